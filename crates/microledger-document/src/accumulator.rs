//! Append-only merge of a delta into the accumulated document
//!
//! Rules, applied recursively from the document root:
//! - a key missing from the document is added
//! - an object merged into an object recurses
//! - an array merged into an array appends every element
//! - any other differing value replaces the existing one
//! - an equal value produces no operation
//!
//! The root of both the document and the delta must be a JSON object.

use crate::pointer;
use microledger_core::{DocumentEffects, MergeOutcome, MicroledgerError, PatchOp, Result};
use serde_json::{Map, Value};

/// Document accumulator that never removes data
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendOnlyDocument;

impl AppendOnlyDocument {
    /// Create the accumulator
    pub fn new() -> Self {
        Self
    }
}

impl DocumentEffects for AppendOnlyDocument {
    fn merge(&self, current: &Value, delta: &Value) -> Result<MergeOutcome> {
        let Value::Object(current) = current else {
            return Err(MicroledgerError::invalid(format!(
                "Accumulated document must be an object, found {}",
                kind(current)
            )));
        };
        let Value::Object(delta) = delta else {
            return Err(MicroledgerError::invalid(format!(
                "Delta must be an object, found {}",
                kind(delta)
            )));
        };

        let mut state = current.clone();
        let mut patch = Vec::new();
        merge_object(&mut state, delta, "", &mut patch);

        Ok(MergeOutcome {
            state: Value::Object(state),
            patch,
        })
    }
}

fn merge_object(
    target: &mut Map<String, Value>,
    delta: &Map<String, Value>,
    base: &str,
    patch: &mut Vec<PatchOp>,
) {
    for (key, incoming) in delta {
        let path = pointer::join(base, key);
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, incoming, &path, patch),
            None => {
                patch.push(PatchOp::add(path, incoming.clone()));
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value, path: &str, patch: &mut Vec<PatchOp>) {
    match (existing, incoming) {
        (Value::Object(target), Value::Object(delta)) => merge_object(target, delta, path, patch),
        (Value::Array(items), Value::Array(appended)) => {
            for item in appended {
                let item_path = pointer::join(path, &items.len().to_string());
                patch.push(PatchOp::add(item_path, item.clone()));
                items.push(item.clone());
            }
        }
        (existing, incoming) => {
            if existing != incoming {
                patch.push(PatchOp::replace(path, incoming.clone()));
                *existing = incoming.clone();
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
