//! Document patch operations
//!
//! The document is append-only, so a patch only ever adds or replaces values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of patch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    /// A value appeared at a path that did not exist before
    Add,
    /// A value at an existing path was replaced
    Replace,
}

/// A single document mutation, addressed by JSON pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    /// Operation kind
    pub op: PatchOpKind,
    /// JSON pointer of the mutated location
    pub path: String,
    /// Value written at `path`
    pub value: Value,
}

impl PatchOp {
    /// Create an `add` operation
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Add,
            path: path.into(),
            value,
        }
    }

    /// Create a `replace` operation
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: path.into(),
            value,
        }
    }
}
