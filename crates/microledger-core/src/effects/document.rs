//! Document accumulator interface
//!
//! Turns the current accumulated document plus a delta into the next document
//! and the ordered patch describing the change. Implementations are pure: the
//! ledger owns the current document and replaces it after a successful append.

use crate::errors::Result;
use crate::patch::PatchOp;
use serde_json::Value;

/// Outcome of merging a delta into the accumulated document
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Document after the delta has been applied
    pub state: Value,
    /// Ordered operations describing how `state` differs from the input
    pub patch: Vec<PatchOp>,
}

/// Document accumulator collaborator
pub trait DocumentEffects: Send + Sync {
    /// Merge `delta` into `current`
    fn merge(&self, current: &Value, delta: &Value) -> Result<MergeOutcome>;
}
