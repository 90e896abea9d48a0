//! Append-only document accumulation
//!
//! Each ledger node stores the full document after its delta was merged, plus
//! the patch describing the merge. This crate provides the merge: objects
//! merge key by key, arrays grow by appending, scalars are replaced, and
//! nothing is ever removed.

#![forbid(unsafe_code)]

/// Append-only merge
pub mod accumulator;
/// JSON pointer construction
pub mod pointer;

pub use accumulator::AppendOnlyDocument;
pub use pointer::{escape_segment, join};
