//! Collaborator interfaces
//!
//! The engine consumes these as black boxes with fixed contracts. Production
//! handlers live in `microledger-effects`, the document accumulator in
//! `microledger-document`, and test doubles in `microledger-testkit`.

pub mod crypto;
pub mod document;
pub mod storage;

pub use crypto::CryptoEffects;
pub use document::{DocumentEffects, MergeOutcome};
pub use storage::{StorageEffects, StoreError, StoreStat};
