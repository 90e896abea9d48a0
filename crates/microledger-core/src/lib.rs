//! # Microledger Core - Foundation
//!
//! **Purpose**: Define the chain node model, the on-disk mode flags, the error
//! taxonomy, and the collaborator interfaces the ledger engine is written
//! against.
//!
//! # Architecture Constraints
//!
//! - YES Node, patch and mode types shared by every crate
//! - YES Collaborator traits (`StorageEffects`, `CryptoEffects`, `DocumentEffects`)
//! - YES Canonical serialization used for hashing and signing
//! - NO handler implementations (see `microledger-effects`)
//! - NO framing or lifecycle logic (see `microledger`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Canonical, order-stable serialization
pub mod canonical;

/// Collaborator interfaces (byte store, crypto, document accumulator)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Key material containers
pub mod keys;

/// Ledger mode flags and format version
pub mod mode;

/// Chain node model
pub mod node;

/// Document patch operations
pub mod patch;

pub use effects::{
    CryptoEffects, DocumentEffects, MergeOutcome, StorageEffects, StoreError, StoreStat,
};
pub use errors::{MicroledgerError, Result};
pub use keys::{SecretKey, SigningKeypair};
pub use mode::{LedgerMode, SigningMode, FORMAT_VERSION};
pub use node::{Node, PreviousHash, Signer, GENESIS_SEQ};
pub use patch::{PatchOp, PatchOpKind};

/// Re-export of the JSON value type used for document state and deltas
pub use serde_json::Value;
