//! # Microledger
//!
//! Single-writer, append-only, tamper-evident ledger of JSON document states.
//!
//! Every node holds the accumulated document, the delta that produced it, a
//! patch describing the change, the hash of its predecessor, an optional
//! signature and its own keyed hash. Nodes are framed onto a random-access
//! byte store behind a small header recording the format version and mode.
//!
//! ```no_run
//! use microledger::{Ledger, LedgerOptions};
//! use microledger_effects::MemoryStorageHandler;
//! use serde_json::json;
//!
//! # async fn demo() -> microledger::Result<()> {
//! let options = LedgerOptions::new().with_genesis(json!({"count": 0}));
//! let mut ledger = Ledger::new(MemoryStorageHandler::new(), options)?;
//! ledger.append(json!({"count": 1})).await?;
//! assert!(ledger.verify_all().await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture Constraints
//!
//! - YES framing, lifecycle, verification and the authorization gate
//! - NO concrete stores or crypto (see `microledger-effects`)
//! - NO replication or multi-writer coordination

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Chain node builder
pub mod builder;
/// Bounded cache of raw frame payloads
pub mod cache;
/// TOML-backed configuration
pub mod config;
/// Length framing and payload sealing
pub mod frame;
/// Authorization gate
pub mod gate;
/// Header encoding and validation
pub mod header;
/// Ledger lifecycle and operations
pub mod ledger;
/// Construction options
pub mod options;
/// Integrity and linkage checks
pub mod verify;

pub use builder::NodeBuilder;
pub use cache::{CachedFrame, RecordCache, DEFAULT_CACHE_CAPACITY};
pub use config::LedgerConfig;
pub use frame::{PayloadCodec, LENGTH_BYTES};
pub use gate::AuthorizationGate;
pub use header::HEADER_PROLOGUE;
pub use ledger::Ledger;
pub use options::LedgerOptions;
pub use verify::{is_linked, verify_integrity};

pub use microledger_authorization::{PathProtection, Profile, Rule};
pub use microledger_core::{
    LedgerMode, MicroledgerError, Node, PatchOp, PatchOpKind, PreviousHash, Result, Signer,
    SigningKeypair, SigningMode, StorageEffects, Value, GENESIS_SEQ,
};
