//! # Microledger Testkit
//!
//! Shared helpers for ledger tests:
//!
//! - [`FaultyStorageHandler`]: wraps a store, fails armed writes and logs calls
//! - [`DeterministicCryptoHandler`]: real primitives with seeded randomness
//! - [`fixtures`]: keypairs and gated genesis documents

#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Seeded crypto handler
pub mod crypto;
/// Keypair and genesis fixtures
pub mod fixtures;
/// Fault-injecting byte store
pub mod storage;

pub use crypto::DeterministicCryptoHandler;
pub use fixtures::{authorized_genesis, keypair};
pub use storage::{FaultyStorageHandler, StoreOp};
