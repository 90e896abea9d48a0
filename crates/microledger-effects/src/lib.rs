//! # Microledger Effects - Production Handlers
//!
//! Stateless or self-contained implementations of the collaborator traits
//! declared in `microledger-core`.
//!
//! - [`MemoryStorageHandler`]: anonymous in-memory byte range
//! - [`FilesystemStorageHandler`]: one file on the local filesystem
//! - [`RealCryptoHandler`]: BLAKE3 / Ed25519 / XChaCha20-Poly1305 with OS randomness
//!
//! Test doubles (fault injection, seeded randomness) live in `microledger-testkit`.

#![forbid(unsafe_code)]

/// Production crypto handler
pub mod crypto;
/// Byte store handlers
pub mod storage;

pub use crypto::RealCryptoHandler;
pub use storage::{FilesystemStorageHandler, MemoryStorageHandler};
