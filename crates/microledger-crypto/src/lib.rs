//! Cryptographic primitives for Microledger
//!
//! Pure functions only. Randomness is always supplied by the caller (salts,
//! nonces, seeds) so the effect handlers decide where it comes from.

#![forbid(unsafe_code)]

/// Keyed BLAKE3 hashing and secret-key derivation
pub mod hash;
/// XChaCha20-Poly1305 sealing of ledger payloads
pub mod sealing;
/// Salted Ed25519 signatures and key identifiers
pub mod signature;

pub use hash::{constant_time_eq, derive_secret_key, keyed_hash, DEFAULT_HASH_KEY, HASH_KEY_BYTES};
pub use sealing::{seal, unseal, NONCE_BYTES};
pub use signature::{
    key_id, keypair_from_rng, keypair_from_seed, sign_salted, verify_salted, SALT_BYTES,
    SEED_BYTES,
};
