//! Cryptographic effects trait definitions
//!
//! Hashing, signing and sealing are pure CPU work, so this interface is
//! synchronous. Randomness is part of the same trait so tests can swap in a
//! seeded source and get reproducible salts and nonces.
//!
//! The keyed-hash domain key is handler configuration: it is injected when the
//! handler is constructed and never passed per call.

use crate::errors::Result;
use crate::keys::{SecretKey, SigningKeypair};

/// Cryptographic collaborator for the ledger engine
pub trait CryptoEffects: Send + Sync {
    /// Keyed content hash using the handler's domain key
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Derive the symmetric ledger key from a user-supplied passphrase
    fn derive_secret_key(&self, passphrase: &[u8]) -> SecretKey;

    /// Sign `message` together with `salt`
    fn sign(&self, keypair: &SigningKeypair, message: &[u8], salt: &[u8]) -> Result<Vec<u8>>;

    /// Verify a salted signature; malformed keys or signatures verify as false
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8], salt: &[u8]) -> bool;

    /// Authenticated symmetric encryption
    fn secret_encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Authenticated symmetric decryption, failing with `Decrypt`
    fn secret_decrypt(&self, key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Fresh random bytes
    fn random_bytes(&self, len: usize) -> Vec<u8>;

    /// Generate a new signing keypair
    fn generate_keypair(&self) -> SigningKeypair;
}
