//! Production crypto handler
//!
//! Delegates to the primitives in `microledger-crypto` and draws randomness
//! from the operating system.

use microledger_core::{CryptoEffects, MicroledgerError, Result, SecretKey, SigningKeypair};
use microledger_crypto::{self as primitives, DEFAULT_HASH_KEY, HASH_KEY_BYTES, NONCE_BYTES};
use rand::rngs::OsRng;
use rand::RngCore;

/// Crypto handler backed by OS randomness
#[derive(Debug, Clone)]
pub struct RealCryptoHandler {
    hash_key: [u8; HASH_KEY_BYTES],
}

impl RealCryptoHandler {
    /// Create a handler hashing under `hash_key`
    pub fn new(hash_key: [u8; HASH_KEY_BYTES]) -> Self {
        Self { hash_key }
    }

    /// Domain key this handler hashes under
    pub fn hash_key(&self) -> &[u8; HASH_KEY_BYTES] {
        &self.hash_key
    }
}

impl Default for RealCryptoHandler {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_KEY)
    }
}

impl CryptoEffects for RealCryptoHandler {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        primitives::keyed_hash(&self.hash_key, data).to_vec()
    }

    fn derive_secret_key(&self, passphrase: &[u8]) -> SecretKey {
        primitives::derive_secret_key(&self.hash_key, passphrase)
    }

    fn sign(&self, keypair: &SigningKeypair, message: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
        primitives::sign_salted(keypair, message, salt)
    }

    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8], salt: &[u8]) -> bool {
        primitives::verify_salted(public_key, message, signature, salt)
    }

    fn secret_encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_BYTES];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| MicroledgerError::crypto(format!("Failed to draw nonce: {e}")))?;
        primitives::seal(key, &nonce, plaintext)
    }

    fn secret_decrypt(&self, key: &SecretKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        primitives::unseal(key, ciphertext)
    }

    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }

    fn generate_keypair(&self) -> SigningKeypair {
        primitives::keypair_from_rng(&mut OsRng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_injected_key() {
        let default = RealCryptoHandler::default();
        let custom = RealCryptoHandler::new([9u8; HASH_KEY_BYTES]);
        assert_eq!(default.hash(b"x"), default.hash(b"x"));
        assert_ne!(default.hash(b"x"), custom.hash(b"x"));
        assert_eq!(default.hash(b"x").len(), 32);
    }

    #[test]
    fn test_encrypt_uses_fresh_nonces() {
        let crypto = RealCryptoHandler::default();
        let key = crypto.derive_secret_key(b"secret");
        let a = crypto.secret_encrypt(&key, b"same").unwrap();
        let b = crypto.secret_encrypt(&key, b"same").unwrap();
        assert_ne!(a, b);
        assert_eq!(crypto.secret_decrypt(&key, &a).unwrap(), b"same");
        assert_eq!(crypto.secret_decrypt(&key, &b).unwrap(), b"same");
    }

    #[test]
    fn test_generated_keypair_signs() {
        let crypto = RealCryptoHandler::default();
        let keypair = crypto.generate_keypair();
        let salt = crypto.random_bytes(16);
        let signature = crypto.sign(&keypair, b"msg", &salt).unwrap();
        assert!(crypto.verify(keypair.public_key(), b"msg", &signature, &salt));
    }
}
