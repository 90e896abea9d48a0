//! Sealing and opening of ledger payloads

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use microledger_core::{MicroledgerError, Result, SecretKey};

/// Nonce length, prepended to every sealed payload
pub const NONCE_BYTES: usize = 24;

/// Encrypt `plaintext`, returning `nonce ‖ ciphertext`
pub fn seal(key: &SecretKey, nonce: &[u8; NONCE_BYTES], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| MicroledgerError::crypto(format!("Failed to create cipher: {e}")))?;

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|e| MicroledgerError::crypto(format!("Encryption failed: {e}")))?;

    let mut sealed = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    sealed.extend_from_slice(nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a payload produced by [`seal`]
pub fn unseal(key: &SecretKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_BYTES {
        return Err(MicroledgerError::decrypt("Ciphertext too short"));
    }

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| MicroledgerError::decrypt(format!("Failed to create cipher: {e}")))?;

    let (nonce, ciphertext) = sealed.split_at(NONCE_BYTES);
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|e| MicroledgerError::decrypt(format!("Decryption failed: {e}")))
}
