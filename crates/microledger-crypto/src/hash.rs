//! Keyed hashing for node content
//!
//! Node hashes are BLAKE3 in keyed mode. The key is a domain separator rather
//! than a secret: it keeps ledger hashes distinct from any other BLAKE3 use of
//! the same bytes. It is handed to the crypto handler at construction.

use microledger_core::SecretKey;
use subtle::ConstantTimeEq;

/// Length of the keyed-hash domain key
pub const HASH_KEY_BYTES: usize = 32;

/// Default domain key: the label `microledger` repeated to fill 32 bytes
pub const DEFAULT_HASH_KEY: [u8; HASH_KEY_BYTES] = fill_key(b"microledger");

const fn fill_key(label: &[u8]) -> [u8; HASH_KEY_BYTES] {
    let mut key = [0u8; HASH_KEY_BYTES];
    let mut i = 0;
    while i < HASH_KEY_BYTES {
        key[i] = label[i % label.len()];
        i += 1;
    }
    key
}

/// Keyed BLAKE3 digest of `data`
pub fn keyed_hash(key: &[u8; HASH_KEY_BYTES], data: &[u8]) -> [u8; 32] {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Derive the symmetric ledger key from a passphrase
pub fn derive_secret_key(key: &[u8; HASH_KEY_BYTES], passphrase: &[u8]) -> SecretKey {
    SecretKey::from_bytes(keyed_hash(key, passphrase))
}

/// Constant-time byte comparison for digests
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
