//! Key material containers
//!
//! Plain byte holders so the core stays independent of any particular
//! signature or cipher crate. Secret halves are zeroized on drop.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the symmetric ledger key
pub const SECRET_KEY_BYTES: usize = 32;

/// Symmetric key used to seal the genesis payload and every frame
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretKey([u8; SECRET_KEY_BYTES]);

impl SecretKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; SECRET_KEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_BYTES] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Signing identity: public key plus the private key bytes it was derived from
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKeypair {
    public_key: Vec<u8>,
    private_key: Vec<u8>,
}

impl SigningKeypair {
    /// Assemble a keypair from its two halves
    pub fn new(public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    /// Public half, embedded in every signed node
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Private half
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("public_key", &hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}
