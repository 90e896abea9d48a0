//! Salted Ed25519 signatures
//!
//! The signed message is `salt ‖ message`. The salt travels with the node in
//! its `by` block, so verification needs only the node itself.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use microledger_core::{MicroledgerError, Result, SigningKeypair};
use rand_core::{CryptoRng, RngCore};

/// Salt length drawn for every signed node
pub const SALT_BYTES: usize = 16;

/// Ed25519 seed length
pub const SEED_BYTES: usize = 32;

/// Characters of the encoded public key kept in a key id
const KEY_ID_CHARS: usize = 7;

/// Build a keypair from a 32-byte seed
pub fn keypair_from_seed(seed: &[u8; SEED_BYTES]) -> SigningKeypair {
    let signing_key = SigningKey::from_bytes(seed);
    SigningKeypair::new(
        signing_key.verifying_key().to_bytes().to_vec(),
        seed.to_vec(),
    )
}

/// Generate a keypair from a caller-supplied random source
pub fn keypair_from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> SigningKeypair {
    let mut seed = [0u8; SEED_BYTES];
    rng.fill_bytes(&mut seed);
    keypair_from_seed(&seed)
}

/// Sign `salt ‖ message`
pub fn sign_salted(keypair: &SigningKeypair, message: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
    let seed: [u8; SEED_BYTES] = keypair.private_key().try_into().map_err(|_| {
        MicroledgerError::crypto(format!(
            "Invalid private key length: expected {SEED_BYTES} bytes, got {}",
            keypair.private_key().len()
        ))
    })?;
    let signing_key = SigningKey::from_bytes(&seed);
    let signature = signing_key.sign(&salted(salt, message));
    Ok(signature.to_bytes().to_vec())
}

/// Verify a salted signature; any malformed input verifies as false
pub fn verify_salted(public_key: &[u8], message: &[u8], signature: &[u8], salt: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    verifying_key
        .verify(&salted(salt, message), &Signature::from_bytes(&sig_bytes))
        .is_ok()
}

/// Key id used by authorization profiles: `#` plus the first characters of
/// the URL-safe base64 public key
pub fn key_id(public_key: &[u8]) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(public_key);
    let truncated: String = encoded.chars().take(KEY_ID_CHARS).collect();
    format!("#{truncated}")
}

fn salted(salt: &[u8], message: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(salt.len() + message.len());
    buf.extend_from_slice(salt);
    buf.extend_from_slice(message);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_sign_and_verify() {
        let keypair = keypair_from_seed(&[1u8; SEED_BYTES]);
        let salt = [5u8; SALT_BYTES];
        let signature = sign_salted(&keypair, b"node", &salt).unwrap();

        assert!(verify_salted(keypair.public_key(), b"node", &signature, &salt));
        assert!(!verify_salted(keypair.public_key(), b"nodf", &signature, &salt));
        assert!(!verify_salted(keypair.public_key(), b"node", &signature, &[6u8; SALT_BYTES]));
    }

    #[test]
    fn test_malformed_inputs_do_not_verify() {
        let keypair = keypair_from_seed(&[2u8; SEED_BYTES]);
        let signature = sign_salted(&keypair, b"m", b"s").unwrap();
        assert!(!verify_salted(&[0u8; 3], b"m", &signature, b"s"));
        assert!(!verify_salted(keypair.public_key(), b"m", &signature[..10], b"s"));
    }

    #[test]
    fn test_bad_private_key_length() {
        let keypair = SigningKeypair::new(vec![0; 32], vec![0; 5]);
        assert!(sign_salted(&keypair, b"m", b"s").is_err());
    }

    #[test]
    fn test_key_id_shape() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let keypair = keypair_from_rng(&mut rng);
        let id = key_id(keypair.public_key());
        assert!(id.starts_with('#'));
        assert_eq!(id.len(), 1 + KEY_ID_CHARS);
        assert_eq!(id, key_id(keypair.public_key()));
    }

    proptest! {
        #[test]
        fn prop_signatures_bind_salt_and_message(
            seed in any::<[u8; 32]>(),
            message in proptest::collection::vec(any::<u8>(), 0..64),
            salt in any::<[u8; 16]>(),
        ) {
            let keypair = keypair_from_seed(&seed);
            let signature = sign_salted(&keypair, &message, &salt).unwrap();
            prop_assert!(verify_salted(keypair.public_key(), &message, &signature, &salt));

            let mut other_salt = salt;
            other_salt[0] ^= 0xff;
            prop_assert!(!verify_salted(keypair.public_key(), &message, &signature, &other_salt));
        }
    }
}
