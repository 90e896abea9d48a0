//! Frame codec
//!
//! A frame is `[8B big-endian length][payload]`. The payload is the canonical
//! node encoding, sealed when the ledger has a secret key. Only the physical
//! tail carries a trailing copy of its length, which lets the last node be
//! read without scanning.

use microledger_core::{CryptoEffects, MicroledgerError, Node, Result, SecretKey};
use std::sync::Arc;

/// Width of every length field
pub const LENGTH_BYTES: usize = 8;

/// Encode a payload length
pub fn encode_length(length: u64) -> [u8; LENGTH_BYTES] {
    length.to_be_bytes()
}

/// Decode a payload length read from the store
pub fn decode_length(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; LENGTH_BYTES] = bytes.try_into().map_err(|_| {
        MicroledgerError::corrupt(format!(
            "Length field must be {LENGTH_BYTES} bytes, found {}",
            bytes.len()
        ))
    })?;
    Ok(u64::from_be_bytes(raw))
}

/// Bytes of a new tail frame, minus its leading length
///
/// Written at `size + 8` before the leading length replaces the old reverse
/// length at `size`.
pub fn tail_bytes(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + LENGTH_BYTES);
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&encode_length(payload.len() as u64));
    bytes
}

/// Converts nodes to frame payloads and back
#[derive(Clone)]
pub struct PayloadCodec {
    crypto: Arc<dyn CryptoEffects>,
    secret_key: Option<SecretKey>,
}

impl PayloadCodec {
    /// Create a codec, sealing payloads when `secret_key` is set
    pub fn new(crypto: Arc<dyn CryptoEffects>, secret_key: Option<SecretKey>) -> Self {
        Self { crypto, secret_key }
    }

    /// Whether payloads are sealed
    pub fn is_sealed(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Payload bytes for `node`
    pub fn encode(&self, node: &Node) -> Result<Vec<u8>> {
        let bytes = node.to_bytes()?;
        match &self.secret_key {
            Some(key) => self.crypto.secret_encrypt(key, &bytes),
            None => Ok(bytes),
        }
    }

    /// Node stored in `payload`
    pub fn decode(&self, payload: &[u8]) -> Result<Node> {
        match &self.secret_key {
            Some(key) => Node::from_bytes(&self.crypto.secret_decrypt(key, payload)?),
            None => Node::from_bytes(payload),
        }
    }
}

impl std::fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCodec")
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use microledger_core::PreviousHash;
    use microledger_effects::RealCryptoHandler;
    use serde_json::json;

    fn node() -> Node {
        let mut node = Node::unsealed(
            PreviousHash::Genesis,
            -1,
            json!({"secret": "plans"}),
            json!({"secret": "plans"}),
            Vec::new(),
        );
        node.hash = vec![7; 32];
        node
    }

    #[test]
    fn test_length_codec() {
        assert_eq!(decode_length(&encode_length(513)).unwrap(), 513);
        assert_matches!(decode_length(&[0; 3]), Err(MicroledgerError::Corrupt(_)));
    }

    #[test]
    fn test_tail_bytes() {
        let bytes = tail_bytes(b"xyz");
        assert_eq!(&bytes[..3], b"xyz");
        assert_eq!(&bytes[3..], &3u64.to_be_bytes());
    }

    #[test]
    fn test_plain_payload_is_canonical_node() {
        let codec = PayloadCodec::new(Arc::new(RealCryptoHandler::default()), None);
        let payload = codec.encode(&node()).unwrap();
        assert_eq!(payload, node().to_bytes().unwrap());
        assert_eq!(codec.decode(&payload).unwrap(), node());
    }

    #[test]
    fn test_sealed_payload_hides_plaintext() {
        let crypto: Arc<dyn CryptoEffects> = Arc::new(RealCryptoHandler::default());
        let key = crypto.derive_secret_key(b"hunter2");
        let codec = PayloadCodec::new(crypto.clone(), Some(key));
        let payload = codec.encode(&node()).unwrap();
        assert!(!String::from_utf8_lossy(&payload).contains("plans"));
        assert_eq!(codec.decode(&payload).unwrap(), node());

        let other = PayloadCodec::new(crypto.clone(), Some(crypto.derive_secret_key(b"other")));
        assert_matches!(other.decode(&payload), Err(MicroledgerError::Decrypt(_)));
    }
}
