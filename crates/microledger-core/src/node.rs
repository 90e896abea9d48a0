//! Chain node model
//!
//! A node is one link of the chain: the accumulated document after a delta,
//! the delta itself, the patch describing the change, the hash of the
//! previous node, an optional signature block and the node's own hash.
//!
//! Two byte views matter for integrity:
//! - [`Node::hashable_bytes`]: every field except `hash` (the `by` block included)
//! - [`Node::signable_bytes`]: every field except `hash` and `by`
//!
//! Both are produced by the same field-ordered struct so the bytes are stable
//! across decode and re-encode.

use crate::canonical::{self, hex_bytes};
use crate::errors::Result;
use crate::patch::PatchOp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Sequence number of the genesis node
pub const GENESIS_SEQ: i64 = -1;

/// Sentinel stored in place of a previous hash on the genesis node
const GENESIS_SENTINEL: &str = "genesis";

/// Link to the previous node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousHash {
    /// The node is the genesis node
    Genesis,
    /// Hash of the node at `seq - 1`
    Hash(Vec<u8>),
}

impl PreviousHash {
    /// Hash bytes, if this is not the genesis sentinel
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Genesis => None,
            Self::Hash(bytes) => Some(bytes),
        }
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Genesis => serializer.serialize_str(GENESIS_SENTINEL),
            Self::Hash(bytes) => serializer.serialize_str(&hex::encode(bytes)),
        }
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        if encoded == GENESIS_SENTINEL {
            return Ok(Self::Genesis);
        }
        hex::decode(&encoded)
            .map(Self::Hash)
            .map_err(serde::de::Error::custom)
    }
}

/// Signature block attached to signed nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    /// Public key of the signer
    #[serde(with = "hex_bytes")]
    pub key: Vec<u8>,
    /// Random salt mixed into the signed message
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,
    /// Signature over the salt and the node's signable bytes
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// One link of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Hash of the previous node, or the genesis sentinel
    pub previous_hash: PreviousHash,
    /// Position in the chain; genesis is -1
    pub seq: i64,
    /// Accumulated document after applying `delta`
    pub state: Value,
    /// Value passed to append
    pub delta: Value,
    /// How `state` changed relative to the previous node
    pub patch: Vec<PatchOp>,
    /// Signature block, present when the ledger signs nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Signer>,
    /// Keyed content hash over every other field
    #[serde(with = "hex_bytes")]
    pub hash: Vec<u8>,
}

/// Borrowed view of a node without its hash
#[derive(Serialize)]
struct NodeContent<'a> {
    previous_hash: &'a PreviousHash,
    seq: i64,
    state: &'a Value,
    delta: &'a Value,
    patch: &'a [PatchOp],
    #[serde(skip_serializing_if = "Option::is_none")]
    by: Option<&'a Signer>,
}

impl Node {
    /// Unsealed node: no signature, empty hash
    pub fn unsealed(
        previous_hash: PreviousHash,
        seq: i64,
        state: Value,
        delta: Value,
        patch: Vec<PatchOp>,
    ) -> Self {
        Self {
            previous_hash,
            seq,
            state,
            delta,
            patch,
            by: None,
            hash: Vec::new(),
        }
    }

    /// Whether this is the genesis node
    pub fn is_genesis(&self) -> bool {
        self.seq == GENESIS_SEQ
    }

    /// Canonical bytes covered by `hash`
    pub fn hashable_bytes(&self) -> Result<Vec<u8>> {
        canonical::to_vec(&self.content(self.by.as_ref()))
    }

    /// Canonical bytes covered by `by.signature`
    pub fn signable_bytes(&self) -> Result<Vec<u8>> {
        canonical::to_vec(&self.content(None))
    }

    /// Canonical bytes of the whole node, as stored in a frame
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        canonical::to_vec(self)
    }

    /// Decode a node from canonical bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        canonical::from_slice(bytes)
    }

    /// Patch paths touched by this node
    pub fn patch_paths(&self) -> impl Iterator<Item = &str> {
        self.patch.iter().map(|op| op.path.as_str())
    }

    fn content<'a>(&'a self, by: Option<&'a Signer>) -> NodeContent<'a> {
        NodeContent {
            previous_hash: &self.previous_hash,
            seq: self.seq,
            state: &self.state,
            delta: &self.delta,
            patch: &self.patch,
            by,
        }
    }
}
