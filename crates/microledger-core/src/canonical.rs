//! Canonical serialization
//!
//! Node hashes and signatures are computed over these bytes, and re-serializing
//! a decoded node must reproduce them exactly. `serde_json` gives that as long
//! as structs keep a fixed field order and objects are key-sorted maps, which
//! is the default `serde_json::Map` representation.

use crate::errors::{MicroledgerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize a value to canonical bytes
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| MicroledgerError::serialize(e.to_string()))
}

/// Deserialize a value from canonical bytes
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| MicroledgerError::deserialize(e.to_string()))
}

/// Serde adapter storing byte vectors as lowercase hex strings
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as hex
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Deserialize bytes from hex
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}
