//! File-backed ledger configuration
//!
//! ```toml
//! cache_capacity = 1024
//! secret_key = "correct horse battery staple"
//!
//! [genesis]
//! publicKey = []
//! authorization = { profiles = [], rules = [] }
//!
//! [[protections]]
//! path = "/authorization"
//! grant = "key_admin"
//! ```

use crate::cache::DEFAULT_CACHE_CAPACITY;
use microledger_authorization::PathProtection;
use microledger_core::{MicroledgerError, Result, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable ledger settings
///
/// Key material for signing is not part of this file; it is attached
/// programmatically through [`crate::LedgerOptions::with_keypair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of cached frame payloads
    pub cache_capacity: usize,
    /// Passphrase the symmetric ledger key is derived from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Genesis document written on first open
    pub genesis: Value,
    /// Path protections; setting this gates every append
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protections: Option<Vec<PathProtection>>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            secret_key: None,
            genesis: Value::Object(Default::default()),
            protections: None,
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MicroledgerError::config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            MicroledgerError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MicroledgerError::config(format!("Failed to render config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.genesis, json!({}));
    }

    #[test]
    fn test_full_config() {
        let config = LedgerConfig::from_toml_str(
            r##"
            cache_capacity = 16
            secret_key = "pass"

            [genesis]
            publicKey = []
            authorization = { profiles = [{ key = "#abc", roles = ["edge"] }], rules = [] }

            [[protections]]
            path = "/authorization"
            grant = "key_admin"
            "##,
        )
        .unwrap();

        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.secret_key.as_deref(), Some("pass"));
        assert_eq!(config.genesis["authorization"]["profiles"][0]["key"], json!("#abc"));
        assert_eq!(
            config.protections,
            Some(vec![PathProtection::new("/authorization", "key_admin")])
        );
    }

    #[test]
    fn test_render_and_reparse() {
        let config = LedgerConfig {
            cache_capacity: 8,
            genesis: json!({"name": "demo"}),
            ..LedgerConfig::default()
        };
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(LedgerConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(LedgerConfig::from_toml_str("cache_capacity = \"many\"").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("microledger.toml");
        tokio::fs::write(&path, "cache_capacity = 4\n").await.unwrap();
        assert_eq!(LedgerConfig::load_from_file(&path).await.unwrap().cache_capacity, 4);
        assert!(LedgerConfig::load_from_file(dir.path().join("missing.toml"))
            .await
            .is_err());
    }
}
