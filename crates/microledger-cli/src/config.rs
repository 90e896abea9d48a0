//! CLI configuration file
//!
//! Ledger settings sit at the top level next to the CLI-only keys:
//!
//! ```toml
//! ledger = "data/ledger.log"
//! keypair = "keys/operator.key"
//! secret_key = "passphrase"
//!
//! [genesis]
//! count = 0
//! ```

use anyhow::{Context, Result};
use microledger::{LedgerConfig, LedgerOptions};
use microledger_core::SigningKeypair;
use microledger_crypto::{keypair_from_seed, SEED_BYTES};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from `--config`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Ledger file
    #[serde(default = "default_ledger_path")]
    pub ledger: PathBuf,
    /// File holding the hex-encoded signing seed
    #[serde(default)]
    pub keypair: Option<PathBuf>,
    /// Ledger settings
    #[serde(flatten)]
    pub settings: LedgerConfig,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("ledger.log")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger: default_ledger_path(),
            keypair: None,
            settings: LedgerConfig::default(),
        }
    }
}

impl CliConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("Invalid config {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Ledger options, with the signing keypair attached when configured
    pub async fn ledger_options(&self) -> Result<LedgerOptions> {
        let mut options = LedgerOptions::from_config(&self.settings);
        if let Some(path) = &self.keypair {
            options = options.with_keypair(read_keypair(path).await?);
        }
        Ok(options)
    }
}

/// Read a signing keypair from a hex seed file
pub async fn read_keypair(path: &Path) -> Result<SigningKeypair> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read keypair {}", path.display()))?;
    let bytes = hex::decode(content.trim()).context("Keypair file is not valid hex")?;
    let seed: [u8; SEED_BYTES] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("Keypair seed must be {SEED_BYTES} bytes"))?;
    Ok(keypair_from_seed(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.ledger, PathBuf::from("ledger.log"));
    }

    #[test]
    fn test_flattened_settings() {
        let config = CliConfig::from_toml_str(
            r#"
            ledger = "data/ledger.log"
            keypair = "keys/operator.key"
            cache_capacity = 8

            [genesis]
            count = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.ledger, PathBuf::from("data/ledger.log"));
        assert_eq!(config.keypair, Some(PathBuf::from("keys/operator.key")));
        assert_eq!(config.settings.cache_capacity, 8);
        assert_eq!(config.settings.genesis, json!({"count": 0}));
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[tokio::test]
    async fn test_read_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.key");
        tokio::fs::write(&path, format!("{}\n", hex::encode([5u8; 32])))
            .await
            .unwrap();
        let keypair = read_keypair(&path).await.unwrap();
        assert_eq!(keypair.public_key(), keypair_from_seed(&[5; 32]).public_key());

        tokio::fs::write(&path, "abcd").await.unwrap();
        assert!(read_keypair(&path).await.is_err());
    }
}
