//! Command handlers

use crate::config::CliConfig;
use anyhow::{bail, Context, Result};
use futures::StreamExt;
use microledger::{Ledger, Node};
use microledger_core::CryptoEffects;
use microledger_crypto::key_id;
use microledger_effects::{FilesystemStorageHandler, RealCryptoHandler};
use serde_json::Value;
use std::path::Path;
use tokio::io::AsyncWriteExt;

async fn open(config: &CliConfig) -> Result<Ledger<FilesystemStorageHandler>> {
    let options = config.ledger_options().await?;
    let ledger = Ledger::new(FilesystemStorageHandler::new(&config.ledger), options)?;
    ledger
        .open()
        .await
        .with_context(|| format!("Failed to open {}", config.ledger.display()))?;
    Ok(ledger)
}

fn print_node(node: &Node) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}

/// Write a fresh signing seed to `out` and print its key id
pub async fn keygen(out: &Path) -> Result<()> {
    if tokio::fs::try_exists(out).await? {
        bail!("{} already exists", out.display());
    }
    let keypair = RealCryptoHandler::default().generate_keypair();
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;
    file.write_all(hex::encode(keypair.private_key()).as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;
    file.flush().await?;

    println!("key id:     {}", key_id(keypair.public_key()));
    println!("public key: {}", hex::encode(keypair.public_key()));
    Ok(())
}

/// Open or create the ledger and print a summary
pub async fn init(config: &CliConfig) -> Result<()> {
    let ledger = open(config).await?;
    println!("ledger:   {}", config.ledger.display());
    println!("mode:     {}", ledger.mode());
    println!("next seq: {}", ledger.next_seq().await?);
    println!("size:     {}", ledger.size().await?);
    Ok(())
}

/// Append a JSON delta and print the new node
pub async fn append(config: &CliConfig, delta: &str) -> Result<()> {
    let delta: Value = serde_json::from_str(delta).context("Delta is not valid JSON")?;
    let mut ledger = open(config).await?;
    let node = ledger.append(delta).await?;
    tracing::info!(seq = node.seq, "appended");
    print_node(&node)
}

/// Print the node at `seq`
pub async fn get(config: &CliConfig, seq: i64) -> Result<()> {
    let ledger = open(config).await?;
    match ledger.get(seq).await? {
        Some(node) => print_node(&node),
        None => bail!("No readable node at seq {seq}"),
    }
}

/// Print the last node
pub async fn last(config: &CliConfig) -> Result<()> {
    let ledger = open(config).await?;
    print_node(&ledger.last().await?)
}

/// Verify one node, or the whole chain when `seq` is omitted
pub async fn verify(config: &CliConfig, seq: Option<i64>) -> Result<()> {
    let ledger = open(config).await?;
    let (target, valid) = match seq {
        Some(seq) => (format!("seq {seq}"), ledger.verify(seq).await?),
        None => ("chain".to_string(), ledger.verify_all().await?),
    };
    if !valid {
        bail!("Verification failed for {target}");
    }
    println!("{target}: ok");
    Ok(())
}

/// Print every node as one JSON line
pub async fn dump(config: &CliConfig) -> Result<()> {
    let ledger = open(config).await?;
    let nodes = ledger.nodes();
    futures::pin_mut!(nodes);
    let mut seq = microledger::GENESIS_SEQ;
    while let Some(node) = nodes.next().await {
        match node? {
            Some(node) => println!("{}", serde_json::to_string(&node)?),
            None => tracing::warn!(seq, "unreadable node"),
        }
        seq += 1;
    }
    Ok(())
}
