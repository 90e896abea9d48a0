//! File-backed ledgers and chain properties

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_matches::assert_matches;
use microledger::{Ledger, LedgerConfig, LedgerOptions, MicroledgerError};
use microledger_effects::{FilesystemStorageHandler, MemoryStorageHandler};
use microledger_testkit::{keypair, DeterministicCryptoHandler};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_file_ledger_resumes_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("ledger.log");
    let options = || {
        LedgerOptions::new()
            .with_genesis(json!({"count": 0}))
            .with_keypair(keypair(2))
            .with_secret_key("file passphrase")
    };

    let mut ledger = Ledger::new(FilesystemStorageHandler::new(&path), options()).unwrap();
    for i in 1..=3 {
        ledger.append(json!({"count": i})).await.unwrap();
    }
    let last = ledger.last().await.unwrap();
    drop(ledger);

    let mut reopened = Ledger::new(FilesystemStorageHandler::new(&path), options()).unwrap();
    assert_eq!(reopened.last().await.unwrap(), last);
    assert_eq!(reopened.next_seq().await.unwrap(), 3);
    reopened.append(json!({"count": 4})).await.unwrap();
    assert!(reopened.verify_all().await.unwrap());

    let plain = Ledger::new(
        FilesystemStorageHandler::new(&path),
        LedgerOptions::new().with_keypair(keypair(2)),
    )
    .unwrap();
    assert_matches!(plain.open().await, Err(MicroledgerError::ModeMismatch { .. }));

    reopened.destroy().await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_options_from_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("microledger.toml");
    tokio::fs::write(
        &config_path,
        r#"
        cache_capacity = 2
        secret_key = "from config"

        [genesis]
        name = "configured"
        "#,
    )
    .await
    .unwrap();

    let config = LedgerConfig::load_from_file(&config_path).await.unwrap();
    let store = FilesystemStorageHandler::new(dir.path().join("ledger.log"));
    let mut ledger = Ledger::new(store, LedgerOptions::from_config(&config)).unwrap();
    ledger.append(json!({"entries": [1]})).await.unwrap();
    ledger.append(json!({"entries": [2]})).await.unwrap();

    assert!(ledger.mode().encrypted);
    assert_eq!(
        ledger.document().await.unwrap(),
        json!({"name": "configured", "entries": [1, 2]})
    );
}

#[tokio::test]
async fn test_seeded_crypto_is_reproducible() {
    async fn build(seed: u64) -> Vec<u8> {
        let store = MemoryStorageHandler::new();
        let options = LedgerOptions::new()
            .with_keypair(keypair(5))
            .with_secret_key("seeded")
            .with_crypto(Arc::new(DeterministicCryptoHandler::new(seed)));
        let mut ledger = Ledger::new(store.clone(), options).unwrap();
        ledger.append(json!({"a": 1})).await.unwrap();
        ledger.append(json!({"b": [true]})).await.unwrap();
        store.contents()
    }

    assert_eq!(build(11).await, build(11).await);
    assert_ne!(build(11).await, build(12).await);
}

#[tokio::test]
async fn test_float_payloads_verify_after_reopen() {
    let store = MemoryStorageHandler::new();
    let mut ledger = Ledger::new(store.clone(), LedgerOptions::new()).unwrap();
    ledger.append(json!({"v": 0.11950560363673307})).await.unwrap();
    ledger.append(json!({"w": [1e-300, -2.5e17, 0.1]})).await.unwrap();
    drop(ledger);

    let reopened = Ledger::new(store, LedgerOptions::new().with_cache_capacity(1)).unwrap();
    assert!(reopened.verify(0).await.unwrap());
    assert!(reopened.verify(1).await.unwrap());
    assert!(reopened.verify_all().await.unwrap());
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        any::<i32>().prop_map(|v| json!(v)),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(|v| json!(v)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_chain_links_for_any_appends(
        deltas in proptest::collection::vec(
            proptest::collection::btree_map("[a-d]", scalar(), 1..4),
            0..8,
        ),
        capacity in 1usize..4,
    ) {
        runtime().block_on(async {
            let store = MemoryStorageHandler::new();
            let mut ledger = Ledger::new(store.clone(), LedgerOptions::new()).unwrap();
            for delta in &deltas {
                ledger.append(json!(delta)).await.unwrap();
            }
            drop(ledger);

            let reopened = Ledger::new(store, LedgerOptions::new().with_cache_capacity(capacity))
                .unwrap();
            let mut previous = reopened.get(-1).await.unwrap().unwrap();
            for seq in 0..deltas.len() as i64 {
                let node = reopened.get(seq).await.unwrap().unwrap();
                prop_assert_eq!(node.previous_hash.as_bytes(), Some(previous.hash.as_slice()));
                prop_assert!(reopened.verify_integrity(&node));
                let recoded = microledger::Node::from_bytes(&node.to_bytes().unwrap()).unwrap();
                prop_assert_eq!(&recoded, &node);
                previous = node;
            }
            prop_assert_eq!(reopened.last().await.unwrap(), previous);
            prop_assert!(reopened.verify_all().await.unwrap());
            Ok(())
        })?;
    }
}
