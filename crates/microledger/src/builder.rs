//! Chain node builder
//!
//! Builds the genesis node and each successor: merge the delta into the
//! accumulated document, link to the previous hash, sign when a keypair is
//! configured, then hash.

use microledger_core::{
    CryptoEffects, DocumentEffects, Node, PreviousHash, Result, Signer, SigningKeypair, Value,
    GENESIS_SEQ,
};
use microledger_crypto::SALT_BYTES;
use std::sync::Arc;

/// Produces sealed nodes ready to be framed
#[derive(Clone)]
pub struct NodeBuilder {
    crypto: Arc<dyn CryptoEffects>,
    document: Arc<dyn DocumentEffects>,
    keypair: Option<SigningKeypair>,
}

impl NodeBuilder {
    /// Create a builder, signing with `keypair` when set
    pub fn new(
        crypto: Arc<dyn CryptoEffects>,
        document: Arc<dyn DocumentEffects>,
        keypair: Option<SigningKeypair>,
    ) -> Self {
        Self {
            crypto,
            document,
            keypair,
        }
    }

    /// Genesis node: `state = delta = value`, no patch
    pub fn genesis(&self, value: Value) -> Result<Node> {
        let node = Node::unsealed(
            PreviousHash::Genesis,
            GENESIS_SEQ,
            value.clone(),
            value,
            Vec::new(),
        );
        self.seal(node)
    }

    /// Successor of `previous` at `seq`, applying `delta` to `previous.state`
    pub fn next(&self, previous: &Node, delta: Value, seq: i64) -> Result<Node> {
        let merged = self.document.merge(&previous.state, &delta)?;
        let node = Node::unsealed(
            PreviousHash::Hash(previous.hash.clone()),
            seq,
            merged.state,
            delta,
            merged.patch,
        );
        self.seal(node)
    }

    fn seal(&self, mut node: Node) -> Result<Node> {
        if let Some(keypair) = &self.keypair {
            let salt = self.crypto.random_bytes(SALT_BYTES);
            let signature = self
                .crypto
                .sign(keypair, &node.signable_bytes()?, &salt)?;
            node.by = Some(Signer {
                key: keypair.public_key().to_vec(),
                salt,
                signature,
            });
        }
        node.hash = self.crypto.hash(&node.hashable_bytes()?);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_integrity;
    use microledger_core::PatchOp;
    use microledger_document::AppendOnlyDocument;
    use microledger_effects::RealCryptoHandler;
    use serde_json::json;

    fn builder(keypair: Option<SigningKeypair>) -> NodeBuilder {
        NodeBuilder::new(
            Arc::new(RealCryptoHandler::default()),
            Arc::new(AppendOnlyDocument),
            keypair,
        )
    }

    #[test]
    fn test_genesis_node() {
        let genesis = builder(None).genesis(json!({"count": 0})).unwrap();
        assert_eq!(genesis.seq, GENESIS_SEQ);
        assert_eq!(genesis.previous_hash, PreviousHash::Genesis);
        assert_eq!(genesis.state, genesis.delta);
        assert!(genesis.patch.is_empty());
        assert!(genesis.by.is_none());
        assert_eq!(genesis.hash.len(), 32);
    }

    #[test]
    fn test_next_links_and_patches() {
        let builder = builder(None);
        let genesis = builder.genesis(json!({"count": 0})).unwrap();
        let node = builder.next(&genesis, json!({"count": 1}), 0).unwrap();

        assert_eq!(node.previous_hash.as_bytes(), Some(genesis.hash.as_slice()));
        assert_eq!(node.state, json!({"count": 1}));
        assert_eq!(node.patch, vec![PatchOp::replace("/count", json!(1))]);
        assert_ne!(node.hash, genesis.hash);
    }

    #[test]
    fn test_signed_nodes_carry_signer() {
        let keypair = microledger_crypto::keypair_from_seed(&[3; 32]);
        let crypto = RealCryptoHandler::default();
        let node = builder(Some(keypair.clone()))
            .genesis(json!({"publicKey": []}))
            .unwrap();

        let by = node.by.as_ref().unwrap();
        assert_eq!(by.key, keypair.public_key());
        assert_eq!(by.salt.len(), SALT_BYTES);
        assert!(verify_integrity(&crypto, &node));
    }

    #[test]
    fn test_rejects_non_object_delta() {
        let builder = builder(None);
        let genesis = builder.genesis(json!({})).unwrap();
        assert!(builder.next(&genesis, json!([1, 2]), 0).is_err());
    }
}
