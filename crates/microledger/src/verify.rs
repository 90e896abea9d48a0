//! Node integrity and chain linkage checks

use microledger_core::{CryptoEffects, Node};
use microledger_crypto::constant_time_eq;

/// Whether `node` hashes to its stored hash and, if signed, carries a valid
/// signature from its embedded key
pub fn verify_integrity(crypto: &dyn CryptoEffects, node: &Node) -> bool {
    let hashable = match node.hashable_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(seq = node.seq, error = %e, "node could not be re-encoded");
            return false;
        }
    };
    if !constant_time_eq(&crypto.hash(&hashable), &node.hash) {
        return false;
    }

    let Some(by) = &node.by else {
        return true;
    };
    match node.signable_bytes() {
        Ok(signable) => crypto.verify(&by.key, &signable, &by.signature, &by.salt),
        Err(_) => false,
    }
}

/// Whether `node` commits to `previous` by hash
pub fn is_linked(previous: &Node, node: &Node) -> bool {
    node.seq == previous.seq + 1
        && node
            .previous_hash
            .as_bytes()
            .is_some_and(|hash| hash == previous.hash.as_slice())
}
