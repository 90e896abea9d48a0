//! Authorization gate
//!
//! Intercepts appends on gated ledgers. The candidate's signer is looked up
//! in the authorization section of the *previous* node's state, so a node can
//! never grant itself the rights it needs.

use crate::verify::verify_integrity;
use microledger_authorization::{
    first_violation, resolve_grants, AuthorizationState, GrantPredicate, PathProtection,
};
use microledger_core::{CryptoEffects, MicroledgerError, Node, Result};
use microledger_crypto::key_id;
use std::sync::Arc;

/// Path-protection check applied before a node is written
#[derive(Clone)]
pub struct AuthorizationGate {
    protections: Vec<PathProtection>,
    predicate: Arc<dyn GrantPredicate>,
}

impl AuthorizationGate {
    /// Create a gate over `protections`
    pub fn new(protections: Vec<PathProtection>, predicate: Arc<dyn GrantPredicate>) -> Self {
        Self {
            protections,
            predicate,
        }
    }

    /// Configured protections
    pub fn protections(&self) -> &[PathProtection] {
        &self.protections
    }

    /// Whether `next` may follow `previous`
    pub fn is_granted(&self, crypto: &dyn CryptoEffects, next: &Node, previous: &Node) -> bool {
        self.check(crypto, next, previous).is_ok()
    }

    /// Like [`Self::is_granted`], with the reason for a denial
    pub fn check(&self, crypto: &dyn CryptoEffects, next: &Node, previous: &Node) -> Result<()> {
        if !verify_integrity(crypto, next) {
            return Err(MicroledgerError::not_allowed(format!(
                "node {} failed integrity check",
                next.seq
            )));
        }
        let Some(by) = &next.by else {
            return Err(MicroledgerError::not_allowed(format!(
                "node {} is unsigned",
                next.seq
            )));
        };

        let signer = key_id(&by.key);
        let state = AuthorizationState::from_document(&previous.state).unwrap_or_default();
        let grants = resolve_grants(&state, &signer, self.predicate.as_ref());

        match first_violation(&self.protections, next.patch_paths(), &grants) {
            None => Ok(()),
            Some(violation) => {
                tracing::warn!(
                    seq = next.seq,
                    signer = %signer,
                    path = %violation.path,
                    grant = %violation.grant,
                    "append denied"
                );
                Err(MicroledgerError::not_allowed(format!(
                    "{signer} lacks grant `{}` required for {}",
                    violation.grant, violation.path
                )))
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("protections", &self.protections)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeBuilder;
    use assert_matches::assert_matches;
    use microledger_authorization::ConditionPredicate;
    use microledger_core::SigningKeypair;
    use microledger_document::AppendOnlyDocument;
    use microledger_effects::RealCryptoHandler;
    use serde_json::{json, Value};

    fn keypair(seed: u8) -> SigningKeypair {
        microledger_crypto::keypair_from_seed(&[seed; 32])
    }

    fn builder(keypair: SigningKeypair) -> NodeBuilder {
        NodeBuilder::new(
            Arc::new(RealCryptoHandler::default()),
            Arc::new(AppendOnlyDocument),
            Some(keypair),
        )
    }

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new(
            vec![PathProtection::new("/docs", "write")],
            Arc::new(ConditionPredicate),
        )
    }

    fn genesis_for(writer: &SigningKeypair) -> Value {
        json!({
            "publicKey": [],
            "docs": {},
            "authorization": {
                "profiles": [{"key": key_id(writer.public_key()), "roles": ["editor"]}],
                "rules": [{"grant": ["write"], "when": {"roles": "editor"}}]
            }
        })
    }

    #[test]
    fn test_profiled_signer_is_granted() {
        let crypto = RealCryptoHandler::default();
        let writer = keypair(1);
        let builder = builder(writer.clone());
        let genesis = builder.genesis(genesis_for(&writer)).unwrap();
        let next = builder
            .next(&genesis, json!({"docs": {"a": "hello"}}), 0)
            .unwrap();
        assert!(gate().is_granted(&crypto, &next, &genesis));
    }

    #[test]
    fn test_unknown_signer_is_denied() {
        let crypto = RealCryptoHandler::default();
        let genesis = builder(keypair(1)).genesis(genesis_for(&keypair(1))).unwrap();
        let next = builder(keypair(2))
            .next(&genesis, json!({"docs": {"a": "hello"}}), 0)
            .unwrap();
        assert_matches!(
            gate().check(&crypto, &next, &genesis),
            Err(MicroledgerError::NotAllowed { reason }) if reason.contains("/docs/a")
        );
    }

    #[test]
    fn test_unprotected_paths_need_no_grant() {
        let crypto = RealCryptoHandler::default();
        let genesis = builder(keypair(1)).genesis(genesis_for(&keypair(1))).unwrap();
        let next = builder(keypair(2))
            .next(&genesis, json!({"notes": "free"}), 0)
            .unwrap();
        assert!(gate().is_granted(&crypto, &next, &genesis));
    }

    #[test]
    fn test_missing_authorization_denies_protected_paths() {
        let crypto = RealCryptoHandler::default();
        let builder = builder(keypair(1));
        let genesis = builder.genesis(json!({"docs": {}})).unwrap();
        let next = builder.next(&genesis, json!({"docs": {"a": 1}}), 0).unwrap();
        assert!(!gate().is_granted(&crypto, &next, &genesis));
    }

    #[test]
    fn test_tampered_candidate_is_denied() {
        let crypto = RealCryptoHandler::default();
        let writer = keypair(1);
        let builder = builder(writer.clone());
        let genesis = builder.genesis(genesis_for(&writer)).unwrap();
        let mut next = builder.next(&genesis, json!({"notes": "x"}), 0).unwrap();
        next.delta = json!({"notes": "y"});
        assert!(!gate().is_granted(&crypto, &next, &genesis));
    }
}
