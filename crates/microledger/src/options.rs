//! Ledger construction options

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::config::LedgerConfig;
use microledger_authorization::{ConditionPredicate, GrantPredicate, PathProtection};
use microledger_core::{CryptoEffects, DocumentEffects, SigningKeypair, Value};
use microledger_document::AppendOnlyDocument;
use microledger_effects::RealCryptoHandler;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Builder for everything a [`crate::Ledger`] needs besides its store
///
/// Defaults: empty-object genesis, no encryption, no signing, no gate, a
/// cache of [`DEFAULT_CACHE_CAPACITY`] frames, and the production
/// collaborators ([`RealCryptoHandler`], [`AppendOnlyDocument`],
/// [`ConditionPredicate`]).
#[derive(Clone)]
pub struct LedgerOptions {
    pub(crate) genesis: Value,
    pub(crate) passphrase: Option<Zeroizing<Vec<u8>>>,
    pub(crate) keypair: Option<SigningKeypair>,
    pub(crate) protections: Option<Vec<PathProtection>>,
    pub(crate) cache_capacity: usize,
    pub(crate) crypto: Arc<dyn CryptoEffects>,
    pub(crate) document: Arc<dyn DocumentEffects>,
    pub(crate) predicate: Arc<dyn GrantPredicate>,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            genesis: Value::Object(Default::default()),
            passphrase: None,
            keypair: None,
            protections: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            crypto: Arc::new(RealCryptoHandler::default()),
            document: Arc::new(AppendOnlyDocument),
            predicate: Arc::new(ConditionPredicate),
        }
    }
}

impl LedgerOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a loaded configuration file
    pub fn from_config(config: &LedgerConfig) -> Self {
        let mut options = Self::new()
            .with_genesis(config.genesis.clone())
            .with_cache_capacity(config.cache_capacity);
        if let Some(passphrase) = &config.secret_key {
            options = options.with_secret_key(passphrase);
        }
        if let Some(protections) = &config.protections {
            options = options.with_protections(protections.clone());
        }
        options
    }

    /// Document written as the genesis node on first open
    pub fn with_genesis(mut self, genesis: Value) -> Self {
        self.genesis = genesis;
        self
    }

    /// Seal every payload with a key derived from `passphrase`
    pub fn with_secret_key(mut self, passphrase: impl AsRef<[u8]>) -> Self {
        self.passphrase = Some(Zeroizing::new(passphrase.as_ref().to_vec()));
        self
    }

    /// Sign every node with `keypair`
    pub fn with_keypair(mut self, keypair: SigningKeypair) -> Self {
        self.keypair = Some(keypair);
        self
    }

    /// Gate appends with path protections (requires a keypair)
    pub fn with_protections(mut self, protections: Vec<PathProtection>) -> Self {
        self.protections = Some(protections);
        self
    }

    /// Maximum number of cached frame payloads
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Replace the crypto collaborator
    pub fn with_crypto(mut self, crypto: Arc<dyn CryptoEffects>) -> Self {
        self.crypto = crypto;
        self
    }

    /// Replace the document accumulator
    pub fn with_document(mut self, document: Arc<dyn DocumentEffects>) -> Self {
        self.document = document;
        self
    }

    /// Replace the grant predicate used by the gate
    pub fn with_grant_predicate(mut self, predicate: Arc<dyn GrantPredicate>) -> Self {
        self.predicate = predicate;
        self
    }
}

impl std::fmt::Debug for LedgerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerOptions")
            .field("genesis", &self.genesis)
            .field("encrypted", &self.passphrase.is_some())
            .field("keypair", &self.keypair)
            .field("protections", &self.protections)
            .field("cache_capacity", &self.cache_capacity)
            .finish_non_exhaustive()
    }
}
