//! Error types for authorization configuration

use thiserror::Error;

/// Authorization configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Path protections need a signing keypair
    #[error("A keypair is required when path protections are configured")]
    MissingKeypair,

    /// Required genesis property is absent
    #[error("Genesis is missing required property `{0}`")]
    MissingProperty(String),

    /// Authorization section carries an unknown property
    #[error("Unexpected authorization property `{0}`, only `profiles` and `rules` are allowed")]
    UnexpectedProperty(String),

    /// Authorization section does not have the expected shape
    #[error("Malformed authorization section: {0}")]
    Malformed(String),
}
