//! Unified error system for the ledger
//!
//! One error type for every engine operation. Store-level failures keep their
//! own enum ([`StoreError`]) so the lifecycle can tell "not found" apart from
//! real I/O trouble.

use crate::effects::StoreError;

/// Unified error type for all ledger operations
#[derive(Debug, thiserror::Error)]
pub enum MicroledgerError {
    /// Persisted format version differs from the one this build writes
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build expects
        expected: String,
        /// Version found on the store
        found: String,
    },

    /// Persisted mode differs from the mode implied by the current options
    #[error("Mode mismatch: expected {expected}, found {found}")]
    ModeMismatch {
        /// Mode code computed from the current options
        expected: String,
        /// Mode code found on the store
        found: String,
    },

    /// Authorization gate denied the append
    #[error("Not allowed: {reason}")]
    NotAllowed {
        /// Why the candidate node was rejected
        reason: String,
    },

    /// Sealed payload could not be opened
    #[error("Decrypt error: {0}")]
    Decrypt(String),

    /// Payload bytes are not a valid node
    #[error("Deserialize error: {0}")]
    Deserialize(String),

    /// Value could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// Byte store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Signing or key material failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Invalid input to an operation
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Invalid construction options or configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Framing on the store is inconsistent
    #[error("Corrupt ledger: {0}")]
    Corrupt(String),
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, MicroledgerError>;

impl MicroledgerError {
    /// Create an authorization denial
    pub fn not_allowed(reason: impl Into<String>) -> Self {
        Self::NotAllowed {
            reason: reason.into(),
        }
    }

    /// Create a decrypt error
    pub fn decrypt(message: impl Into<String>) -> Self {
        Self::Decrypt(message.into())
    }

    /// Create a deserialize error
    pub fn deserialize(message: impl Into<String>) -> Self {
        Self::Deserialize(message.into())
    }

    /// Create a serialize error
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize(message.into())
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a corruption error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }

    /// Whether this error is the store reporting a missing backing object
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }

    /// Whether this error is fatal to opening the ledger
    pub fn is_open_mismatch(&self) -> bool {
        matches!(
            self,
            Self::VersionMismatch { .. } | Self::ModeMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for MicroledgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = MicroledgerError::from(StoreError::not_found("ledger.log"));
        assert!(err.is_not_found());
        assert!(!MicroledgerError::corrupt("short header").is_not_found());
    }

    #[test]
    fn test_mismatch_display() {
        let err = MicroledgerError::ModeMismatch {
            expected: "11".into(),
            found: "01".into(),
        };
        assert!(err.is_open_mismatch());
        assert_eq!(err.to_string(), "Mode mismatch: expected 11, found 01");
    }
}
