//! Ledger mode flags and format version
//!
//! The header stores the mode as two ASCII characters. The first records
//! whether payloads are sealed with a secret key; the second records whether
//! nodes are signed, and whether appends pass through the authorization gate.
//! On reopen the mode is recomputed from the current options and compared
//! with the stored code, never trusted from the file.

use crate::errors::{MicroledgerError, Result};
use std::fmt;

/// On-disk format version written into every header
pub const FORMAT_VERSION: [u8; 2] = *b"01";

/// Signing configuration of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningMode {
    /// No keypair; nodes carry no `by` block
    Unsigned,
    /// Every node is signed by the configured keypair
    Signed,
    /// Signed, and every append is checked against path protections
    Gated,
}

impl SigningMode {
    fn code(self) -> u8 {
        match self {
            Self::Unsigned => b'0',
            Self::Signed => b'1',
            Self::Gated => b'2',
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'0' => Some(Self::Unsigned),
            b'1' => Some(Self::Signed),
            b'2' => Some(Self::Gated),
            _ => None,
        }
    }
}

/// Feature flags persisted in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerMode {
    /// Payloads are sealed with a secret key
    pub encrypted: bool,
    /// Signing configuration
    pub signing: SigningMode,
}

impl LedgerMode {
    /// Compute the mode from construction options
    ///
    /// The gate only counts when a keypair is present; protections without a
    /// keypair are rejected earlier, at option validation.
    pub fn from_options(secret_key: bool, keypair: bool, gated: bool) -> Self {
        let signing = match (keypair, gated) {
            (false, _) => SigningMode::Unsigned,
            (true, false) => SigningMode::Signed,
            (true, true) => SigningMode::Gated,
        };
        Self {
            encrypted: secret_key,
            signing,
        }
    }

    /// Two-character header code
    pub fn encode(self) -> [u8; 2] {
        [if self.encrypted { b'1' } else { b'0' }, self.signing.code()]
    }

    /// Decode a header code
    pub fn decode(code: [u8; 2]) -> Result<Self> {
        let encrypted = match code[0] {
            b'0' => false,
            b'1' => true,
            _ => return Err(Self::unknown(code)),
        };
        let signing = SigningMode::from_code(code[1]).ok_or_else(|| Self::unknown(code))?;
        Ok(Self { encrypted, signing })
    }

    /// Whether nodes are signed
    pub fn is_signed(self) -> bool {
        !matches!(self.signing, SigningMode::Unsigned)
    }

    /// Whether appends pass through the authorization gate
    pub fn is_gated(self) -> bool {
        matches!(self.signing, SigningMode::Gated)
    }

    fn unknown(code: [u8; 2]) -> MicroledgerError {
        MicroledgerError::ModeMismatch {
            expected: "a known mode code".to_string(),
            found: String::from_utf8_lossy(&code).into_owned(),
        }
    }
}

impl fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.encode();
        write!(f, "{}{}", code[0] as char, code[1] as char)
    }
}
