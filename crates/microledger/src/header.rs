//! Ledger header
//!
//! ```text
//! [2B version][2B mode][8B genesis len][genesis payload][8B genesis len]
//! ```
//!
//! The trailing genesis length doubles as the reverse length until the first
//! frame overwrites it.

use crate::frame::{encode_length, LENGTH_BYTES};
use microledger_core::{LedgerMode, MicroledgerError, Result, FORMAT_VERSION};

/// Bytes of version plus mode at the start of every store
pub const HEADER_PROLOGUE: usize = 4;

/// Offset of the genesis payload
pub const GENESIS_OFFSET: u64 = (HEADER_PROLOGUE + LENGTH_BYTES) as u64;

/// Full header bytes for a fresh store, trailing length included
pub fn encode_header(mode: LedgerMode, genesis_payload: &[u8]) -> Vec<u8> {
    let length = encode_length(genesis_payload.len() as u64);
    let mut header =
        Vec::with_capacity(HEADER_PROLOGUE + 2 * LENGTH_BYTES + genesis_payload.len());
    header.extend_from_slice(&FORMAT_VERSION);
    header.extend_from_slice(&mode.encode());
    header.extend_from_slice(&length);
    header.extend_from_slice(genesis_payload);
    header.extend_from_slice(&length);
    header
}

/// Check a stored prologue against the version and the expected mode
///
/// The version is compared first, so a store written by another format
/// version reports `VersionMismatch` even when its mode code also differs.
pub fn check_prologue(prologue: &[u8], expected: LedgerMode) -> Result<()> {
    let [v0, v1, m0, m1] = prologue else {
        return Err(MicroledgerError::corrupt(format!(
            "Header prologue must be {HEADER_PROLOGUE} bytes, found {}",
            prologue.len()
        )));
    };

    if [*v0, *v1] != FORMAT_VERSION {
        return Err(MicroledgerError::VersionMismatch {
            expected: String::from_utf8_lossy(&FORMAT_VERSION).into_owned(),
            found: String::from_utf8_lossy(&[*v0, *v1]).into_owned(),
        });
    }

    if [*m0, *m1] != expected.encode() {
        return Err(MicroledgerError::ModeMismatch {
            expected: expected.to_string(),
            found: String::from_utf8_lossy(&[*m0, *m1]).into_owned(),
        });
    }

    Ok(())
}
