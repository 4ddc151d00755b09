//! Vault file envelope and record-set encoding.
//!
//! A `.enc` vault file has this layout:
//!
//! ```text
//! [nonce: 12 bytes][AES-256-GCM ciphertext + 16-byte tag]
//! ```
//!
//! The nonce doubles as the Argon2id salt.  The plaintext inside the
//! ciphertext is a versioned JSON document:
//!
//! ```text
//! {"version": 1, "entries": {"<name>": {"secret": "..", "digits": "6", "algorithm": "SHA1"}}}
//! ```
//!
//! Datafiles written before 1.0.0 hold a bare map of `LegacyRecord`s
//! instead.  Those are recognised and reported, never upgraded here.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::record::{LegacyRecord, Record};
use crate::crypto::NONCE_LEN;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current plaintext schema version.
pub const FORMAT_VERSION: u32 = 1;

/// Smallest valid vault file: a nonce plus at least one ciphertext byte.
pub const MIN_FILE_LEN: usize = NONCE_LEN + 1;

// ---------------------------------------------------------------------------
// Plaintext schema
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CurrentDocumentRef<'a> {
    version: u32,
    entries: &'a BTreeMap<String, Record>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CurrentDocument {
    version: u32,
    entries: BTreeMap<String, Record>,
}

/// Outcome of the two-stage plaintext parser.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Parsed under the current schema.
    Current(BTreeMap<String, Record>),
    /// Parsed under the pre-1.0.0 schema only.
    Legacy(BTreeMap<String, LegacyRecord>),
    /// Neither schema matched.
    Unparseable,
}

/// Encode a record set as the current versioned document.
pub fn encode(records: &BTreeMap<String, Record>) -> Result<Zeroizing<Vec<u8>>> {
    let doc = CurrentDocumentRef {
        version: FORMAT_VERSION,
        entries: records,
    };
    serde_json::to_vec(&doc)
        .map(Zeroizing::new)
        .map_err(|e| VaultError::SerializationError(format!("entries: {e}")))
}

/// Parse plaintext, trying the current schema first and the legacy
/// schema second.
///
/// Stage order matters: a document that matches the current schema is
/// never reported as legacy.
pub fn parse(plaintext: &[u8]) -> Decoded {
    if let Ok(doc) = serde_json::from_slice::<CurrentDocument>(plaintext) {
        if doc.version == FORMAT_VERSION {
            return Decoded::Current(doc.entries);
        }
        tracing::debug!(version = doc.version, "unsupported entries version");
        return Decoded::Unparseable;
    }

    match serde_json::from_slice::<BTreeMap<String, LegacyRecord>>(plaintext) {
        Ok(legacy) => Decoded::Legacy(legacy),
        Err(_) => Decoded::Unparseable,
    }
}

/// Decode plaintext into the current record set.
///
/// Returns `LegacyFormatDetected` for a pre-1.0.0 record set and
/// `InvalidEntries` when nothing matches.
pub fn decode(plaintext: &[u8]) -> Result<BTreeMap<String, Record>> {
    match parse(plaintext) {
        Decoded::Current(records) => Ok(records),
        Decoded::Legacy(_) => Err(VaultError::LegacyFormatDetected),
        Decoded::Unparseable => Err(VaultError::InvalidEntries),
    }
}

// ---------------------------------------------------------------------------
// File envelope
// ---------------------------------------------------------------------------

/// Split raw file bytes into `(nonce, ciphertext)`.
///
/// `path` is only used for the error message.
pub fn split_vault<'a>(path: &Path, data: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
    if data.len() < MIN_FILE_LEN {
        return Err(VaultError::InsufficientData(path.to_path_buf()));
    }
    Ok(data.split_at(NONCE_LEN))
}

/// Build the on-disk bytes: `nonce || ciphertext`.
pub fn join_vault(nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);
    buf
}
