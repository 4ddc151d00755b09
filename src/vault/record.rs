//! Record types stored inside a vault.
//!
//! A `Record` holds the generation parameters of one TOTP account.
//! `LegacyRecord` is the pre-1.0.0 shape; it is only ever decoded to
//! detect an old datafile, never converted.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Keyed-hash algorithms an account may use.
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["SHA1", "SHA256", "SHA512"];

/// One stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Base32 shared secret.
    pub secret: String,

    /// Number of code digits, kept as text so future formats can widen it.
    pub digits: String,

    /// Hash algorithm name, e.g. "SHA1".
    pub algorithm: String,
}

impl Record {
    /// Build a validated record.
    ///
    /// `secret` must be non-empty, `digits` must be a decimal number and
    /// `algorithm` must be one of `SUPPORTED_ALGORITHMS`.
    pub fn new(
        secret: impl Into<String>,
        digits: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Result<Self> {
        let record = Self {
            secret: secret.into(),
            digits: digits.into(),
            algorithm: algorithm.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(VaultError::InvalidRecord("secret cannot be empty".into()));
        }
        if self.digits.is_empty() || !self.digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VaultError::InvalidRecord(format!(
                "digit count '{}' is not a number",
                self.digits
            )));
        }
        if !SUPPORTED_ALGORITHMS.contains(&self.algorithm.as_str()) {
            return Err(VaultError::InvalidRecord(format!(
                "unsupported algorithm '{}' (expected one of {})",
                self.algorithm,
                SUPPORTED_ALGORITHMS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Pre-1.0.0 record: digit count was an integer and there was no
/// algorithm field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyRecord {
    pub secret: String,
    pub digits: i64,
}
