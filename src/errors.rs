use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the twofat datastore.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Vault file errors ---
    #[error("Insufficient data in {0}")]
    InsufficientData(PathBuf),

    #[error("Wrong password")]
    WrongPassword,

    #[error("Invalid entries data")]
    InvalidEntries,

    #[error(
        "This datafile uses the pre-1.0.0 format. Export its contents with a twofat \
         version below 1.0.0 and import the exported data with twofat 1.0.0 or later."
    )]
    LegacyFormatDetected,

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Could not get randomized data")]
    RandomUnavailable,

    // --- Record errors ---
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Password prompt errors ---
    #[error("Password prompt failed: {0}")]
    PromptFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Could not determine the home directory")]
    HomeDirUnavailable,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error category, for callers that only need to branch on the
/// kind of failure and not on its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InsufficientData,
    WrongPassword,
    InvalidEntries,
    LegacyFormatDetected,
    Io,
    Other,
}

impl VaultError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::WrongPassword => ErrorKind::WrongPassword,
            Self::InvalidEntries => ErrorKind::InvalidEntries,
            Self::LegacyFormatDetected => ErrorKind::LegacyFormatDetected,
            Self::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Other,
        }
    }
}

/// Convenience type alias for datastore results.
pub type Result<T> = std::result::Result<T, VaultError>;
