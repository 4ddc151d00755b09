//! Vault module: encrypted record storage.
//!
//! This module provides:
//! - `Record` and `LegacyRecord` types (`record`)
//! - The `nonce || ciphertext` envelope and versioned plaintext schema (`format`)
//! - `Store` for creating, unlocking and saving vaults, and the unlocked `Database` (`store`)

pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use format::{Decoded, FORMAT_VERSION};
pub use record::{LegacyRecord, Record, SUPPORTED_ALGORITHMS};
pub use store::{Database, Store};
