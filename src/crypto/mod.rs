//! Cryptographic primitives for the datastore.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with caller-supplied nonces (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)

pub mod encryption;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, generate_nonce, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, Argon2Params, FORMAT_V1_PARAMS, KEY_LEN};
