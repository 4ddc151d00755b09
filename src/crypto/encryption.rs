//! AES-256-GCM authenticated encryption.
//!
//! Unlike a self-contained blob format, the nonce is chosen by the
//! caller: the vault stores it up front and also uses it as the
//! Argon2id salt, so it has to exist before the key does.
//!
//! Ciphertext layout returned by `encrypt`:
//!   [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Generate a fresh random 12-byte nonce from the OS CSPRNG.
///
/// 96 random bits per call make a collision across any realistic
/// number of saves negligible.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| VaultError::RandomUnavailable)?;
    Ok(nonce)
}

/// Encrypt `plaintext` with a 32-byte `key` under `nonce`.
///
/// Returns ciphertext with the tag appended.  A nonce must never be
/// reused with the same key.
pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::EncryptionFailed(format!(
            "nonce must be {NONCE_LEN} bytes (got {})",
            nonce.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Decrypt and authenticate data produced by `encrypt`.
///
/// Every failure collapses into `WrongPassword`: a bad key, a bad
/// nonce and a tampered ciphertext are indistinguishable to the caller,
/// and nothing is returned unless the tag verifies.
pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::WrongPassword);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::WrongPassword)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::WrongPassword)?;

    Ok(Zeroizing::new(plaintext))
}
