//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The cost parameters are fixed: they are part of
//! the on-disk format, because a vault only stores the salt and the
//! exact same settings must be reproduced at unlock time.  Changing
//! any of them requires a new format version.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters for format version 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

/// 64 MB, 3 iterations, 4 lanes.
pub const FORMAT_V1_PARAMS: Argon2Params = Argon2Params {
    memory_kib: 65_536,
    iterations: 3,
    parallelism: 4,
};

/// Derive a 32-byte key from a password and salt using Argon2id with
/// the format version 1 parameters.
///
/// The same password + salt always produces the same key.  The key is
/// wiped from memory when the returned wrapper is dropped.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = Params::new(
        FORMAT_V1_PARAMS.memory_kib,
        FORMAT_V1_PARAMS.iterations,
        FORMAT_V1_PARAMS.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut *key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}
