//! Diagnostic logging via `tracing`.
//!
//! Events go to stderr.  `RUST_LOG` wins over the configured filter.
//! Passwords, keys and plaintext are never logged.

use tracing_subscriber::EnvFilter;

use crate::errors::{Result, VaultError};

/// Install the global fmt subscriber.
///
/// `default_filter` is used when `RUST_LOG` is unset or invalid.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| VaultError::ConfigError(format!("invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| VaultError::ConfigError(format!("logging already initialized: {e}")))
}
