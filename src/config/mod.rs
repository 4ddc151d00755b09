//! Startup configuration.
//!
//! `Config` is resolved once from the process identity (executable name
//! and home directory) plus the optional `Settings` file, then handed to
//! `Store` explicitly.

pub mod settings;

use std::path::{Path, PathBuf};

pub use settings::Settings;

use crate::errors::{Result, VaultError};

/// Executable name used when argv[0] is unavailable.
const FALLBACK_EXE_NAME: &str = "twofat";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the `.enc` vault file.
    pub vault_path: PathBuf,

    /// Default `tracing` filter.
    pub log_filter: String,
}

impl Config {
    /// Configuration for an explicit vault path with default logging.
    pub fn new(vault_path: PathBuf) -> Self {
        Self {
            vault_path,
            log_filter: Settings::default().log_filter,
        }
    }

    /// Default layout for an executable: `<home>/.<exe_name>.enc`.
    pub fn for_executable(exe_name: &str, home: &Path) -> Self {
        Self::new(home.join(format!(".{exe_name}.enc")))
    }

    /// Apply `<home>/.<exe_name>.toml` on top of the default layout.
    pub fn resolve(exe_name: &str, home: &Path) -> Result<Self> {
        let settings = Settings::load(&Settings::file_path(home, exe_name))?;
        let mut config = Self::for_executable(exe_name, home);

        if let Some(path) = settings.vault_path {
            config.vault_path = if path.is_relative() {
                home.join(path)
            } else {
                path
            };
        }
        config.log_filter = settings.log_filter;

        Ok(config)
    }

    /// Resolve configuration for the running process.
    pub fn from_process() -> Result<Self> {
        let exe_name = exe_name(std::env::args_os().next().as_deref().map(Path::new));
        let home = dirs::home_dir().ok_or(VaultError::HomeDirUnavailable)?;
        Self::resolve(&exe_name, &home)
    }
}

/// Base name of the executable path, e.g. `/usr/bin/twofat` -> `twofat`.
fn exe_name(argv0: Option<&Path>) -> String {
    argv0
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_EXE_NAME.to_string())
}
