use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{Result, VaultError};

/// User-level settings, loaded from `~/.<exe-name>.toml`.
///
/// Every field has a sensible default so the tool works out-of-the-box
/// without any settings file at all.  Key derivation costs are not
/// settings: they are fixed by the vault format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Vault file location.  Relative paths are resolved against the
    /// home directory.
    #[serde(default)]
    pub vault_path: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_log_filter() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Settings file location for an executable name.
    ///
    /// Example: `/home/user/.twofat.toml`
    pub fn file_path(home: &Path, exe_name: &str) -> PathBuf {
        home.join(format!(".{exe_name}.toml"))
    }

    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_returns_defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(&tmp.path().join(".twofat.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".twofat.toml");
        fs::write(&path, "vault_path = \"vaults/otp.enc\"\nlog_filter = \"debug\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.vault_path, Some(PathBuf::from("vaults/otp.enc")));
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".twofat.toml");
        fs::write(&path, "not valid {{toml").unwrap();
        assert!(matches!(Settings::load(&path), Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn kdf_settings_are_not_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".twofat.toml");
        fs::write(&path, "argon2_iterations = 1\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn file_path_is_dotfile_in_home() {
        let p = Settings::file_path(Path::new("/home/user"), "twofat");
        assert_eq!(p, PathBuf::from("/home/user/.twofat.toml"));
    }
}
