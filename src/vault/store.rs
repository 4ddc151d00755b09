//! High-level vault operations.
//!
//! `Store` ties the format layer, the crypto layer and password
//! acquisition together: it creates a vault when none exists, unlocks
//! an existing one, and writes the record set back on `save`.
//! `Database` is the unlocked, in-memory result.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::{decrypt, derive_key, encrypt, generate_nonce};
use crate::errors::{Result, VaultError};
use crate::password::{self, PasswordInput};

use super::format;
use super::record::Record;

/// An unlocked vault: the record set plus the password protecting it.
///
/// The password lives only in memory and is wiped on drop.
pub struct Database {
    password: Zeroizing<Vec<u8>>,
    records: BTreeMap<String, Record>,
}

impl Database {
    pub(crate) fn new(password: Zeroizing<Vec<u8>>, records: BTreeMap<String, Record>) -> Self {
        Self { password, records }
    }

    /// All records, ordered by account name.
    pub fn records(&self) -> &BTreeMap<String, Record> {
        &self.records
    }

    /// Look up one account.
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    /// Returns `true` if an account with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Add or replace an account.  Returns the previous record, if any.
    ///
    /// The record is validated first; nothing changes on error.
    pub fn insert(&mut self, name: &str, record: Record) -> Result<Option<Record>> {
        if name.is_empty() {
            return Err(VaultError::InvalidRecord("account name cannot be empty".into()));
        }
        record.validate()?;
        Ok(self.records.insert(name.to_string(), record))
    }

    /// Remove an account, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Record> {
        self.records.remove(name)
    }

    /// Move an account to a new name.
    ///
    /// Fails if `from` is missing or `to` is already taken.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if to.is_empty() {
            return Err(VaultError::InvalidRecord("account name cannot be empty".into()));
        }
        if self.records.contains_key(to) {
            return Err(VaultError::InvalidRecord(format!(
                "account '{to}' already exists"
            )));
        }
        let record = self
            .records
            .remove(from)
            .ok_or_else(|| VaultError::InvalidRecord(format!("account '{from}' not found")))?;
        self.records.insert(to.to_string(), record);
        Ok(())
    }

    /// Account names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("password", &"<redacted>")
            .field("accounts", &self.records.len())
            .finish()
    }
}

/// Vault file handle.  Build one from a `Config`, then `load` it.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.vault_path.clone(),
        }
    }

    /// Path to the `.enc` vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the vault file exists.
    ///
    /// Only "not found" counts as absent; any other stat failure is an
    /// error so that an unreadable vault is never re-initialized.
    pub fn exists(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Open the vault, creating it first if the file does not exist.
    pub fn load(&self, input: &mut dyn PasswordInput) -> Result<Database> {
        if !self.exists()? {
            return self.initialize_new(input);
        }

        tracing::debug!(path = %self.path.display(), "unlocking vault");
        let data = fs::read(&self.path)?;
        let (nonce, ciphertext) = format::split_vault(&self.path, &data)?;

        let password = password::unlock(input)?;

        // The nonce is also the KDF salt.
        let key = derive_key(&password, nonce)?;
        let plaintext = decrypt(key.as_slice(), nonce, ciphertext).map_err(|_| {
            tracing::debug!(path = %self.path.display(), "vault authentication failed");
            VaultError::WrongPassword
        })?;

        let records = format::decode(&plaintext).map_err(|e| {
            if matches!(e, VaultError::LegacyFormatDetected) {
                tracing::debug!(path = %self.path.display(), "pre-1.0.0 datafile detected");
            }
            e
        })?;

        tracing::info!(accounts = records.len(), "vault unlocked");
        Ok(Database::new(password, records))
    }

    /// Create an empty vault protected by a newly chosen password.
    ///
    /// Nothing is written if no password gets confirmed.
    pub fn initialize_new(&self, input: &mut dyn PasswordInput) -> Result<Database> {
        tracing::info!(path = %self.path.display(), "initializing vault");
        if let Some(parent) = self.path.parent() {
            create_private_dir(parent)?;
        }

        let password = password::init(input)?;
        let db = Database::new(password, BTreeMap::new());
        self.save(&db)?;
        Ok(db)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt the record set under a fresh nonce and replace the vault
    /// file atomically (temp file in the same directory, then rename).
    pub fn save(&self, db: &Database) -> Result<()> {
        let nonce = generate_nonce()?;
        let key = derive_key(&db.password, &nonce)?;
        let plaintext = format::encode(&db.records)?;
        let ciphertext = encrypt(key.as_slice(), &nonce, &plaintext)?;

        let buf = format::join_vault(&nonce, &ciphertext);
        write_private_atomic(&self.path, &buf)?;

        tracing::debug!(bytes = buf.len(), accounts = db.records.len(), "vault saved");
        Ok(())
    }

    /// Choose a new password and re-encrypt the whole record set with it.
    ///
    /// On failure the in-memory password and the file stay unchanged.
    pub fn change_password(&self, db: &mut Database, input: &mut dyn PasswordInput) -> Result<()> {
        let new_password = password::init(input)?;
        let old_password = std::mem::replace(&mut db.password, new_password);

        if let Err(e) = self.save(db) {
            db.password = old_password;
            return Err(e);
        }

        tracing::info!("vault password changed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

/// Create `dir` (and parents) readable only by the owner.
fn create_private_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    Ok(())
}

/// Write `data` to `path` with owner-only permissions.
///
/// The bytes land in a uniquely named temp file in the same directory
/// (created 0600), are fsynced, and the file is renamed over the target.
/// The directory is fsynced afterwards so the rename itself is durable.
fn write_private_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!(
        ".{}.",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.as_file_mut().write_all(data)?;
    tmp.as_file().sync_all()?;
    // Dropping the temp file on any error above removes it.
    tmp.persist(path).map_err(|e| e.error)?;

    sync_dir(parent)?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::PipedInput;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn piped(pw: &str) -> PipedInput<Cursor<Vec<u8>>> {
        PipedInput::new(Cursor::new(pw.as_bytes().to_vec()))
    }

    fn store_in(dir: &TempDir) -> Store {
        Store::new(&Config::new(dir.path().join(".twofat.enc")))
    }

    #[test]
    fn database_debug_hides_password() {
        let db = Database::new(Zeroizing::new(b"hunter22".to_vec()), BTreeMap::new());
        let shown = format!("{db:?}");
        assert!(!shown.contains("hunter22"));
    }

    #[test]
    fn insert_validates_record() {
        let mut db = Database::new(Zeroizing::new(b"pw".to_vec()), BTreeMap::new());
        let bad = Record {
            secret: String::new(),
            digits: "6".into(),
            algorithm: "SHA1".into(),
        };
        assert!(db.insert("github", bad).is_err());
        assert!(db.is_empty());

        let good = Record::new("JBSWY3DPEHPK3PXP", "6", "SHA1").unwrap();
        assert!(db.insert("github", good.clone()).unwrap().is_none());
        assert_eq!(db.insert("github", good.clone()).unwrap(), Some(good));
    }

    #[test]
    fn rename_moves_record() {
        let mut db = Database::new(Zeroizing::new(b"pw".to_vec()), BTreeMap::new());
        db.insert("a", Record::new("S", "6", "SHA1").unwrap()).unwrap();
        db.insert("b", Record::new("T", "6", "SHA1").unwrap()).unwrap();

        assert!(db.rename("a", "b").is_err());
        assert!(db.rename("missing", "c").is_err());
        db.rename("a", "c").unwrap();
        assert_eq!(db.names().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn contains_tracks_inserts_and_removals() {
        let mut db = Database::new(Zeroizing::new(b"pw".to_vec()), BTreeMap::new());
        assert!(!db.contains("github"));

        db.insert("github", Record::new("S", "6", "SHA1").unwrap()).unwrap();
        assert!(db.contains("github"));
        assert!(!db.contains("GitHub"));

        db.remove("github");
        assert!(!db.contains("github"));
    }

    #[test]
    fn save_replaces_file_and_resets_mode() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let db = store.load(&mut piped("pw")).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();
        }
        let before = fs::metadata(store.path()).unwrap();

        store.save(&db).unwrap();

        // A new file was renamed into place, not the old one rewritten.
        #[cfg(unix)]
        {
            use std::os::unix::fs::{MetadataExt, PermissionsExt};
            let after = fs::metadata(store.path()).unwrap();
            assert_ne!(after.ino(), before.ino());
            assert_eq!(after.permissions().mode() & 0o777, 0o600);
        }
        #[cfg(not(unix))]
        let _ = before;

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let db = store.load(&mut piped("pw")).unwrap();

        let elsewhere = Store::new(&Config::new(dir.path().join("gone").join("v.enc")));
        let err = elsewhere.save(&db).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Io);
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("vault.enc");
        let store = Store::new(&Config::new(path.clone()));

        store.load(&mut piped("pw")).unwrap();
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
