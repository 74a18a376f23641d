//! Flat key/value persistence.
//!
//! A last-write-wins string map, optionally write-through to a JSON file.
//! No transactions, no versioning, no expiry. Writes are synchronous; the
//! host serializes calls into the store, so a `RwLock` around the map is
//! the only discipline needed.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Fixed key names.
pub mod keys {
    /// The web page's auth token.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Stable installation identifier backing `deviceId`.
    pub const INSTALLATION_ID: &str = "installationId";
}

/// Last-write-wins string store.
///
/// In-memory by default; opened on a path it loads existing contents and
/// writes the whole map back on every mutation.
pub struct TokenStore {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
}

impl TokenStore {
    /// Create a store with no backing file (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Open a store at `path`, loading any existing contents.
    ///
    /// A missing file is an empty store; an unreadable or corrupt file is
    /// an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| Error::StorageReadError(format!("corrupt store file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::StorageReadError(e.to_string())),
        };
        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    /// Upsert one value. Last write wins.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    /// Read one value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Remove one entry. Returns whether it existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    /// Whether a key is present.
    pub fn exists(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(path, text).map_err(|e| Error::StorageWriteError(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = TokenStore::in_memory();

        store.set(keys::AUTH_TOKEN, "abc123").unwrap();
        assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some("abc123"));
        assert!(store.exists(keys::AUTH_TOKEN));

        assert!(store.delete(keys::AUTH_TOKEN).unwrap());
        assert!(store.get(keys::AUTH_TOKEN).is_none());
        assert!(!store.delete(keys::AUTH_TOKEN).unwrap());
    }

    #[test]
    fn test_last_write_wins() {
        let store = TokenStore::in_memory();
        store.set(keys::AUTH_TOKEN, "first").unwrap();
        store.set(keys::AUTH_TOKEN, "second").unwrap();
        assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some("second"));
    }

    #[test]
    fn test_reopen_sees_persisted_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = TokenStore::open(&path).unwrap();
        store.set(keys::AUTH_TOKEN, "abc123").unwrap();
        drop(store);

        let store = TokenStore::open(&path).unwrap();
        assert_eq!(store.get(keys::AUTH_TOKEN).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            TokenStore::open(&path),
            Err(Error::StorageReadError(_))
        ));
    }

    #[test]
    fn test_unwritable_path_fails_on_set() {
        let store = TokenStore::open("/nonexistent-dir/pergola/store.json").unwrap();
        assert!(matches!(
            store.set(keys::AUTH_TOKEN, "abc123"),
            Err(Error::StorageWriteError(_))
        ));
    }
}
