//! Durable key/value storage for client state.
//!
//! Mirrors browser local storage: synchronous string values keyed by name,
//! shared between every client using the same directory, last write wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Key for the bearer token.
pub const TOKEN_KEY: &str = "tastyshare_token";
/// Key for the JSON-encoded session user.
pub const USER_KEY: &str = "tastyshare_user";
/// Key for the JSON-encoded add-recipe draft.
pub const DRAFT_KEY: &str = "tastyshare_recipe_draft";
/// Key for the dark-mode preference ("true" / "false").
pub const DARK_MODE_KEY: &str = "tastyshare-dark-mode";

/// Synchronous string storage.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one JSON object in `<dir>/local-storage.json`.
///
/// Every call re-reads the file, so concurrent clients see each other's
/// writes, and the last writer wins.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store inside `dir`. The directory is created on first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("local-storage.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Current entries for a read-modify-write. A corrupt file starts over;
    /// an I/O failure aborts so unrelated keys are not overwritten.
    fn entries_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Ok(entries) => Ok(entries),
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "resetting corrupt local storage"
                );
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the file atomically: write a sibling temp file, then rename.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read local storage"
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries_for_update()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut map = store.lock();
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Log a storage failure without interrupting the caller.
pub(crate) fn log_storage_error(op: &str, key: &str, result: Result<(), StorageError>) {
    if let Err(e) = result {
        tracing::warn!(op, key, error = %e, "local storage write failed");
    }
}
