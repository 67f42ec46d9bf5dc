//! Persisted key-value store
//!
//! The browser-storage stand-in: a synchronous string key-value store. The
//! cart occupies a single key; other keys are none of this crate's
//! business. [`FileStorage`] keeps the whole map in one JSON object file,
//! [`MemoryStorage`] backs tests and throwaway sessions.

use std::{
    fs,
    path::{Path, PathBuf},
};

use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors from reading or writing the backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure reading or writing the store file.
    #[error("failed to access persisted store: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is not a JSON object of string values.
    #[error("persisted store is not a key-value object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A synchronous string key-value store.
///
/// Writes are expected to complete before `set` returns; there is no flush
/// step. Concurrent writers (other processes on the same file) are
/// last-write-wins, mirroring multi-tab browser storage.
#[automock]
pub trait StorageBackend {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the value under `key`. Absent keys are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object file mapping keys to string values.
///
/// The file is read on every access rather than cached, so an external
/// writer's changes are visible on the next `get`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates a store backed by the given file. The file is created on the
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<FxHashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(FxHashMap::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(&self, entries: &FxHashMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string(entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_storage_set_get_remove() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.set("cart", "[]")?;
        assert_eq!(storage.get("cart")?, Some("[]".to_owned()));

        storage.remove("cart")?;
        assert_eq!(storage.get("cart")?, None);

        Ok(())
    }

    #[test]
    fn file_storage_round_trips_values() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("store.json"));

        assert_eq!(storage.get("cart")?, None);

        storage.set("cart", r#"[{"id":"P1"}]"#)?;
        assert_eq!(storage.get("cart")?, Some(r#"[{"id":"P1"}]"#.to_owned()));

        Ok(())
    }

    #[test]
    fn file_storage_survives_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");

        let mut storage = FileStorage::new(&path);
        storage.set("cart", "[]")?;
        storage.set("theme", "dark")?;
        drop(storage);

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("cart")?, Some("[]".to_owned()));
        assert_eq!(reopened.get("theme")?, Some("dark".to_owned()));

        Ok(())
    }

    #[test]
    fn file_storage_rejects_non_object_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        fs::write(&path, "not json")?;

        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get("cart"),
            Err(StorageError::Malformed(_))
        ));

        Ok(())
    }

    #[test]
    fn remove_of_absent_key_does_not_create_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");

        let mut storage = FileStorage::new(&path);
        storage.remove("cart")?;

        assert!(!path.exists());

        Ok(())
    }
}
