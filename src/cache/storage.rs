//! Key-value storage backends for the cache
//!
//! Provides a `Storage` trait with a file-backed implementation that keeps
//! one JSON file per key in the XDG cache directory, plus an in-memory map.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend's lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store
///
/// Callers treat every method as best-effort: a failed read is a miss, a
/// failed write or remove is logged and otherwise ignored.
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as a JSON file on disk
///
/// Files live in an XDG-compliant cache directory (`~/.cache/nextmatch/` on
/// Linux).
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStorage {
    /// Creates a new FileStorage using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "nextmatch")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new FileStorage with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.cache_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_dir()?;
        fs::write(self.cache_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps values in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = FileStorage::with_dir(temp_dir.path().to_path_buf());
        (storage, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (storage, temp_dir) = create_test_storage();

        storage
            .write("test_key", r#"{"value":42}"#)
            .expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Cache file should exist");
        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, r#"{"value":42}"#);
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (storage, _temp_dir) = create_test_storage();

        let result = storage.read("nonexistent_key").expect("Read should succeed");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_written_value() {
        let (storage, _temp_dir) = create_test_storage();

        storage.write("key", "hello").expect("Write should succeed");

        assert_eq!(storage.read("key").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let storage = FileStorage::with_dir(nested_path.clone());

        storage.write("nested_key", "{}").expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_overwrite_existing_value() {
        let (storage, _temp_dir) = create_test_storage();

        storage.write("overwrite_key", "first").expect("First write should succeed");
        storage.write("overwrite_key", "second").expect("Second write should succeed");

        assert_eq!(storage.read("overwrite_key").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_deletes_file() {
        let (storage, temp_dir) = create_test_storage();
        storage.write("gone", "{}").expect("Write should succeed");

        storage.remove("gone").expect("Remove should succeed");

        assert!(!temp_dir.path().join("gone.json").exists());
        assert!(storage.read("gone").unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let (storage, _temp_dir) = create_test_storage();

        assert!(storage.remove("never_written").is_ok());
    }

    #[test]
    fn test_read_directory_in_place_of_file_is_an_error() {
        let (storage, temp_dir) = create_test_storage();
        fs::create_dir_all(temp_dir.path().join("blocked.json")).unwrap();

        assert!(storage.read("blocked").is_err());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(storage) = FileStorage::new() {
            let path_str = storage.dir().to_string_lossy();
            assert!(
                path_str.contains("nextmatch"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        assert!(storage.read("k").unwrap().is_none());
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.read("k").unwrap().is_none());
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let storage: Box<dyn Storage> = Box::new(MemoryStorage::new());

        storage.write("k", "v").unwrap();

        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}
