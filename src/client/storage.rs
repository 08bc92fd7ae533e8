//! Persistence collaborator of the client cache.
//!
//! A record is one named string blob, the way a browser keeps a value in
//! local storage. Failures are reported to the caller, which logs them and
//! keeps working in memory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

// == Cache Storage ==
pub trait CacheStorage: Send + Sync {
    /// Returns the record, or `None` when nothing was stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError>;

    /// Removing a missing record is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// == File Storage ==
/// One `<key>.json` file per record inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

// == Memory Storage ==
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        self.records().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dsa_tracker_storage_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
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
    fn test_file_storage_creates_dir_and_file() {
        let dir = scratch_dir("create");
        let storage = FileStorage::new(&dir);

        assert!(storage.read("questions-cache").unwrap().is_none());
        storage.write("questions-cache", "{}").unwrap();
        assert!(dir.join("questions-cache.json").exists());
        assert_eq!(storage.read("questions-cache").unwrap().as_deref(), Some("{}"));

        storage.remove("questions-cache").unwrap();
        storage.remove("questions-cache").unwrap();
        assert!(storage.read("questions-cache").unwrap().is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
