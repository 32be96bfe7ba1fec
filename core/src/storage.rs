//! Durable key-value providers backing `ProductRecordStore`.
//!
//! # Design
//! The store only needs get/set by key, so that is the whole trait. The
//! mobile host can supply its own provider (platform preferences); the core
//! ships an in-memory one and a directory-of-files one.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;

/// Byte-oriented key-value storage with get/set-by-key semantics.
pub trait KeyValueStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// Process-local storage. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a uniquely named sibling temp file first and are renamed into
/// place, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let usable = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !usable {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            debug!(dir = %self.dir.display(), "created storage directory");
        }
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_get_missing_is_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("adData").unwrap().is_none());
    }

    #[test]
    fn memory_storage_set_then_get() {
        let storage = MemoryStorage::new();
        storage.set("adData", b"{}").unwrap();
        assert_eq!(storage.get("adData").unwrap().as_deref(), Some(&b"{}"[..]));
        storage.set("adData", b"[]").unwrap();
        assert_eq!(storage.get("adData").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn file_storage_creates_directory_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("state");
        let storage = FileStorage::new(&dir);

        assert!(storage.get("adData").unwrap().is_none());
        storage.set("adData", b"hello").unwrap();

        assert!(dir.join("adData.json").exists());
        assert_eq!(storage.get("adData").unwrap().as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn file_storage_overwrite_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.set("adData", b"one").unwrap();
        storage.set("adData", b"two").unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["adData.json".to_string()]);
        assert_eq!(storage.get("adData").unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(storage.set(key, b"x"), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }
}
