//! JSON file storage - one file of key/value strings, like a browser profile

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result;
use crate::ports::Storage;

/// File name used inside the app directory
pub const STORAGE_FILE: &str = "storage.json";

/// Storage backed by a single JSON object file
///
/// Every call takes an exclusive advisory lock on a sidecar `.lock` file and
/// re-reads the whole file. Writes replace the file atomically via a temp file
/// in the same directory, so readers never see a half-written file.
pub struct JsonFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStorage {
    /// Open (or lazily create) `storage.json` inside `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create storage directory: {:?}", dir))?;
        Ok(Self::at(dir.join(STORAGE_FILE)))
    }

    fn at(path: PathBuf) -> Self {
        let mut lock_name = path.as_os_str().to_owned();
        lock_name.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_name),
        }
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", self.lock_path))?;
        FileExt::lock_exclusive(&lock_file).context("Failed to acquire storage lock")?;

        let result = f();

        // Lock is also released when the file is closed
        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed storage file {:?}", self.path))
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, items)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn get_item(&self, key: &str) -> result::Result<Option<String>> {
        let items = self.with_lock(|| self.read_all())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> result::Result<()> {
        self.with_lock(|| {
            let mut items = self.read_all()?;
            items.insert(key.to_string(), value.to_string());
            self.write_all(&items)
        })?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> result::Result<()> {
        self.with_lock(|| {
            let mut items = self.read_all()?;
            if items.remove(key).is_some() {
                self.write_all(&items)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get_item("appUsers").unwrap(), None);
        assert!(!dir.path().join(STORAGE_FILE).exists());
    }

    #[test]
    fn test_values_persist_across_instances() {
        let dir = tempdir().unwrap();
        JsonFileStorage::new(dir.path())
            .unwrap()
            .set_item("appSession", r#"{"email":"a@b"}"#)
            .unwrap();

        let reopened = JsonFileStorage::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get_item("appSession").unwrap(),
            Some(r#"{"email":"a@b"}"#.to_string())
        );
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        storage.remove_item("nothing").unwrap();
        assert!(!dir.path().join(STORAGE_FILE).exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        std::fs::write(dir.path().join(STORAGE_FILE), "{not json").unwrap();

        let err = storage.get_item("appUsers").unwrap_err();
        assert!(err.to_string().contains("Malformed storage file"));
    }
}
