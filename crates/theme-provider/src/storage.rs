//! Preference storage backends
//!
//! A [`PreferenceStorage`] is a string key/value store that outlives any single
//! controller. Failures are reported to the caller, never swallowed.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThemeError};

/// Key/value string store used to persist the theme preference
pub trait PreferenceStorage {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage, shared by cloning an `Rc` around it
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.borrow_mut().remove(key)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A single persisted preference entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceEntry {
    /// Raw stored value
    pub value: String,
    /// Last updated timestamp in RFC3339 format
    pub last_updated: Option<String>,
}

/// JSON file storage for native front ends
///
/// The file maps each key to a [`PreferenceEntry`]. A missing file reads as
/// empty; a malformed one is a storage error.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<config_dir>/theme-provider/preferences.json`
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ThemeError::Storage("Could not determine config directory".to_string())
        })?;
        Ok(Self::new(
            config_dir.join("theme-provider").join("preferences.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored entry
    pub fn entries(&self) -> Result<BTreeMap<String, PreferenceEntry>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.storage_error("read", e))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ThemeError::Storage(format!(
                "Failed to parse preferences at {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read a full entry, including its timestamp
    pub fn entry(&self, key: &str) -> Result<Option<PreferenceEntry>> {
        Ok(self.entries()?.remove(key))
    }

    fn write_entries(&self, entries: &BTreeMap<String, PreferenceEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_error("create", e))?;
            }
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| self.storage_error("serialize", e))?;
        fs::write(&self.path, content).map_err(|e| self.storage_error("write", e))?;
        Ok(())
    }

    fn storage_error(&self, action: &str, err: impl std::fmt::Display) -> ThemeError {
        ThemeError::Storage(format!(
            "Failed to {} preferences at {}: {}",
            action,
            self.path.display(),
            err
        ))
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entry(key)?.map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries()?;
        entries.insert(
            key.to_string(),
            PreferenceEntry {
                value: value.to_string(),
                last_updated: Some(chrono::Local::now().to_rfc3339()),
            },
        );
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_memory_storage_get_set() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "dark").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_memory_storage_overwrite() {
        let storage = MemoryStorage::new();
        storage.set("k", "dark").unwrap();
        storage.set("k", "light").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("light"));
        assert_eq!(storage.remove("k").as_deref(), Some("light"));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("prefs.json"));
        assert_eq!(storage.get("vite-ui-theme").unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("prefs.json");
        let storage = FileStorage::new(&path);
        storage.set("vite-ui-theme", "dark").unwrap();
        assert!(path.exists());

        let entry = storage.entry("vite-ui-theme").unwrap().unwrap();
        assert_eq!(entry.value, "dark");
        assert!(entry.last_updated.is_some());
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("prefs.json"));
        storage.set("a", "light").unwrap();
        storage.set("b", "dark").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("light"));
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_io_failures_are_storage_errors() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the preferences file should be
        let storage = FileStorage::new(temp_dir.path());
        assert!(matches!(storage.get("k"), Err(ThemeError::Storage(_))));
        assert!(matches!(storage.set("k", "dark"), Err(ThemeError::Storage(_))));
    }

    #[test]
    fn test_memory_storage_clear() {
        let storage = MemoryStorage::new();
        storage.set("a", "light").unwrap();
        storage.set("b", "dark").unwrap();
        storage.clear();
        assert!(storage.is_empty());
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_storage_malformed_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get("k"), Err(ThemeError::Storage(_))));
    }
}
