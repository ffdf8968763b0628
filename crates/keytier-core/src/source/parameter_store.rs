//! Persisted system parameter store
//!
//! Low-trust key/value parameters that can be edited from inside the
//! application. Reads made by the resolver are privileged: they return the
//! raw stored value without applying any per-user access rules.
//!
//! The file store re-reads its file on every operation, so writes made by
//! other processes are visible to long-lived resolvers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::CredentialProvider;
use crate::error::{KeytierError, Result};

/// File name used inside the data directory
pub const PARAMETER_FILE_NAME: &str = "parameters.json";

/// Provider kind of the parameter tier
pub const PARAMETER_KIND: &str = "System Parameters";

/// Trait for parameter store backends
pub trait ParameterStore: Send + Sync {
    /// Privileged read of a parameter
    fn get_param(&self, key: &str) -> Result<Option<String>>;

    /// Set a parameter, replacing any existing value
    fn set_param(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a parameter; returns whether it existed
    fn unset_param(&self, key: &str) -> Result<bool>;

    /// List all parameter keys in insertion order
    fn list_keys(&self) -> Result<Vec<String>>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}

/// File format for persistent storage
#[derive(Debug, Default, Serialize, Deserialize)]
struct ParameterFile {
    version: u32,
    parameters: IndexMap<String, String>,
}

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| KeytierError::StorageError("parameter lock poisoned".to_string()))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| KeytierError::StorageError("parameter lock poisoned".to_string()))
}

/// JSON file parameter store
pub struct FileParameterStore {
    path: PathBuf,
    parameters: RwLock<IndexMap<String, String>>,
}

impl FileParameterStore {
    /// Open the store at `path`, loading existing parameters if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parameters = Self::load_from_file(&path)?;

        Ok(Self {
            path,
            parameters: RwLock::new(parameters),
        })
    }

    /// Open `parameters.json` inside a data directory, creating the directory
    pub fn in_dir(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join(PARAMETER_FILE_NAME))
    }

    fn load_from_file(path: &Path) -> Result<IndexMap<String, String>> {
        if !path.exists() {
            debug!("No parameter file found at {:?}", path);
            return Ok(IndexMap::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let file: ParameterFile = serde_json::from_str(&contents)?;
        debug!("Loaded {} parameters from {:?}", file.parameters.len(), path);
        Ok(file.parameters)
    }

    /// Re-read the file, discarding the in-memory view
    pub fn reload(&self) -> Result<()> {
        self.refresh().map(drop)
    }

    /// Replace the in-memory view with the file contents and hold the lock
    fn refresh(&self) -> Result<RwLockWriteGuard<'_, IndexMap<String, String>>> {
        let mut parameters = write_lock(&self.parameters)?;
        *parameters = Self::load_from_file(&self.path)?;
        Ok(parameters)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, parameters: &IndexMap<String, String>) -> Result<()> {
        let file = ParameterFile {
            version: 1,
            parameters: parameters.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &contents)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!("Saved {} parameters to {:?}", parameters.len(), self.path);
        Ok(())
    }
}

impl ParameterStore for FileParameterStore {
    fn get_param(&self, key: &str) -> Result<Option<String>> {
        Ok(self.refresh()?.get(key).cloned())
    }

    fn set_param(&self, key: &str, value: &str) -> Result<()> {
        let mut parameters = self.refresh()?;
        parameters.insert(key.to_string(), value.to_string());
        self.save(&parameters)?;
        debug!("Set parameter: {}", key);
        Ok(())
    }

    fn unset_param(&self, key: &str) -> Result<bool> {
        let mut parameters = self.refresh()?;
        if parameters.shift_remove(key).is_none() {
            return Ok(false);
        }
        self.save(&parameters)?;
        debug!("Unset parameter: {}", key);
        Ok(true)
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.refresh()?.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "JSON File"
    }
}

/// In-memory parameter store
#[derive(Default)]
pub struct MemoryParameterStore {
    parameters: RwLock<IndexMap<String, String>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParameterStore for MemoryParameterStore {
    fn get_param(&self, key: &str) -> Result<Option<String>> {
        Ok(read_lock(&self.parameters)?.get(key).cloned())
    }

    fn set_param(&self, key: &str, value: &str) -> Result<()> {
        write_lock(&self.parameters)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn unset_param(&self, key: &str) -> Result<bool> {
        Ok(write_lock(&self.parameters)?.shift_remove(key).is_some())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(read_lock(&self.parameters)?.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

/// Reads a credential from a parameter store key
#[derive(Clone)]
pub struct ParameterStoreProvider {
    store: Arc<dyn ParameterStore>,
    key: String,
}

impl ParameterStoreProvider {
    pub fn new(store: Arc<dyn ParameterStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

impl CredentialProvider for ParameterStoreProvider {
    fn fetch(&self) -> Result<Option<String>> {
        self.store.get_param(&self.key)
    }

    fn kind(&self) -> &'static str {
        PARAMETER_KIND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileParameterStore::in_dir(temp_dir.path()).unwrap();
            store.set_param("google_api_key", "AIza-param").unwrap();
            store.set_param("web.base.url", "http://localhost:8069").unwrap();
        }

        let store = FileParameterStore::in_dir(temp_dir.path()).unwrap();
        assert_eq!(
            store.get_param("google_api_key").unwrap(),
            Some("AIza-param".to_string())
        );
        assert_eq!(
            store.list_keys().unwrap(),
            vec!["google_api_key".to_string(), "web.base.url".to_string()]
        );
    }

    #[test]
    fn test_file_store_unset_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileParameterStore::in_dir(temp_dir.path()).unwrap();
        store.set_param("k", "v").unwrap();

        assert!(store.unset_param("k").unwrap());
        assert!(!store.unset_param("k").unwrap());

        let other = FileParameterStore::open(store.path()).unwrap();
        other.set_param("k", "v2").unwrap();
        store.reload().unwrap();
        assert_eq!(store.get_param("k").unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_file_store_sees_writes_from_other_handles() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileParameterStore::in_dir(temp_dir.path()).unwrap();
        assert_eq!(store.get_param("google_api_key").unwrap(), None);

        let writer = FileParameterStore::in_dir(temp_dir.path()).unwrap();
        writer.set_param("google_api_key", "AIza-later").unwrap();

        assert_eq!(
            store.get_param("google_api_key").unwrap(),
            Some("AIza-later".to_string())
        );

        // A write through the stale handle keeps the other handle's key
        store.set_param("web.base.url", "http://localhost:8069").unwrap();
        assert_eq!(
            writer.list_keys().unwrap(),
            vec!["google_api_key".to_string(), "web.base.url".to_string()]
        );

        writer.unset_param("google_api_key").unwrap();
        assert_eq!(store.get_param("google_api_key").unwrap(), None);
    }

    #[test]
    fn test_provider_reads_store() {
        let store = Arc::new(MemoryParameterStore::new());
        store.set_param("google_api_key", "xyz").unwrap();

        let provider = ParameterStoreProvider::new(store.clone(), "google_api_key");
        assert_eq!(provider.fetch().unwrap(), Some("xyz".to_string()));
        assert_eq!(provider.kind(), PARAMETER_KIND);

        store.unset_param("google_api_key").unwrap();
        assert_eq!(provider.fetch().unwrap(), None);
    }
}
