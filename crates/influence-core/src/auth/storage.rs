//! Key-value backends for persisting opaque credential strings.
//!
//! Three interchangeable implementations sit behind [`SecureStorage`]:
//! - [`KeyringStorage`]: OS keychain (the secure-store path)
//! - [`FileStorage`]: JSON file with owner-only permissions, used when
//!   no keychain is reachable
//! - [`MemoryStorage`]: process-local map for tests and throwaway sessions
//!
//! The backend is chosen once at startup with [`StorageBackend::select`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Keychain service name for stored credentials.
const SERVICE_NAME: &str = "influence";

/// File name of the fallback store inside the data directory.
const STORAGE_FILE: &str = "credentials.json";

/// Suffix of the scratch file written before it replaces the store.
const TEMP_SUFFIX: &str = "tmp";

/// Key read to check whether the keychain is usable.
const AVAILABILITY_KEY: &str = "__availability__";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Storage file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl StorageError {
    fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Last-write-wins key-value persistence for credential strings.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// Keyring
// ============================================================================

/// OS keychain storage. Each key is one keychain entry under the
/// `influence` service.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Check whether the platform keychain answers at all.
    /// A missing entry counts as available.
    pub async fn is_available(&self) -> bool {
        match self.run(AVAILABILITY_KEY, |entry| entry.get_password()).await {
            Ok(_) | Err(StorageError::Keyring(keyring::Error::NoEntry)) => true,
            Err(e) => {
                debug!(error = %e, "Keychain unavailable");
                false
            }
        }
    }

    async fn run<T, F>(&self, key: &str, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> keyring::Result<T> + Send + 'static,
    {
        let entry = Entry::new(&self.service, key)?;
        tokio::task::spawn_blocking(move || op(entry))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
            .map_err(StorageError::from)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStorage for KeyringStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.run(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let value = value.to_string();
        self.run(key, move |entry| entry.set_password(&value)).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.run(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}

// ============================================================================
// File
// ============================================================================

/// Plain JSON map on disk, 0600 on Unix.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: RwLock<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Store under `<data_dir>/credentials.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> StorageResult<HashMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write_all(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(data)?;
        let temp = self.temp_path();

        // The mode only applies when the file is created, so start fresh.
        match tokio::fs::remove_file(&temp).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(&temp, e)),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp)
            .await
            .map_err(|e| StorageError::io(&temp, e))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| StorageError::io(&temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::io(&temp, e))?;
        drop(file);

        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SecureStorage for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.write().await;
        let mut data = self.read_all().await?;
        data.insert(key.to_string(), value.to_string());
        self.write_all(&data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.write().await;
        let mut data = self.read_all().await?;
        if data.remove(key).is_some() {
            self.write_all(&data).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorage for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Backend selection
// ============================================================================

/// Which storage implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keychain when reachable, otherwise the file store.
    #[default]
    Auto,
    Keyring,
    File,
    Memory,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(StorageBackend::Auto),
            "keyring" | "keychain" => Some(StorageBackend::Keyring),
            "file" => Some(StorageBackend::File),
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }

    /// Build the storage implementation. `data_dir` locates the file store.
    pub async fn select(self, data_dir: &Path) -> Arc<dyn SecureStorage> {
        match self {
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
            StorageBackend::File => Arc::new(FileStorage::in_dir(data_dir)),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::Auto => {
                let keyring = KeyringStorage::new();
                if keyring.is_available().await {
                    Arc::new(keyring)
                } else {
                    warn!(dir = %data_dir.display(), "Keychain unavailable, falling back to file storage");
                    Arc::new(FileStorage::in_dir(data_dir))
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
