//! Durable key-value storage for the bearer token
//!
//! The session store is the only writer. Two backends are provided: a
//! directory of one-file-per-key records for the real console, and an
//! in-memory map for tests.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use trade_admin_core::is_valid_storage_key;

/// Minimal persistence primitive outside process memory
#[async_trait]
pub trait CredentialStorage: Send + Sync + std::fmt::Debug {
    /// Read the value under `key`, `None` when absent
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// File-backed storage: `<dir>/<key>` holds the raw value
#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    dir: PathBuf,
}

impl FileCredentialStorage {
    /// Create storage rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if !is_valid_storage_key(key) {
            return Err(StorageError::Unavailable {
                message: format!("invalid storage key '{key}'"),
            });
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl CredentialStorage for FileCredentialStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value = String::from_utf8(bytes).map_err(|e| StorageError::Corrupted {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write-then-rename so a crash never leaves a half-written token.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        tokio::fs::write(&tmp, value.as_bytes()).await?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "credential record written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "credential record removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Process-local storage; values vanish when the process exits
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with one value
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.values.lock().insert(key.into(), value.into());
        storage
    }

    /// Synchronous peek for assertions
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
