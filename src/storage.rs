//! Durable storage for the persisted session record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plays the part browser `localStorage` plays for a web client: one
//! serialized record under a well-known key, where absence means anonymous.
//! Only the session manager writes or removes it.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
    #[error("record could not be serialized: {0}")]
    Encode(String),
}

/// Single-record key/value storage.
pub trait SessionStore: Send + Sync {
    /// Raw record, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn save(&self, raw: &str) -> Result<(), StorageError>;

    /// Removing a missing record is not an error.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Load and decode the stored record.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] when the record exists but does not
/// decode as `T`, or an I/O error from the store.
pub fn load_json<T: DeserializeOwned>(store: &dyn SessionStore) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.load()? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Corrupt(e.to_string()))
}

/// Encode and store a record.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] or an I/O error from the store.
pub fn save_json<T: Serialize>(store: &dyn SessionStore, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.save(&raw)
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the record as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self { path: dir.as_ref().join(format!("{key}.json")) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn remove(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
