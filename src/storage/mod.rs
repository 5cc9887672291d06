//! Durable key/value storage for session state.
//!
//! The SDK persists a subset of the authentication session (the session
//! record and the raw refresh-token string) through the [`Storage`] trait so
//! it survives process restarts. Applications can plug in whatever backing
//! store they have; the SDK ships two implementations:
//!
//! - [`MemoryStorage`]: an in-memory map, for tests and ephemeral processes
//! - [`FileStorage`]: a single JSON object file on disk
//!
//! # Best-Effort Writes
//!
//! Callers inside the SDK treat persistence as best-effort: a failed write or
//! remove is logged and never propagated, so storage trouble can never fail a
//! login or an API call. The trait itself still returns `Result` so direct
//! users can observe failures.
//!
//! # Example
//!
//! ```rust
//! use aems_api::storage::{MemoryStorage, Storage};
//!
//! let storage = MemoryStorage::new();
//! storage.set("aems_refresh_token", "token-value").unwrap();
//! assert_eq!(
//!     storage.get("aems_refresh_token").unwrap(),
//!     Some("token-value".to_string())
//! );
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error while reading or writing the backing store.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store contents could not be serialized or deserialized.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Synchronous string key/value storage.
///
/// Implementations must be safe to share across threads; operations are
/// synchronous and expected to be fast (the SDK calls them from async
/// contexts without spawning).
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`Storage`] implementation.
///
/// Values live only as long as the process. Useful in tests and in
/// deployments that do not want durable sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// File-backed [`Storage`] implementation.
///
/// All keys live in a single JSON object file. A missing or undecodable file
/// loads as an empty store, so a corrupted file degrades to an anonymous
/// session rather than an error at startup. Every `set`/`remove` rewrites
/// the file.
///
/// # Example
///
/// ```rust,no_run
/// use aems_api::storage::{FileStorage, Storage};
///
/// let storage = FileStorage::open("/var/lib/myapp/session.json").unwrap();
/// storage.set("aems_refresh_token", "token-value").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens a file-backed store at `path`, loading any existing contents.
    ///
    /// A missing file starts the store empty. A file that exists but cannot
    /// be parsed also starts the store empty; the parse failure is logged.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Discarding undecodable storage file contents"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        self.flush(&values)
    }
}

// Verify storage types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemoryStorage>();
    assert_send_sync::<FileStorage>();
};
