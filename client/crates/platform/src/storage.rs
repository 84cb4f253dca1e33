//! Ephemeral Session Storage
//!
//! Key-value persistence scoped to the browser session (the native analogue
//! of `sessionStorage`). Values survive a reload within the same session but
//! never outlive it. Used for the impersonation session and table-session
//! records.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend refused or lost the write (quota, detached context, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be decoded
    #[error("Corrupt value under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Storage result type alias
pub type StorageResult<T> = Result<T, StorageError>;

/// Session-scoped key-value store
///
/// Synchronous by contract: the real backing stores (sessionStorage, an
/// in-process map) do not suspend. Implementations must be cheap enough to
/// call from non-async code paths.
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process session store
///
/// The default store for native hosts and tests. Dropping it is the
/// "storage cleared" lifecycle event.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}
