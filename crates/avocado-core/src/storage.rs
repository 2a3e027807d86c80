use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors produced by key-value storage backends.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The configured bucket has never been written to.
    #[error("bucket {bucket:?} not found")]
    BucketNotFound { bucket: String },
    /// Backend selection is invalid.
    #[error("storage configuration error: {reason}")]
    Config { reason: String },
    /// The store file could not be opened or created.
    #[error("storage i/o failure: {reason}")]
    Io { reason: String },
    /// Another handle held the store lock for longer than the allowed wait.
    #[error("timed out after {waited:?} waiting for lock on {}", path.display())]
    LockTimeout { path: PathBuf, waited: Duration },
    /// The backend replied with a shape we cannot decode.
    #[error("unexpected storage reply: {reason}")]
    Format { reason: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Uniform CRUD contract shared by the file and networked backends.
///
/// Every call is synchronous and self-contained; implementations may open and
/// close their underlying handle per call.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value for a key, `None` when absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Persist a value under a key, overwriting any existing entry.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key and its value (idempotent).
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Enumerate every stored key.
    fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}
