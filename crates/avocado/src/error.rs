use std::time::Duration;

use avocado_core::StoreError;
use avocado_crypto::CryptoError;
use thiserror::Error;

/// Everything the facade can report to callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvocadoError {
    #[error("value not provided")]
    ValueRequired,
    #[error("key not provided")]
    KeyRequired,
    #[error("configuration error: {reason}")]
    Config { reason: String },
    #[error("i/o error: {reason}")]
    Io { reason: String },
    #[error("format error: {reason}")]
    Format { reason: String },
    #[error("encryption failed: {reason}")]
    Encrypt { reason: String },
    #[error("decryption failed: {reason}")]
    Decrypt { reason: String },
    #[error("key generation failed: {reason}")]
    KeyGen { reason: String },
    #[error("encrypted value not found for key {key:?}")]
    NotFound { key: String },
    /// Retryable: another process holds the store.
    #[error("store lock not acquired within {waited:?}")]
    LockTimeout { waited: Duration },
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

impl AvocadoError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}

impl From<StoreError> for AvocadoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config { reason } => Self::Config { reason },
            StoreError::Io { reason } => Self::Io { reason },
            StoreError::Format { reason } => Self::Format { reason },
            StoreError::LockTimeout { waited, .. } => Self::LockTimeout { waited },
            err @ (StoreError::BucketNotFound { .. } | StoreError::Storage { .. }) => {
                Self::Storage {
                    reason: err.to_string(),
                }
            }
        }
    }
}

impl From<CryptoError> for AvocadoError {
    fn from(err: CryptoError) -> Self {
        match err {
            err @ CryptoError::Io { .. } => Self::Io {
                reason: err.to_string(),
            },
            CryptoError::Format { reason } => Self::Format { reason },
            CryptoError::Decrypt { reason } => Self::Decrypt { reason },
            CryptoError::Encrypt { reason } => Self::Encrypt { reason },
            CryptoError::KeyGen { reason } => Self::KeyGen { reason },
        }
    }
}
