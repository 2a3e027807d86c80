use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("cannot read key file {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
    #[error("invalid key format: {reason}")]
    Format { reason: String },
    #[error("decryption failed: {reason}")]
    Decrypt { reason: String },
    #[error("encryption failed: {reason}")]
    Encrypt { reason: String },
    #[error("key generation failed: {reason}")]
    KeyGen { reason: String },
}
