use std::{fmt, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::storage::StoreError;

/// Default wait for the file store's exclusive lock.
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 10;

/// Default bound on connecting to and each round trip with the networked store.
pub const DEFAULT_REDIS_TIMEOUT_SECS: u64 = 5;

/// Settings for the embedded single-file store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FileStoreConfig {
    /// Location of the database file; created on first use.
    pub path: PathBuf,
    /// Bucket (table) holding the entries.
    pub bucket: String,
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl FileStoreConfig {
    pub fn new(path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bucket: bucket.into(),
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

/// Settings for the networked in-memory store.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RedisStoreConfig {
    /// `host:port`, e.g. `localhost:6379`.
    pub address: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Logical database index.
    #[serde(default)]
    pub db: i64,
    /// Connect, read and write timeout; must be non-zero.
    #[serde(default = "default_redis_timeout_secs")]
    pub timeout_secs: u64,
}

impl RedisStoreConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: None,
            db: 0,
            timeout_secs: DEFAULT_REDIS_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_redis_timeout_secs() -> u64 {
    DEFAULT_REDIS_TIMEOUT_SECS
}

impl fmt::Debug for RedisStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStoreConfig")
            .field("address", &self.address)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("db", &self.db)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Loose storage specification as it appears in config files: either side may be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct StorageSpec {
    pub file: Option<FileStoreConfig>,
    pub redis: Option<RedisStoreConfig>,
}

/// Validated backend selection. Exactly one variant is chosen for a client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// No backend configured; storage operations are no-ops.
    Unconfigured,
    File(FileStoreConfig),
    Redis(RedisStoreConfig),
}

impl TryFrom<StorageSpec> for StorageBackend {
    type Error = StoreError;

    fn try_from(spec: StorageSpec) -> Result<Self, Self::Error> {
        match (spec.file, spec.redis) {
            (Some(_), Some(_)) => Err(StoreError::Config {
                reason: "only one storage backend may be configured".to_string(),
            }),
            (Some(file), None) => Ok(Self::File(file)),
            (None, Some(redis)) => Ok(Self::Redis(redis)),
            (None, None) => Ok(Self::Unconfigured),
        }
    }
}
