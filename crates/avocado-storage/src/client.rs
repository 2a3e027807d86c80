use avocado_core::{KeyValueStore, StorageBackend, StorageSpec, StoreError};
use tracing::{debug, info};

use crate::{file_store::FileStore, redis_store::RedisStore};

enum Backend {
    Unconfigured,
    File(FileStore),
    Redis(RedisStore),
}

/// Routes every operation to the single backend chosen at construction.
pub struct StorageClient {
    backend: Backend,
}

impl StorageClient {
    /// Validate a loose spec (both sides optional) and build the matching client.
    pub fn configure(spec: StorageSpec) -> Result<Self, StoreError> {
        Self::from_backend(StorageBackend::try_from(spec)?)
    }

    pub fn from_backend(backend: StorageBackend) -> Result<Self, StoreError> {
        let backend = match backend {
            StorageBackend::Unconfigured => Backend::Unconfigured,
            StorageBackend::File(config) => {
                info!(path = %config.path.display(), bucket = %config.bucket, "using file store");
                Backend::File(FileStore::new(config))
            }
            StorageBackend::Redis(config) => {
                info!(address = %config.address, db = config.db, "using redis store");
                Backend::Redis(RedisStore::connect(&config)?)
            }
        };
        Ok(Self { backend })
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.backend, Backend::Unconfigured)
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Unconfigured => "unconfigured",
            Backend::File(_) => "file",
            Backend::Redis(_) => "redis",
        }
    }

    fn store(&self) -> Option<&dyn KeyValueStore> {
        match &self.backend {
            Backend::Unconfigured => {
                debug!("no storage backend configured; operation ignored");
                None
            }
            Backend::File(store) => Some(store),
            Backend::Redis(store) => Some(store),
        }
    }
}

impl KeyValueStore for StorageClient {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.store() {
            Some(store) => store.get(key),
            None => Ok(None),
        }
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        match self.store() {
            Some(store) => store.set(key, value),
            None => Ok(()),
        }
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        match self.store() {
            Some(store) => store.delete(key),
            None => Ok(()),
        }
    }

    fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        match self.store() {
            Some(store) => store.get_all(),
            None => Ok(Vec::new()),
        }
    }
}
