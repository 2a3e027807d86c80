//! Seal values with RSA-OAEP and file the ciphertext in a key-value store.
//!
//! The storage key doubles as the OAEP label, so a ciphertext only opens under the
//! key it was stored with. Keys are read from disk on every call and never cached.
//!
//! ```no_run
//! use avocado::{Avocado, FileStoreConfig, StorageSpec};
//!
//! let spec = StorageSpec {
//!     file: Some(FileStoreConfig::new("/tmp/avocado.db", "secrets")),
//!     redis: None,
//! };
//! let avocado = Avocado::configure(spec)?;
//! avocado.encrypt_and_store(b"val1", b"Hello", "/keys/public.pem")?;
//! let plain = avocado.find_and_decrypt(b"val1", "/keys/private.pem")?;
//! assert_eq!(plain, b"Hello");
//! # Ok::<(), avocado::AvocadoError>(())
//! ```

mod error;

use std::path::Path;

pub use avocado_core::{
    FileStoreConfig, KeyValueStore, RedisStoreConfig, StorageBackend, StorageSpec,
};
use avocado_core::StoreError;
use avocado_crypto::{load_private_key, load_public_key, oaep};
pub use avocado_storage::StorageClient;
pub use error::AvocadoError;
use tracing::{debug, instrument};

pub type Result<T> = std::result::Result<T, AvocadoError>;

/// Encrypt-and-store facade over a configured [`StorageClient`].
pub struct Avocado {
    storage: StorageClient,
}

impl Avocado {
    /// Wrap a storage client. An unconfigured client is refused.
    pub fn new(storage: StorageClient) -> Result<Self> {
        if !storage.is_configured() {
            return Err(AvocadoError::Config {
                reason: "no storage backend configured".to_string(),
            });
        }
        Ok(Self { storage })
    }

    pub fn configure(spec: StorageSpec) -> Result<Self> {
        Self::new(StorageClient::configure(spec)?)
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// Encrypt `value` for `key` with the public key at `public_key_path` and store it.
    /// Returns the stored ciphertext.
    #[instrument(skip_all, fields(backend = self.storage.backend_name()))]
    pub fn encrypt_and_store(
        &self,
        key: &[u8],
        value: &[u8],
        public_key_path: impl AsRef<Path>,
    ) -> Result<Vec<u8>> {
        if value.is_empty() {
            return Err(AvocadoError::ValueRequired);
        }
        if key.is_empty() {
            return Err(AvocadoError::KeyRequired);
        }

        let public_key = load_public_key(public_key_path)?;
        let ciphertext = oaep::encrypt(&public_key, value, key)?;
        self.storage.set(key, &ciphertext)?;
        debug!(len = ciphertext.len(), "stored ciphertext");
        Ok(ciphertext)
    }

    /// Fetch the ciphertext for `key` and open it with the private key at `private_key_path`.
    #[instrument(skip_all, fields(backend = self.storage.backend_name()))]
    pub fn find_and_decrypt(
        &self,
        key: &[u8],
        private_key_path: impl AsRef<Path>,
    ) -> Result<Vec<u8>> {
        let ciphertext = match self.storage.get(key) {
            Ok(Some(ciphertext)) => ciphertext,
            // Nothing was ever stored in the bucket, so the value is absent too.
            Ok(None) | Err(StoreError::BucketNotFound { .. }) => {
                return Err(AvocadoError::NotFound {
                    key: String::from_utf8_lossy(key).into_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let private_key = load_private_key(private_key_path)?;
        let plaintext = oaep::decrypt(&private_key, &ciphertext, key)?;
        debug!("decrypted value");
        Ok(plaintext)
    }

    #[instrument(skip_all, fields(backend = self.storage.backend_name()))]
    pub fn list_keys(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self.storage.get_all()?)
    }

    #[instrument(skip_all, fields(backend = self.storage.backend_name()))]
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        Ok(self.storage.delete(key)?)
    }
}
