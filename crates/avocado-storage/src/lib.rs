//! Concrete key-value backends behind the `KeyValueStore` contract.
//! The file backend is a single redb database; the networked backend speaks to Redis.

pub mod client;
pub mod file_store;
pub mod redis_store;

pub use client::StorageClient;

use avocado_core::StoreError;

pub(crate) fn storage_err<E: ToString>(err: E) -> StoreError {
    StoreError::Storage {
        reason: err.to_string(),
    }
}
