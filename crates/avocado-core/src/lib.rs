//! Core contracts for Avocado: the key-value storage trait and backend configuration.
//! This crate is intentionally small so both backends and the facade can share it.

pub mod config;
pub mod storage;

pub use config::{FileStoreConfig, RedisStoreConfig, StorageBackend, StorageSpec};
pub use storage::{KeyValueStore, StoreError};
