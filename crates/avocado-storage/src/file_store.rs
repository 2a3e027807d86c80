use std::{
    fs,
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use avocado_core::{FileStoreConfig, KeyValueStore, StoreError};
use redb::{Database, DatabaseError, ReadableTable, TableDefinition, TableError};
use tracing::{debug, instrument};

use crate::storage_err;

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

type Bucket<'a> = TableDefinition<'a, &'static [u8], &'static [u8]>;

/// Single-file store organized in buckets (redb tables).
/// Each operation opens the database, runs one transaction and drops the handle.
pub struct FileStore {
    path: PathBuf,
    bucket: String,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn new(config: FileStoreConfig) -> Self {
        let lock_timeout = config.lock_timeout();
        Self {
            path: config.path,
            bucket: config.bucket,
            lock_timeout,
        }
    }

    fn bucket(&self) -> Bucket<'_> {
        TableDefinition::new(&self.bucket)
    }

    /// Open (or create) the database, waiting up to `lock_timeout` for other handles to let go.
    fn open(&self) -> Result<Database, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::Io {
                reason: format!("{}: {err}", parent.display()),
            })?;
        }

        let started = Instant::now();
        loop {
            match Database::create(&self.path) {
                Ok(db) => return Ok(db),
                Err(DatabaseError::DatabaseAlreadyOpen) => {
                    let waited = started.elapsed();
                    if waited >= self.lock_timeout {
                        return Err(StoreError::LockTimeout {
                            path: self.path.clone(),
                            waited,
                        });
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL.min(self.lock_timeout - waited));
                }
                Err(DatabaseError::Storage(redb::StorageError::Io(err))) => {
                    return Err(StoreError::Io {
                        reason: format!("{}: {err}", self.path.display()),
                    })
                }
                Err(err) => return Err(storage_err(err)),
            }
        }
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip_all, fields(bucket = %self.bucket))]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let db = self.open()?;
        let tx = db.begin_read().map_err(storage_err)?;
        let table = match tx.open_table(self.bucket()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StoreError::BucketNotFound {
                    bucket: self.bucket.clone(),
                })
            }
            Err(err) => return Err(storage_err(err)),
        };

        let value = table
            .get(key)
            .map_err(storage_err)?
            .map(|guard| guard.value().to_vec());
        debug!(found = value.is_some(), "file store get");
        Ok(value)
    }

    #[instrument(skip_all, fields(bucket = %self.bucket))]
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let db = self.open()?;
        let tx = db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(self.bucket()).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        // An uncommitted transaction is aborted on drop, leaving prior state intact.
        tx.commit().map_err(storage_err)?;
        debug!("file store set");
        Ok(())
    }

    #[instrument(skip_all, fields(bucket = %self.bucket))]
    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let db = self.open()?;
        let tx = db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(self.bucket()).map_err(storage_err)?;
            table.remove(key).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;
        debug!("file store delete");
        Ok(())
    }

    #[instrument(skip_all, fields(bucket = %self.bucket))]
    fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let db = self.open()?;
        let tx = db.begin_read().map_err(storage_err)?;
        let table = match tx.open_table(self.bucket()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(storage_err(err)),
        };

        let mut keys = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (key, _) = entry.map_err(storage_err)?;
            keys.push(key.value().to_vec());
        }
        debug!(count = keys.len(), "file store enumerate");
        Ok(keys)
    }
}
