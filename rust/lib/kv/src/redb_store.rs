use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::KVError;
use crate::traits::{collect_window, KVStore, Predicate};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database with ordered keys.
pub struct RedbStore {
    db: Arc<Database>,
}

/// I/O failures mean the backend is unreachable; everything else is a
/// query/storage failure.
fn storage_err(e: impl Into<redb::Error>) -> KVError {
    match e.into() {
        redb::Error::Io(e) => KVError::Unavailable(e.to_string()),
        redb::Error::DatabaseAlreadyOpen => {
            KVError::Unavailable("database is locked by another process".to_string())
        }
        other => KVError::Storage(other.to_string()),
    }
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage_err)?;

        // Ensure the table exists so read transactions can open it.
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        debug!("RedbStore: opened {:?}", path);
        Ok(Self { db: Arc::new(db) })
    }

    fn windowed(
        &self,
        prefix: &str,
        predicate: Option<Predicate<'_>>,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;
        let iter = table.range(prefix..).map_err(storage_err)?;

        let entries = iter
            .map(|entry| -> Result<(String, Vec<u8>), KVError> {
                let (key, value) = entry.map_err(storage_err)?;
                Ok((key.value().to_string(), value.value().to_vec()))
            })
            .take_while(|entry| match entry {
                Ok((key, _)) => key.starts_with(prefix),
                Err(_) => true,
            });

        collect_window(entries, predicate, limit, offset, cancel)
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.batch_set(&[(key, value)])
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            for (key, value) in entries {
                table.insert(*key, *value).map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn scan_range(
        &self,
        prefix: &str,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        self.windowed(prefix, None, limit, offset, cancel)
    }

    fn scan_filter(
        &self,
        prefix: &str,
        predicate: Predicate<'_>,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        self.windowed(prefix, Some(predicate), limit, offset, cancel)
    }
}
