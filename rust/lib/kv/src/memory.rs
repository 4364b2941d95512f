use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

use tokio_util::sync::CancellationToken;

use crate::error::KVError;
use crate::traits::{collect_window, KVStore, Predicate};

/// MemoryKV is an in-process KVStore over a sorted map.
///
/// Used for `--in-memory` runs and tests. Nothing is persisted.
#[derive(Default)]
pub struct MemoryKV {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKV {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, KVError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, KVError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>, KVError> {
        self.entries
            .read()
            .map_err(|_| KVError::Storage("memory store lock poisoned".to_string()))
    }

    fn windowed(
        &self,
        prefix: &str,
        predicate: Option<Predicate<'_>>,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let map = self.read()?;
        let entries = map
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| Ok((key.clone(), value.clone())));
        collect_window(entries, predicate, limit, offset, cancel)
    }
}

impl KVStore for MemoryKV {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.batch_set(&[(key, value)])
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| KVError::Storage("memory store lock poisoned".to_string()))?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_vec());
        }
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

    fn count(&self, prefix: &str) -> Result<usize, KVError> {
        let map = self.read()?;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .count())
    }
}
