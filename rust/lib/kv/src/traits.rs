use tokio_util::sync::CancellationToken;

use crate::error::KVError;

/// Row filter applied during a predicate scan.
///
/// Receives the raw stored value. Returning an error aborts the scan.
pub type Predicate<'a> = &'a dyn Fn(&[u8]) -> Result<bool, KVError>;

/// KVStore is the storage backend capability the catalog reads from.
///
/// Keys follow a namespaced convention: `catalog:product:{id}`.
/// Every scan yields entries in ascending key order, so limit/offset windows
/// are stable across calls as long as the data does not change.
///
/// Scans take a `CancellationToken` and stop with `KVError::Unavailable`
/// before reading the next row once it is cancelled.
pub trait KVStore: Send + Sync {
    /// Point lookup. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Set several key-value pairs in one transaction.
    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Ordered range scan over keys matching `prefix`, skipping `offset`
    /// entries and returning at most `limit`.
    fn scan_range(
        &self,
        prefix: &str,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Predicate scan: walks every key matching `prefix` and keeps the entries
    /// accepted by `predicate`. `offset` and `limit` apply to the matched set.
    ///
    /// The filter is not backed by any index, so the cost grows with the
    /// number of entries under `prefix`, not with `limit`.
    fn scan_filter(
        &self,
        prefix: &str,
        predicate: Predicate<'_>,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        self.scan_range(prefix, usize::MAX, 0, &CancellationToken::new())
    }

    /// Number of keys matching a prefix.
    fn count(&self, prefix: &str) -> Result<usize, KVError> {
        Ok(self.scan(prefix)?.len())
    }
}

/// Error returned by a scan whose token was cancelled.
pub fn cancelled() -> KVError {
    KVError::Unavailable("scan cancelled".to_string())
}

/// Apply an offset/limit window (and optional predicate) to an ordered entry
/// stream. Stops pulling from `entries` once the window is full or `cancel`
/// fires.
pub(crate) fn collect_window<I>(
    entries: I,
    predicate: Option<Predicate<'_>>,
    limit: usize,
    offset: usize,
    cancel: &CancellationToken,
) -> Result<Vec<(String, Vec<u8>)>, KVError>
where
    I: Iterator<Item = Result<(String, Vec<u8>), KVError>>,
{
    let mut results = Vec::new();
    if limit == 0 {
        return Ok(results);
    }

    let mut skipped = 0;
    for entry in entries {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }
        let (key, value) = entry?;
        if let Some(accept) = predicate {
            if !accept(&value)? {
                continue;
            }
        }
        if skipped < offset {
            skipped += 1;
            continue;
        }
        results.push((key, value));
        if results.len() >= limit {
            break;
        }
    }
    Ok(results)
}
