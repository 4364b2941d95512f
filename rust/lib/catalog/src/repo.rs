//! ProductRepo: synchronous product reads over a KVStore backend.
//!
//! Maps each catalog query onto one storage capability:
//! point lookup, ordered range scan, predicate scan. Every read takes the
//! request's `CancellationToken` and passes it down to the scan loop.

use std::cell::Cell;
use std::sync::Arc;

use catalog_core::ServiceError;
use catalog_kv::{KVError, KVStore};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::model::{product_key, ProductMetadata, PRODUCT_PREFIX};
use crate::pattern::TitlePattern;

/// Records matched by a title search, plus how many rows were examined.
#[derive(Debug)]
pub struct SearchOutcome {
    pub records: Vec<ProductMetadata>,
    /// Rows actually read. The scan ends once the window is full, so this is
    /// at most the catalog size and may be far less for broad terms.
    pub scanned: usize,
}

/// Read-only product access. Holds a shared handle to the KV backend.
pub struct ProductRepo {
    kv: Arc<dyn KVStore>,
}

/// Just enough of a record to evaluate the title filter.
#[derive(Deserialize)]
struct TitleOnly {
    #[serde(default)]
    title: Option<String>,
}

impl ProductRepo {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    fn kv_err(e: KVError) -> ServiceError {
        match e {
            KVError::Unavailable(msg) => ServiceError::BackendUnavailable(msg),
            other => ServiceError::BackendError(other.to_string()),
        }
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<ProductMetadata, ServiceError> {
        let record: ProductMetadata = serde_json::from_slice(bytes).map_err(|e| {
            ServiceError::BackendError(format!("malformed record at '{}': {}", key, e))
        })?;
        if key.strip_prefix(PRODUCT_PREFIX) != Some(record.id.as_str()) {
            return Err(ServiceError::BackendError(format!(
                "record at '{}' carries id '{}'",
                key, record.id
            )));
        }
        Ok(record)
    }

    fn decode_all(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<ProductMetadata>, ServiceError> {
        entries
            .iter()
            .map(|(key, bytes)| Self::decode(key, bytes))
            .collect()
    }

    /// Point lookup by product id. Returns None if not found.
    pub fn get(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ProductMetadata>, ServiceError> {
        if cancel.is_cancelled() {
            return Err(Self::kv_err(catalog_kv::cancelled()));
        }
        let key = product_key(id);
        match self.kv.get(&key).map_err(Self::kv_err)? {
            Some(bytes) => Ok(Some(Self::decode(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Up to `limit` products in key order, skipping the first `offset`.
    pub fn list(
        &self,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductMetadata>, ServiceError> {
        let entries = self
            .kv
            .scan_range(PRODUCT_PREFIX, limit, offset, cancel)
            .map_err(Self::kv_err)?;
        Self::decode_all(entries)
    }

    /// Products whose title matches `pattern`, windowed by `limit`/`offset`
    /// over the matched set.
    ///
    /// `title` is not part of the key, so every product row is read until the
    /// window fills. A record without a title is matched as an empty title.
    pub fn search_title(
        &self,
        pattern: &TitlePattern,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, ServiceError> {
        let scanned = Cell::new(0usize);
        let predicate = |bytes: &[u8]| -> Result<bool, KVError> {
            scanned.set(scanned.get() + 1);
            let row: TitleOnly = serde_json::from_slice(bytes)
                .map_err(|e| KVError::Serialization(format!("malformed record: {}", e)))?;
            Ok(pattern.matches(row.title.as_deref().unwrap_or_default()))
        };

        let entries = self
            .kv
            .scan_filter(PRODUCT_PREFIX, &predicate, limit, offset, cancel)
            .map_err(Self::kv_err)?;
        Ok(SearchOutcome {
            records: Self::decode_all(entries)?,
            scanned: scanned.get(),
        })
    }

    /// Total number of stored products.
    pub fn count(&self, cancel: &CancellationToken) -> Result<usize, ServiceError> {
        if cancel.is_cancelled() {
            return Err(Self::kv_err(catalog_kv::cancelled()));
        }
        self.kv.count(PRODUCT_PREFIX).map_err(Self::kv_err)
    }
}
