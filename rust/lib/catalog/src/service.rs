//! CatalogService: the three catalog queries with argument validation,
//! a per-call storage deadline and logging.
//!
//! Each call is one stateless round trip. Storage work runs on the blocking
//! pool under a child of the caller's `CancellationToken`. The child is
//! cancelled when the deadline passes, when the caller cancels, or when the
//! returned future is dropped; the storage scan checks it before every row.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::{ListResult, PageParams, ServiceConfig, ServiceError};
use catalog_kv::KVStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::ProductMetadata;
use crate::pattern::TitlePattern;
use crate::repo::ProductRepo;

pub struct CatalogService {
    repo: Arc<ProductRepo>,
    timeout: Option<Duration>,
    default_limit: i64,
    scan_warn_threshold: usize,
}

impl CatalogService {
    /// Service with default settings.
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self::with_config(kv, &ServiceConfig::default())
    }

    pub fn with_config(kv: Arc<dyn KVStore>, config: &ServiceConfig) -> Self {
        Self {
            repo: Arc::new(ProductRepo::new(kv)),
            timeout: config.request_timeout(),
            default_limit: config.default_limit,
            scan_warn_threshold: config.search_scan_warn_threshold,
        }
    }

    /// Page size applied when a caller omits `limit`.
    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// ListProducts: up to `limit` products in storage order after skipping
    /// `offset`. No filter.
    pub async fn list_products(
        &self,
        params: PageParams,
        cancel: &CancellationToken,
    ) -> Result<ListResult<ProductMetadata>, ServiceError> {
        let page = params.validate()?;
        debug!(limit = page.limit, offset = page.offset, "list products");

        let rows = self
            .run("list products", cancel, move |repo, cancel| {
                repo.list(page.probe_limit(), page.offset, cancel)
            })
            .await?;
        Ok(ListResult::from_probe(rows, page))
    }

    /// GetById: point lookup. A missing product is `Ok(None)`.
    pub async fn get_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ProductMetadata>, ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::InvalidArgument("id must not be empty".to_string()));
        }
        debug!(id, "get product");

        let id = id.to_string();
        self.run("get product", cancel, move |repo, cancel| repo.get(&id, cancel))
            .await
    }

    /// SearchByTitle: products whose title contains `search_term`.
    ///
    /// Full scan over the products; cost grows with the catalog size, not
    /// with `limit`. An empty term matches every product.
    pub async fn search_by_title(
        &self,
        search_term: &str,
        params: PageParams,
        cancel: &CancellationToken,
    ) -> Result<ListResult<ProductMetadata>, ServiceError> {
        let page = params.validate()?;
        let pattern = TitlePattern::contains(search_term);
        debug!(%pattern, limit = page.limit, offset = page.offset, "search by title");

        let outcome = self
            .run("search by title", cancel, move |repo, cancel| {
                repo.search_title(&pattern, page.probe_limit(), page.offset, cancel)
            })
            .await?;

        // `scanned` is rows actually read before the page filled.
        if outcome.scanned > self.scan_warn_threshold {
            warn!(
                scanned = outcome.scanned,
                matched = outcome.records.len(),
                "title search read {} rows; it is a full scan and slows down as the catalog grows",
                outcome.scanned
            );
        }
        Ok(ListResult::from_probe(outcome.records, page))
    }

    /// Total number of products.
    pub async fn count(&self, cancel: &CancellationToken) -> Result<usize, ServiceError> {
        self.run("count products", cancel, |repo, cancel| repo.count(cancel))
            .await
    }

    /// Run a blocking repo call on the blocking pool, bounded by the
    /// configured deadline and the caller's token.
    async fn run<R, F>(
        &self,
        op: &'static str,
        cancel: &CancellationToken,
        f: F,
    ) -> Result<R, ServiceError>
    where
        R: Send + 'static,
        F: FnOnce(&ProductRepo, &CancellationToken) -> Result<R, ServiceError> + Send + 'static,
    {
        let token = cancel.child_token();
        // Fires on every early exit, including this future being dropped.
        let guard = token.clone().drop_guard();

        let repo = Arc::clone(&self.repo);
        let task_token = token.clone();
        let task = tokio::task::spawn_blocking(move || f(&repo, &task_token));

        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        let joined = tokio::select! {
            joined = task => joined,
            _ = token.cancelled() => {
                debug!(op, "storage request cancelled by caller");
                return Err(ServiceError::BackendUnavailable(format!(
                    "{}: storage request cancelled",
                    op
                )));
            }
            _ = deadline => {
                let limit = timeout.unwrap_or_default();
                warn!(op, timeout_ms = limit.as_millis() as u64, "storage request timed out");
                return Err(ServiceError::BackendUnavailable(format!(
                    "{}: storage request timed out after {}ms",
                    op,
                    limit.as_millis()
                )));
            }
        };
        guard.disarm();

        joined.map_err(|e| ServiceError::Internal(format!("{}: storage task failed: {}", op, e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::product_key;
    use crate::repo::tests::{live, put, sample_kv, FailingKV};
    use catalog_kv::{KVError, MemoryKV, Predicate};

    fn service() -> CatalogService {
        CatalogService::new(sample_kv())
    }

    fn ids(result: &ListResult<ProductMetadata>) -> Vec<&str> {
        result.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn scenario_from_two_records() {
        let svc = service();

        let widgets = svc
            .search_by_title("Widget", PageParams::new(10, 0), &live())
            .await
            .unwrap();
        assert_eq!(ids(&widgets), vec!["1"]);
        assert!(!widgets.has_more);

        let second = svc.list_products(PageParams::new(1, 1), &live()).await.unwrap();
        assert_eq!(ids(&second), vec!["2"]);
        assert!(!second.has_more);

        assert!(svc.get_by_id("3", &live()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_never_exceeds_limit() {
        let kv = MemoryKV::new();
        for i in 0..7 {
            put(&kv, &ProductMetadata::new(format!("p{}", i), format!("Item {}", i)));
        }
        let svc = CatalogService::new(Arc::new(kv));

        for limit in 1..=9 {
            let page = svc.list_products(PageParams::new(limit, 0), &live()).await.unwrap();
            assert!(page.items.len() <= limit as usize);
            assert_eq!(page.has_more, limit < 7, "limit {}", limit);
        }
    }

    #[tokio::test]
    async fn offset_past_end_is_empty_not_error() {
        let svc = service();
        let list = svc.list_products(PageParams::new(5, 2), &live()).await.unwrap();
        assert!(list.items.is_empty());
        let search = svc
            .search_by_title("", PageParams::new(5, 100), &live())
            .await
            .unwrap();
        assert!(search.items.is_empty());
    }

    #[tokio::test]
    async fn get_by_id_returns_matching_record() {
        let svc = service();
        let product = svc.get_by_id("2", &live()).await.unwrap().unwrap();
        assert_eq!(product.id, "2");
        assert_eq!(product.title.as_deref(), Some("Red Gadget"));
    }

    #[tokio::test]
    async fn empty_term_matches_list_count() {
        let svc = service();
        let all = svc
            .search_by_title("", PageParams::new(100, 0), &live())
            .await
            .unwrap();
        let listed = svc.list_products(PageParams::new(100, 0), &live()).await.unwrap();
        assert_eq!(all.items.len(), listed.items.len());
        assert_eq!(svc.count(&live()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn invalid_arguments_rejected_before_backend() {
        // Any backend call would fail with BackendUnavailable.
        let svc = CatalogService::new(Arc::new(FailingKV { unavailable: true }));

        for params in [PageParams::new(0, 0), PageParams::new(-3, 0), PageParams::new(5, -1)] {
            let err = svc.list_products(params, &live()).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)), "{:?}", params);
            let err = svc.search_by_title("x", params, &live()).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)), "{:?}", params);
        }
        let err = svc.get_by_id("", &live()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn backend_errors_surface_unchanged() {
        let down = CatalogService::new(Arc::new(FailingKV { unavailable: true }));
        let err = down.get_by_id("1", &live()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BackendUnavailable(_)));

        let broken = CatalogService::new(Arc::new(FailingKV { unavailable: false }));
        let err = broken
            .search_by_title("x", PageParams::new(1, 0), &live())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BackendError(_)));
    }

    /// Backend that reads `ROWS` rows at 10ms each, checking the token
    /// before every row, and counts the rows it read.
    struct SlowRowsKV {
        reads: Arc<AtomicUsize>,
    }

    impl SlowRowsKV {
        const ROWS: usize = 50;

        fn read_all(&self, cancel: &CancellationToken) -> Result<Vec<(String, Vec<u8>)>, KVError> {
            for _ in 0..Self::ROWS {
                if cancel.is_cancelled() {
                    return Err(catalog_kv::cancelled());
                }
                std::thread::sleep(Duration::from_millis(10));
                self.reads.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Vec::new())
        }
    }

    impl KVStore for SlowRowsKV {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KVError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), KVError> {
            Ok(())
        }
        fn scan_range(
            &self,
            _: &str,
            _: usize,
            _: usize,
            cancel: &CancellationToken,
        ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
            self.read_all(cancel)
        }
        fn scan_filter(
            &self,
            _: &str,
            _: Predicate<'_>,
            _: usize,
            _: usize,
            cancel: &CancellationToken,
        ) -> Result<Vec<(String, Vec<u8>)>, KVError> {
            self.read_all(cancel)
        }
    }

    fn slow_service(request_timeout_ms: u64) -> (CatalogService, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let config = ServiceConfig {
            request_timeout_ms,
            ..Default::default()
        };
        let kv = SlowRowsKV {
            reads: Arc::clone(&reads),
        };
        (CatalogService::with_config(Arc::new(kv), &config), reads)
    }

    /// Wait long enough for an unstopped scan to finish, then check it stopped.
    async fn assert_scan_stopped(reads: &AtomicUsize) {
        let at_stop = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(800)).await;
        let later = reads.load(Ordering::SeqCst);
        assert!(later <= at_stop + 1, "scan kept reading: {} -> {}", at_stop, later);
        assert!(later < SlowRowsKV::ROWS);
    }

    #[tokio::test]
    async fn deadline_stops_the_scan() {
        let (svc, reads) = slow_service(30);
        let err = svc
            .search_by_title("Widget", PageParams::new(10, 0), &live())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BackendUnavailable(_)));
        assert!(err.to_string().contains("timed out"), "got: {}", err);
        assert_scan_stopped(&reads).await;
    }

    #[tokio::test]
    async fn caller_cancellation_stops_the_scan() {
        let (svc, reads) = slow_service(0);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let err = svc.list_products(PageParams::new(10, 0), &cancel).await.unwrap_err();
        assert!(matches!(err, ServiceError::BackendUnavailable(_)));
        assert!(err.to_string().contains("cancelled"), "got: {}", err);
        assert_scan_stopped(&reads).await;
    }

    #[tokio::test]
    async fn dropped_request_stops_the_scan() {
        let (svc, reads) = slow_service(0);
        let cancel = live();
        let abandoned = tokio::time::timeout(
            Duration::from_millis(30),
            svc.search_by_title("", PageParams::new(10, 0), &cancel),
        )
        .await;
        assert!(abandoned.is_err());
        assert_scan_stopped(&reads).await;
    }

    #[tokio::test]
    async fn wildcard_in_term_passes_through() {
        let kv = sample_kv();
        kv.set(&product_key("3"), br#"{"id": "3", "title": "Blue Metal Widget"}"#)
            .unwrap();
        let svc = CatalogService::new(kv);
        let result = svc
            .search_by_title("Blue%Widget", PageParams::new(10, 0), &live())
            .await
            .unwrap();
        assert_eq!(ids(&result), vec!["1", "3"]);
    }
}
