//! Catalog query service.
//!
//! Read-only access to product metadata held in a KV backend:
//! paginated listing, lookup by id, and title substring search.
//!
//! ```ignore
//! let service = Arc::new(CatalogService::with_config(kv, &config));
//! let app = Router::new().nest(routes::MOUNT, catalog_router(service));
//! ```

pub mod model;
pub mod pattern;
pub mod repo;
pub mod routes;
pub mod service;

pub use model::{product_key, ProductMetadata, PRODUCT_PREFIX};
pub use pattern::TitlePattern;
pub use repo::{ProductRepo, SearchOutcome};
pub use routes::{catalog_router, MOUNT};
pub use service::CatalogService;
