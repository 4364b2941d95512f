//! HTTP binding for the catalog queries.
//!
//! Routes (nested under [`MOUNT`] by the server):
//!   GET /?limit&offset                                 list page
//!   GET /search/products?limit&offset                  list page
//!   GET /search/searchByTitle?searchTerm&limit&offset  title search page
//!   GET /search/count                                  total products
//!   GET /{id}                                          get by id
//!
//! Each request gets its own `CancellationToken`; axum drops the handler
//! future when the client goes away, which cancels the storage scan.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use catalog_core::{CountResult, ListResult, PageParams, ServiceError};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::model::ProductMetadata;
use crate::service::CatalogService;

/// Path prefix the catalog router is mounted at.
pub const MOUNT: &str = "/product";

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    #[serde(default)]
    search_term: String,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Build the catalog router.
pub fn catalog_router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/search/products", get(list_handler))
        .route("/search/searchByTitle", get(search_handler))
        .route("/search/count", get(count_handler))
        .route("/{id}", get(get_handler))
        .with_state(service)
}

fn page_params(service: &CatalogService, limit: Option<i64>, offset: Option<i64>) -> PageParams {
    PageParams::new(limit.unwrap_or(service.default_limit()), offset.unwrap_or(0))
}

fn bad_query(rejection: QueryRejection) -> ServiceError {
    ServiceError::InvalidArgument(rejection.body_text())
}

async fn list_handler(
    State(service): State<Arc<CatalogService>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResult<ProductMetadata>>, ServiceError> {
    let Query(q) = query.map_err(bad_query)?;
    let params = page_params(&service, q.limit, q.offset);
    Ok(Json(service.list_products(params, &CancellationToken::new()).await?))
}

async fn search_handler(
    State(service): State<Arc<CatalogService>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ListResult<ProductMetadata>>, ServiceError> {
    let Query(q) = query.map_err(bad_query)?;
    let params = page_params(&service, q.limit, q.offset);
    Ok(Json(service
        .search_by_title(&q.search_term, params, &CancellationToken::new())
        .await?))
}

async fn count_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<CountResult>, ServiceError> {
    let count = service.count(&CancellationToken::new()).await?;
    Ok(Json(CountResult { count }))
}

async fn get_handler(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Result<Json<ProductMetadata>, ServiceError> {
    match service.get_by_id(&id, &CancellationToken::new()).await? {
        Some(product) => Ok(Json(product)),
        None => Err(ServiceError::NotFound(format!("product '{}' not found", id))),
    }
}
