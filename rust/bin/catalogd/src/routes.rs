//! Route registration: catalog routes plus system endpoints.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use catalog_store::{catalog_router, CatalogService, MOUNT};
use tower_http::trace::TraceLayer;

/// Build the complete router.
pub fn build_router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest(MOUNT, catalog_router(service))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "catalogd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
