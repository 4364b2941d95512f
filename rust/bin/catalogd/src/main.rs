//! `catalogd`: the product catalog query server.
//!
//! Usage:
//!   catalogd [-c <config.toml>] [--listen <addr>] [--data-dir <dir>]
//!            [--seed-dir <dir>] [--in-memory]

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use catalog_store::CatalogService;
use clap::Parser;
use tracing::info;

use config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        info!("Loading configuration from {}", path.display());
    }
    let config = config::resolve(&cli)?;

    // Initialize storage.
    let kv = bootstrap::open_store(&config, cli.in_memory)?;
    let seeded = bootstrap::seed(&config, kv.as_ref())?;
    if seeded > 0 {
        info!("Seeded {} products", seeded);
    }

    let service = Arc::new(CatalogService::with_config(kv, &config));
    let app = routes::build_router(service);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Catalog server listening on {}", config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
