//! Bookshelf Server
//!
//! REST API server for a file-backed book collection.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{api, config::AppConfig, repository::JsonFileStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookshelf_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Bookshelf Server v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonFileStore::new(&config.storage.path);
    tracing::info!(
        "Using books file {:?} (strict writes: {})",
        store.path(),
        config.storage.strict_writes
    );

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address {}", config.server.host))?,
        config.server.port,
    );

    let state = AppState::new(config, Arc::new(store));
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
