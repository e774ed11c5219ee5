mod config;
mod dataset;
mod errors;
mod figure;
mod models;
mod routes;
mod state;
mod stats;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dataset::{DatasetLoader, HttpDatasetSource, RedisDatasetCache};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobs dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Arc::new(RedisDatasetCache::new(redis));
    info!("Redis client initialized");

    // Upstream dataset source
    let source = Arc::new(HttpDatasetSource::new(
        config.dataset_url.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    )?);
    info!(
        "Dataset source: {} (timeout {}s)",
        config.dataset_url, config.fetch_timeout_secs
    );

    let loader = Arc::new(DatasetLoader::new(cache, source));

    if config.reset_dataset_cache {
        let cleared = loader.clear_cache().await?;
        warn!("RESET_DATASET_CACHE set; cached dataset cleared: {cleared}");
    }

    let state = AppState { loader };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
