mod candidates;
mod config;
mod errors;
mod jobs;
mod models;
mod notifications;
mod reports;
mod resumes;
mod routes;
mod seed;
mod simulator;
mod state;
mod storage;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::notifications::Notifier;
use crate::routes::build_router;
use crate::simulator::Simulator;
use crate::state::{shared_rng, AppState, Stores};
use crate::storage::{FileSnapshotStore, MemorySnapshotStore, RedisSnapshotStore, SnapshotStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hiring API v{}", env!("CARGO_PKG_VERSION"));

    // Snapshot backend: Redis when configured, local files otherwise
    let backend = build_backend(&config).await?;

    let stores = Arc::new(
        Stores::load(backend, config.seed_mock_data)
            .await
            .context("Failed to rehydrate stores")?,
    );

    let notifier = Notifier::new();
    let rng = shared_rng(config.rng_seed);
    if let Some(seed) = config.rng_seed {
        info!(seed, "Using deterministic RNG");
    }

    let simulator = Simulator::new(
        stores.clone(),
        notifier.clone(),
        rng.clone(),
        config.simulation.clone(),
    );
    let worker = simulator.spawn_worker();
    info!(
        batch_size = config.simulation.batch_size,
        success_rate = config.simulation.success_rate,
        "Analysis worker started"
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        stores,
        notifier,
        rng,
        simulator: simulator.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    simulator.shutdown();
    worker.await.context("Analysis worker panicked")?;
    info!("Shutdown complete");

    Ok(())
}

async fn build_backend(config: &Config) -> Result<Arc<dyn SnapshotStore>> {
    if config.ephemeral_storage {
        warn!("EPHEMERAL_STORAGE is set, nothing will survive a restart");
        return Ok(Arc::new(MemorySnapshotStore::default()));
    }
    match &config.redis_url {
        Some(url) => {
            let store = RedisSnapshotStore::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(store))
        }
        None => {
            let store = FileSnapshotStore::open(&config.data_dir)
                .await
                .with_context(|| format!("Failed to open data dir {}", config.data_dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
