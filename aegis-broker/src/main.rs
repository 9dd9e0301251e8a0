//! aegis-broker - Upload Broker Service
//!
//! Accepts image uploads from the presentation client, stores them in the
//! external object store, hands processing off to the worker service, and
//! serves task-status polling plus narrative/video enrichment endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use aegis_broker::config::{Args, Config};
use aegis_broker::narrative::NarrativeClient;
use aegis_broker::videos::VideoSearchClient;
use aegis_broker::worker_client::WorkerClient;
use aegis_broker::AppState;
use aegis_common::storage::HttpObjectStore;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis_broker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Aegis Broker (aegis-broker) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::resolve(&args).context("Failed to resolve configuration")?;

    info!("Object store: {}", config.object_store_endpoint);
    info!("Worker: {}", config.worker_url);
    info!(
        "Worker timeout: {} seconds",
        config.worker_timeout.as_secs()
    );

    let store = HttpObjectStore::new(
        &config.object_store_endpoint,
        &config.object_store_bucket,
        config.object_store_access_token.clone(),
    );
    let object_url_base = format!(
        "{}/{}",
        config.object_store_endpoint.trim_end_matches('/'),
        config.object_store_bucket
    );
    let worker = WorkerClient::new(&config.worker_url, config.worker_timeout);
    let narrative = NarrativeClient::new(
        config.narrative_endpoint.clone(),
        config.narrative_api_key.clone(),
    );
    if !narrative.is_configured() {
        info!("Narrative endpoint not configured; /narrative will report 503");
    }
    let videos = VideoSearchClient::new(config.video_api_key.clone(), &config.video_region);

    let state = AppState::new(Arc::new(store), worker, narrative, videos, object_url_base);
    let app = aegis_broker::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("aegis-broker listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
