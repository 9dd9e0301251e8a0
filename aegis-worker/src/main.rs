//! aegis-worker - Classification Worker Service
//!
//! Given a stored object's identifiers, downloads the object from the
//! shared store, runs the external classification pipeline, and returns
//! the verdict to the broker.

use std::net::SocketAddr;
use std::sync::Arc;

use aegis_common::storage::HttpObjectStore;
use aegis_worker::classifier::ClassifierClient;
use aegis_worker::config::{Args, Config};
use aegis_worker::AppState;
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
                .unwrap_or_else(|_| "aegis_worker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Aegis Worker (aegis-worker) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::resolve(&args).context("Failed to resolve configuration")?;

    info!("Object store: {}", config.object_store_endpoint);
    info!("Classifier model: {}", config.classifier_model);
    info!("Scratch directory: {}", config.scratch_dir.display());

    // Scratch directory must exist before the first download lands
    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .context("Failed to create scratch directory")?;

    let store = HttpObjectStore::new(
        &config.object_store_endpoint,
        &config.object_store_bucket,
        config.object_store_access_token.clone(),
    );
    let classifier = ClassifierClient::new(
        &config.classifier_endpoint,
        &config.classifier_model,
        config.classifier_api_key.clone(),
    );

    let state = AppState::new(Arc::new(store), classifier, config.scratch_dir.clone());
    let app = aegis_worker::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("aegis-worker listening on http://{}", addr);
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
