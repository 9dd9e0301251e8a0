//! aegis-worker library interface
//!
//! The worker turns a stored object into a classification result: it
//! downloads the object from the shared store, runs it through the external
//! classification pipeline, and answers the broker's single processing
//! request with the verdict.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use crate::classifier::ClassifierClient;
use aegis_common::storage::ObjectStore;
use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Object store the broker uploaded into
    pub store: Arc<dyn ObjectStore>,
    /// External classification pipeline client
    pub classifier: ClassifierClient,
    /// Directory for temporary local copies of downloaded objects
    pub scratch_dir: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        classifier: ClassifierClient,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            classifier,
            scratch_dir,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::process_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
