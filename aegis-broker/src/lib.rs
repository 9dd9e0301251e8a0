//! aegis-broker library interface
//!
//! The broker decouples the client's upload request from the slow remote
//! classification call: uploads get an immediate task id, a background
//! hand-off stores the file and notifies the worker, and clients poll
//! `/status/{task_id}` until the task reaches a terminal state.

pub mod api;
pub mod config;
pub mod error;
pub mod handoff;
pub mod narrative;
pub mod tasks;
pub mod videos;
pub mod worker_client;

pub use crate::error::{ApiError, ApiResult};

use crate::narrative::NarrativeClient;
use crate::tasks::TaskStore;
use crate::videos::VideoSearchClient;
use crate::worker_client::WorkerClient;
use aegis_common::storage::ObjectStore;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Task table: one record per submitted upload
    pub tasks: TaskStore,
    /// Object store the hand-off uploads into
    pub store: Arc<dyn ObjectStore>,
    /// Client for the worker's processing endpoint
    pub worker: WorkerClient,
    /// Streamed LLM narrative client
    pub narrative: NarrativeClient,
    /// Related-video search client
    pub videos: VideoSearchClient,
    /// Public base URL of stored objects (`{endpoint}/{bucket}`), used to
    /// hand the stored image to the narrative LLM
    pub object_url_base: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        worker: WorkerClient,
        narrative: NarrativeClient,
        videos: VideoSearchClient,
        object_url_base: impl Into<String>,
    ) -> Self {
        Self {
            tasks: TaskStore::new(),
            store,
            worker,
            narrative,
            videos,
            object_url_base: object_url_base.into().trim_end_matches('/').to_string(),
            startup_time: Utc::now(),
        }
    }

    /// Public URL of the object stored under `key`
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.object_url_base, key)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::upload_routes())
        .merge(api::status_routes())
        .merge(api::narrative_routes())
        .merge(api::video_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
