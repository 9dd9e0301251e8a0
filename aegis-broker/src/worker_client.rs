//! Worker service client
//!
//! Sends the hand-off's single processing request to the worker. The worker
//! downloads the stored object itself; only the object identifiers travel
//! in the request body. The call is bounded by a configurable timeout
//! (default 300 seconds) and is never retried.

use aegis_common::api::types::ProcessRequest;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for the worker processing call
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors from the worker processing call.
///
/// `Transport` and `Rejected` are kept apart so the task's failure payload
/// can carry the remote's own error detail when one exists.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Network failure or timeout before a response arrived
    #[error("worker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The worker answered with a non-success status
    #[error("worker rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// HTTP client for the worker's processing endpoint
#[derive(Debug, Clone)]
pub struct WorkerClient {
    http_client: Client,
    base_url: String,
}

impl WorkerClient {
    /// Create a new worker client with a bounded request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the worker to process a stored object.
    ///
    /// Returns the worker's JSON body on success; the broker records it
    /// verbatim as the task result.
    pub async fn process(&self, object_name: &str, object_key: &str) -> Result<Value, WorkerError> {
        let url = format!("{}/process", self.base_url);
        debug!(object_key = %object_key, url = %url, "Notifying worker");

        let response = self
            .http_client
            .post(&url)
            .json(&ProcessRequest {
                object_name: object_name.to_string(),
                object_key: object_key.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}
