//! HTTP object store adapter
//!
//! Speaks plain `PUT`/`GET {endpoint}/{bucket}/{key}` against an
//! S3-compatible HTTP gateway, with optional bearer-token authorization.
//! Remote rejections are surfaced as `Error::Storage` carrying the
//! gateway's response detail so the broker can record it on the task.

use super::ObjectStore;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for object store requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Object store client over an S3-compatible HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http_client: Client,
    endpoint: String,
    bucket: String,
    access_token: Option<String>,
}

impl HttpObjectStore {
    /// Create a new store client.
    ///
    /// `endpoint` is the gateway base URL (no trailing slash required),
    /// `bucket` the target bucket name. `access_token`, when present, is
    /// sent as a bearer authorization header on every request.
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Public URL of the object stored under `key`.
    ///
    /// Used by the narrative report to hand the stored image to the
    /// vision-capable LLM.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<()> {
        let url = self.object_url(key);
        debug!(key = %key, size = bytes.len(), "Uploading object");

        let response = self
            .request(self.http_client.put(&url))
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "upload rejected ({}): {}",
                status, detail
            )));
        }

        debug!(key = %key, "Object uploaded");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let url = self.object_url(key);
        debug!(key = %key, "Downloading object");

        let response = self
            .request(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("download request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "download rejected ({}): {}",
                status, detail
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Storage(format!("download body read failed: {}", e)))?;

        debug!(key = %key, size = bytes.len(), "Object downloaded");
        Ok(bytes)
    }
}
