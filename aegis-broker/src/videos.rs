//! Related-video search
//!
//! Thin proxy over the YouTube Data API so the presentation client can show
//! educational videos next to a verdict. Two operations: keyword search
//! (search call followed by a details call for view counts) and the
//! regional most-popular chart.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// YouTube Data API base URL
const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default timeout for video API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Results per search/chart request
const MAX_RESULTS: u32 = 10;

/// Errors from the video search proxy
#[derive(Debug, Error)]
pub enum VideoSearchError {
    /// No API key configured for this deployment
    #[error("video search API key not configured")]
    NotConfigured,

    /// Network failure or timeout
    #[error("video API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The video API answered with a non-success status
    #[error("video API rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    /// The response body was missing the expected items
    #[error("video API response missing items")]
    MalformedResponse,
}

/// One video in a search or trending response
#[derive(Debug, Clone, Serialize)]
pub struct VideoItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub thumbnail: String,
    pub view_count: u64,
}

/// Client for the video search API
#[derive(Debug, Clone)]
pub struct VideoSearchClient {
    http_client: Client,
    api_key: Option<String>,
    region: String,
}

impl VideoSearchClient {
    pub fn new(api_key: Option<String>, region: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            region: region.into(),
        }
    }

    /// Keyword search: search call for ids, details call for view counts
    pub async fn search(&self, query: &str) -> Result<Vec<VideoItem>, VideoSearchError> {
        let api_key = self.api_key.as_ref().ok_or(VideoSearchError::NotConfigured)?;
        debug!(query = %query, "Searching videos");

        let search_data = self
            .get_json(
                &format!("{}/search", YOUTUBE_API_URL),
                &[
                    ("key", api_key.as_str()),
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", &MAX_RESULTS.to_string()),
                ],
            )
            .await?;

        let items = search_data["items"]
            .as_array()
            .ok_or(VideoSearchError::MalformedResponse)?;
        let video_ids: Vec<&str> = items
            .iter()
            .filter_map(|item| item["id"]["videoId"].as_str())
            .collect();
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let detail_data = self
            .get_json(
                &format!("{}/videos", YOUTUBE_API_URL),
                &[
                    ("key", api_key.as_str()),
                    ("part", "snippet,statistics"),
                    ("id", &video_ids.join(",")),
                ],
            )
            .await?;

        let detail_items = detail_data["items"]
            .as_array()
            .ok_or(VideoSearchError::MalformedResponse)?;
        Ok(detail_items
            .iter()
            .filter_map(|item| {
                Some(VideoItem {
                    title: item["snippet"]["title"].as_str()?.to_string(),
                    video_id: item["id"].as_str().map(str::to_string),
                    video_url: None,
                    thumbnail: item["snippet"]["thumbnails"]["default"]["url"]
                        .as_str()?
                        .to_string(),
                    view_count: parse_view_count(&item["statistics"]["viewCount"]),
                })
            })
            .collect())
    }

    /// Most-popular chart for the configured region
    pub async fn trending(&self) -> Result<Vec<VideoItem>, VideoSearchError> {
        let api_key = self.api_key.as_ref().ok_or(VideoSearchError::NotConfigured)?;
        debug!(region = %self.region, "Fetching trending videos");

        let data = self
            .get_json(
                &format!("{}/videos", YOUTUBE_API_URL),
                &[
                    ("key", api_key.as_str()),
                    ("part", "snippet,statistics"),
                    ("chart", "mostPopular"),
                    ("regionCode", &self.region),
                    ("maxResults", &MAX_RESULTS.to_string()),
                ],
            )
            .await?;

        let items = data["items"]
            .as_array()
            .ok_or(VideoSearchError::MalformedResponse)?;
        Ok(items
            .iter()
            .filter_map(|item| {
                let video_id = item["id"].as_str()?;
                Some(VideoItem {
                    title: item["snippet"]["title"].as_str()?.to_string(),
                    video_id: None,
                    video_url: Some(format!("https://www.youtube.com/watch?v={}", video_id)),
                    thumbnail: item["snippet"]["thumbnails"]["default"]["url"]
                        .as_str()?
                        .to_string(),
                    view_count: parse_view_count(&item["statistics"]["viewCount"]),
                })
            })
            .collect())
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, VideoSearchError> {
        let response = self.http_client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VideoSearchError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

/// View counts arrive as JSON strings; absent or unparsable counts are 0
fn parse_view_count(value: &Value) -> u64 {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| value.as_u64())
        .unwrap_or(0)
}
