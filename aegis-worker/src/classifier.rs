//! Classification pipeline client
//!
//! Sends an image to the hosted inference endpoint for the configured
//! pretrained model and maps the raw label candidates onto the closed
//! `Fake`/`Real` set. Model labels vary across checkpoints ("DeepFake",
//! "fake", "Real", ...), so the mapping lowercases the top candidate and
//! looks for a fake marker substring.

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for inference requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from the classification call
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Scratch file could not be read
    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure or timeout
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The inference endpoint answered with a non-success status
    #[error("inference endpoint rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    /// The response carried no label candidates
    #[error("inference response carried no classification candidates")]
    EmptyResponse,
}

/// One label candidate from the inference response
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Classification verdict: closed-set label plus confidence in [0,1]
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub model_result: String,
    pub confidence: f64,
}

/// Client for the hosted image-classification endpoint
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http_client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ClassifierClient {
    /// Create a new classifier client.
    ///
    /// `endpoint` is the inference API base URL, `model` the pretrained
    /// model identifier appended to it.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Classify the image at `path`
    pub async fn classify(&self, path: &Path) -> Result<Verdict, ClassifierError> {
        let image = tokio::fs::read(path).await?;
        debug!(path = %path.display(), size = image.len(), "Running classification");

        let url = format!("{}/models/{}", self.endpoint, self.model);
        let mut request = self
            .http_client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(image);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Rejected { status, body });
        }

        let body: Value = response.json().await?;
        parse_verdict(&body)
    }
}

/// Pick the top candidate and map its label onto the closed set.
///
/// Candidates arrive ordered by descending score; a flat array and the
/// nested `[[...]]` batch form are both accepted.
fn parse_verdict(body: &Value) -> Result<Verdict, ClassifierError> {
    let candidates = body
        .as_array()
        .map(|arr| match arr.first() {
            Some(Value::Array(inner)) => inner.as_slice(),
            _ => arr.as_slice(),
        })
        .unwrap_or_default();

    let top: LabelScore = candidates
        .first()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .ok_or(ClassifierError::EmptyResponse)?;

    Ok(Verdict {
        model_result: map_label(&top.label).to_string(),
        confidence: top.score.clamp(0.0, 1.0),
    })
}

/// Map a raw model label onto the closed `Fake`/`Real` set
fn map_label(label: &str) -> &'static str {
    let label = label.to_lowercase();
    if label.contains("fake") || label.contains("deepfake") {
        "Fake"
    } else {
        "Real"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_label_variants() {
        assert_eq!(map_label("DeepFake"), "Fake");
        assert_eq!(map_label("fake"), "Fake");
        assert_eq!(map_label("Deepfake Detected"), "Fake");
        assert_eq!(map_label("Real"), "Real");
        assert_eq!(map_label("authentic"), "Real");
    }

    #[test]
    fn test_parse_verdict_takes_top_candidate() {
        let body = json!([
            {"label": "DeepFake", "score": 0.87},
            {"label": "Real", "score": 0.13}
        ]);

        let verdict = parse_verdict(&body).unwrap();
        assert_eq!(verdict.model_result, "Fake");
        assert!((verdict.confidence - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_verdict_accepts_batch_form() {
        let body = json!([[{"label": "Realism", "score": 0.91}]]);

        let verdict = parse_verdict(&body).unwrap();
        assert_eq!(verdict.model_result, "Real");
    }

    #[test]
    fn test_parse_verdict_clamps_score() {
        let body = json!([{"label": "fake", "score": 1.2}]);
        assert!((parse_verdict(&body).unwrap().confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_verdict_empty_response() {
        assert!(matches!(
            parse_verdict(&json!([])),
            Err(ClassifierError::EmptyResponse)
        ));
        assert!(matches!(
            parse_verdict(&json!({"error": "loading"})),
            Err(ClassifierError::EmptyResponse)
        ));
    }
}
