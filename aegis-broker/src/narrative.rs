//! LLM narrative enrichment
//!
//! Turns a completed classification verdict into a human-readable forensic
//! report by calling a vision-capable chat-completions endpoint. The call
//! streams: the response body is a text/event-stream whose `data:` lines
//! each carry one text chunk. The stream is one logical call, consumed to
//! completion - chunks are accumulated into the full report and the
//! category line is extracted from the finished text.
//!
//! Nothing here mutates the task record; the narrative is derived from a
//! terminal result, not part of the task lifecycle.

use futures::StreamExt;
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default timeout for the full narrative stream
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Token budget for the generated report
const MAX_TOKENS: u32 = 400;

/// Errors from the narrative call
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// No endpoint/key configured for this deployment
    #[error("narrative endpoint not configured")]
    NotConfigured,

    /// Network failure or timeout
    #[error("narrative request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The LLM endpoint answered with a non-success status
    #[error("narrative endpoint rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Classification verdict fed into the report prompt
#[derive(Debug, Clone)]
pub struct ClassificationVerdict {
    pub model_result: String,
    pub confidence: f64,
}

/// Finished narrative: the full report text plus the extracted category
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeReport {
    pub report: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Client for the streamed narrative endpoint
#[derive(Debug, Clone)]
pub struct NarrativeClient {
    http_client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl NarrativeClient {
    /// Create a new narrative client.
    ///
    /// `endpoint` is the full chat-completions URL. When absent the client
    /// is constructed disabled and every call reports `NotConfigured`.
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// True when an endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Generate the forensic report for a stored image and its verdict.
    ///
    /// Consumes the chunk stream to completion; malformed individual chunks
    /// are skipped, transport failures abort the whole call.
    pub async fn analyze(
        &self,
        verdict: &ClassificationVerdict,
        image_url: &str,
    ) -> Result<NarrativeReport, NarrativeError> {
        let endpoint = self.endpoint.as_ref().ok_or(NarrativeError::NotConfigured)?;

        let mut request = self
            .http_client
            .post(endpoint)
            .header(header::ACCEPT, "text/event-stream")
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .json(&build_request_body(verdict, image_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Rejected { status, body });
        }

        // Accumulate the chunk stream. Lines may be split across network
        // frames, so buffer the trailing partial line between reads.
        let mut report = String::new();
        let mut pending = String::new();
        let mut stream = response.bytes_stream();

        while let Some(frame) = stream.next().await {
            let frame = frame?;
            pending.push_str(&String::from_utf8_lossy(&frame));

            while let Some(newline) = pending.find('\n') {
                let line: String = pending.drain(..=newline).collect();
                if let Some(chunk) = chunk_content(line.trim_end()) {
                    report.push_str(&chunk);
                }
            }
        }
        if let Some(chunk) = chunk_content(pending.trim_end()) {
            report.push_str(&chunk);
        }

        debug!(report_len = report.len(), "Narrative stream consumed");
        if report.is_empty() {
            warn!("Narrative stream produced no content");
        }

        let category = extract_category(&report);
        Ok(NarrativeReport { report, category })
    }
}

/// Extract the text chunk from one event-stream line, if it carries one
fn chunk_content(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    // Malformed chunks are skipped, not fatal
    let value: Value = serde_json::from_str(payload).ok()?;
    value["message"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pull the `Category : <word>` line out of the finished report
fn extract_category(report: &str) -> Option<String> {
    let re = Regex::new(r"(?m)Category\s*:\s*(\S+)").expect("valid regex");
    re.captures(report)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('*').to_string())
        .filter(|c| !c.is_empty())
}

fn build_request_body(verdict: &ClassificationVerdict, image_url: &str) -> Value {
    let system_text = format!(
        "You are a digital forensics expert and deepfake detection model. \
         Perform a technical manipulation analysis of the supplied image and \
         cross-check it against the internal model verdict.\n\
         \n\
         Internal model verdict:\n\
         - Class: {}\n\
         - Confidence: {:.1}%\n\
         \n\
         Report sections:\n\
         Category : name the image's subject category in a single word \
         (e.g. person, object, celebrity, landscape).\n\
         1. Pixel and compression artifact analysis: report pixel-level \
         inconsistencies, unnatural compression traces, color mismatches.\n\
         2. Lighting and shadow consistency: evaluate whether light \
         direction, intensity and color temperature agree between subject \
         and background.\n\
         3. Geometric consistency: look for anatomically implausible \
         features (facial symmetry, eye reflections, teeth, ears).\n\
         4. Background and context analysis: distortions or resolution \
         mismatches between subject and background.\n\
         5. Final verdict: conclude 'Deepfake' or 'Real' with technical \
         justification.\n\
         6. Cross-check: state whether your conclusion agrees with the \
         internal model verdict and, if not, which analysis differed.\n\
         \n\
         Write the result in markdown with clearly separated sections.",
        verdict.model_result,
        verdict.confidence * 100.0
    );

    json!({
        "messages": [
            { "role": "system", "content": system_text },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": "Determine whether this image is a deepfake." },
                    { "type": "image_url", "imageUrl": { "url": image_url } }
                ]
            }
        ],
        "maxTokens": MAX_TOKENS,
        "temperature": 0.5,
        "topP": 0.8,
        "stream": true
    })
}
