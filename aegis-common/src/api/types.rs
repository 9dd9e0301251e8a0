//! Shared API request/response types
//!
//! Wire-level types used by both Aegis services:
//! - aegis-broker (upload + task polling)
//! - aegis-worker (object processing)
//!
//! The broker stores the worker's success body verbatim as the task result,
//! so `ProcessResponse` defines the result payload a polling client sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ========================================
// Task Types
// ========================================

/// Lifecycle state of a submitted analysis task.
///
/// Transitions exactly once from `Processing` to one of the terminal
/// states. Serialized lowercase to match the polling contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// True for `Completed` and `Failed` (no further transitions occur)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// The `{status, result}` pair returned by the status endpoint.
///
/// `result` is `None` if and only if the task is still `processing`.
/// On success it carries the worker's JSON body; on failure an
/// `{"error": ...}` descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    pub result: Option<Value>,
}

/// One row of the prior-results listing (`GET /tasks`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub file_name: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

// ========================================
// Broker Endpoints
// ========================================

/// POST /upload response: the polling token plus a human-readable note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: Uuid,
    pub message: String,
}

// ========================================
// Worker Endpoint
// ========================================

/// POST /process request body sent by the broker's hand-off routine.
///
/// `object_key` is the full store key (date prefix included), computed once
/// at submission time — the worker must not rebuild it from `object_name`,
/// or a task straddling midnight would look up the wrong prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub object_name: String,
    pub object_key: String,
}

/// POST /process success body; relayed verbatim as the task result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    pub source_object: String,
    pub model_result: String,
    pub confidence: f64,
}

/// Error body returned by the worker (non-2xx) and embedded in failed
/// task results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_task_status_terminality() {
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_snapshot_processing_has_null_result() {
        let snapshot = TaskSnapshot {
            status: TaskStatus::Processing,
            result: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "processing");
        assert!(json["result"].is_null());
    }

    #[test]
    fn test_process_request_roundtrip() {
        let json = r#"{"object_name": "test.jpg", "object_key": "2026-08-07/test.jpg"}"#;
        let request: ProcessRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.object_name, "test.jpg");
        assert_eq!(request.object_key, "2026-08-07/test.jpg");
    }

    #[test]
    fn test_process_response_deserialization() {
        let json = r#"{
            "message": "classification completed",
            "source_object": "test.jpg",
            "model_result": "Fake",
            "confidence": 0.87
        }"#;
        let response: ProcessResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.model_result, "Fake");
        assert!((response.confidence - 0.87).abs() < f64::EPSILON);
        assert_eq!(response.source_object, "test.jpg");
    }

    #[test]
    fn test_error_body() {
        let body = ErrorBody::new("object storage upload failed");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("object storage upload failed"));
    }
}
