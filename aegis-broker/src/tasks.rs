//! Task records and the injectable task store
//!
//! One record per submitted upload, keyed by a v4 UUID issued at submission.
//! A record is mutated exactly once, by the hand-off routine, when it moves
//! to a terminal state; the status-read path only ever takes snapshots.
//!
//! The store is process-lifetime memory. Records are never destroyed and do
//! not survive a restart; a polling client that outlives a broker restart
//! sees NotFound for its old task id and must resubmit.

use aegis_common::api::types::{TaskSnapshot, TaskStatus, TaskSummary};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

/// Everything the broker tracks about one submitted analysis request
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: Uuid,
    /// Original upload file name (display name, path components stripped)
    pub file_name: String,
    /// Store key computed once at submission; never recomputed afterwards
    pub object_key: String,
    pub status: TaskStatus,
    /// `None` while processing; set exactly once with the terminal status
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn new(file_name: String, object_key: String) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            file_name,
            object_key,
            status: TaskStatus::Processing,
            result: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// The `{status, result}` pair the polling contract exposes
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            status: self.status,
            result: self.result.clone(),
        }
    }

    fn summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.task_id,
            file_name: self.file_name.clone(),
            status: self.status,
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }
}

/// Concurrency-safe task table shared between the HTTP handlers and the
/// per-task hand-off routines.
///
/// Exactly one writer (the hand-off) touches a given record after creation,
/// so the lock is held only for the map operation itself. Terminal
/// transitions are enforced here: once a record is `completed` or `failed`
/// it is never overwritten.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    records: Arc<RwLock<HashMap<Uuid, TaskRecord>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh `processing` record and return its task id
    pub async fn create(&self, file_name: &str, object_key: &str) -> Uuid {
        let record = TaskRecord::new(file_name.to_string(), object_key.to_string());
        let task_id = record.task_id;
        self.records.write().await.insert(task_id, record);
        task_id
    }

    /// Snapshot of the `{status, result}` pair, if the task exists
    pub async fn get(&self, task_id: Uuid) -> Option<TaskSnapshot> {
        self.records
            .read()
            .await
            .get(&task_id)
            .map(TaskRecord::snapshot)
    }

    /// Full record, if the task exists (narrative needs the object key)
    pub async fn record(&self, task_id: Uuid) -> Option<TaskRecord> {
        self.records.read().await.get(&task_id).cloned()
    }

    /// Transition to `completed` with the worker's response body
    pub async fn complete(&self, task_id: Uuid, result: Value) {
        self.finish(task_id, TaskStatus::Completed, result).await;
    }

    /// Transition to `failed` with an `{"error": ...}` descriptor
    pub async fn fail(&self, task_id: Uuid, error: impl Into<String>) {
        self.finish(task_id, TaskStatus::Failed, json!({ "error": error.into() }))
            .await;
    }

    /// Prior results, newest first
    pub async fn list(&self) -> Vec<TaskSummary> {
        let records = self.records.read().await;
        let mut summaries: Vec<TaskSummary> = records.values().map(TaskRecord::summary).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    async fn finish(&self, task_id: Uuid, status: TaskStatus, result: Value) {
        let mut records = self.records.write().await;
        match records.get_mut(&task_id) {
            Some(record) if record.status.is_terminal() => {
                // Status is monotonic: processing -> {completed|failed}, once
                warn!(
                    task_id = %task_id,
                    current = ?record.status,
                    attempted = ?status,
                    "Ignoring terminal transition on already-terminal task"
                );
            }
            Some(record) => {
                record.status = status;
                record.result = Some(result);
                record.finished_at = Some(Utc::now());
            }
            None => {
                warn!(task_id = %task_id, "Terminal transition for unknown task");
            }
        }
    }
}
