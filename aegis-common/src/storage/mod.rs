//! Object store abstraction
//!
//! The upload pipeline treats the object store as an external collaborator
//! with a put/get contract. `HttpObjectStore` talks to an S3-compatible
//! HTTP gateway; `MemoryObjectStore` backs tests and local development.
//!
//! Keys are namespaced by a date-stamp prefix (`YYYY-MM-DD/<file-name>`).
//! The broker computes the key exactly once at submission and persists it
//! on the task record; every later access (worker download, narrative
//! image URL) reuses the stored key rather than recomputing "today".

mod http;
mod memory;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

/// Key-addressable object storage contract
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store `bytes` under `key`, overwriting any existing object
    async fn put(&self, key: &str, bytes: Bytes) -> Result<()>;

    /// Retrieve the object stored under `key`
    async fn get(&self, key: &str) -> Result<Bytes>;
}

/// Build the date-prefixed store key for an object
pub fn object_key(date: NaiveDate, file_name: &str) -> String {
    format!("{}/{}", date.format("%Y-%m-%d"), file_name)
}

/// Build the store key using today's date in the server's local timezone
pub fn object_key_for_today(file_name: &str) -> String {
    object_key(chrono::Local::now().date_naive(), file_name)
}
