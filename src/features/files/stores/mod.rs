//! Record stores backing the retrieval-code registry.
//!
//! The registry only talks to `RecordStore`, so the in-memory map can be
//! swapped for a persistent store without touching the services.

mod memory_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::FileRecord;

pub use memory_store::InMemoryRecordStore;

/// Code-to-record map with atomic check-and-mutate operations
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `record` unless its code is already taken.
    ///
    /// The check and the insert are one atomic step. Returns `false` when the
    /// code is live and nothing was inserted.
    async fn insert_unique(&self, record: FileRecord) -> Result<bool>;

    async fn contains(&self, code: &str) -> Result<bool>;

    async fn find(&self, code: &str) -> Result<Option<FileRecord>>;

    /// Remove the record under `code` only if it is still the record with `id`.
    ///
    /// Returns the removed record. Concurrent callers racing on the same
    /// record see exactly one `Some`.
    async fn remove_if(&self, code: &str, id: Uuid) -> Result<Option<FileRecord>>;

    /// All records in insertion order
    async fn snapshot(&self) -> Result<Vec<FileRecord>>;

    /// Atomically remove and return every record with `expires_at <= now`
    async fn take_expired(&self, now: DateTime<Utc>) -> Result<Vec<FileRecord>>;

    async fn len(&self) -> Result<usize>;
}
