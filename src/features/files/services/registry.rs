use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::features::files::stores::RecordStore;
use crate::modules::storage::BlobStore;

/// Live record count after reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub files: usize,
}

/// Retrieval-code registry
///
/// Owns record creation, lookup and expiry, and keeps the record store
/// consistent with the blob store: every read path drops records whose blob
/// has vanished or whose retention window has passed.
pub struct Registry {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl Registry {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { records, blobs }
    }

    /// Whether `code` is held by a record, without reconciliation
    pub async fn contains(&self, code: &str) -> Result<bool> {
        self.records.contains(code).await
    }

    /// Insert a record keyed by its code.
    ///
    /// Returns `false` if the code was claimed in the meantime; nothing is
    /// inserted in that case.
    pub async fn put(&self, record: FileRecord) -> Result<bool> {
        self.records.insert_unique(record).await
    }

    /// Look up a live record by code
    pub async fn get(&self, code: &str) -> Result<FileRecord> {
        let record = self
            .records
            .find(code)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.reconcile(record, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Up to `limit` live records, newest upload first, ties in insertion order
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<FileRecord>> {
        let mut records = self.records.snapshot().await?;
        // Stable sort keeps insertion order among equal timestamps
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let now = Utc::now();
        let mut live = Vec::with_capacity(limit.min(records.len()));
        for record in records {
            if live.len() >= limit {
                break;
            }
            if let Some(record) = self.reconcile(record, now).await? {
                live.push(record);
            }
        }

        Ok(live)
    }

    /// Remove every record with `expires_at <= now` and delete its blob.
    ///
    /// Returns the number of records removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.records.take_expired(now).await?;

        for record in &expired {
            self.delete_blob(record).await;
        }

        if !expired.is_empty() {
            info!("Expiry sweep removed {} file(s)", expired.len());
        }

        Ok(expired.len())
    }

    pub async fn stats(&self) -> Result<RegistryStats> {
        let now = Utc::now();
        for record in self.records.snapshot().await? {
            self.reconcile(record, now).await?;
        }

        Ok(RegistryStats {
            files: self.records.len().await?,
        })
    }

    /// Returns the record if it is still live, purging it otherwise
    async fn reconcile(&self, record: FileRecord, now: DateTime<Utc>) -> Result<Option<FileRecord>> {
        if record.is_expired(now) {
            if let Some(removed) = self.records.remove_if(&record.code, record.id).await? {
                info!("File {} expired, removing", removed.code);
                self.delete_blob(&removed).await;
            }
            return Ok(None);
        }

        if !self.blobs.exists(&record.storage_key).await? {
            if self
                .records
                .remove_if(&record.code, record.id)
                .await?
                .is_some()
            {
                warn!(
                    "Blob {} for code {} is missing, dropping stale record",
                    record.storage_key, record.code
                );
            }
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn delete_blob(&self, record: &FileRecord) {
        match self.blobs.delete(&record.storage_key).await {
            Ok(()) => debug!("Deleted blob {}", record.storage_key),
            Err(e) => warn!(
                "Failed to delete blob {} of code {}: {}",
                record.storage_key, record.code, e
            ),
        }
    }
}
