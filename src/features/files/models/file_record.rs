use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::shared::constants::RETENTION_DAYS;

/// Registry entry for one uploaded file
///
/// Immutable once created; the registry only inserts and removes records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: Uuid,
    /// Sanitized filename as shown to users
    pub original_name: String,
    /// Key of the blob in the blob store
    pub storage_key: String,
    /// Retrieval code
    pub code: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(
        id: Uuid,
        original_name: String,
        code: String,
        size_bytes: u64,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            storage_key: Self::storage_key_for(id, &original_name),
            id,
            original_name,
            code,
            size_bytes,
            uploaded_at,
            expires_at: uploaded_at + Duration::days(RETENTION_DAYS),
        }
    }

    /// Storage key for an upload, unique per id even when filenames repeat
    pub fn storage_key_for(id: Uuid, original_name: &str) -> String {
        format!("{}_{}", id, original_name)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_key_and_expiry() {
        let id = Uuid::new_v4();
        let uploaded_at = Utc::now();
        let record = FileRecord::new(id, "a.txt".into(), "FV-0000000A".into(), 10, uploaded_at);

        assert_eq!(record.storage_key, format!("{}_a.txt", id));
        assert_eq!(record.expires_at - record.uploaded_at, Duration::days(7));
        assert!(record.expires_at > record.uploaded_at);
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let record = FileRecord::new(
            Uuid::new_v4(),
            "a.txt".into(),
            "FV-0000000A".into(),
            10,
            Utc::now(),
        );

        assert!(!record.is_expired(record.expires_at - Duration::seconds(1)));
        assert!(record.is_expired(record.expires_at));
    }

    #[test]
    fn test_same_name_gets_distinct_keys() {
        let a = FileRecord::storage_key_for(Uuid::new_v4(), "a.txt");
        let b = FileRecord::storage_key_for(Uuid::new_v4(), "a.txt");
        assert_ne!(a, b);
    }
}
