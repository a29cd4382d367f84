use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::FileRecord;
use crate::shared::format::{format_size, format_timestamp};

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub success: bool,
    /// Retrieval code to share with the recipient
    #[schema(example = "FV-3F9A0C1D")]
    pub code: String,
    /// Sanitized filename the file is stored under
    #[schema(example = "report.pdf")]
    pub filename: String,
}

/// Metadata of a retrievable file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoDto {
    pub filename: String,
    /// Human-readable size, e.g. "1.46 KB"
    pub size: String,
    /// Upload time, `YYYY-MM-DD HH:MM:SS` in server local time
    pub upload_date: String,
    /// Expiry time, `YYYY-MM-DD HH:MM:SS` in server local time
    pub expire_date: String,
}

impl From<&FileRecord> for FileInfoDto {
    fn from(record: &FileRecord) -> Self {
        Self {
            filename: record.original_name.clone(),
            size: format_size(record.size_bytes),
            upload_date: format_timestamp(record.uploaded_at),
            expire_date: format_timestamp(record.expires_at),
        }
    }
}

/// Entry of the recent uploads listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentFileDto {
    pub filename: String,
    pub code: String,
    pub upload_date: String,
}

impl From<&FileRecord> for RecentFileDto {
    fn from(record: &FileRecord) -> Self {
        Self {
            filename: record.original_name.clone(),
            code: record.code.clone(),
            upload_date: format_timestamp(record.uploaded_at),
        }
    }
}

/// Service statistics
///
/// Only `files` is tracked. The other counters are placeholders and always zero.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsDto {
    /// Number of live files
    pub files: usize,
    pub downloads: u64,
    pub users: u64,
    pub countries: u64,
}

/// Response DTO for an on-demand expiry sweep
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepResponseDto {
    /// Number of expired files removed
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_file_info_uses_camel_case_keys() {
        let record = FileRecord::new(
            Uuid::new_v4(),
            "a.txt".into(),
            "FV-0000000A".into(),
            10,
            Utc::now(),
        );

        let value = serde_json::to_value(FileInfoDto::from(&record)).unwrap();
        assert_eq!(value["filename"], "a.txt");
        assert_eq!(value["size"], "10 Bytes");
        assert!(value["uploadDate"].is_string());
        assert!(value["expireDate"].is_string());

        let value = serde_json::to_value(RecentFileDto::from(&record)).unwrap();
        assert_eq!(value["code"], "FV-0000000A");
        assert!(value["uploadDate"].is_string());
    }
}
