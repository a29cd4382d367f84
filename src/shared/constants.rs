/// Extensions accepted for upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "docx", "xlsx", "pptx", "zip", "rar",
];

/// Default maximum upload size in bytes (10 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Days a file stays retrievable after upload
pub const RETENTION_DAYS: i64 = 7;

/// Default interval between expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

// =============================================================================
// RETRIEVAL CODES
// =============================================================================

/// Prefix of every retrieval code, e.g. "FV-3F9A0C1D"
pub const CODE_PREFIX: &str = "FV-";

/// Number of hex characters following the prefix (32 bits of entropy)
pub const CODE_LENGTH: usize = 8;

/// Number of entries returned by the recent files listing
pub const RECENT_FILES_LIMIT: usize = 10;

/// Timestamp layout used in API responses
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
