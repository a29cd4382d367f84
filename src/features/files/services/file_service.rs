use bytes::Bytes;
use chrono::Utc;
use minijinja::{context, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    FileInfoDto, RecentFileDto, StatsDto, SweepResponseDto, UploadResponseDto,
};
use crate::features::files::models::FileRecord;
use crate::features::files::services::{CodeGenerator, Registry};
use crate::modules::storage::{BlobStore, BlobStream};
use crate::shared::constants::RECENT_FILES_LIMIT;
use crate::shared::filename::sanitize_filename;
use crate::shared::templates::render_template;
use crate::shared::validation::{file_extension, is_extension_allowed, normalize_code};

/// Blob content ready to be sent as an attachment
pub struct FileDownload {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub stream: BlobStream,
}

/// Rendered preview of a file
pub enum FilePreview {
    /// Raw image bytes served inline
    Image { content_type: String, data: Bytes },
    /// HTML viewer or download page
    Page(String),
}

/// Service for file drop-off and retrieval
pub struct FileService {
    registry: Arc<Registry>,
    blobs: Arc<dyn BlobStore>,
    codes: CodeGenerator,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(
        registry: Arc<Registry>,
        blobs: Arc<dyn BlobStore>,
        codes: CodeGenerator,
        max_upload_size: usize,
    ) -> Self {
        Self {
            registry,
            blobs,
            codes,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Validate a user-supplied filename and return its lowercased extension
    pub fn check_filename(raw_filename: &str) -> Result<String> {
        if raw_filename.trim().is_empty() {
            return Err(AppError::Validation("No selected file".to_string()));
        }

        if !is_extension_allowed(raw_filename) {
            return Err(AppError::Validation("File type not allowed".to_string()));
        }

        file_extension(raw_filename)
            .ok_or_else(|| AppError::Validation("File type not allowed".to_string()))
    }

    pub fn too_large_error(&self) -> AppError {
        AppError::Validation(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            self.max_upload_size,
            self.max_upload_size / 1024 / 1024
        ))
    }

    /// Store an uploaded file and register it under a fresh retrieval code
    ///
    /// # Arguments
    /// * `raw_filename` - The filename as sent by the client
    /// * `data` - The file content
    ///
    /// # Returns
    /// The retrieval code and the sanitized filename
    pub async fn upload(&self, raw_filename: &str, data: Bytes) -> Result<UploadResponseDto> {
        let extension = Self::check_filename(raw_filename)?;

        if data.len() > self.max_upload_size {
            return Err(self.too_large_error());
        }

        let filename = resolve_filename(raw_filename, &extension);
        let id = Uuid::new_v4();
        let storage_key = FileRecord::storage_key_for(id, &filename);
        let size_bytes = data.len() as u64;

        self.blobs.put(&storage_key, data).await?;

        let record = match self.register(id, &filename, size_bytes).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&storage_key).await {
                    warn!("Failed to remove orphan blob {}: {}", storage_key, cleanup);
                }
                return Err(e);
            }
        };

        info!(
            "File uploaded: code={}, key={}, size={}",
            record.code, record.storage_key, record.size_bytes
        );

        Ok(UploadResponseDto {
            success: true,
            code: record.code,
            filename: record.original_name,
        })
    }

    /// Draw codes until one is committed to the registry
    async fn register(&self, id: Uuid, filename: &str, size_bytes: u64) -> Result<FileRecord> {
        let uploaded_at = Utc::now();

        loop {
            let code = self.codes.generate(&self.registry).await?;
            let record = FileRecord::new(id, filename.to_string(), code, size_bytes, uploaded_at);

            if self.registry.put(record.clone()).await? {
                return Ok(record);
            }

            debug!("Retrieval code {} claimed concurrently, drawing again", record.code);
        }
    }

    async fn lookup(&self, code: &str) -> Result<FileRecord> {
        let code = normalize_code(code)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.registry.get(&code).await
    }

    pub async fn get_info(&self, code: &str) -> Result<FileInfoDto> {
        let record = self.lookup(code).await?;
        Ok(FileInfoDto::from(&record))
    }

    pub async fn download(&self, code: &str) -> Result<FileDownload> {
        let record = self.lookup(code).await?;
        let stream = self.blobs.open(&record.storage_key).await?;

        debug!("Serving download of {} ({})", record.code, record.storage_key);

        Ok(FileDownload {
            content_type: mime_guess::from_path(&record.original_name)
                .first_or_octet_stream()
                .to_string(),
            filename: record.original_name,
            size_bytes: record.size_bytes,
            stream,
        })
    }

    /// Build a preview: images inline, text and PDF in a viewer page,
    /// anything else as a download link
    pub async fn preview(&self, code: &str) -> Result<FilePreview> {
        let record = self.lookup(code).await?;
        let extension = file_extension(&record.original_name).unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" => {
                let data = self.blobs.read(&record.storage_key).await?;
                let content_type = mime_guess::from_ext(&extension)
                    .first_or_octet_stream()
                    .to_string();
                return Ok(FilePreview::Image { content_type, data });
            }
            "txt" => {
                let data = self.blobs.read(&record.storage_key).await?;
                match String::from_utf8(data.to_vec()) {
                    Ok(content) => {
                        let page = render_page(
                            "preview/text.html",
                            context! {
                                filename => &record.original_name,
                                content => content,
                                code => &record.code,
                            },
                        )?;
                        return Ok(FilePreview::Page(page));
                    }
                    Err(_) => debug!("{} is not valid UTF-8, offering download", record.code),
                }
            }
            "pdf" => {
                let page = render_page(
                    "preview/pdf.html",
                    context! {
                        filename => &record.original_name,
                        code => &record.code,
                    },
                )?;
                return Ok(FilePreview::Page(page));
            }
            _ => {}
        }

        let page = render_page(
            "preview/download.html",
            context! {
                filename => &record.original_name,
                code => &record.code,
            },
        )?;
        Ok(FilePreview::Page(page))
    }

    pub async fn list_recent(&self) -> Result<Vec<RecentFileDto>> {
        let records = self.registry.list_recent(RECENT_FILES_LIMIT).await?;
        Ok(records.iter().map(RecentFileDto::from).collect())
    }

    pub async fn stats(&self) -> Result<StatsDto> {
        let stats = self.registry.stats().await?;

        Ok(StatsDto {
            files: stats.files,
            downloads: 0,
            users: 0,
            countries: 0,
        })
    }

    pub async fn sweep_expired(&self) -> Result<SweepResponseDto> {
        let removed = self.registry.sweep_expired(Utc::now()).await?;
        Ok(SweepResponseDto { removed })
    }
}

fn render_page(template_name: &str, ctx: Value) -> Result<String> {
    render_template(template_name, ctx).map_err(|e| AppError::Internal(e.to_string()))
}

/// Sanitized display name, falling back to `file.<ext>` when sanitizing
/// loses the name or its extension
fn resolve_filename(raw_filename: &str, extension: &str) -> String {
    match sanitize_filename(raw_filename) {
        Some(name) if file_extension(&name).as_deref() == Some(extension) => name,
        _ => format!("file.{}", extension),
    }
}
