use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::BytesMut;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    FileInfoDto, RecentFileDto, StatsDto, SweepResponseDto, UploadFileDto, UploadResponseDto,
};
use crate::features::files::services::{FilePreview, FileService};
use crate::shared::types::ErrorResponse;

fn multipart_error(service: &FileService, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return service.too_large_error();
    }

    debug!("Failed to read multipart data: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field. The content is
/// read in chunks and rejected as soon as it exceeds the upload limit, before
/// anything is written to storage.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponseDto),
        (status = 400, description = "Missing file, disallowed type or file too large", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponseDto>> {
    let mut multipart = multipart
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {}", e)))?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&service, e))?
    {
        if field.name() != Some("file") {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let raw_filename = field.file_name().unwrap_or("").to_string();
        FileService::check_filename(&raw_filename)?;

        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(&service, e))?
        {
            if data.len() + chunk.len() > service.max_upload_size() {
                return Err(service.too_large_error());
            }
            data.extend_from_slice(&chunk);
        }

        let response = service.upload(&raw_filename, data.freeze()).await?;
        return Ok(Json(response));
    }

    Err(AppError::Validation("No file part".to_string()))
}

/// Get file metadata by retrieval code
#[utoipa::path(
    get,
    path = "/api/file/{code}",
    tag = "files",
    params(
        ("code" = String, Path, description = "Retrieval code")
    ),
    responses(
        (status = 200, description = "File found", body = FileInfoDto),
        (status = 404, description = "Unknown or expired code", body = ErrorResponse)
    )
)]
pub async fn get_file_info(
    State(service): State<Arc<FileService>>,
    Path(code): Path<String>,
) -> Result<Json<FileInfoDto>> {
    let info = service.get_info(&code).await?;
    Ok(Json(info))
}

/// Download a file by retrieval code
///
/// Streams the content as an attachment named after the original file.
#[utoipa::path(
    get,
    path = "/api/download/{code}",
    tag = "files",
    params(
        ("code" = String, Path, description = "Retrieval code")
    ),
    responses(
        (status = 200, description = "File content as attachment"),
        (status = 404, description = "Unknown or expired code", body = ErrorResponse)
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    Path(code): Path<String>,
) -> Result<Response> {
    let download = service.download(&code).await?;

    let headers = [
        (header::CONTENT_TYPE, download.content_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        ),
        (header::CONTENT_LENGTH, download.size_bytes.to_string()),
    ];

    Ok((headers, Body::from_stream(download.stream)).into_response())
}

/// Preview a file by retrieval code
///
/// Images are returned inline, text and PDF files in a viewer page, other
/// types as a page with a download link.
#[utoipa::path(
    get,
    path = "/api/view/{code}",
    tag = "files",
    params(
        ("code" = String, Path, description = "Retrieval code")
    ),
    responses(
        (status = 200, description = "Image content or HTML preview page"),
        (status = 404, description = "Unknown or expired code", body = ErrorResponse)
    )
)]
pub async fn view_file(
    State(service): State<Arc<FileService>>,
    Path(code): Path<String>,
) -> Result<Response> {
    let response = match service.preview(&code).await? {
        FilePreview::Image { content_type, data } => {
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        FilePreview::Page(html) => Html(html).into_response(),
    };

    Ok(response)
}

/// List the most recent uploads
#[utoipa::path(
    get,
    path = "/api/recent",
    tag = "files",
    responses(
        (status = 200, description = "Up to ten most recent files", body = Vec<RecentFileDto>)
    )
)]
pub async fn list_recent_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<RecentFileDto>>> {
    let files = service.list_recent().await?;
    Ok(Json(files))
}

/// Service statistics
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "files",
    responses(
        (status = 200, description = "Live file count", body = StatsDto)
    )
)]
pub async fn get_stats(State(service): State<Arc<FileService>>) -> Result<Json<StatsDto>> {
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Remove expired files now instead of waiting for the background sweep
#[utoipa::path(
    post,
    path = "/api/maintenance/sweep",
    tag = "files",
    responses(
        (status = 200, description = "Expired files removed", body = SweepResponseDto)
    )
)]
pub async fn sweep_expired(
    State(service): State<Arc<FileService>>,
) -> Result<Json<SweepResponseDto>> {
    let swept = service.sweep_expired().await?;
    Ok(Json(swept))
}

#[cfg(test)]
mod tests {
    use crate::features::files::models::FileRecord;
    use crate::shared::test_helpers::TestContext;
    use crate::shared::validation::RETRIEVAL_CODE_REGEX;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    fn file_form(filename: &str, data: &[u8]) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(data.to_vec())
                .file_name(filename)
                .mime_type("application/octet-stream"),
        )
    }

    #[tokio::test]
    async fn test_upload_info_download_sweep_flow() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let response = server
            .post("/api/upload")
            .multipart(file_form("a.txt", b"0123456789"))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "a.txt");
        let code = body["code"].as_str().unwrap().to_string();
        assert!(RETRIEVAL_CODE_REGEX.is_match(&code));

        let response = server.get(&format!("/api/file/{}", code)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let info = response.json::<Value>();
        assert_eq!(info["filename"], "a.txt");
        assert_eq!(info["size"], "10 Bytes");
        assert!(info["uploadDate"].is_string());
        assert!(info["expireDate"].is_string());

        let response = server.get(&format!("/api/download/{}", code)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.as_bytes().as_ref(), b"0123456789");
        let disposition = response.header("content-disposition");
        assert_eq!(disposition.to_str().unwrap(), "attachment; filename=\"a.txt\"");

        // Sweep as if the retention window had passed
        let record = ctx.registry.get(&code).await.unwrap();
        let removed = ctx
            .registry
            .sweep_expired(record.expires_at + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let response = server.get(&format!("/api/file/{}", code)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert!(response.json::<Value>()["error"].is_string());
        assert_eq!(ctx.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extension() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let response = server
            .post("/api/upload")
            .multipart(file_form("setup.exe", b"MZ"))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({"error": "File type not allowed"}));
        assert_eq!(ctx.registry.stats().await.unwrap().files, 0);
        assert_eq!(ctx.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let ctx = TestContext::with_max_upload_size(1024).await;
        let server = ctx.server();

        let response = server
            .post("/api/upload")
            .multipart(file_form("big.zip", &vec![0u8; 4096]))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("File too large"), "{error}");
        assert_eq!(ctx.registry.stats().await.unwrap().files, 0);
        assert_eq!(ctx.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_route_body_limit_is_too_large() {
        let ctx = TestContext::with_max_upload_size(1024).await;
        let server = ctx.server();

        // A large leading field trips the route body limit before the file
        // field is read, so the per-chunk cap never sees it
        let form = MultipartForm::new()
            .add_text("note", "x".repeat(2 * 1024 * 1024))
            .add_part(
                "file",
                Part::bytes(b"small".to_vec())
                    .file_name("a.txt")
                    .mime_type("text/plain"),
            );
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("File too large"), "{error}");
        assert_eq!(ctx.registry.stats().await.unwrap().files, 0);
        assert_eq!(ctx.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let form = MultipartForm::new().add_text("note", "no file here");
        let response = server.post("/api/upload").multipart(form).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({"error": "No file part"}));

        let response = server
            .post("/api/upload")
            .multipart(file_form("", b"data"))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({"error": "No selected file"}));

        let response = server.post("/api/upload").json(&json!({"file": "x"})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_code_is_404_everywhere() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        for path in [
            "/api/file/FV-00000000",
            "/api/download/FV-00000000",
            "/api/view/FV-00000000",
            "/api/file/not-a-code",
        ] {
            let response = server.get(path).await;
            assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_out_of_band_deletion_is_404() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let body = server
            .post("/api/upload")
            .multipart(file_form("photo.jpg", b"\xff\xd8\xff"))
            .await
            .json::<Value>();
        let code = body["code"].as_str().unwrap().to_string();

        let record = ctx.registry.get(&code).await.unwrap();
        ctx.remove_blob_out_of_band(&record.storage_key);

        let response = server.get(&format!("/api/view/{}", code)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let stats = server.get("/api/stats").await.json::<Value>();
        assert_eq!(stats, json!({"files": 0, "downloads": 0, "users": 0, "countries": 0}));
    }

    #[tokio::test]
    async fn test_view_image_and_text() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let image = server
            .post("/api/upload")
            .multipart(file_form("photo.JPG", b"\xff\xd8\xff"))
            .await
            .json::<Value>();
        let response = server
            .get(&format!("/api/view/{}", image["code"].as_str().unwrap()))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header("content-type"), "image/jpeg");
        assert_eq!(response.as_bytes().as_ref(), b"\xff\xd8\xff");

        let text = server
            .post("/api/upload")
            .multipart(file_form("readme.txt", b"plain words"))
            .await
            .json::<Value>();
        let response = server
            .get(&format!("/api/view/{}", text["code"].as_str().unwrap()))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(response.text().contains("plain words"));
    }

    #[tokio::test]
    async fn test_recent_lists_newest_first_and_caps_at_ten() {
        let ctx = TestContext::new().await;
        let server = ctx.server();
        let now = Utc::now();

        for i in 0..12 {
            let name = format!("f{}.txt", i);
            let record = FileRecord::new(
                uuid::Uuid::new_v4(),
                name.clone(),
                format!("FV-{:08X}", i),
                1,
                now - Duration::minutes(12 - i),
            );
            ctx.blobs
                .put(&record.storage_key, bytes::Bytes::from_static(b"x"))
                .await
                .unwrap();
            assert!(ctx.registry.put(record).await.unwrap());
        }

        let response = server.get("/api/recent").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let recent = response.json::<Vec<Value>>();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0]["filename"], "f11.txt");
        assert_eq!(recent[0]["code"], "FV-0000000B");
        assert_eq!(recent[9]["filename"], "f2.txt");
        assert!(recent[0].get("size").is_none());
    }

    #[tokio::test]
    async fn test_sweep_endpoint() {
        let ctx = TestContext::new().await;
        let server = ctx.server();

        let record = FileRecord::new(
            uuid::Uuid::new_v4(),
            "old.txt".into(),
            "FV-0000000D".into(),
            1,
            Utc::now() - Duration::days(8),
        );
        ctx.blobs
            .put(&record.storage_key, bytes::Bytes::from_static(b"x"))
            .await
            .unwrap();
        ctx.registry.put(record).await.unwrap();

        let response = server.post("/api/maintenance/sweep").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!({"removed": 1}));
        assert_eq!(ctx.blob_count(), 0);
    }
}
