use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    download_file, get_file_info, get_stats, list_recent_files, sweep_expired, upload_file,
    view_file,
};
use crate::features::files::services::FileService;

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    let body_limit = file_service.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/file/{code}", get(get_file_info))
        .route("/api/download/{code}", get(download_file))
        .route("/api/view/{code}", get(view_file))
        .route("/api/recent", get(list_recent_files))
        .route("/api/stats", get(get_stats))
        .route("/api/maintenance/sweep", post(sweep_expired))
        .with_state(file_service)
}
