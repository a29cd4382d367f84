use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::upload_file,
        files_handlers::get_file_info,
        files_handlers::download_file,
        files_handlers::view_file,
        files_handlers::list_recent_files,
        files_handlers::get_stats,
        files_handlers::sweep_expired,
    ),
    components(
        schemas(
            ErrorResponse,
            files_dtos::UploadFileDto,
            files_dtos::UploadResponseDto,
            files_dtos::FileInfoDto,
            files_dtos::RecentFileDto,
            files_dtos::StatsDto,
            files_dtos::SweepResponseDto,
        )
    ),
    tags(
        (name = "files", description = "File drop-off and retrieval by code"),
    ),
    info(
        title = "Filedrop API",
        version = "0.1.0",
        description = "Upload a file, share the retrieval code",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
