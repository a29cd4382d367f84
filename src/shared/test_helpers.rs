#[cfg(test)]
use crate::core::config::StorageConfig;
#[cfg(test)]
use crate::features::files::{
    routes as files_routes, CodeGenerator, FileService, InMemoryRecordStore, Registry,
};
#[cfg(test)]
use crate::modules::storage::{BlobStore, LocalBlobStore};
#[cfg(test)]
use crate::shared::constants::DEFAULT_MAX_UPLOAD_SIZE;
#[cfg(test)]
use std::sync::Arc;

/// Registry, blob store and service wired over a temporary upload directory
#[cfg(test)]
pub struct TestContext {
    _dir: tempfile::TempDir,
    pub upload_dir: std::path::PathBuf,
    pub blobs: Arc<dyn BlobStore>,
    pub registry: Arc<Registry>,
    pub service: Arc<FileService>,
}

#[cfg(test)]
impl TestContext {
    pub async fn new() -> Self {
        Self::with_max_upload_size(DEFAULT_MAX_UPLOAD_SIZE).await
    }

    pub async fn with_max_upload_size(max_upload_size: usize) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let upload_dir = dir.path().join("uploads");

        let blobs: Arc<dyn BlobStore> = Arc::new(
            LocalBlobStore::new(&StorageConfig {
                upload_dir: upload_dir.clone(),
            })
            .await
            .expect("Failed to create blob store"),
        );
        let registry = Arc::new(Registry::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::clone(&blobs),
        ));
        let service = Arc::new(FileService::new(
            Arc::clone(&registry),
            Arc::clone(&blobs),
            CodeGenerator::default(),
            max_upload_size,
        ));

        Self {
            _dir: dir,
            upload_dir,
            blobs,
            registry,
            service,
        }
    }

    /// Delete a blob behind the registry's back
    pub fn remove_blob_out_of_band(&self, storage_key: &str) {
        std::fs::remove_file(self.upload_dir.join(storage_key)).expect("Failed to remove blob");
    }

    /// Number of blobs currently on disk
    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .expect("Failed to read upload dir")
            .count()
    }

    /// HTTP test server over the file routes
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::new(files_routes(Arc::clone(&self.service)))
            .expect("Failed to create test server")
    }
}
