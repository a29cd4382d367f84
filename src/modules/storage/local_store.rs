use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{BlobStore, BlobStream};

/// Local file system blob store, one flat file per storage key
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create the store, creating the upload directory if needed
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.upload_dir).await?;

        debug!("Local blob store ready at {:?}", config.upload_dir);

        Ok(Self {
            base_path: config.upload_dir.clone(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a storage key to a path inside the base directory
    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let invalid = key.is_empty()
            || key.contains(['/', '\\'])
            || key == "."
            || key == "..";

        if invalid {
            return Err(AppError::Internal(format!("Invalid storage key '{}'", key)));
        }

        Ok(self.base_path.join(key))
    }
}

fn not_found_or_storage(key: &str, e: std::io::Error) -> AppError {
    if e.kind() == ErrorKind::NotFound {
        AppError::NotFound(format!("Blob not found: {}", key))
    } else {
        AppError::Storage(e)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let full_path = self.full_path(key)?;

        let written = async {
            let mut file = fs::File::create(&full_path).await?;
            file.write_all(&data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Never leave a truncated blob behind
            if let Err(cleanup) = fs::remove_file(&full_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove partial blob {:?}: {}", full_path, cleanup);
                }
            }
            return Err(AppError::Storage(e));
        }

        debug!("Saved blob {:?} ({} bytes)", full_path, data.len());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        let full_path = self.full_path(key)?;

        let data = fs::read(&full_path)
            .await
            .map_err(|e| not_found_or_storage(key, e))?;

        Ok(Bytes::from(data))
    }

    async fn open(&self, key: &str) -> Result<BlobStream> {
        let full_path = self.full_path(key)?;

        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| not_found_or_storage(key, e))?;

        Ok(ReaderStream::new(file).boxed())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_path = self.full_path(key)?;
        Ok(fs::try_exists(&full_path).await?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!("Deleted blob {:?}", full_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}
