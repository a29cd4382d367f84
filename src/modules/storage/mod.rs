//! Storage module for uploaded file content
//!
//! Provides the `BlobStore` abstraction and a local-directory implementation.
//! Blobs are addressed by an opaque storage key chosen by the caller.

mod local_store;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::core::error::Result;

pub use local_store::LocalBlobStore;

/// Chunked blob content, suitable for streaming into a response body
pub type BlobStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Content storage keyed by storage key
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing nothing: keys are unique per upload
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Read the whole blob into memory
    async fn read(&self, key: &str) -> Result<Bytes>;

    /// Open the blob for streaming
    async fn open(&self, key: &str) -> Result<BlobStream>;

    /// Check whether the blob is present
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete the blob; deleting a missing blob is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}
