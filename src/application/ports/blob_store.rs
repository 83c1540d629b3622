use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::FileId;

pub type ByteStream<'a> = BoxStream<'a, Result<Bytes, io::Error>>;

/// Binary storage for uploaded content. Streams handed out by `download` are
/// released when dropped.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, id: &FileId, stream: ByteStream<'_>) -> Result<u64, BlobStoreError>;

    async fn download(&self, id: &FileId) -> Result<ByteStream<'static>, BlobStoreError>;

    async fn delete(&self, id: &FileId) -> Result<(), BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
