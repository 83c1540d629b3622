use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream};
use tokio::sync::RwLock;

use crate::application::ports::{BlobStore, BlobStoreError, ByteStream};
use crate::domain::FileId;

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<FileId, Bytes>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: FileId, content: impl Into<Bytes>) {
        self.blobs.write().await.insert(id, content.into());
    }

    pub async fn contains(&self, id: &FileId) -> bool {
        self.blobs.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, id: &FileId, mut stream: ByteStream<'_>) -> Result<u64, BlobStoreError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        let size = buffer.len() as u64;
        self.blobs.write().await.insert(id.clone(), buffer.freeze());
        Ok(size)
    }

    async fn download(&self, id: &FileId) -> Result<ByteStream<'static>, BlobStoreError> {
        let content = self
            .blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(id.to_string()))?;
        Ok(stream::once(async move { Ok(content) }).boxed())
    }

    async fn delete(&self, id: &FileId) -> Result<(), BlobStoreError> {
        self.blobs
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::NotFound(id.to_string()))
    }
}
