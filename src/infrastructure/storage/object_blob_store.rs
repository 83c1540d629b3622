use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{BlobStore, BlobStoreError, ByteStream};
use crate::domain::FileId;

/// Blob store backed by any `object_store` implementation (local disk, Azure).
pub struct ObjectBlobStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectBlobStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    pub fn local(base_path: PathBuf) -> Result<Self, BlobStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| BlobStoreError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(fs)))
    }

    pub fn azure(account: &str, access_key: &str, container: &str) -> Result<Self, BlobStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| BlobStoreError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(store)))
    }
}

fn store_path(id: &FileId) -> StorePath {
    StorePath::from(id.as_str())
}

#[async_trait::async_trait]
impl BlobStore for ObjectBlobStore {
    async fn upload(&self, id: &FileId, mut stream: ByteStream<'_>) -> Result<u64, BlobStoreError> {
        let mut upload = self
            .inner
            .put_multipart(&store_path(id))
            .await
            .map_err(|e| BlobStoreError::UploadFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(BlobStoreError::Io(e));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(BlobStoreError::UploadFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| BlobStoreError::UploadFailed(e.to_string()))?;

        Ok(total_bytes)
    }

    async fn download(&self, id: &FileId) -> Result<ByteStream<'static>, BlobStoreError> {
        let result = self
            .inner
            .get(&store_path(id))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => BlobStoreError::NotFound(id.to_string()),
                other => BlobStoreError::DownloadFailed(other.to_string()),
            })?;

        Ok(result.into_stream().map_err(io::Error::other).boxed())
    }

    async fn delete(&self, id: &FileId) -> Result<(), BlobStoreError> {
        self.inner
            .delete(&store_path(id))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => BlobStoreError::NotFound(id.to_string()),
                other => BlobStoreError::DeleteFailed(other.to_string()),
            })
    }
}
