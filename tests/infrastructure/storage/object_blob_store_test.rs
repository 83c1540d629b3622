use std::io;

use bytes::Bytes;
use futures::{TryStreamExt, stream};

use filegate::application::ports::{BlobStore, BlobStoreError};
use filegate::domain::FileId;
use filegate::infrastructure::storage::ObjectBlobStore;

fn create_test_store() -> (tempfile::TempDir, ObjectBlobStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = ObjectBlobStore::local(dir.path().to_path_buf()).unwrap();
    (dir, store)
}

async fn read_all(store: &ObjectBlobStore, id: &FileId) -> Vec<u8> {
    let chunks: Vec<Bytes> = store
        .download(id)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    chunks.concat()
}

#[tokio::test]
async fn given_valid_stream_when_uploading_then_size_is_reported() {
    let (_dir, store) = create_test_store();
    let id = FileId::new();

    let chunks = vec![Ok(Bytes::from("hello ")), Ok(Bytes::from("world"))];
    let byte_stream = Box::pin(stream::iter(chunks));

    let size = store.upload(&id, byte_stream).await.unwrap();
    assert_eq!(size, 11);
}

#[tokio::test]
async fn given_uploaded_file_when_downloading_then_bytes_match_original() {
    let (_dir, store) = create_test_store();
    let id = FileId::new();

    let content = b"test content";
    let byte_stream = Box::pin(stream::iter(vec![Ok(Bytes::from(&content[..]))]));
    store.upload(&id, byte_stream).await.unwrap();

    assert_eq!(read_all(&store, &id).await, content);
}

#[tokio::test]
async fn given_stream_with_empty_chunks_when_uploading_then_they_are_skipped() {
    let (_dir, store) = create_test_store();
    let id = FileId::new();

    let chunks = vec![
        Ok(Bytes::new()),
        Ok(Bytes::from("abc")),
        Ok(Bytes::new()),
        Ok(Bytes::from("def")),
    ];
    let size = store
        .upload(&id, Box::pin(stream::iter(chunks)))
        .await
        .unwrap();

    assert_eq!(size, 6);
    assert_eq!(read_all(&store, &id).await, b"abcdef");
}

#[tokio::test]
async fn given_uploaded_file_when_deleting_then_download_returns_not_found() {
    let (_dir, store) = create_test_store();
    let id = FileId::new();

    let byte_stream = Box::pin(stream::iter(vec![Ok(Bytes::from("data"))]));
    store.upload(&id, byte_stream).await.unwrap();

    store.delete(&id).await.unwrap();

    let result = store.download(&id).await;
    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_stream_error_when_uploading_then_returns_error() {
    let (_dir, store) = create_test_store();
    let id = FileId::new();

    let chunks: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from("partial")),
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "network drop",
        )),
    ];
    let byte_stream = Box::pin(stream::iter(chunks));

    let result = store.upload(&id, byte_stream).await;
    assert!(matches!(result, Err(BlobStoreError::Io(_))));
    assert!(store.download(&id).await.is_err());
}

#[tokio::test]
async fn given_nonexistent_file_when_downloading_then_returns_not_found() {
    let (_dir, store) = create_test_store();

    let result = store.download(&FileId::new()).await;
    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}
