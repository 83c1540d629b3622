mod in_memory_store;
mod object_blob_store;
mod store_factory;

pub use in_memory_store::InMemoryBlobStore;
pub use object_blob_store::ObjectBlobStore;
pub use store_factory::BlobStoreFactory;
