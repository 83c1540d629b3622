mod blob_store;
mod job_repository;
mod metrics_collector;
mod repository_error;
mod scan_checker;

pub use blob_store::{BlobStore, BlobStoreError, ByteStream};
pub use job_repository::JobRepository;
pub use metrics_collector::{MetricsCollector, ScanOutcome, UploadOutcome};
pub use repository_error::RepositoryError;
pub use scan_checker::{ScanChecker, ScanCheckerError, ScanVerdict};
