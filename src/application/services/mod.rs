mod scan_scheduler;
mod scan_worker;
mod upload_service;

pub use scan_scheduler::{
    DEFAULT_POLL_INTERVAL, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, MIN_POLL_INTERVAL,
    ScanScheduler, SchedulerConfig, SchedulerError, SchedulerStatus,
};
pub use scan_worker::{MALWARE_DETECTED_REASON, ScanWorker, ScanWorkerError, WorkOutcome};
pub use upload_service::{UploadService, UploadServiceError};
