use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::application::ports::{
    BlobStore, BlobStoreError, JobRepository, MetricsCollector, RepositoryError, ScanChecker,
    ScanCheckerError, ScanOutcome, ScanVerdict,
};
use crate::domain::{FileId, JobStatus, JobVersion, TransitionError, UploadJob};

/// Failure reason recorded on infected uploads. Checker detail is never exposed.
pub const MALWARE_DETECTED_REASON: &str = "file contains malware";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The job reached a terminal status and it was persisted.
    Finished(JobStatus),
    /// The stored job no longer qualifies for scanning, e.g. a duplicate
    /// dispatch of a job another worker already took.
    Skipped(JobStatus),
    /// The job vanished from the store between discovery and processing.
    Missing,
}

/// Per-job scanning logic: fetch the blob, run the checker, record the verdict.
///
/// Safe to run more than once for the same job; the stored record is re-read
/// before every attempt and every write is conditional on it, so stale queue
/// entries never overwrite a newer status.
#[derive(Clone)]
pub struct ScanWorker {
    job_repository: Arc<dyn JobRepository>,
    blob_store: Arc<dyn BlobStore>,
    scan_checker: Arc<dyn ScanChecker>,
    metrics: Arc<dyn MetricsCollector>,
    stuck_job_timeout: Duration,
}

impl ScanWorker {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        blob_store: Arc<dyn BlobStore>,
        scan_checker: Arc<dyn ScanChecker>,
        metrics: Arc<dyn MetricsCollector>,
        stuck_job_timeout: Duration,
    ) -> Self {
        Self {
            job_repository,
            blob_store,
            scan_checker,
            metrics,
            stuck_job_timeout,
        }
    }

    pub async fn process(&self, queued: UploadJob) -> Result<WorkOutcome, ScanWorkerError> {
        let Some(mut job) = self.job_repository.get(queued.id).await? else {
            tracing::warn!("Queued job no longer exists");
            return Ok(WorkOutcome::Missing);
        };

        if !self.is_dispatchable(&job) {
            tracing::debug!(
                status = %job.status,
                "Skipping job that no longer qualifies for scanning"
            );
            return Ok(WorkOutcome::Skipped(job.status));
        }

        let started = Instant::now();

        let read = job.version();
        let file_id = job.start_scan()?;
        if !self.persist(&job, read).await? {
            tracing::debug!("Another worker claimed the job first");
            return Ok(WorkOutcome::Skipped(read.status));
        }
        tracing::debug!(file_id = %file_id, "Scan started");
        let leased = job.version();

        let outcome = match self.inspect(&file_id).await {
            Ok(ScanVerdict::Clean) => {
                job.complete()?;
                tracing::info!("File is clean");
                ScanOutcome::Success
            }
            Ok(ScanVerdict::Infected) => {
                job.fail(MALWARE_DETECTED_REASON)?;
                tracing::warn!("Malware detected");
                ScanOutcome::VirusDetected
            }
            Err(e) => {
                tracing::error!(error = %e, "Scan attempt failed");
                job.fail(e.to_string())?;
                ScanOutcome::Error
            }
        };
        self.metrics.record_scan_duration(outcome, started.elapsed());

        if !self.persist(&job, leased).await? {
            tracing::warn!(
                status = %job.status,
                "Lease lost before the verdict was stored; leaving the job to its new owner"
            );
            return Ok(WorkOutcome::Skipped(JobStatus::Scanning));
        }
        Ok(WorkOutcome::Finished(job.status))
    }

    fn is_dispatchable(&self, job: &UploadJob) -> bool {
        match job.status {
            JobStatus::ScanPending => true,
            JobStatus::Scanning => job.is_stuck(Utc::now(), self.stuck_job_timeout),
            _ => false,
        }
    }

    async fn inspect(&self, file_id: &FileId) -> Result<ScanVerdict, ScanFailure> {
        let content = self
            .blob_store
            .download(file_id)
            .await
            .map_err(ScanFailure::Download)?;

        self.scan_checker
            .check(content)
            .await
            .map_err(ScanFailure::Check)
    }

    /// Writes `job` if the stored record still matches `expected`.
    async fn persist(
        &self,
        job: &UploadJob,
        expected: JobVersion,
    ) -> Result<bool, ScanWorkerError> {
        tracing::debug!(status = %job.status, "Job status transition");
        self.job_repository
            .update_if(job, expected)
            .await
            .map_err(ScanWorkerError::Repository)
    }
}

#[derive(Debug, thiserror::Error)]
enum ScanFailure {
    #[error("failed to download file: {0}")]
    Download(BlobStoreError),
    #[error("virus check failed: {0}")]
    Check(ScanCheckerError),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanWorkerError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("transition: {0}")]
    Transition(#[from] TransitionError),
}
