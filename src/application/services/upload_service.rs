use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::{
    BlobStore, BlobStoreError, ByteStream, JobRepository, MetricsCollector, RepositoryError,
    UploadOutcome,
};
use crate::domain::{FileId, JobId, JobStatus, TransitionError, UploadJob, UserId};

/// The request-facing side of the job lifecycle: creating jobs, accepting
/// content, serving clean files and deleting them.
pub struct UploadService {
    job_repository: Arc<dyn JobRepository>,
    blob_store: Arc<dyn BlobStore>,
    metrics: Arc<dyn MetricsCollector>,
}

impl UploadService {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        blob_store: Arc<dyn BlobStore>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        Self {
            job_repository,
            blob_store,
            metrics,
        }
    }

    #[tracing::instrument(skip(self), fields(user_id = %user))]
    pub async fn create_job(&self, user: &UserId) -> Result<UploadJob, UploadServiceError> {
        let job = UploadJob::new(user.clone());
        self.job_repository.create(&job).await?;
        tracing::info!(job_id = %job.id, "Upload job created");
        Ok(job)
    }

    pub async fn get_job(
        &self,
        user: &UserId,
        job_id: JobId,
    ) -> Result<UploadJob, UploadServiceError> {
        let job = self
            .job_repository
            .get(job_id)
            .await?
            .ok_or_else(|| UploadServiceError::JobNotFound(job_id.to_string()))?;
        ensure_owner(user, &job)?;
        Ok(job)
    }

    /// Stores the job's content and queues it for scanning.
    ///
    /// Both the claim and the hand-off to scanning are conditional writes, so
    /// of two concurrent uploads to one job only the first to claim it wins;
    /// the other gets [`UploadServiceError::StaleJob`] and its blob is removed.
    /// A blob store failure fails the job; the failed job is carried in the
    /// returned error.
    #[tracing::instrument(skip(self, stream), fields(user_id = %user, job_id = %job_id))]
    pub async fn upload(
        &self,
        user: &UserId,
        job_id: JobId,
        filename: Option<String>,
        stream: ByteStream<'_>,
    ) -> Result<UploadJob, UploadServiceError> {
        let mut job = self.get_job(user, job_id).await?;
        let read = job.version();
        job.start_upload()?;
        if !self.job_repository.update_if(&job, read).await? {
            return Err(UploadServiceError::StaleJob(job_id));
        }

        let started = Instant::now();
        let file_id = FileId::new();
        let claimed = job.version();

        match self.blob_store.upload(&file_id, stream).await {
            Ok(size) => {
                self.metrics
                    .record_upload_duration(UploadOutcome::Success, started.elapsed());
                self.metrics.record_upload_size(size);

                job.mark_uploaded(file_id.clone(), filename)?;
                let queued = match self.job_repository.update_if(&job, claimed).await {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        tracing::warn!(file_id = %file_id, "Job changed while its content was stored");
                        Err(UploadServiceError::StaleJob(job_id))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, file_id = %file_id, "Failed to queue stored file for scanning");
                        Err(e.into())
                    }
                };
                if let Err(e) = queued {
                    self.remove_orphan(&file_id).await;
                    return Err(e);
                }

                tracing::info!(file_id = %file_id, bytes = size, "File stored, awaiting scan");
                Ok(job)
            }
            Err(e) => {
                self.metrics
                    .record_upload_duration(UploadOutcome::Error, started.elapsed());
                tracing::error!(error = %e, "Failed to store uploaded file");

                job.fail(e.to_string())?;
                match self.job_repository.update_if(&job, claimed).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!("Job changed while its content was stored; failure not recorded")
                    }
                    Err(update_err) => {
                        tracing::error!(error = %update_err, "Failed to record upload failure")
                    }
                }
                Err(UploadServiceError::StoreFailed {
                    job: Box::new(job),
                    source: e,
                })
            }
        }
    }

    /// Opens a clean file for download. Only `Completed` jobs are served.
    pub async fn download(
        &self,
        user: &UserId,
        file_id: &FileId,
    ) -> Result<(UploadJob, ByteStream<'static>), UploadServiceError> {
        let job = self.job_for_file(user, file_id).await?;
        if job.status != JobStatus::Completed {
            return Err(UploadServiceError::NotReady(job.status));
        }

        let stream = self.blob_store.download(file_id).await?;
        Ok((job, stream))
    }

    /// Marks the job `Deleted`, then removes its blob.
    #[tracing::instrument(skip(self), fields(user_id = %user, file_id = %file_id))]
    pub async fn delete(&self, user: &UserId, file_id: &FileId) -> Result<(), UploadServiceError> {
        let mut job = self.job_for_file(user, file_id).await?;
        let read = job.version();
        job.mark_deleted()?;
        if !self.job_repository.update_if(&job, read).await? {
            return Err(UploadServiceError::StaleJob(job.id));
        }

        match self.blob_store.delete(file_id).await {
            Ok(()) => {}
            Err(BlobStoreError::NotFound(_)) => {
                tracing::warn!("Blob already absent while deleting file");
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(job_id = %job.id, "File deleted");
        Ok(())
    }

    async fn remove_orphan(&self, file_id: &FileId) {
        if let Err(e) = self.blob_store.delete(file_id).await {
            tracing::warn!(error = %e, file_id = %file_id, "Failed to remove orphaned blob");
        }
    }

    async fn job_for_file(
        &self,
        user: &UserId,
        file_id: &FileId,
    ) -> Result<UploadJob, UploadServiceError> {
        let job = self
            .job_repository
            .get_by_file_id(file_id)
            .await?
            .ok_or_else(|| UploadServiceError::FileNotFound(file_id.to_string()))?;
        ensure_owner(user, &job)?;
        Ok(job)
    }
}

fn ensure_owner(user: &UserId, job: &UploadJob) -> Result<(), UploadServiceError> {
    if job.created_by != *user {
        return Err(UploadServiceError::Forbidden);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadServiceError {
    #[error("upload job not found: {0}")]
    JobNotFound(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("access denied: job belongs to a different user")]
    Forbidden,
    #[error("file is not available: job is {0}")]
    NotReady(JobStatus),
    #[error("{0}")]
    Conflict(#[from] TransitionError),
    #[error("job {0} was changed by another request")]
    StaleJob(JobId),
    #[error("failed to store file: {source}")]
    StoreFailed {
        job: Box<UploadJob>,
        #[source]
        source: BlobStoreError,
    },
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("blob store: {0}")]
    BlobStore(#[from] BlobStoreError),
}
