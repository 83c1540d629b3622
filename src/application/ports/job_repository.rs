use async_trait::async_trait;

use crate::domain::{FileId, JobId, JobStatus, JobVersion, UploadJob};

use super::RepositoryError;

/// Persistence for upload jobs.
///
/// Implementations synchronize concurrent access themselves; the scheduler and
/// its workers share one instance.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &UploadJob) -> Result<(), RepositoryError>;

    async fn get(&self, id: JobId) -> Result<Option<UploadJob>, RepositoryError>;

    /// Overwrites the stored record. Updating an id that is not stored is a
    /// no-op, not an error.
    async fn update(&self, job: &UploadJob) -> Result<(), RepositoryError>;

    /// Overwrites the stored record only while it still matches `expected`.
    /// Returns `false`, writing nothing, when the job changed underneath the
    /// caller or is gone.
    async fn update_if(
        &self,
        job: &UploadJob,
        expected: JobVersion,
    ) -> Result<bool, RepositoryError>;

    async fn get_by_status(&self, status: JobStatus) -> Result<Vec<UploadJob>, RepositoryError>;

    async fn get_by_file_id(
        &self,
        file_id: &FileId,
    ) -> Result<Option<UploadJob>, RepositoryError>;
}
