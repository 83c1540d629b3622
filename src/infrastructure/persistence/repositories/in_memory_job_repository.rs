use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{FileId, JobId, JobStatus, JobVersion, UploadJob};

/// Process-local job store, used for development and tests.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, UploadJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &UploadJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<UploadJob>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn update(&self, job: &UploadJob) -> Result<(), RepositoryError> {
        if let Some(stored) = self.jobs.write().await.get_mut(&job.id) {
            *stored = job.clone();
        }
        Ok(())
    }

    async fn update_if(
        &self,
        job: &UploadJob,
        expected: JobVersion,
    ) -> Result<bool, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job.id) {
            Some(stored) if stored.version() == expected => {
                *stored = job.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_by_status(&self, status: JobStatus) -> Result<Vec<UploadJob>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }

    async fn get_by_file_id(
        &self,
        file_id: &FileId,
    ) -> Result<Option<UploadJob>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .find(|job| job.file_id.as_ref() == Some(file_id))
            .cloned())
    }
}
