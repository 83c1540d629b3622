use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{FileId, JobId, JobStatus, JobVersion, UploadJob, UserId};

const SELECT_COLUMNS: &str =
    "SELECT id, created_by, file_id, filename, status, error, created_at, updated_at FROM upload_jobs";

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: &PgRow) -> Result<UploadJob, RepositoryError> {
    let status: String = row.try_get("status").map_err(invalid_record)?;
    let status = status
        .parse::<JobStatus>()
        .map_err(RepositoryError::InvalidRecord)?;
    let id: Uuid = row.try_get("id").map_err(invalid_record)?;
    let created_by: String = row.try_get("created_by").map_err(invalid_record)?;
    let file_id: Option<String> = row.try_get("file_id").map_err(invalid_record)?;

    Ok(UploadJob {
        id: JobId::from_uuid(id),
        created_by: UserId::new(created_by),
        file_id: file_id.map(FileId::from_raw),
        filename: row.try_get("filename").map_err(invalid_record)?,
        status,
        error: row.try_get("error").map_err(invalid_record)?,
        created_at: row.try_get("created_at").map_err(invalid_record)?,
        updated_at: row.try_get("updated_at").map_err(invalid_record)?,
    })
}

fn invalid_record(e: sqlx::Error) -> RepositoryError {
    RepositoryError::InvalidRecord(e.to_string())
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return RepositoryError::ConstraintViolation(db.to_string());
        }
    }
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(e.to_string())
        }
        _ => RepositoryError::QueryFailed(e.to_string()),
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &UploadJob) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO upload_jobs (id, created_by, file_id, filename, status, error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.created_by.as_str())
        .bind(job.file_id.as_ref().map(|id| id.as_str()))
        .bind(job.filename.as_deref())
        .bind(job.status.as_str())
        .bind(job.error.as_deref())
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get(&self, id: JobId) -> Result<Option<UploadJob>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, status = %job.status))]
    async fn update(&self, job: &UploadJob) -> Result<(), RepositoryError> {
        // Zero affected rows means the job is gone; that is not an error.
        sqlx::query(
            r#"
            UPDATE upload_jobs
            SET file_id = $1, filename = $2, status = $3, error = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(job.file_id.as_ref().map(|id| id.as_str()))
        .bind(job.filename.as_deref())
        .bind(job.status.as_str())
        .bind(job.error.as_deref())
        .bind(job.updated_at)
        .bind(job.id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, status = %job.status, expected = %expected.status))]
    async fn update_if(
        &self,
        job: &UploadJob,
        expected: JobVersion,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE upload_jobs
            SET file_id = $1, filename = $2, status = $3, error = $4, updated_at = $5
            WHERE id = $6 AND status = $7 AND updated_at = $8
            "#,
        )
        .bind(job.file_id.as_ref().map(|id| id.as_str()))
        .bind(job.filename.as_deref())
        .bind(job.status.as_str())
        .bind(job.error.as_deref())
        .bind(job.updated_at)
        .bind(job.id.as_uuid())
        .bind(expected.status.as_str())
        .bind(expected.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn get_by_status(&self, status: JobStatus) -> Result<Vec<UploadJob>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE status = $1"))
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed)?;

        rows.iter().map(job_from_row).collect()
    }

    #[instrument(skip(self), fields(file_id = %file_id))]
    async fn get_by_file_id(
        &self,
        file_id: &FileId,
    ) -> Result<Option<UploadJob>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE file_id = $1"))
            .bind(file_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.as_ref().map(job_from_row).transpose()
    }
}
