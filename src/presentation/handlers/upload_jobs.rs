use std::io;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{JobId, JobStatus, UploadJob};
use crate::presentation::state::AppState;

use super::auth::CurrentUser;
use super::error::{ApiError, error_response};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Clients see both scan stages as one `VIRUS_CHECKING` status.
fn api_status(status: JobStatus) -> &'static str {
    match status {
        JobStatus::ScanPending | JobStatus::Scanning => "VIRUS_CHECKING",
        other => other.as_str(),
    }
}

impl From<&UploadJob> for JobResponse {
    fn from(job: &UploadJob) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: api_status(job.status),
            file_id: job.file_id.as_ref().map(|id| id.to_string()),
            filename: job.filename.clone(),
            error: job.error.clone(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, Response> {
    Uuid::parse_str(raw)
        .map(JobId::from_uuid)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", raw)))
}

#[tracing::instrument(skip(state))]
pub async fn create_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    match state.upload_service.create_job(&user).await {
        Ok(job) => (StatusCode::CREATED, Json(JobResponse::from(&job))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.upload_service.get_job(&user, job_id).await {
        Ok(job) => {
            let body = Json(JobResponse::from(&job));
            match (&job.status, &job.file_id) {
                (JobStatus::Completed, Some(file_id)) => (
                    StatusCode::OK,
                    [(header::LOCATION, format!("/api/files/{}", file_id))],
                    body,
                )
                    .into_response(),
                _ => (StatusCode::OK, body).into_response(),
            }
        }
        Err(e) => ApiError(e).into_response(),
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let job_id = match parse_job_id(&job_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Upload request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file provided");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        tracing::debug!(filename = ?filename, "Receiving file content");

        let stream = field.map_err(io::Error::other).boxed();
        return match state
            .upload_service
            .upload(&user, job_id, filename, stream)
            .await
        {
            Ok(job) => (StatusCode::CREATED, Json(JobResponse::from(&job))).into_response(),
            Err(e) => ApiError(e).into_response(),
        };
    }
}
