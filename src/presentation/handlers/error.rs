use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::BlobStoreError;
use crate::application::services::UploadServiceError;

use super::upload_jobs::JobResponse;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub struct ApiError(pub UploadServiceError);

impl From<UploadServiceError> for ApiError {
    fn from(e: UploadServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            UploadServiceError::JobNotFound(_) | UploadServiceError::FileNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            UploadServiceError::BlobStore(BlobStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            UploadServiceError::Forbidden => StatusCode::FORBIDDEN,
            UploadServiceError::NotReady(_)
            | UploadServiceError::Conflict(_)
            | UploadServiceError::StaleJob(_) => StatusCode::CONFLICT,
            UploadServiceError::StoreFailed { job, .. } => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(JobResponse::from(job.as_ref())),
                )
                    .into_response();
            }
            UploadServiceError::Repository(_) | UploadServiceError::BlobStore(_) => {
                tracing::error!(error = %self.0, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        error_response(status, self.0.to_string())
    }
}
