use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::domain::FileId;
use crate::presentation::state::AppState;

use super::auth::CurrentUser;
use super::error::ApiError;

fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[tracing::instrument(skip(state))]
pub async fn download_file_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(file_id): Path<String>,
) -> Response {
    let file_id = FileId::from_raw(file_id);

    match state.upload_service.download(&user, &file_id).await {
        Ok((job, stream)) => {
            let filename = job
                .filename
                .clone()
                .unwrap_or_else(|| file_id.to_string());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (header::CONTENT_DISPOSITION, content_disposition(&filename)),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_file_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(file_id): Path<String>,
) -> Response {
    let file_id = FileId::from_raw(file_id);

    match state.upload_service.delete(&user, &file_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
