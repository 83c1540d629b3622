use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub scheduler: &'static str,
}

/// Reports `degraded` with 503 while the scan scheduler is not running, since
/// uploads would then never leave `VIRUS_CHECKING`.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (code, status, scheduler) = if state.scheduler_status.is_running() {
        (StatusCode::OK, "healthy", "running")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "stopped")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            scheduler,
        }),
    )
}
