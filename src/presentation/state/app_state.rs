use std::sync::Arc;

use crate::application::services::{SchedulerStatus, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub scheduler_status: SchedulerStatus,
    pub max_upload_bytes: usize,
}
