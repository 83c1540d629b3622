mod auth;
mod error;
mod files;
mod health;
mod upload_jobs;

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use error::{ApiError, ErrorResponse};
pub use files::{delete_file_handler, download_file_handler};
pub use health::health_handler;
pub use upload_jobs::{
    JobResponse, create_job_handler, job_status_handler, upload_file_handler,
};
