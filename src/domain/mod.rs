mod file_id;
mod job;
mod job_id;
mod job_status;
mod user_id;

pub use file_id::FileId;
pub use job::{JobVersion, UploadJob};
pub use job_id::JobId;
pub use job_status::{JobEvent, JobStatus, TransitionError};
pub use user_id::UserId;
