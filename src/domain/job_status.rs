use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Uploading,
    ScanPending,
    Scanning,
    Completed,
    Failed,
    Deleted,
}

/// Something that happened to an upload job and may move its status forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    UploadStarted,
    ContentStored,
    UploadFailed,
    ScanStarted,
    ScanClean,
    ScanFailed,
    DeleteRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid transition from {from} on {event:?}")]
    InvalidTransition { from: JobStatus, event: JobEvent },
    #[error("job has no file attached")]
    MissingFileId,
    #[error("job already has file {0} attached")]
    FileIdAlreadySet(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Uploading => "UPLOADING",
            JobStatus::ScanPending => "SCAN_PENDING",
            JobStatus::Scanning => "SCANNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Deleted => "DELETED",
        }
    }

    /// Terminal statuses are never touched by the scheduler again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Deleted
        )
    }

    pub fn transition(self, event: JobEvent) -> Result<JobStatus, TransitionError> {
        let next = match (self, event) {
            (JobStatus::Pending | JobStatus::Uploading, JobEvent::UploadStarted) => {
                JobStatus::Uploading
            }
            (JobStatus::Pending | JobStatus::Uploading, JobEvent::ContentStored) => {
                JobStatus::ScanPending
            }
            (JobStatus::Pending | JobStatus::Uploading, JobEvent::UploadFailed) => {
                JobStatus::Failed
            }
            // Scanning -> Scanning is the stuck-job re-dispatch.
            (JobStatus::ScanPending | JobStatus::Scanning, JobEvent::ScanStarted) => {
                JobStatus::Scanning
            }
            (JobStatus::Scanning, JobEvent::ScanClean) => JobStatus::Completed,
            (JobStatus::Scanning, JobEvent::ScanFailed) => JobStatus::Failed,
            (JobStatus::Completed | JobStatus::Failed, JobEvent::DeleteRequested) => {
                JobStatus::Deleted
            }
            (from, event) => return Err(TransitionError::InvalidTransition { from, event }),
        };
        Ok(next)
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(JobStatus::Pending),
            "UPLOADING" => Ok(JobStatus::Uploading),
            "SCAN_PENDING" => Ok(JobStatus::ScanPending),
            "SCANNING" => Ok(JobStatus::Scanning),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            "DELETED" => Ok(JobStatus::Deleted),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
