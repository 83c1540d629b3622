use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};

use super::{FileId, JobEvent, JobId, JobStatus, TransitionError, UserId};

const UNKNOWN_FAILURE: &str = "unknown error";

/// One uploaded file's way from upload through malware screening.
///
/// Status changes go through the event methods below, which apply the
/// transition table in [`JobStatus::transition`] and refresh `updated_at`.
/// `file_id` and `error` are only ever set alongside the matching transition.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadJob {
    pub id: JobId,
    pub created_by: UserId,
    pub file_id: Option<FileId>,
    pub filename: Option<String>,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The part of a stored job a conditional update compares against: the job
/// must still have this status and this `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobVersion {
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

impl UploadJob {
    pub fn new(created_by: UserId) -> Self {
        let now = now();
        Self {
            id: JobId::new(),
            created_by,
            file_id: None,
            filename: None,
            status: JobStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start_upload(&mut self) -> Result<(), TransitionError> {
        self.apply(JobEvent::UploadStarted)
    }

    pub fn mark_uploaded(
        &mut self,
        file_id: FileId,
        filename: Option<String>,
    ) -> Result<(), TransitionError> {
        if let Some(existing) = &self.file_id {
            if *existing != file_id {
                return Err(TransitionError::FileIdAlreadySet(existing.to_string()));
            }
        }
        self.apply(JobEvent::ContentStored)?;
        self.file_id = Some(file_id);
        if filename.is_some() {
            self.filename = filename;
        }
        Ok(())
    }

    /// Moves the job into `Scanning` and hands back the blob to inspect.
    pub fn start_scan(&mut self) -> Result<FileId, TransitionError> {
        let file_id = self.file_id.clone().ok_or(TransitionError::MissingFileId)?;
        self.apply(JobEvent::ScanStarted)?;
        Ok(file_id)
    }

    pub fn complete(&mut self) -> Result<(), TransitionError> {
        self.apply(JobEvent::ScanClean)
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        let event = match self.status {
            JobStatus::Scanning => JobEvent::ScanFailed,
            _ => JobEvent::UploadFailed,
        };
        self.apply(event)?;

        let reason = reason.into();
        self.error = Some(if reason.trim().is_empty() {
            UNKNOWN_FAILURE.to_string()
        } else {
            reason
        });
        Ok(())
    }

    pub fn mark_deleted(&mut self) -> Result<(), TransitionError> {
        self.apply(JobEvent::DeleteRequested)
    }

    pub fn version(&self) -> JobVersion {
        JobVersion {
            status: self.status,
            updated_at: self.updated_at,
        }
    }

    /// A `Scanning` job whose last update predates `now - timeout` is presumed
    /// abandoned by a crashed worker.
    pub fn is_stuck(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        if self.status != JobStatus::Scanning {
            return false;
        }
        match now.signed_duration_since(self.updated_at).to_std() {
            Ok(elapsed) => elapsed > timeout,
            Err(_) => false,
        }
    }

    fn apply(&mut self, event: JobEvent) -> Result<(), TransitionError> {
        self.status = self.status.transition(event)?;
        self.updated_at = now().max(self.created_at);
        Ok(())
    }
}

/// Microsecond precision, the resolution Postgres stores, so a version read
/// back from the store equals the one written.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
