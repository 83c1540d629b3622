use std::io;

use super::ByteStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVerdict {
    Clean,
    Infected,
}

/// Pass/fail malware inspection of a byte stream.
///
/// `Ok(ScanVerdict::Infected)` means the content was inspected and rejected;
/// `Err` means the inspection itself could not be carried out.
#[async_trait::async_trait]
pub trait ScanChecker: Send + Sync {
    async fn check(&self, content: ByteStream<'static>) -> Result<ScanVerdict, ScanCheckerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScanCheckerError {
    #[error("failed to read content: {0}")]
    Read(#[from] io::Error),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("scanner reported failure: {0}")]
    Rejected(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}
