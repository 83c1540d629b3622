use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanOutcome {
    Success,
    VirusDetected,
    Error,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "success",
            ScanOutcome::VirusDetected => "virus_detected",
            ScanOutcome::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadOutcome {
    Success,
    Error,
}

impl UploadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadOutcome::Success => "success",
            UploadOutcome::Error => "error",
        }
    }
}

pub trait MetricsCollector: Send + Sync {
    fn record_upload_duration(&self, outcome: UploadOutcome, duration: Duration);

    fn record_upload_size(&self, bytes: u64);

    fn record_scan_duration(&self, outcome: ScanOutcome, duration: Duration);
}
