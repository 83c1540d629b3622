use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::application::ports::{MetricsCollector, ScanOutcome, UploadOutcome};

/// Counting collector that keeps running totals in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMetricsCollector {
    uploads_succeeded: AtomicU64,
    uploads_failed: AtomicU64,
    uploaded_bytes: AtomicU64,
    scans_clean: AtomicU64,
    scans_infected: AtomicU64,
    scans_errored: AtomicU64,
    scan_time_micros: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub uploads_succeeded: u64,
    pub uploads_failed: u64,
    pub uploaded_bytes: u64,
    pub scans_clean: u64,
    pub scans_infected: u64,
    pub scans_errored: u64,
    pub scan_time_micros: u64,
}

impl MetricsSnapshot {
    pub fn scans_total(&self) -> u64 {
        self.scans_clean + self.scans_infected + self.scans_errored
    }
}

impl InMemoryMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uploads_succeeded: self.uploads_succeeded.load(Ordering::Relaxed),
            uploads_failed: self.uploads_failed.load(Ordering::Relaxed),
            uploaded_bytes: self.uploaded_bytes.load(Ordering::Relaxed),
            scans_clean: self.scans_clean.load(Ordering::Relaxed),
            scans_infected: self.scans_infected.load(Ordering::Relaxed),
            scans_errored: self.scans_errored.load(Ordering::Relaxed),
            scan_time_micros: self.scan_time_micros.load(Ordering::Relaxed),
        }
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn record_upload_duration(&self, outcome: UploadOutcome, _duration: Duration) {
        let counter = match outcome {
            UploadOutcome::Success => &self.uploads_succeeded,
            UploadOutcome::Error => &self.uploads_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_upload_size(&self, bytes: u64) {
        self.uploaded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_scan_duration(&self, outcome: ScanOutcome, duration: Duration) {
        let counter = match outcome {
            ScanOutcome::Success => &self.scans_clean,
            ScanOutcome::VirusDetected => &self.scans_infected,
            ScanOutcome::Error => &self.scans_errored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.scan_time_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }
}
