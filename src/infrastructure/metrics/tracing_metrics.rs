use std::time::Duration;

use crate::application::ports::{MetricsCollector, ScanOutcome, UploadOutcome};

/// Emits every measurement as a structured `tracing` event on the `metrics`
/// target, for collection by whatever log pipeline the deployment runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsCollector;

impl TracingMetricsCollector {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsCollector for TracingMetricsCollector {
    fn record_upload_duration(&self, outcome: UploadOutcome, duration: Duration) {
        tracing::info!(
            target: "metrics",
            metric = "file_upload_duration_seconds",
            status = outcome.as_str(),
            value = duration.as_secs_f64()
        );
    }

    fn record_upload_size(&self, bytes: u64) {
        tracing::info!(
            target: "metrics",
            metric = "file_upload_size_bytes",
            value = bytes
        );
    }

    fn record_scan_duration(&self, outcome: ScanOutcome, duration: Duration) {
        tracing::info!(
            target: "metrics",
            metric = "virus_check_duration_seconds",
            status = outcome.as_str(),
            value = duration.as_secs_f64()
        );
    }
}
