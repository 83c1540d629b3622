use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ScanChecker, ScanCheckerError};
use crate::presentation::config::{ScannerProviderSetting, ScannerSettings};

use super::http_scan_checker::HttpScanChecker;
use super::mock_scan_checker::MockScanChecker;

pub struct ScanCheckerFactory;

impl ScanCheckerFactory {
    pub fn create(settings: &ScannerSettings) -> Result<Arc<dyn ScanChecker>, ScanCheckerError> {
        match settings.provider {
            ScannerProviderSetting::Mock => {
                tracing::warn!("Using mock scan checker; uploads are not really inspected");
                Ok(Arc::new(MockScanChecker::new()))
            }
            ScannerProviderSetting::Http => {
                let url = settings.url.as_deref().ok_or_else(|| {
                    ScanCheckerError::Configuration("scanner.url required".into())
                })?;
                let timeout = Duration::from_secs(settings.request_timeout_secs);
                Ok(Arc::new(HttpScanChecker::new(url, timeout)?))
            }
        }
    }
}
