mod checker_factory;
mod http_scan_checker;
mod mock_scan_checker;

pub use checker_factory::ScanCheckerFactory;
pub use http_scan_checker::HttpScanChecker;
pub use mock_scan_checker::MockScanChecker;
