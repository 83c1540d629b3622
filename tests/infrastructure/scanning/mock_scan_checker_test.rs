use filegate::application::ports::{ScanChecker, ScanVerdict};
use filegate::infrastructure::scanning::MockScanChecker;

use crate::helpers::fakes::{byte_stream, failing_stream};

#[tokio::test]
async fn given_ordinary_content_when_checking_then_clean() {
    let checker = MockScanChecker::new();

    let verdict = checker.check(byte_stream(b"%PDF-1.7 ...")).await.unwrap();

    assert_eq!(verdict, ScanVerdict::Clean);
}

#[tokio::test]
async fn given_virus_marker_when_checking_then_infected() {
    let checker = MockScanChecker::new();

    let verdict = checker.check(byte_stream(b"virus\n")).await.unwrap();

    assert_eq!(verdict, ScanVerdict::Infected);
}

#[tokio::test]
async fn given_marker_inside_larger_content_when_checking_then_clean() {
    let checker = MockScanChecker::new();

    let verdict = checker
        .check(byte_stream(b"this mentions a virus but is harmless"))
        .await
        .unwrap();

    assert_eq!(verdict, ScanVerdict::Clean);
}

#[tokio::test]
async fn given_unreadable_content_when_checking_then_returns_error() {
    let checker = MockScanChecker::new();

    let result = checker.check(failing_stream()).await;

    assert!(result.is_err());
}
