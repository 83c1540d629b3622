use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::json;
use tokio::net::TcpListener;

use filegate::application::ports::{ScanChecker, ScanCheckerError, ScanVerdict};
use filegate::infrastructure::scanning::HttpScanChecker;

use crate::helpers::fakes::byte_stream;

/// Fake scanner: rejects content containing `EICAR`, fails on `crash`.
async fn scan_endpoint(body: Bytes) -> impl IntoResponse {
    let text = String::from_utf8_lossy(&body);
    if text.contains("crash") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if text.contains("broken") {
        return axum::Json(json!({"success": false, "clean": false, "message": "engine offline"}))
            .into_response();
    }
    let clean = !text.contains("EICAR");
    axum::Json(json!({"success": true, "clean": clean, "message": ""})).into_response()
}

async fn spawn_scanner() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/scan", post(scan_endpoint));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/scan", addr)
}

async fn checker() -> HttpScanChecker {
    HttpScanChecker::new(spawn_scanner().await, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn given_clean_content_when_checking_then_returns_clean() {
    let checker = checker().await;

    let verdict = checker.check(byte_stream(b"hello")).await.unwrap();

    assert_eq!(verdict, ScanVerdict::Clean);
}

#[tokio::test]
async fn given_flagged_content_when_checking_then_returns_infected() {
    let checker = checker().await;

    let verdict = checker
        .check(byte_stream(b"X5O!P%@AP EICAR-STANDARD-ANTIVIRUS-TEST-FILE"))
        .await
        .unwrap();

    assert_eq!(verdict, ScanVerdict::Infected);
}

#[tokio::test]
async fn given_server_error_when_checking_then_returns_unexpected_status() {
    let checker = checker().await;

    let result = checker.check(byte_stream(b"crash")).await;

    assert!(matches!(
        result,
        Err(ScanCheckerError::UnexpectedStatus(500))
    ));
}

#[tokio::test]
async fn given_unsuccessful_scan_when_checking_then_returns_rejected_with_message() {
    let checker = checker().await;

    let result = checker.check(byte_stream(b"broken")).await;

    match result {
        Err(ScanCheckerError::Rejected(message)) => assert_eq!(message, "engine offline"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn given_unreachable_scanner_when_checking_then_returns_request_failed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let checker =
        HttpScanChecker::new(format!("http://{}/scan", addr), Duration::from_secs(2)).unwrap();

    let result = checker.check(byte_stream(b"hello")).await;

    assert!(matches!(result, Err(ScanCheckerError::RequestFailed(_))));
}
