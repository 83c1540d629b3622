use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Body, Client, StatusCode};
use serde::Deserialize;

use crate::application::ports::{ByteStream, ScanChecker, ScanCheckerError, ScanVerdict};

/// Client for a virus-check service that accepts the raw file as a POST body
/// and answers with `{"success": bool, "clean": bool, "message": string}`.
pub struct HttpScanChecker {
    client: Client,
    url: String,
}

#[derive(Deserialize)]
struct CheckResponse {
    success: bool,
    clean: bool,
    #[serde(default)]
    message: String,
}

impl HttpScanChecker {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScanCheckerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanCheckerError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ScanChecker for HttpScanChecker {
    async fn check(&self, content: ByteStream<'static>) -> Result<ScanVerdict, ScanCheckerError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::wrap_stream(content))
            .send()
            .await
            .map_err(|e| ScanCheckerError::RequestFailed(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ScanCheckerError::UnexpectedStatus(response.status().as_u16()));
        }

        let result: CheckResponse = response
            .json()
            .await
            .map_err(|e| ScanCheckerError::InvalidResponse(e.to_string()))?;

        if !result.success {
            return Err(ScanCheckerError::Rejected(result.message));
        }

        Ok(if result.clean {
            ScanVerdict::Clean
        } else {
            ScanVerdict::Infected
        })
    }
}
