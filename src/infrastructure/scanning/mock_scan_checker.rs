use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;

use crate::application::ports::{ByteStream, ScanChecker, ScanCheckerError, ScanVerdict};

const INFECTED_MARKER: &[u8] = b"virus";

/// Development checker: content whose trimmed text is `virus` is infected,
/// everything else is clean.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockScanChecker;

impl MockScanChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScanChecker for MockScanChecker {
    async fn check(
        &self,
        mut content: ByteStream<'static>,
    ) -> Result<ScanVerdict, ScanCheckerError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = content.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        if buffer.trim_ascii() == INFECTED_MARKER {
            Ok(ScanVerdict::Infected)
        } else {
            Ok(ScanVerdict::Clean)
        }
    }
}
