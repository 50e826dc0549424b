// ABOUTME: Remote resource fetching for the slide-report application
// ABOUTME: Downloads the picture shown on picture slides over plain HTTP GET

use crate::errors::{ReportError, Result};
use log::info;
use reqwest::blocking::Client;
use std::time::Duration;

/// Status and body of a completed GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can retrieve the bytes behind a URL.
///
/// A response with a non-success status is still `Ok`; `Err` means no
/// response was received at all.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Fetcher backed by a blocking reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ReportError::FetchError)?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        info!("Fetching remote resource: {}", url);
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        info!("Fetched {} bytes with status {}", body.len(), status);
        Ok(FetchResponse { status, body })
    }
}
