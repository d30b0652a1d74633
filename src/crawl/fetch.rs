// src/crawl/fetch.rs
// =============================================================================
// Downloads one page.
//
// Only an exact "200 OK" counts as a page. Everything else (redirect
// responses the client didn't follow, 404s, 500s, timeouts, DNS failures,
// TLS errors...) becomes a FetchError. The worker logs it and moves on;
// fetch failures never stop a crawl and are never retried.
//
// The reqwest Client passed in already carries the configured timeout and
// User-Agent (see CrawlConfig::http_client).
// =============================================================================

use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Why a page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with something other than 200
    #[error("HTTP {0}")]
    Status(u16),
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Redirect loop or too many redirects
    #[error("too many redirects")]
    TooManyRedirects,
    /// Could not resolve hostname
    #[error("could not resolve hostname")]
    Dns,
    /// Could not connect
    #[error("connection failed: {0}")]
    Connect(String),
    /// SSL/TLS certificate error
    #[error("TLS certificate error")]
    Tls,
    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
    /// Anything else reqwest reports
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    // Sorts reqwest errors into the kinds above.
    // reqwest doesn't expose DNS/TLS failures as typed variants, so those are
    // recognized from the error text.
    fn categorize(error: reqwest::Error) -> Self {
        let error_string = error.to_string().to_lowercase();

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            if error_string.contains("dns") {
                FetchError::Dns
            } else {
                FetchError::Connect(error_string)
            }
        } else if error_string.contains("certificate") || error_string.contains("ssl") {
            FetchError::Tls
        } else {
            FetchError::Other(error_string)
        }
    }
}

// GETs `url` and returns the body of a 200 response
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::categorize)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))
}
