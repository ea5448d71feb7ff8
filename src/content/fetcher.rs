// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP fetching of summarization input by URL
//!
//! The response body is returned as decoded text with markup intact.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Per-request timeout for URL fetches
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// URL fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or uses a non-HTTP scheme
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, String),

    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    /// Connection or protocol error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTTP non-success status
    #[error("HTTP {0} for url: {1}")]
    HttpStatus(u16, String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Fetches page bodies with a fixed timeout and no retries
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    client: Client,
    timeout: Duration,
}

impl UrlFetcher {
    /// Create a fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// GET `url` and return the body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Self::validate_url(url)?;

        debug!("Fetching content from: {} (timeout {:?})", parsed, self.timeout);

        let response = self.client.get(parsed.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url.to_string()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::HttpError(e.to_string())
            }
        })?;

        info!("Fetched {} chars from: {}", body.len(), url);
        Ok(body)
    }

    /// Only absolute http/https URLs are fetched
    pub fn validate_url(url: &str) -> Result<Url, FetchError> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| FetchError::InvalidUrl(url.to_string(), e.to_string()))?;

        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl(
                url.to_string(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        Ok(parsed)
    }
}
