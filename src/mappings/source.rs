//! HTTP access to the community data pack.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::{HTTP_POOL_MAX_IDLE_PER_HOST, USER_AGENT, retry};
use crate::error::AppError;

/// Creates the HTTP client used for data pack downloads, with connection
/// pooling and a request-level timeout.
pub fn create_http_client_with_timeout(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()
}

/// Fetches the data pack document from a fixed URL.
///
/// Only JSON decoding happens here; the caller checks the document shape.
#[derive(Debug, Clone)]
pub struct RemoteDataSource {
    client: Client,
    url: String,
    max_retries: u32,
    initial_backoff: Duration,
    max_retry_after: Duration,
}

impl RemoteDataSource {
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(timeout_seconds)?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            max_retries: retry::MAX_RETRIES,
            initial_backoff: Duration::from_millis(retry::INITIAL_BACKOFF_MS),
            max_retry_after: Duration::from_secs(retry::MAX_RETRY_AFTER_SECS),
        }
    }

    /// Overrides the retry policy for transient failures
    pub fn with_retry_policy(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Caps the delay a `Retry-After` header can impose between attempts
    pub fn with_max_retry_after(mut self, max_retry_after: Duration) -> Self {
        self.max_retry_after = max_retry_after;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads and decodes the data pack.
    ///
    /// Failures classified as retryable (timeouts, connection failures, 429
    /// and 5xx) are retried with exponential backoff. A `Retry-After` header
    /// replaces the backoff but is capped, so the total wait stays bounded.
    ///
    /// # Errors
    /// The transport variants of [`AppError`]: `NetworkTimeout`,
    /// `NetworkConnection`, `ApiNotFound`, `ApiRateLimit`, `ApiClientError`,
    /// `ApiServerError`, `ApiServiceUnavailable`, `ApiNoData` for an empty body
    /// and `ApiMalformedJson` for a body that is not JSON.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_document(&self) -> Result<Value, AppError> {
        let url = self.url.as_str();
        info!("Fetching data pack from {url}");

        let mut attempt = 0u32;
        let mut backoff = self.initial_backoff;
        let response = loop {
            let (failure, retry_after) = match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => break resp,
                Ok(resp) => (status_error(resp.status(), url), parse_retry_after(&resp)),
                Err(e) => (request_error(e, url), None),
            };

            if !failure.is_retryable() || attempt >= self.max_retries {
                error!("Data pack request failed: {failure}");
                return Err(failure);
            }

            let wait = retry_wait(retry_after, backoff, self.max_retry_after);
            warn!(
                "{}. Retrying in {:?} (attempt {}/{})",
                failure,
                wait,
                attempt + 1,
                self.max_retries
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
            backoff = backoff.saturating_mul(2);
        };
        debug!("Response status: {}", response.status());

        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to read response body from URL {}: {}", url, e);
                return Err(if e.is_timeout() {
                    AppError::network_timeout(url)
                } else {
                    AppError::ApiFetch(e)
                });
            }
        };
        debug!("Data pack size: {} bytes", body.len());

        if body.trim().is_empty() {
            return Err(AppError::api_no_data("Response body is empty", url));
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            error!(
                "Data pack is not valid JSON: {} (first 200 chars: {})",
                e,
                body.chars().take(200).collect::<String>()
            );
            AppError::api_malformed_json(e.to_string(), url)
        })
    }
}

/// Maps a non-success status to the matching transport error
fn status_error(status: StatusCode, url: &str) -> AppError {
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    match status_code {
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
        500..=599 => AppError::api_server_error(status_code, reason, url),
        _ => AppError::api_client_error(status_code, reason, url),
    }
}

fn request_error(e: reqwest::Error, url: &str) -> AppError {
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

/// `Retry-After` in seconds; HTTP dates are ignored
fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Server-requested delay capped at `max_retry_after`, else the backoff
fn retry_wait(retry_after: Option<Duration>, backoff: Duration, max_retry_after: Duration) -> Duration {
    retry_after
        .map(|requested| requested.min(max_retry_after))
        .unwrap_or(backoff)
}
