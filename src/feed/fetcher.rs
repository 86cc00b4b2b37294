use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use super::parser::{parse_feed, RawEntry};

/// Errors that can occur while fetching and parsing one feed source.
///
/// Parse failures are folded in here so the scheduler handles a single
/// per-feed error type.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body read exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Feed content could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Bounds applied to every feed fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Build the shared HTTP client used for all feed fetches.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder().user_agent(user_agent).build()?)
}

/// Fetch a feed source and parse it into raw entries.
///
/// The whole operation (connect, headers, body) is bounded by
/// `limits.timeout`. An empty feed is `Ok(vec![])`. There is no retry: a
/// failed source gets its next chance on the following cycle.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Fetch exceeded `limits.timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Body exceeded `limits.max_bytes`
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
/// - [`FetchError::Parse`] - Not a recognisable feed
pub async fn fetch_and_parse(
    client: &reqwest::Client,
    url: &str,
    limits: &FetchLimits,
) -> Result<Vec<RawEntry>, FetchError> {
    let bytes = tokio::time::timeout(limits.timeout, fetch_bytes(client, url, limits.max_bytes))
        .await
        .map_err(|_| FetchError::Timeout(limits.timeout))??;

    parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))
}

async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, max_bytes).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
