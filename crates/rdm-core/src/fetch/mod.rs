//! Outbound fetch: the `Transport` seam and its libcurl implementation.
//!
//! The pipeline only depends on the contract "URL in, body bytes out, any
//! non-2xx is an error"; tests swap in an in-memory transport.

mod curl_transport;

use std::fmt;

use crate::retry::{self, RetryPolicy};

pub use curl_transport::CurlTransport;

/// Error returned by a single fetch attempt (curl failure or HTTP error).
/// Kept separate from `ItemError` so retries can be classified first.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// URL could not be handed to the transport at all.
    InvalidUrl(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::InvalidUrl(url) => write!(f, "invalid URL {:?}", url),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Http(_) | FetchError::InvalidUrl(_) => None,
        }
    }
}

/// Fetches the full body of a URL. Implementations are blocking and are
/// called from the tokio blocking pool, one call per worker at a time.
pub trait Transport: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetch with retry on transient errors (timeouts, connection, 429/503, 5xx).
pub fn fetch_with_retry(
    transport: &dyn Transport,
    url: &str,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, FetchError> {
    retry::run_with_retry(policy, || transport.fetch(url))
}
