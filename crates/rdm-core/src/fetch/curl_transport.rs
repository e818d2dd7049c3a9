//! Single-stream HTTP GET via libcurl's easy interface.

use std::time::Duration;

use super::{FetchError, Transport};
use crate::config::TransportConfig;

/// Blocking libcurl transport. A fresh easy handle is used per fetch, so one
/// instance can be shared by every worker.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirections: u32,
}

impl CurlTransport {
    pub fn new(cfg: &TransportConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
        }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url::Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(FetchError::Curl)?;
        easy.follow_location(true).map_err(FetchError::Curl)?;
        easy.max_redirections(self.max_redirections)
            .map_err(FetchError::Curl)?;
        easy.connect_timeout(self.connect_timeout)
            .map_err(FetchError::Curl)?;
        // Abort if throughput drops below 1 KiB/s for 60s.
        easy.low_speed_limit(1024).map_err(FetchError::Curl)?;
        easy.low_speed_time(Duration::from_secs(60))
            .map_err(FetchError::Curl)?;
        easy.timeout(self.timeout).map_err(FetchError::Curl)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(FetchError::Curl)?;
            transfer.perform().map_err(FetchError::Curl)?;
        }

        let code = easy.response_code().map_err(FetchError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_url_without_network() {
        let t = CurlTransport::default();
        let err = t.fetch("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
