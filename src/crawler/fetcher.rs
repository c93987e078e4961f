//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client (user agent, timeouts, certificate policy)
//! - Single GET requests returning the raw body
//! - Classifying failures as status or transport errors
//!
//! There is no retry logic here; callers log and skip.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use etd_harvester::config::HttpConfig;
/// use etd_harvester::crawler::build_http_client;
///
/// let config = HttpConfig {
///     ignore_certificates: true,
///     ..HttpConfig::default()
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    if config.ignore_certificates {
        tracing::warn!("TLS certificate validation is disabled");
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(config.ignore_certificates)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | body bytes |
/// | any other status | `FetchError::Status` |
/// | connection, TLS, timeout, body read failure | `FetchError::Transport` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The absolute URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!("Fetching {}", url);

    let transport = |source| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    Ok(body.to_vec())
}
