//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the per-request timeout
//! - GET requests to fetch page bodies
//! - Error classification into transport and body failures

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a single fetch
///
/// Every variant leaves the record Failed; the split only informs logging.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed (connect, timeout, redirect loop)
    #[error("request to {address} failed: {source}")]
    Transport {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response started but its body could not be read
    #[error("reading body of {address} failed: {source}")]
    Body {
        address: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Returns true if the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } | Self::Body { source, .. } => source.is_timeout(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Deadline for a whole request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use skein::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_millis(5000)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    // Default redirect policy and no custom headers
    Client::builder()
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// The response status is not inspected; error pages are parsed for links
/// like any other body.
pub async fn fetch_page(client: &Client, address: &str) -> Result<Vec<u8>, FetchError> {
    let response = client
        .get(address)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            address: address.to_string(),
            source,
        })?;

    tracing::trace!("{} -> {}", address, response.status());

    let body = response.bytes().await.map_err(|source| FetchError::Body {
        address: address.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(Duration::from_millis(5000));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_millis(2000)).unwrap();
        let body = fetch_page(&client, &format!("{}/page", server.uri()))
            .await
            .unwrap();

        assert_eq!(&body[..], b"<p>hello</p>");
    }

    #[tokio::test]
    async fn test_fetch_page_ignores_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_millis(2000)).unwrap();
        let body = fetch_page(&client, &server.uri()).await.unwrap();

        assert_eq!(&body[..], b"missing");
    }

    #[tokio::test]
    async fn test_fetch_page_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_millis(200)).unwrap();
        let err = fetch_page(&client, &server.uri()).await.unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        let client = build_http_client(Duration::from_millis(2000)).unwrap();
        // Port 9 (discard) is essentially never listening
        let err = fetch_page(&client, "http://127.0.0.1:9/").await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
