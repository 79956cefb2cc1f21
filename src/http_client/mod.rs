//! HTTP client for the dashboard API.

mod endpoint;
mod response;

pub use endpoint::Endpoint;
pub use response::{ApiResponse, ErrorBody};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Default user agent for API requests.
pub const USER_AGENT: &str = concat!("gapchart/", env!("CARGO_PKG_VERSION"));

/// Errors reaching the API or reading its answer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
}

/// Something that can issue GET requests against the API.
///
/// Implemented by [`HttpClient`]; tests substitute scripted transports.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue one GET with `params` URL-encoded into the query string.
    async fn get(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed API client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        // Keep any path prefix of the base when joining endpoint paths.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full URL for an endpoint call.
    pub fn endpoint_url(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(endpoint.path().trim_start_matches('/'))?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// GET an endpoint and decode a successful body as `T`.
    ///
    /// Non-2xx answers become [`TransportError::Status`] carrying the
    /// server's `error` message when there is one.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<T, TransportError> {
        let response = self.get(endpoint, params).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status.as_u16(),
                message: response
                    .error_message()
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }
        Ok(response.json()?)
    }
}

#[async_trait]
impl ApiTransport for HttpClient {
    async fn get(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint_url(endpoint, params)?;
        debug!("Fetching URL: {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            "{} answered {} in {}ms ({} bytes)",
            endpoint,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(base, Duration::from_secs(5), USER_AGENT).unwrap()
    }

    #[test]
    fn test_endpoint_url_encodes_params() {
        let url = client("http://127.0.0.1:5000")
            .endpoint_url(
                Endpoint::Gaps,
                &[
                    ("gap_size".to_string(), "0-1%".to_string()),
                    ("day".to_string(), "Monday".to_string()),
                    ("gap_direction".to_string(), "Up".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/gaps?gap_size=0-1%25&day=Monday&gap_direction=Up"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_prefix() {
        let url = client("https://example.com/dashboard")
            .endpoint_url(Endpoint::StockChart, &[])
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/dashboard/api/stock/chart");
    }

    #[test]
    fn test_endpoint_url_encodes_spaces_and_symbols() {
        let url = client("http://localhost:5000/")
            .endpoint_url(
                Endpoint::EarningsByBin,
                &[
                    ("ticker".to_string(), "AAPL".to_string()),
                    ("bin".to_string(), "Slight Beat".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(url.query(), Some("ticker=AAPL&bin=Slight+Beat"));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpClient::new("not a url", Duration::from_secs(1), USER_AGENT).is_err());
    }
}
