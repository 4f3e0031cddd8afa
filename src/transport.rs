//! The wire-level seam between the request executor and the network.
//!
//! [`Client`](crate::Client) never talks to `reqwest` directly. It hands a fully
//! prepared request to a [`Transport`] and gets back either the raw response or a
//! [`TransportError`]. Classification, retries and decoding all happen above this layer.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Header carrying the server-assigned correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A single HTTP request, ready to go on the wire.
///
/// Built once per logical call by the executor and re-sent unchanged on every attempt.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, query string included.
    pub url: Url,
    /// Authorization, content type and any per-request headers.
    pub headers: HeaderMap,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Upper bound for this one attempt.
    pub timeout: Duration,
}

/// The undecoded result of a request that reached the server.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns the `x-request-id` header, if the server sent one.
    pub fn request_id(&self) -> Option<String> {
        self.header(REQUEST_ID_HEADER).map(str::to_owned)
    }
}

/// A failure below the HTTP layer: nothing usable came back from the server.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The attempt exceeded its timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other network failure (reset connection, truncated body, ...).
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Sends prepared requests.
///
/// Implementations must perform exactly one network exchange per call and must not
/// retry on their own; the executor owns the retry loop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single attempt.
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// The production [`Transport`], backed by `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with a fresh `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new() -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("opengov-api-rust/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                crate::Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { http })
    }

    /// Wraps an already configured `reqwest` client (proxies, custom roots, ...).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // The response is consumed here so the connection goes back to the pool
        // (or is closed) before the executor decides anything.
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_request_id_header() {
        let mut response = RawResponse::new(StatusCode::NOT_FOUND, "");
        assert_eq!(response.request_id(), None);

        response
            .headers
            .insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        assert_eq!(response.request_id().as_deref(), Some("req-42"));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Timeout("deadline elapsed".to_string());
        assert_eq!(err.to_string(), "Request timed out: deadline elapsed");
    }
}
