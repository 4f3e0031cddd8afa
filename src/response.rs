//! Successful responses together with their HTTP details.

use crate::transport::REQUEST_ID_HEADER;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded 2xx response.
///
/// Returned by [`Client::send`](crate::Client::send). Most callers only want the
/// payload and use [`Client::execute`](crate::Client::execute) instead.
///
/// # Examples
///
/// ```no_run
/// use opengov_api::{Client, Configuration, RequestDescriptor};
///
/// # async fn example() -> Result<(), opengov_api::Error> {
/// let client = Client::new(Configuration::from_env())?;
/// let response = client.send(&RequestDescriptor::get("users")).await?;
///
/// println!("Users: {}", response.data["data"]);
/// println!("Took {:?} over {} attempt(s)", response.latency, response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded payload.
    pub data: T,

    /// The body exactly as received.
    pub raw_body: String,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until this response, backoff included.
    pub latency: Duration,

    /// Number of attempts it took; `1` if the first one succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the call needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns the server-assigned request id.
    ///
    /// ```
    /// # use opengov_api::Response;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-request-id", HeaderValue::from_static("req-7"));
    ///
    /// let response = Response::new((), String::new(), StatusCode::OK, headers, Duration::ZERO, 1);
    /// assert_eq!(response.request_id(), Some("req-7"));
    /// ```
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_response_details() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req-9"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let response = Response::new("{}", "{}".to_string(), StatusCode::OK, headers, Duration::ZERO, 2);

        assert!(response.was_retried());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("retry-after"), None);
        assert_eq!(response.request_id(), Some("req-9"));
    }
}
