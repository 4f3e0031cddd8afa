//! Error types for OpenGov API calls.
//!
//! Every failure surfaced by this crate is an [`Error`], so callers can handle
//! "anything that went wrong talking to OpenGov" in a single arm and match on the
//! variant only where they care. HTTP status failures carry a [`StatusError`] with
//! the status code, the server's request id, the parsed (or raw) body and the number
//! of attempts that were made before giving up.

use crate::transport::{RawResponse, TransportError};
use http::StatusCode;
use serde_json::Value;
use std::fmt;

/// The main error type for OpenGov API calls.
///
/// # Examples
///
/// ```no_run
/// use opengov_api::{Client, Configuration, Error, StatusKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new(Configuration::from_env())?;
///
/// match opengov_api::resources::users::get_user(&client, "user-123").await {
///     Ok(user) => println!("{:?}", user.items()),
///     Err(Error::Status(e)) if e.kind == StatusKind::NotFound => {
///         eprintln!("no such user (request id {:?})", e.request_id);
///     }
///     Err(e) if e.is_connection() => eprintln!("network trouble after {:?} tries", e.attempts()),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// Required configuration is missing or invalid.
    ///
    /// Raised before anything is sent and never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server could not be reached, or the connection broke mid-exchange.
    #[error("Connection failed after {attempts} attempt(s): {message}")]
    Connection {
        /// Description of the underlying failure
        message: String,
        /// Total number of attempts made
        attempts: usize,
    },

    /// An attempt exceeded the configured timeout.
    ///
    /// A timeout is a kind of connection failure; see [`Error::is_connection`].
    #[error("Request timed out after {attempts} attempt(s): {message}")]
    Timeout {
        /// Description of the underlying failure
        message: String,
        /// Total number of attempts made
        attempts: usize,
    },

    /// The server answered with a success status but the body was not valid JSON.
    #[error("Failed to parse response (status {status}): {message}")]
    ResponseParse {
        /// The decoder's error message
        message: String,
        /// The HTTP status code of the response
        status: StatusCode,
        /// The raw body that failed to parse
        body: String,
    },

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Status(#[from] StatusError),
}

impl Error {
    /// Builds the terminal error for a transport failure.
    pub(crate) fn from_transport(err: TransportError, attempts: usize) -> Self {
        match err {
            TransportError::Timeout(message) => Error::Timeout { message, attempts },
            TransportError::Connect(message) => Error::Connection {
                message: format!("connect: {}", message),
                attempts,
            },
            TransportError::Network(message) => Error::Connection { message, attempts },
        }
    }

    /// Returns `true` for connection failures, timeouts included.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::Timeout { .. })
    }

    /// Returns `true` if this error describes a transient condition.
    ///
    /// Connection failures, timeouts, 429 and 5xx responses are transient. By the time
    /// a caller sees one of these the executor has already exhausted its retries, so
    /// this is a hint for retrying at a higher level.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection { .. } | Error::Timeout { .. } => true,
            Error::Status(e) => matches!(e.kind, StatusKind::RateLimit | StatusKind::InternalServer),
            Error::Configuration(_) | Error::ResponseParse { .. } => false,
        }
    }

    /// Returns how many attempts were made, for errors produced by the retry loop.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Error::Connection { attempts, .. } | Error::Timeout { attempts, .. } => Some(*attempts),
            Error::Status(e) => Some(e.attempts),
            Error::Configuration(_) | Error::ResponseParse { .. } => None,
        }
    }

    /// Returns the HTTP status code if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status(e) => Some(e.status),
            Error::ResponseParse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server-assigned request id, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Status(e) => e.request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the response body for errors where the server answered.
    ///
    /// Unparseable success bodies come back as [`ErrorBody::Text`].
    pub fn body(&self) -> Option<ErrorBody> {
        match self {
            Error::Status(e) => e.body.clone(),
            Error::ResponseParse { body, .. } => Some(ErrorBody::Text(body.clone())),
            _ => None,
        }
    }

    /// Returns the status class for HTTP status errors.
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Error::Status(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// The class of a non-2xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// 400
    BadRequest,
    /// 401
    Authentication,
    /// 403
    PermissionDenied,
    /// 404
    NotFound,
    /// 429
    RateLimit,
    /// 500 and above
    InternalServer,
    /// Any other non-success status.
    Other,
}

impl StatusKind {
    /// Maps a status code to its class.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => StatusKind::BadRequest,
            401 => StatusKind::Authentication,
            403 => StatusKind::PermissionDenied,
            404 => StatusKind::NotFound,
            429 => StatusKind::RateLimit,
            code if code >= 500 => StatusKind::InternalServer,
            _ => StatusKind::Other,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::BadRequest => "Bad request",
            StatusKind::Authentication => "Authentication failed",
            StatusKind::PermissionDenied => "Permission denied",
            StatusKind::NotFound => "Not found",
            StatusKind::RateLimit => "Rate limited",
            StatusKind::InternalServer => "Server error",
            StatusKind::Other => "HTTP error",
        };
        f.write_str(name)
    }
}

/// The body of an error response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON; kept verbatim.
    Text(String),
}

/// A non-2xx response, classified.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{kind} ({status}): {message}")]
pub struct StatusError {
    /// Status class.
    pub kind: StatusKind,
    /// The HTTP status code.
    pub status: StatusCode,
    /// Human readable message, taken from the body when possible.
    pub message: String,
    /// Value of the `x-request-id` response header.
    pub request_id: Option<String>,
    /// Parsed or raw body.
    pub body: Option<ErrorBody>,
    /// Number of attempts made; 1 until the executor says otherwise.
    pub attempts: usize,
}

impl StatusError {
    /// Classifies a raw response, picking up its request id.
    pub fn from_response(response: &RawResponse) -> Self {
        let mut err = classify_status(response.status, &response.body);
        err.request_id = response.request_id();
        err
    }

    /// Sets the attempt count.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Builds a [`StatusError`] from a status code and the response body.
///
/// The message is the body's `message` field, else `error`, else `detail`, else
/// `"Status {code}: {reason}"`. A body that is not JSON is kept as text.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use opengov_api::{classify_status, StatusKind};
///
/// let err = classify_status(StatusCode::NOT_FOUND, r#"{"detail": "Record not found"}"#);
/// assert_eq!(err.kind, StatusKind::NotFound);
/// assert_eq!(err.message, "Record not found");
/// assert_eq!(err.attempts, 1);
/// ```
pub fn classify_status(status: StatusCode, raw_body: &str) -> StatusError {
    let (message, body) = match serde_json::from_str::<Value>(raw_body) {
        Ok(value) => (extract_message(&value), ErrorBody::Json(value)),
        Err(_) => (None, ErrorBody::Text(raw_body.to_string())),
    };

    StatusError {
        kind: StatusKind::from_status(status),
        status,
        message: message.unwrap_or_else(|| synthesized_message(status)),
        request_id: None,
        body: Some(body),
        attempts: 1,
    }
}

fn synthesized_message(status: StatusCode) -> String {
    format!(
        "Status {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

fn extract_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_meaningful(value))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

// Null, false, zero and empty containers don't count as a message.
fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A specialized `Result` type for OpenGov API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_status_kind_mapping() {
        let cases = [
            (400, StatusKind::BadRequest),
            (401, StatusKind::Authentication),
            (403, StatusKind::PermissionDenied),
            (404, StatusKind::NotFound),
            (409, StatusKind::Other),
            (422, StatusKind::Other),
            (429, StatusKind::RateLimit),
            (500, StatusKind::InternalServer),
            (503, StatusKind::InternalServer),
            (302, StatusKind::Other),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(StatusKind::from_status(status), kind, "status {}", code);
        }
    }

    #[test]
    fn test_message_extraction_order() {
        let err = classify_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "d", "error": "e", "message": "m"}"#,
        );
        assert_eq!(err.message, "m");

        let err = classify_status(StatusCode::BAD_REQUEST, r#"{"detail": "d", "error": "e"}"#);
        assert_eq!(err.message, "e");

        let err = classify_status(StatusCode::BAD_REQUEST, r#"{"detail": "d"}"#);
        assert_eq!(err.message, "d");
    }

    #[test]
    fn test_empty_message_falls_through() {
        let err = classify_status(StatusCode::FORBIDDEN, r#"{"message": "", "error": null}"#);
        assert_eq!(err.message, "Status 403: Forbidden");
        assert_eq!(
            err.body,
            Some(ErrorBody::Json(json!({"message": "", "error": null})))
        );
    }

    #[test]
    fn test_non_string_message_is_rendered() {
        let err = classify_status(StatusCode::BAD_REQUEST, r#"{"error": {"code": 7}}"#);
        assert_eq!(err.message, r#"{"code":7}"#);
    }

    #[test]
    fn test_non_object_json_uses_synthesized_message() {
        let err = classify_status(StatusCode::BAD_GATEWAY, r#"["oops"]"#);
        assert_eq!(err.kind, StatusKind::InternalServer);
        assert_eq!(err.message, "Status 502: Bad Gateway");
        assert_eq!(err.body, Some(ErrorBody::Json(json!(["oops"]))));
    }

    #[test]
    fn test_unparseable_body_kept_as_text() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>");
        assert_eq!(err.message, "Status 500: Internal Server Error");
        assert_eq!(
            err.body,
            Some(ErrorBody::Text("<html>boom</html>".to_string()))
        );
        assert_eq!(err.attempts, 1);
    }

    #[test]
    fn test_from_response_reads_request_id() {
        let mut response = RawResponse::new(StatusCode::UNAUTHORIZED, r#"{"message": "bad token"}"#);
        response
            .headers
            .insert("x-request-id", HeaderValue::from_static("abc-123"));

        let err = StatusError::from_response(&response).with_attempts(2);
        assert_eq!(err.kind, StatusKind::Authentication);
        assert_eq!(err.request_id.as_deref(), Some("abc-123"));
        assert_eq!(err.attempts, 2);
        assert_eq!(err.to_string(), "Authentication failed (401 Unauthorized): bad token");
    }

    #[test]
    fn test_timeout_is_a_connection_error() {
        let err = Error::from_transport(TransportError::Timeout("slow".into()), 4);
        assert!(err.is_connection());
        assert!(err.is_retryable());
        assert_eq!(err.attempts(), Some(4));
        assert_eq!(err.to_string(), "Request timed out after 4 attempt(s): slow");
    }

    #[test]
    fn test_retryable_classification() {
        let rate_limited = Error::Status(classify_status(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(rate_limited.is_retryable());

        let not_found = Error::Status(classify_status(StatusCode::NOT_FOUND, ""));
        assert!(!not_found.is_retryable());

        assert!(!Error::Configuration("missing".into()).is_retryable());
    }

    #[test]
    fn test_body_accessor() {
        let err = Error::Status(classify_status(StatusCode::BAD_REQUEST, r#"{"error": "bad"}"#));
        assert_eq!(err.body(), Some(ErrorBody::Json(json!({"error": "bad"}))));

        let err = Error::ResponseParse {
            message: "expected value".to_string(),
            status: StatusCode::OK,
            body: "oops".to_string(),
        };
        assert_eq!(err.body(), Some(ErrorBody::Text("oops".to_string())));
        assert_eq!(Error::Configuration("x".into()).body(), None);
    }
}
