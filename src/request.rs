//! Request descriptors.

use http::Method;
use serde_json::Value;

/// Describes one logical API call: what to send, not how.
///
/// The path is relative to the community root, so `"records/123"` ends up as
/// `{base_endpoint}/{community}/records/123`. Query parameters keep their insertion
/// order; a key may appear more than once.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use opengov_api::RequestDescriptor;
///
/// let request = RequestDescriptor::get("records")
///     .with_query_param("filter[status]", "ACTIVE")
///     .with_query_param("page[size]", "50");
///
/// assert_eq!(request.method, Method::GET);
/// assert_eq!(request.query.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// The HTTP method.
    pub method: Method,

    /// Resource path, relative to the community root.
    pub path: String,

    /// Query parameters, in order.
    pub query: Vec<(String, String)>,

    /// Optional JSON body.
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Creates a descriptor with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A `GET` descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` descriptor with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// A `PATCH` descriptor with a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    /// A `DELETE` descriptor.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters.
    pub fn with_query_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}
