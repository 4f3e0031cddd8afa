//! The request executor.
//!
//! [`Client`] turns a [`RequestDescriptor`] into an HTTP exchange, retries transient
//! failures according to the configured [`RetryPolicy`](crate::RetryPolicy), and
//! returns either the decoded JSON payload or a classified [`Error`].

use crate::{
    config::{Configuration, Settings},
    redact::{mask_authorization, redact_json},
    request::RequestDescriptor,
    retry::{classify_failure, compute_delay, Failure},
    transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport},
    Error, Response, Result,
};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// An OpenGov API client.
///
/// Cheap to clone; clones share the transport and the [`Configuration`]. Every call
/// reads one snapshot of the configuration, so settings changed through
/// [`Client::configuration`] apply to the next call.
///
/// # Examples
///
/// ```no_run
/// use opengov_api::{Client, Configuration, RequestDescriptor};
///
/// # async fn example() -> Result<(), opengov_api::Error> {
/// let config = Configuration::new();
/// config.set_credential("my-api-key");
/// config.set_tenant("springfield");
///
/// let client = Client::new(config)?;
/// let users = client.execute(&RequestDescriptor::get("users")).await?;
/// println!("{}", users["data"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: Configuration,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Creates a client over the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: Configuration) -> Result<Self> {
        Self::builder().configuration(config).build()
    }

    /// Creates a new `ClientBuilder`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The configuration this client reads on every call.
    pub fn configuration(&self) -> &Configuration {
        &self.inner.config
    }

    /// Executes a call and returns the decoded payload.
    ///
    /// A 2xx response with an empty body decodes to `Value::Null`.
    ///
    /// # Errors
    ///
    /// * [`Error::Configuration`] if the credential or community is missing
    /// * [`Error::Connection`] / [`Error::Timeout`] once retries are exhausted
    /// * [`Error::Status`] for a non-2xx response (after retries for 429 and 5xx)
    /// * [`Error::ResponseParse`] if a 2xx body is not JSON
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        self.send(descriptor).await.map(|response| response.data)
    }

    /// Executes a call and deserializes the payload into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Client::execute`]; a payload that does not fit `T` is reported as
    /// [`Error::ResponseParse`].
    pub async fn execute_as<T>(&self, descriptor: &RequestDescriptor) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(descriptor).await?;
        serde_json::from_value(response.data).map_err(|e| {
            tracing::error!(error = %e, status = response.status.as_u16(), "Failed to decode payload");
            Error::ResponseParse {
                message: e.to_string(),
                status: response.status,
                body: response.raw_body,
            }
        })
    }

    /// Executes a call and returns the payload together with response details.
    ///
    /// This drives the retry loop: an attempt that fails with a retryable condition is
    /// followed by a backoff sleep and another attempt, until it succeeds, fails
    /// permanently, or `max_retries` retries have been spent.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<Response<Value>> {
        let settings = self.inner.config.snapshot();
        let request = prepare(&settings, descriptor)?;
        let policy = settings.retry_policy();
        let start_time = Instant::now();
        let mut attempt: u32 = 0;

        let authorization = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(mask_authorization)
            .unwrap_or_default();

        loop {
            let attempts = attempt as usize + 1;

            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempts,
                authorization = %authorization,
                "Executing HTTP request"
            );
            if let Some(body) = &request.body {
                tracing::debug!(body = %redact_json(body), "Request body");
            }

            let failure = match self.inner.transport.send(&request).await {
                Ok(response) if response.status.is_success() => {
                    match decode(response, start_time.elapsed(), attempts) {
                        Ok(response) => {
                            tracing::info!(
                                method = %request.method,
                                url = %request.url,
                                status = response.status.as_u16(),
                                latency_ms = response.latency.as_millis(),
                                attempts = attempts,
                                "Received HTTP response"
                            );
                            return Ok(response);
                        }
                        Err(failure) => failure,
                    }
                }
                Ok(response) => Failure::Status(response),
                Err(err) => Failure::Transport(err),
            };

            let verdict = classify_failure(&failure);
            if !verdict.retryable || attempt >= policy.max_retries {
                let error = failure.into_error(attempts);
                tracing::error!(
                    error = %error,
                    method = %request.method,
                    url = %request.url,
                    attempts = attempts,
                    "Request failed"
                );
                return Err(error);
            }

            let delay = compute_delay(attempt, verdict.retry_after, policy);
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                attempt = attempts,
                delay_ms = delay.as_millis(),
                server_requested = verdict.retry_after.is_some(),
                "Request failed, retrying after delay"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// `GET {path}`.
    pub async fn get(&self, path: impl Into<String>) -> Result<Value> {
        self.execute(&RequestDescriptor::get(path)).await
    }

    /// `POST {path}` with a JSON body.
    pub async fn post(&self, path: impl Into<String>, body: Value) -> Result<Value> {
        self.execute(&RequestDescriptor::post(path, body)).await
    }

    /// `PATCH {path}` with a JSON body.
    pub async fn patch(&self, path: impl Into<String>, body: Value) -> Result<Value> {
        self.execute(&RequestDescriptor::patch(path, body)).await
    }

    /// `DELETE {path}`, discarding any body.
    pub async fn delete(&self, path: impl Into<String>) -> Result<()> {
        self.execute(&RequestDescriptor::delete(path)).await.map(|_| ())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builds the wire request for one call from a settings snapshot.
fn prepare(settings: &Settings, descriptor: &RequestDescriptor) -> Result<PreparedRequest> {
    let credential = settings.credential()?;
    let tenant = settings.tenant()?;

    let raw_url = format!(
        "{}/{}/{}",
        settings.base_endpoint().trim_end_matches('/'),
        tenant,
        descriptor.path.trim_start_matches('/')
    );
    let mut url = Url::parse(&raw_url)
        .map_err(|e| Error::Configuration(format!("Invalid request URL {}: {}", raw_url, e)))?;
    for (key, value) in &descriptor.query {
        url.query_pairs_mut().append_pair(key, value);
    }

    let mut authorization = HeaderValue::try_from(format!("{} {}", settings.auth_scheme(), credential))
        .map_err(|e| Error::Configuration(format!("Invalid Authorization header value: {}", e)))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(PreparedRequest {
        method: descriptor.method.clone(),
        url,
        headers,
        body: descriptor.body.clone(),
        timeout: settings.timeout(),
    })
}

/// Decodes a 2xx response. Failure here is permanent.
fn decode(
    response: RawResponse,
    latency: Duration,
    attempts: usize,
) -> std::result::Result<Response<Value>, Failure> {
    let RawResponse {
        status,
        headers,
        body,
    } = response;

    let data = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&body) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = status.as_u16(),
                    raw_response = %body,
                    "Failed to parse JSON response"
                );
                return Err(Failure::Decode {
                    status,
                    message: format!("Failed to parse JSON response: {}", e),
                    body,
                });
            }
        }
    };

    Ok(Response::new(data, body, status, headers, latency, attempts))
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use opengov_api::{ClientBuilder, Configuration};
///
/// # fn example() -> Result<(), opengov_api::Error> {
/// let client = ClientBuilder::new()
///     .configuration(Configuration::from_env())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: Option<Configuration>,
    transport: Option<Box<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
        }
    }

    /// Sets the configuration. Defaults to [`Configuration::from_env`].
    pub fn configuration(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the transport. Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default transport cannot be created.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new()?),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: self.config.unwrap_or_else(Configuration::from_env),
                transport,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
