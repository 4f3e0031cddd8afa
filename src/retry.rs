//! Retry policy, failure classification and backoff.
//!
//! Everything here is pure: the executor in [`crate::client`] feeds a failed attempt to
//! [`classify_failure`], and if the failure is transient asks [`compute_delay`] how long
//! to wait before the next try.

use crate::error::StatusError;
use crate::transport::{RawResponse, TransportError};
use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use rand::Rng;
use std::time::{Duration, SystemTime};

/// How often and how patiently to retry transient failures.
///
/// # Examples
///
/// ```
/// use opengov_api::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_retries, 3);
/// assert_eq!(policy.initial_delay, Duration::from_secs(1));
///
/// // No retries at all
/// let strict = RetryPolicy::disabled();
/// assert_eq!(strict.max_retries, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the exponential delay, and on server-requested delays.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays. At least `1.0`.
    pub backoff_multiplier: f64,
    /// Random spread applied to each delay, as a fraction in `[0, 1)`.
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Checks the numeric invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.initial_delay.is_zero() {
            return Err(Error::Configuration(
                "initial_delay must be positive".to_string(),
            ));
        }
        if self.max_delay.is_zero() {
            return Err(Error::Configuration("max_delay must be positive".to_string()));
        }
        if !(self.backoff_multiplier >= 1.0 && self.backoff_multiplier.is_finite()) {
            return Err(Error::Configuration(format!(
                "backoff_multiplier must be a finite number >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if !(0.0..1.0).contains(&self.jitter_fraction) {
            return Err(Error::Configuration(format!(
                "jitter_fraction must be in [0, 1), got {}",
                self.jitter_fraction
            )));
        }
        Ok(())
    }

    /// Delay before retry number `attempt + 1`; see [`compute_delay`].
    pub fn delay_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        compute_delay(attempt, retry_after, self)
    }
}

/// Why a single attempt did not produce a payload.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Nothing usable came back from the server.
    Transport(TransportError),
    /// The server answered with a non-2xx status.
    Status(RawResponse),
    /// The server answered 2xx but the body could not be decoded.
    Decode {
        /// The HTTP status code
        status: StatusCode,
        /// The undecodable body
        body: String,
        /// The decoder's message
        message: String,
    },
}

impl Failure {
    /// Converts the failure of the final attempt into the error handed to the caller.
    pub fn into_error(self, attempts: usize) -> Error {
        match self {
            Failure::Transport(err) => Error::from_transport(err, attempts),
            Failure::Status(response) => {
                Error::Status(StatusError::from_response(&response).with_attempts(attempts))
            }
            Failure::Decode {
                status,
                body,
                message,
            } => Error::ResponseParse {
                message,
                status,
                body,
            },
        }
    }
}

/// Verdict on a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether another attempt may succeed.
    pub retryable: bool,
    /// Server-requested delay, from `Retry-After`.
    pub retry_after: Option<Duration>,
}

impl Classification {
    fn retry(retry_after: Option<Duration>) -> Self {
        Self {
            retryable: true,
            retry_after,
        }
    }

    fn fatal() -> Self {
        Self {
            retryable: false,
            retry_after: None,
        }
    }
}

/// Decides whether a failure is transient.
///
/// Connection failures and timeouts are retryable. So are 429 (honouring `Retry-After`)
/// and every status from 500 up. Other statuses and decode failures are permanent.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use opengov_api::retry::{classify_failure, Failure};
/// use opengov_api::transport::RawResponse;
///
/// let verdict = classify_failure(&Failure::Status(RawResponse::new(StatusCode::BAD_GATEWAY, "")));
/// assert!(verdict.retryable);
///
/// let verdict = classify_failure(&Failure::Status(RawResponse::new(StatusCode::NOT_FOUND, "")));
/// assert!(!verdict.retryable);
/// ```
pub fn classify_failure(failure: &Failure) -> Classification {
    match failure {
        Failure::Transport(_) => Classification::retry(None),
        Failure::Status(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
            Classification::retry(parse_retry_after(&response.headers))
        }
        Failure::Status(response) if response.status.as_u16() >= 500 => {
            Classification::retry(None)
        }
        Failure::Status(_) | Failure::Decode { .. } => Classification::fatal(),
    }
}

/// Computes the delay before the next attempt.
///
/// `attempt` is the zero-based index of the attempt that just failed. A server hint
/// wins over the formula and is capped at `max_delay`. Otherwise the delay is
/// `min(initial_delay * multiplier^attempt, max_delay)` spread by up to
/// `±jitter_fraction` of itself. The cap applies before jitter, so a jittered delay
/// may slightly exceed `max_delay`.
pub fn compute_delay(attempt: u32, retry_after: Option<Duration>, policy: &RetryPolicy) -> Duration {
    if let Some(hint) = retry_after {
        return hint.min(policy.max_delay);
    }

    let capped = capped_backoff(attempt, policy);
    if policy.jitter_fraction == 0.0 {
        return capped;
    }
    let unit = rand::thread_rng().gen_range(-1.0..=1.0);
    apply_jitter(capped, policy.jitter_fraction, unit)
}

fn capped_backoff(attempt: u32, policy: &RetryPolicy) -> Duration {
    let exponent = attempt.min(i32::MAX as u32) as i32;
    let nanos = policy.initial_delay.as_nanos() as f64 * policy.backoff_multiplier.powi(exponent);
    let max_nanos = policy.max_delay.as_nanos() as f64;
    // An overflowing product is +inf, which `min` pulls back to the cap.
    Duration::from_nanos(nanos.min(max_nanos).round() as u64)
}

fn apply_jitter(delay: Duration, fraction: f64, unit: f64) -> Duration {
    let nanos = delay.as_nanos() as f64;
    let jittered = nanos + nanos * fraction * unit;
    Duration::from_nanos(jittered.max(0.0).round() as u64)
}

/// Parses `Retry-After` as (fractional) seconds or as an HTTP date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?.trim();

    if let Ok(seconds) = header.parse::<f64>() {
        // NaN and negative values are not hints; anything too large saturates and is
        // capped by `compute_delay`.
        if seconds.is_nan() || seconds < 0.0 {
            return None;
        }
        return Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}
