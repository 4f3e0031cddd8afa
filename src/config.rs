//! Connection settings shared by every request a [`Client`](crate::Client) makes.
//!
//! A [`Configuration`] is a cheap, cloneable handle. Setters may be called at any time,
//! from any thread; each request takes one consistent [`Settings`] snapshot when it
//! starts, so a concurrent update is either fully visible to it or not at all.

use crate::redact::mask_secret;
use crate::retry::RetryPolicy;
use crate::{Error, Result};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "OPENGOV_API_KEY";

/// Environment variable consulted for the community (tenant) identifier.
pub const COMMUNITY_ENV: &str = "OPENGOV_COMMUNITY";

/// Production API root.
pub const DEFAULT_BASE_ENDPOINT: &str = "https://api.plce.opengov.com/plce/v2";

/// Scheme placed in front of the credential in the `Authorization` header.
pub const DEFAULT_AUTH_SCHEME: &str = "Token";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A point-in-time copy of the connection settings.
#[derive(Clone)]
pub struct Settings {
    credential: Option<String>,
    base_endpoint: String,
    tenant: Option<String>,
    timeout: Duration,
    auth_scheme: String,
    retry_policy: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential: None,
            base_endpoint: DEFAULT_BASE_ENDPOINT.to_string(),
            tenant: None,
            timeout: DEFAULT_TIMEOUT,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl Settings {
    /// Returns the API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no key is set.
    pub fn credential(&self) -> Result<&str> {
        self.credential.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "API key not set. Call set_credential() or set the {} environment variable.",
                API_KEY_ENV
            ))
        })
    }

    /// Returns the community identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no community is set.
    pub fn tenant(&self) -> Result<&str> {
        self.tenant.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "Community not set. Call set_tenant() or set the {} environment variable.",
                COMMUNITY_ENV
            ))
        })
    }

    /// Returns the API root, without a trailing slash.
    pub fn base_endpoint(&self) -> &str {
        &self.base_endpoint
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the `Authorization` scheme.
    pub fn auth_scheme(&self) -> &str {
        &self.auth_scheme
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("credential", &self.credential.as_deref().map(mask_secret))
            .field("base_endpoint", &self.base_endpoint)
            .field("tenant", &self.tenant)
            .field("timeout", &self.timeout)
            .field("auth_scheme", &self.auth_scheme)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

/// A partial update to a [`RetryPolicy`].
///
/// Only the fields that were set are applied; the rest keep their current values.
/// An explicit zero (`jitter_fraction(0.0)`, `max_retries(0)`) is a real value, not
/// "unset".
///
/// # Examples
///
/// ```
/// use opengov_api::{Configuration, RetryPolicyUpdate};
/// use std::time::Duration;
///
/// let config = Configuration::new();
/// config
///     .configure_retry_policy(
///         RetryPolicyUpdate::new()
///             .max_retries(5)
///             .initial_delay(Duration::from_secs(2)),
///     )
///     .unwrap();
///
/// let policy = config.retry_policy();
/// assert_eq!(policy.max_retries, 5);
/// assert_eq!(policy.max_delay, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryPolicyUpdate {
    max_retries: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    backoff_multiplier: Option<f64>,
    jitter_fraction: Option<f64>,
}

impl RetryPolicyUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Sets the cap on the backoff delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Sets the exponential growth factor.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Sets the jitter fraction.
    pub fn jitter_fraction(mut self, fraction: f64) -> Self {
        self.jitter_fraction = Some(fraction);
        self
    }

    /// Applies the set fields on top of `policy`.
    pub fn merge_into(&self, policy: &RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.unwrap_or(policy.max_retries),
            initial_delay: self.initial_delay.unwrap_or(policy.initial_delay),
            max_delay: self.max_delay.unwrap_or(policy.max_delay),
            backoff_multiplier: self.backoff_multiplier.unwrap_or(policy.backoff_multiplier),
            jitter_fraction: self.jitter_fraction.unwrap_or(policy.jitter_fraction),
        }
    }
}

/// Shared, mutable connection settings.
///
/// # Examples
///
/// ```
/// use opengov_api::Configuration;
/// use std::time::Duration;
///
/// let config = Configuration::new();
/// config.set_credential("secret-key");
/// config.set_tenant("springfield");
/// config.set_base_endpoint("https://api.example.com/v2/");
/// config.set_timeout(Duration::from_secs(60));
///
/// assert_eq!(config.base_endpoint(), "https://api.example.com/v2");
/// assert_eq!(config.tenant().unwrap(), "springfield");
/// ```
#[derive(Clone, Default)]
pub struct Configuration {
    inner: Arc<RwLock<Settings>>,
}

impl Configuration {
    /// Creates a configuration with defaults and no credential or community.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration seeded from `OPENGOV_API_KEY` and `OPENGOV_COMMUNITY`.
    ///
    /// Missing or empty variables are left unset; setters override them later.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let settings = Settings {
            credential: present(API_KEY_ENV),
            tenant: present(COMMUNITY_ENV),
            ..Settings::default()
        };
        tracing::debug!(
            credential_from_env = settings.credential.is_some(),
            tenant_from_env = settings.tenant.is_some(),
            "Configuration seeded from environment"
        );
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Returns a consistent copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Sets the API key. An empty key unsets it.
    pub fn set_credential(&self, credential: impl Into<String>) {
        let credential = non_empty(credential.into());
        tracing::info!(
            credential = %credential.as_deref().map(mask_secret).unwrap_or_default(),
            "API key configured"
        );
        self.update(|s| s.credential = credential);
    }

    /// Sets the API root. A single trailing slash is dropped.
    pub fn set_base_endpoint(&self, endpoint: impl Into<String>) {
        let mut endpoint = endpoint.into();
        if endpoint.ends_with('/') {
            endpoint.pop();
        }
        tracing::info!(base_endpoint = %endpoint, "Base endpoint configured");
        self.update(|s| s.base_endpoint = endpoint);
    }

    /// Sets the community identifier. An empty value unsets it.
    pub fn set_tenant(&self, tenant: impl Into<String>) {
        let tenant = non_empty(tenant.into());
        tracing::info!(tenant = ?tenant, "Community configured");
        self.update(|s| s.tenant = tenant);
    }

    /// Sets the per-attempt timeout.
    pub fn set_timeout(&self, timeout: Duration) {
        tracing::info!(timeout_ms = timeout.as_millis(), "Timeout configured");
        self.update(|s| s.timeout = timeout);
    }

    /// Sets the `Authorization` scheme (default `Token`).
    pub fn set_auth_scheme(&self, scheme: impl Into<String>) {
        let scheme = scheme.into();
        tracing::info!(auth_scheme = %scheme, "Authorization scheme configured");
        self.update(|s| s.auth_scheme = scheme);
    }

    /// Merges `update` into the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the merged policy is invalid; the current
    /// policy is then left untouched.
    pub fn configure_retry_policy(&self, update: RetryPolicyUpdate) -> Result<()> {
        let policy = self.update(|s| {
            let merged = update.merge_into(&s.retry_policy);
            merged.validate()?;
            s.retry_policy = merged.clone();
            Ok::<_, Error>(merged)
        })?;

        tracing::info!(
            max_retries = policy.max_retries,
            initial_delay_ms = policy.initial_delay.as_millis(),
            max_delay_ms = policy.max_delay.as_millis(),
            backoff_multiplier = policy.backoff_multiplier,
            jitter_fraction = policy.jitter_fraction,
            "Retry policy updated"
        );
        Ok(())
    }

    /// Returns the API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no key is set.
    pub fn credential(&self) -> Result<String> {
        self.snapshot().credential().map(str::to_owned)
    }

    /// Returns the community identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no community is set.
    pub fn tenant(&self) -> Result<String> {
        self.snapshot().tenant().map(str::to_owned)
    }

    /// Returns the API root.
    pub fn base_endpoint(&self) -> String {
        self.snapshot().base_endpoint
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.snapshot().timeout
    }

    /// Returns the `Authorization` scheme.
    pub fn auth_scheme(&self) -> String {
        self.snapshot().auth_scheme
    }

    /// Returns a copy of the retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.snapshot().retry_policy
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Configuration").field(&self.snapshot()).finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Configuration::new();
        assert_eq!(config.base_endpoint(), DEFAULT_BASE_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.auth_scheme(), "Token");
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_missing_credential_names_remedy() {
        let config = Configuration::new();
        match config.credential() {
            Err(Error::Configuration(message)) => {
                assert!(message.contains("set_credential()"));
                assert!(message.contains(API_KEY_ENV));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_tenant_names_remedy() {
        let config = Configuration::new();
        match config.tenant() {
            Err(Error::Configuration(message)) => {
                assert!(message.contains("set_tenant()"));
                assert!(message.contains(COMMUNITY_ENV));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = Configuration::new();
        config.set_credential("key");
        config.set_credential("");
        assert!(config.credential().is_err());

        config.set_tenant("   ");
        assert!(config.tenant().is_err());
    }

    #[test]
    fn test_base_endpoint_strips_one_trailing_slash() {
        let config = Configuration::new();
        config.set_base_endpoint("https://api.example.com/v2/");
        assert_eq!(config.base_endpoint(), "https://api.example.com/v2");

        config.set_base_endpoint("https://api.example.com/v2");
        assert_eq!(config.base_endpoint(), "https://api.example.com/v2");
    }

    #[test]
    fn test_seeded_from_environment_lookup() {
        let vars = HashMap::from([
            (API_KEY_ENV, "env-key".to_string()),
            (COMMUNITY_ENV, "".to_string()),
        ]);
        let config = Configuration::from_lookup(|name| vars.get(name).cloned());
        assert_eq!(config.credential().unwrap(), "env-key");
        assert!(config.tenant().is_err());

        // explicit setters win over the environment
        config.set_credential("explicit");
        assert_eq!(config.credential().unwrap(), "explicit");
    }

    #[test]
    fn test_retry_update_changes_only_given_field() {
        let config = Configuration::new();
        let before = config.retry_policy();

        config
            .configure_retry_policy(RetryPolicyUpdate::new().max_delay(Duration::from_secs(5)))
            .unwrap();

        let after = config.retry_policy();
        assert_eq!(after.max_delay, Duration::from_secs(5));
        assert_eq!(after.max_retries, before.max_retries);
        assert_eq!(after.initial_delay, before.initial_delay);
        assert_eq!(after.backoff_multiplier, before.backoff_multiplier);
        assert_eq!(after.jitter_fraction, before.jitter_fraction);
    }

    #[test]
    fn test_explicit_zero_is_applied() {
        let config = Configuration::new();
        config
            .configure_retry_policy(RetryPolicyUpdate::new().jitter_fraction(0.0).max_retries(0))
            .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.jitter_fraction, 0.0);
        assert_eq!(policy.max_retries, 0);
    }

    #[test]
    fn test_empty_update_is_a_no_op() {
        let config = Configuration::new();
        config.configure_retry_policy(RetryPolicyUpdate::new()).unwrap();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_invalid_update_keeps_previous_policy() {
        let config = Configuration::new();
        let result = config.configure_retry_policy(
            RetryPolicyUpdate::new()
                .max_retries(7)
                .backoff_multiplier(0.5),
        );

        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_clones_share_state() {
        let config = Configuration::new();
        let other = config.clone();
        other.set_tenant("shelbyville");
        assert_eq!(config.tenant().unwrap(), "shelbyville");
    }

    #[test]
    fn test_debug_masks_credential() {
        let config = Configuration::new();
        config.set_credential("super-secret-key-9876");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***9876"));
    }
}
