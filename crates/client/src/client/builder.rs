//! Client builder for constructing [`SearchJobClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (base URL, credentials)
//! - Normalizing the base URL (removing trailing slashes)
//! - Configuring the underlying HTTP client (timeouts, TLS verification)
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`SearchJobClient`] methods)
//!
//! # Invariants
//! - `base_url`, `username` and `password` must be provided before `build()`
//! - The base URL is always normalized to have no trailing slashes
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use harness_config::HarnessConfig;
use harness_config::constants::{
    DEFAULT_SEARCH_MAX_ATTEMPTS, DEFAULT_SEARCH_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS,
};
use secrecy::SecretString;

use crate::auth::BasicAuth;
use crate::client::SearchJobClient;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

const MAX_REDIRECTS: usize = 5;

/// Builder for creating a new [`SearchJobClient`].
pub struct SearchJobClientBuilder {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<SecretString>,
    skip_verify: bool,
    timeout: Duration,
    max_attempts: u32,
    poll_interval: Duration,
    metrics: Option<MetricsCollector>,
}

impl Default for SearchJobClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_SEARCH_MAX_ATTEMPTS,
            poll_interval: Duration::from_millis(DEFAULT_SEARCH_POLL_INTERVAL_MS),
            metrics: None,
        }
    }
}

impl SearchJobClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the management API base URL, e.g. `https://localhost:8089`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set basic-auth credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// The search head in the test stack uses a self-signed certificate.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many status checks a search may make before timing out.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the pause between status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the metrics collector.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Copy connection, credential and search timing settings from the
    /// harness configuration.
    pub fn from_config(mut self, config: &HarnessConfig) -> Self {
        self.base_url = Some(config.splunk.base_url());
        self.username = Some(config.splunk.username.clone());
        self.password = Some(config.splunk.password.clone());
        self.skip_verify = config.splunk.skip_verify;
        self.timeout = config.splunk.timeout;
        self.max_attempts = config.timing.search_max_attempts;
        self.poll_interval = config.timing.search_poll_interval;
        self
    }

    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`SearchJobClient`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL or credentials are
    /// missing, or the HTTP client cannot be built.
    pub fn build(self) -> Result<SearchJobClient> {
        let base_url = self
            .base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(base_url);

        let username = self
            .username
            .ok_or_else(|| ClientError::Config("username is required".to_string()))?;
        let password = self
            .password
            .ok_or_else(|| ClientError::Config("password is required".to_string()))?;

        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if self.skip_verify {
            if base_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(SearchJobClient {
            http,
            base_url,
            auth: BasicAuth::new(username, password),
            max_attempts: self.max_attempts,
            poll_interval: self.poll_interval,
            metrics: self.metrics,
        })
    }
}
