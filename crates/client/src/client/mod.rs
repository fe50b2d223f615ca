//! The search job client.
//!
//! [`SearchJobClient`] owns the HTTP connection pool and credentials and
//! exposes the three search phases (submit, wait, fetch) plus the combined
//! [`SearchJobClient::search`].
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//! - `search`: Search methods
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Retrying a search until expected data appears (callers wrap
//!   [`SearchJobClient::search`] in [`crate::poll::poll`])

pub mod builder;
mod search;

use std::time::Duration;

use crate::auth::BasicAuth;
use crate::metrics::MetricsCollector;

/// Client for the search jobs REST API.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use search_client::SearchJobClient;
///
/// let client = SearchJobClient::builder()
///     .from_config(&harness_config)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SearchJobClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) auth: BasicAuth,
    pub(crate) max_attempts: u32,
    pub(crate) poll_interval: Duration,
    pub(crate) metrics: Option<MetricsCollector>,
}

impl SearchJobClient {
    /// Create a new client builder.
    pub fn builder() -> builder::SearchJobClientBuilder {
        builder::SearchJobClientBuilder::new()
    }

    /// Base URL of the management API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Maximum number of status checks per search.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between status checks.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Collector receiving request metrics, if one was attached.
    pub fn metrics(&self) -> Option<&MetricsCollector> {
        self.metrics.as_ref()
    }
}
