//! Metrics collection for search API calls.
//!
//! This module records, through the `metrics` facade:
//! - Request latency histograms per endpoint
//! - Request and error counters
//! - Job status polls and decoded record counts
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (install a recorder in the binary for that)
//! - Ingestion throughput and lag verdicts (see the harness crate)
//!
//! # Invariants
//! - All metrics use consistent label names: `endpoint`, `method`, `status`, `error_category`
//! - Recording is infallible and a no-op when no recorder is installed

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for request duration histogram.
pub const METRIC_REQUEST_DURATION: &str = "harness_search_request_duration_seconds";

/// Metric name for total request counter.
pub const METRIC_REQUESTS_TOTAL: &str = "harness_search_requests_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "harness_search_errors_total";

/// Metric name for job status poll counter.
pub const METRIC_STATUS_POLLS_TOTAL: &str = "harness_search_status_polls_total";

/// Metric name for decoded record counter.
pub const METRIC_RECORDS_DECODED: &str = "harness_search_records_decoded_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection refused, DNS, TLS and other pre-response failures
    Transport,
    /// HTTP 4xx client errors
    Http4xx,
    /// HTTP 5xx server errors
    Http5xx,
    /// Malformed or unexpected response body
    Protocol,
    /// A record did not fit the requested type
    Decode,
    /// A bounded wait ran out
    Timeout,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error.root() {
            ClientError::Transport { source, .. } if source.is_timeout() => ErrorCategory::Timeout,
            ClientError::Transport { .. } | ClientError::Config(_) => ErrorCategory::Transport,
            ClientError::Api { status, .. } => {
                if (400..500).contains(status) {
                    ErrorCategory::Http4xx
                } else if (500..600).contains(status) {
                    ErrorCategory::Http5xx
                } else {
                    ErrorCategory::Protocol
                }
            }
            ClientError::Protocol { .. } | ClientError::Search { .. } => ErrorCategory::Protocol,
            ClientError::Decode { .. } => ErrorCategory::Decode,
            ClientError::Timeout { .. } => ErrorCategory::Timeout,
        }
    }
}

/// Metrics collector for search API calls.
///
/// A lightweight wrapper around the `metrics` macros with consistent labels.
///
/// # Example
///
/// ```rust,ignore
/// use search_client::metrics::MetricsCollector;
///
/// let collector = MetricsCollector::new();
/// collector.record_request_duration("/services/search/v2/jobs", "POST", Duration::from_millis(150), Some(201));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    /// Create an enabled collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a collector that records nothing.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the duration of an API request.
    ///
    /// `status` is `None` when the request failed before a response arrived.
    pub fn record_request_duration(
        &self,
        endpoint: &str,
        method: &str,
        duration: Duration,
        status: Option<u16>,
    ) {
        if !self.enabled {
            return;
        }

        let status_label = status.map_or("error".to_string(), |s| s.to_string());

        metrics::histogram!(METRIC_REQUEST_DURATION,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "status" => status_label,
        )
        .record(duration.as_secs_f64());
    }

    /// Record a request attempt.
    pub fn record_request(&self, endpoint: &str, method: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_REQUESTS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
        )
        .increment(1);
    }

    /// Record an error.
    pub fn record_error(&self, endpoint: &str, method: &str, category: ErrorCategory) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "error_category" => category.as_str(),
        )
        .increment(1);
    }

    /// Record an error from a `ClientError`, categorizing it automatically.
    pub fn record_client_error(&self, endpoint: &str, method: &str, error: &ClientError) {
        self.record_error(endpoint, method, ErrorCategory::from(error));
    }

    /// Record one job status check and whether the job was done.
    pub fn record_status_poll(&self, done: bool) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_STATUS_POLLS_TOTAL,
            "done" => if done { "true" } else { "false" },
        )
        .increment(1);
    }

    /// Record how many records a results call decoded.
    pub fn record_decoded(&self, kind: &'static str, count: usize) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_RECORDS_DECODED, "kind" => kind).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_as_str() {
        assert_eq!(ErrorCategory::Transport.as_str(), "transport");
        assert_eq!(ErrorCategory::Http4xx.as_str(), "http_4xx");
        assert_eq!(ErrorCategory::Http5xx.as_str(), "http_5xx");
        assert_eq!(ErrorCategory::Protocol.as_str(), "protocol");
        assert_eq!(ErrorCategory::Decode.as_str(), "decode");
        assert_eq!(ErrorCategory::Timeout.as_str(), "timeout");
    }

    #[test]
    fn test_error_categorization() {
        let timeout_err = ClientError::Timeout {
            operation: "search job completion",
            attempts: 20,
        };
        assert_eq!(ErrorCategory::from(&timeout_err), ErrorCategory::Timeout);

        let api_400 = ClientError::Api {
            status: 400,
            url: "test".to_string(),
            message: "bad request".to_string(),
        };
        assert_eq!(ErrorCategory::from(&api_400), ErrorCategory::Http4xx);

        let api_503 = ClientError::Api {
            status: 503,
            url: "test".to_string(),
            message: "unavailable".to_string(),
        };
        assert_eq!(ErrorCategory::from(&api_503), ErrorCategory::Http5xx);

        let protocol = ClientError::protocol("Missing sid in response", "{}");
        assert_eq!(ErrorCategory::from(&protocol), ErrorCategory::Protocol);
    }

    #[test]
    fn test_search_annotation_uses_inner_category() {
        let inner = ClientError::Timeout {
            operation: "search job completion",
            attempts: 3,
        };
        let outer = inner.in_search("index=kafka", Some("1.2"));
        assert_eq!(ErrorCategory::from(&outer), ErrorCategory::Timeout);
    }

    #[test]
    fn test_metrics_collector_enabled() {
        assert!(MetricsCollector::new().is_enabled());
        assert!(!MetricsCollector::disabled().is_enabled());
    }
}
