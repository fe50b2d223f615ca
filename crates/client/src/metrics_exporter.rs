//! Prometheus exposition of the search client metrics.
//!
//! Installs `metrics-exporter-prometheus` as the global recorder and serves
//! everything recorded through [`crate::metrics::MetricsCollector`] in
//! Prometheus text format at `http://<bind>/metrics`.
//!
//! # What this module does NOT handle:
//! - Recording metrics (see [`crate::metrics`])
//! - Pushing to a gateway; the endpoint is scrape-only
//!
//! # Invariants
//! - At most one recorder per process; a second install fails

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};
use tracing::info;

use crate::metrics::METRIC_REQUEST_DURATION;

/// Histogram buckets, in seconds, for search API request latency.
const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Running Prometheus exporter.
///
/// The HTTP listener lives as long as the process; this handle only keeps
/// the bound address.
#[derive(Debug)]
pub struct MetricsExporter {
    bind_addr: SocketAddr,
}

impl MetricsExporter {
    /// Install the exporter as the global recorder and start its listener.
    ///
    /// Must be called from within a Tokio runtime so the listener is
    /// spawned on it.
    ///
    /// # Errors
    /// - `bind_addr` is not a socket address
    /// - another recorder is already installed or the listener cannot start
    pub fn install(bind_addr: &str) -> Result<Self, MetricsExporterError> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| MetricsExporterError::InvalidBindAddress(bind_addr.to_string(), e))?;

        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_REQUEST_DURATION.to_string()),
                REQUEST_DURATION_BUCKETS,
            )?
            .with_http_listener(addr)
            .install()?;

        info!(%addr, "Prometheus metrics exporter listening on /metrics");
        Ok(Self { bind_addr: addr })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Errors raised while installing the exporter.
#[derive(Debug, thiserror::Error)]
pub enum MetricsExporterError {
    #[error("Invalid bind address '{0}': {1}")]
    InvalidBindAddress(String, std::net::AddrParseError),

    #[error("Failed to install Prometheus exporter: {0}")]
    Install(String),
}

impl From<BuildError> for MetricsExporterError {
    fn from(err: BuildError) -> Self {
        MetricsExporterError::Install(err.to_string())
    }
}
