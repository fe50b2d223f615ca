//! Search job client for the connector harness.
//!
//! Talks to the Splunk search jobs REST API over HTTPS with basic auth:
//! submit a query, wait (bounded) for the job to finish, and decode its
//! records into caller-chosen types. Also hosts the bounded retry primitive
//! used for every eventually consistent check in the harness, and the
//! logging/tracing setup shared by the binary.

mod auth;
pub mod client;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
pub mod poll;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::BasicAuth;
pub use client::SearchJobClient;
pub use client::builder::SearchJobClientBuilder;
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use metrics_exporter::{MetricsExporter, MetricsExporterError};
pub use models::{EventRecord, ResultsKind, SearchQuery, Statistic};
pub use poll::{Attempt, PollError, PollLimit, PollOutcome, PollPolicy, poll};
