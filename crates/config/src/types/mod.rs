//! Configuration type definitions for the connector harness.
//!
//! Responsibilities:
//! - Define the `HarnessConfig` aggregate and its per-concern sections.
//! - Derive URLs (management API, HEC endpoint) from host/port settings.
//!
//! Does NOT handle:
//! - Reading values from the environment (see `loader` module).
//! - Talking to Splunk, Kafka, or the connector process (see client and harness crates).
//!
//! Invariants:
//! - All secret values use `secrecy::SecretString` so they never reach logs.
//! - A `HarnessConfig` is constructed once per run and shared by reference.

pub(crate) mod connection;
mod connector;
mod kafka;
mod performance;
mod timing;

pub use connection::SplunkConnection;
pub use connector::ConnectorConfig;
pub use kafka::KafkaConfig;
pub use performance::PerformanceConfig;
pub use timing::TimingConfig;

/// Complete harness configuration, built once by [`crate::ConfigLoader`].
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Splunk management API and HEC settings.
    pub splunk: SplunkConnection,
    /// Kafka broker settings.
    pub kafka: KafkaConfig,
    /// Connector binary and config template settings.
    pub connector: ConnectorConfig,
    /// Deadlines and polling intervals.
    pub timing: TimingConfig,
}
