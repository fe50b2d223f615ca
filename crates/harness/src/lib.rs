//! Verification harness for the Kafka-to-Splunk connector.
//!
//! A scenario renders a connector config, runs the connector under
//! supervision, produces records onto Kafka and then polls Splunk until
//! the records are searchable with the expected content, routing and
//! timestamps, or until a deadline passes. The performance scenarios
//! additionally derive ingestion rate and lag from Splunk's statistics.

pub mod broker;
pub mod error;
pub mod ingest;
pub mod scenarios;
pub mod supervisor;
pub mod template;

pub use broker::{BulkPublish, Header, KafkaBroker, MessageBroker};
pub use error::{HarnessError, Result};
pub use ingest::{IngestStats, MetricsError, RateThresholds, Verdict};
pub use scenarios::{Scenario, ScenarioReport, ScenarioRunner};
pub use supervisor::{ConnectorSupervisor, ProcessState, ShutdownOutcome, SupervisedProcess};
pub use template::{Substitutions, render};
