//! Error types for the harness.
//!
//! Responsibilities:
//! - Define the failure taxonomy for process supervision, templating, the
//!   message broker, metrics and scenario assertions.
//! - Absorb client and configuration errors so scenario code can use `?`.
//!
//! Invariants:
//! - `Assertion` and `Metrics` mean the pipeline misbehaved; every other
//!   variant means the harness or its environment is broken.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use harness_config::ConfigError;
use search_client::{ClientError, PollError};
use thiserror::Error;

use crate::ingest::MetricsError;
use crate::supervisor::ProcessState;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors raised while running a scenario.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The OS could not start the connector process.
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signalling or reaping the connector process failed.
    #[error("Failed to {action} process {pid}: {source}")]
    Signal {
        pid: u32,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The process exited on its own after SIGTERM, but not with status 0.
    #[error("Process {pid} exited uncleanly after SIGTERM: {status}")]
    UncleanExit { pid: u32, status: ExitStatus },

    /// The process exited before its warm-up finished.
    #[error("Process {pid} exited during warm-up: {status}")]
    EarlyExit { pid: u32, status: ExitStatus },

    /// A lifecycle operation was requested in a state that does not allow it.
    #[error("Cannot {action} a process in state {state}")]
    InvalidTransition {
        action: &'static str,
        state: ProcessState,
    },

    /// An eventually consistent check did not hold before its deadline.
    #[error(
        "Timed out waiting for {what} after {attempts} attempts in {:.1}s: {last_diagnostic}",
        .elapsed.as_secs_f64()
    )]
    Timeout {
        what: String,
        attempts: u32,
        elapsed: Duration,
        last_diagnostic: String,
    },

    /// Data reached the index but does not match what was produced.
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Ingestion statistics could not be parsed or evaluated.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// A config template could not be rendered.
    #[error("Template {path}: {message}")]
    Template { path: PathBuf, message: String },

    /// A Kafka request or tool invocation failed.
    #[error("Broker operation `{operation}` failed: {message}")]
    Broker { operation: String, message: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HarnessError {
    /// Convert a poll failure, naming what was being waited for.
    pub fn from_poll(err: PollError<HarnessError>, what: impl Into<String>) -> Self {
        match err {
            PollError::Exhausted {
                attempts,
                elapsed,
                last_diagnostic,
            } => Self::Timeout {
                what: what.into(),
                attempts,
                elapsed,
                last_diagnostic,
            },
            PollError::Aborted(e) => e,
        }
    }

    /// Taxonomy name used in logs and summaries.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Spawn { .. } | Self::EarlyExit { .. } => "SpawnError",
            Self::Signal { .. } | Self::UncleanExit { .. } | Self::InvalidTransition { .. } => {
                "SupervisionError"
            }
            Self::Timeout { .. } => "TimeoutError",
            Self::Assertion(_) => "AssertionError",
            Self::Metrics(_) => "MetricsError",
            Self::Template { .. } => "TemplateError",
            Self::Broker { .. } => "BrokerError",
            Self::Client(e) => e.category(),
            Self::Config(_) => "ConfigError",
        }
    }

    /// Whether the failure reflects the pipeline under test rather than the
    /// harness itself.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            Self::Assertion(_) | Self::Metrics(_) | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_poll_exhausted_becomes_timeout() {
        let err = HarnessError::from_poll(
            PollError::Exhausted {
                attempts: 7,
                elapsed: Duration::from_secs(30),
                last_diagnostic: "0 events for | search index=kafka".to_string(),
            },
            "events on kafka-test-topic",
        );

        assert_eq!(err.category(), "TimeoutError");
        let msg = err.to_string();
        assert!(msg.contains("events on kafka-test-topic"));
        assert!(msg.contains("7 attempts"));
        assert!(msg.contains("30.0s"));
        assert!(msg.contains("| search index=kafka"));
    }

    #[test]
    fn test_from_poll_aborted_unwraps_inner() {
        let err = HarnessError::from_poll(
            PollError::Aborted(HarnessError::Assertion("expected 1 event, got 2".to_string())),
            "events",
        );
        assert!(matches!(err, HarnessError::Assertion(_)));
    }

    #[test]
    fn test_client_category_passes_through() {
        let err: HarnessError = ClientError::protocol("Missing sid in response", "{}").into();
        assert_eq!(err.category(), "ProtocolError");
        assert!(!err.is_pipeline_failure());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = HarnessError::InvalidTransition {
            action: "stop",
            state: ProcessState::Stopped,
        };
        assert_eq!(err.to_string(), "Cannot stop a process in state Stopped");
    }
}
