//! CLI exit codes for scripting and CI.
//!
//! Responsibilities:
//! - Define structured exit codes that separate harness breakage from a
//!   misbehaving pipeline.
//! - Map harness, client and configuration errors to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-7 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use connector_harness::HarnessError;
use harness_config::ConfigError;
use search_client::ClientError;

/// Structured exit codes for `connector-harness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Unhandled failure, broker tooling included.
    GeneralError = 1,

    /// Missing or invalid configuration, or a template that does not render.
    ConfigError = 2,

    /// Splunk could not be reached.
    TransportError = 3,

    /// Splunk answered with an error status or an unexpected body.
    ProtocolError = 4,

    /// A search job or an eventual-consistency check ran out of time.
    Timeout = 5,

    /// Indexed data or ingestion metrics did not meet expectations.
    ///
    /// This is the only code that blames the connector under test.
    PipelineFailure = 6,

    /// The connector could not be started or stopped cleanly.
    SupervisionError = 7,

    /// Interrupted by SIGINT/Ctrl+C (128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err.root() {
            ClientError::Transport { .. } => ExitCode::TransportError,
            ClientError::Api { .. } | ClientError::Protocol { .. } | ClientError::Decode { .. } => {
                ExitCode::ProtocolError
            }
            ClientError::Timeout { .. } => ExitCode::Timeout,
            ClientError::Config(_) => ExitCode::ConfigError,
            ClientError::Search { .. } => ExitCode::GeneralError,
        }
    }
}

impl From<&HarnessError> for ExitCode {
    fn from(err: &HarnessError) -> Self {
        match err {
            HarnessError::Spawn { .. }
            | HarnessError::EarlyExit { .. }
            | HarnessError::Signal { .. }
            | HarnessError::UncleanExit { .. }
            | HarnessError::InvalidTransition { .. } => ExitCode::SupervisionError,
            HarnessError::Timeout { .. } => ExitCode::Timeout,
            HarnessError::Assertion(_) | HarnessError::Metrics(_) => ExitCode::PipelineFailure,
            HarnessError::Template { .. } | HarnessError::Config(_) => ExitCode::ConfigError,
            HarnessError::Broker { .. } => ExitCode::GeneralError,
            HarnessError::Client(e) => ExitCode::from(e),
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// The exit code of the first known error in the chain, or
    /// [`ExitCode::GeneralError`].
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<HarnessError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(err);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ConfigError;
            }
        }
        ExitCode::GeneralError
    }
}
