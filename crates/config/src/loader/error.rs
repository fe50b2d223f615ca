//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Name the variable behind every missing or malformed setting.
//! - Report `.env` problems without echoing the file.
//!
//! Invariants:
//! - Dotenv errors NEVER include raw .env line contents; they hold the
//!   HEC token and the Splunk password.

use std::io::ErrorKind;
use thiserror::Error;

/// Errors raised while building a [`crate::HarnessConfig`] or
/// [`crate::PerformanceConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A variable is set but does not parse or is out of range.
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    /// The per-request HTTP timeout is outside the accepted range.
    #[error("Invalid HTTP timeout: {message}")]
    InvalidTimeout { message: String },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
