//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` that merges `.env`, environment
//!   variables and direct builder calls.
//! - Build the final `HarnessConfig`, failing on the first missing required value.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Performance scenario settings (see `PerformanceConfig::from_env`).
//!
//! Invariants / Assumptions:
//! - Whichever of `from_env()` and the `with_*` methods runs last wins.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_CONFIG_DIR, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_HEC_PORT, DEFAULT_KAFKA_CONTAINER,
    DEFAULT_KAFKA_INTERNAL_BOOTSTRAP, DEFAULT_TIMEOUT_SECS, DEFAULT_WARMUP_SECS,
    ENV_KAFKA_BROKER_ADDRESS, ENV_OTEL_BINARY_FILE, ENV_SPLUNK_HEC_TOKEN, ENV_SPLUNK_HOST,
    ENV_SPLUNK_MGMT_PORT, ENV_SPLUNK_PASSWORD, ENV_SPLUNK_USERNAME, MAX_TIMEOUT_SECS,
};
use crate::types::{
    ConnectorConfig, HarnessConfig, KafkaConfig, SplunkConnection, TimingConfig,
};

/// Configuration loader that builds a [`HarnessConfig`] from the environment.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    host: Option<String>,
    management_port: Option<u16>,
    hec_port: Option<u16>,
    username: Option<String>,
    password: Option<SecretString>,
    hec_token: Option<SecretString>,
    broker_address: Option<String>,
    kafka_container: Option<String>,
    internal_bootstrap: Option<String>,
    binary: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    skip_verify: Option<bool>,
    timeout: Option<Duration>,
    warmup: Option<Duration>,
    grace_period: Option<Duration>,
    timing: Option<TimingConfig>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    ///
    /// # Errors
    ///
    /// - `ConfigError::DotenvParse` if the file has invalid syntax.
    /// - `ConfigError::DotenvIo` if the file exists but cannot be read.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Set the Splunk host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the Splunk management port.
    pub fn with_management_port(mut self, port: u16) -> Self {
        self.management_port = Some(port);
        self
    }

    /// Set the Splunk username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the Splunk password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into().into()));
        self
    }

    /// Set the HEC token.
    pub fn with_hec_token(mut self, token: impl Into<String>) -> Self {
        self.hec_token = Some(SecretString::new(token.into().into()));
        self
    }

    /// Set the Kafka broker address used by the connector.
    pub fn with_broker_address(mut self, address: impl Into<String>) -> Self {
        self.broker_address = Some(address.into());
        self
    }

    /// Set the connector binary path.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Set the config template directory.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Set whether to skip TLS verification.
    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connector warm-up pause.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = Some(warmup);
        self
    }

    /// Set the connector graceful-stop window.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = Some(grace);
        self
    }

    /// Override every deadline and polling interval at once.
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = Some(timing);
        self
    }

    pub(crate) fn set_host(&mut self, value: Option<String>) {
        self.host = value;
    }

    pub(crate) fn set_management_port(&mut self, value: Option<u16>) {
        self.management_port = value;
    }

    pub(crate) fn set_hec_port(&mut self, value: Option<u16>) {
        self.hec_port = value;
    }

    pub(crate) fn set_username(&mut self, value: Option<String>) {
        self.username = value;
    }

    pub(crate) fn set_password(&mut self, value: Option<SecretString>) {
        self.password = value;
    }

    pub(crate) fn set_hec_token(&mut self, value: Option<SecretString>) {
        self.hec_token = value;
    }

    pub(crate) fn set_broker_address(&mut self, value: Option<String>) {
        self.broker_address = value;
    }

    pub(crate) fn set_kafka_container(&mut self, value: Option<String>) {
        self.kafka_container = value;
    }

    pub(crate) fn set_internal_bootstrap(&mut self, value: Option<String>) {
        self.internal_bootstrap = value;
    }

    pub(crate) fn set_binary(&mut self, value: Option<PathBuf>) {
        self.binary = value;
    }

    pub(crate) fn set_config_dir(&mut self, value: Option<PathBuf>) {
        self.config_dir = value;
    }

    pub(crate) fn set_skip_verify(&mut self, value: Option<bool>) {
        self.skip_verify = value;
    }

    pub(crate) fn set_timeout(&mut self, value: Option<Duration>) {
        self.timeout = value;
    }

    /// Timing being assembled, starting from the defaults.
    pub(crate) fn timing_mut(&mut self) -> &mut TimingConfig {
        self.timing.get_or_insert_with(TimingConfig::default)
    }

    /// Build the final configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingEnvVar` naming the first absent required value,
    ///   checked in the order host, port, username, password, HEC token,
    ///   broker address, binary.
    /// - `ConfigError::InvalidTimeout` if the HTTP timeout is zero or too large.
    pub fn build(self) -> Result<HarnessConfig, ConfigError> {
        let host = require(self.host, ENV_SPLUNK_HOST)?;
        let management_port = require(self.management_port, ENV_SPLUNK_MGMT_PORT)?;
        let username = require(self.username, ENV_SPLUNK_USERNAME)?;
        let password = require(self.password, ENV_SPLUNK_PASSWORD)?;
        let hec_token = require(self.hec_token, ENV_SPLUNK_HEC_TOKEN)?;
        let broker_address = require(self.broker_address, ENV_KAFKA_BROKER_ADDRESS)?;
        let binary = require(self.binary, ENV_OTEL_BINARY_FILE)?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        validate_timeout(timeout)?;

        Ok(HarnessConfig {
            splunk: SplunkConnection {
                host,
                management_port,
                hec_port: self.hec_port.unwrap_or(DEFAULT_HEC_PORT),
                username,
                password,
                hec_token,
                skip_verify: self.skip_verify.unwrap_or(true),
                timeout,
            },
            kafka: KafkaConfig {
                broker_address,
                container: self
                    .kafka_container
                    .unwrap_or_else(|| DEFAULT_KAFKA_CONTAINER.to_string()),
                internal_bootstrap: self
                    .internal_bootstrap
                    .unwrap_or_else(|| DEFAULT_KAFKA_INTERNAL_BOOTSTRAP.to_string()),
            },
            connector: ConnectorConfig {
                binary,
                config_dir: self
                    .config_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
                warmup: self
                    .warmup
                    .unwrap_or(Duration::from_secs(DEFAULT_WARMUP_SECS)),
                grace_period: self
                    .grace_period
                    .unwrap_or(Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS)),
            },
            timing: self.timing.unwrap_or_default(),
        })
    }
}

fn require<T>(value: Option<T>, var: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::InvalidTimeout {
            message: "must be greater than zero".to_string(),
        });
    }
    if timeout.as_secs() > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidTimeout {
            message: format!(
                "must be at most {} seconds (got {})",
                MAX_TIMEOUT_SECS,
                timeout.as_secs()
            ),
        });
    }
    Ok(())
}
