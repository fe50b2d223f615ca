//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse environment variables for harness configuration.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Does NOT handle:
//! - Building the final config (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue naming the variable.

use secrecy::SecretString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::constants::{
    ENV_CONFIG_DIR, ENV_HEC_PORT, ENV_HTTP_TIMEOUT, ENV_KAFKA_BROKER_ADDRESS,
    ENV_KAFKA_CONTAINER, ENV_KAFKA_INTERNAL_BOOTSTRAP, ENV_OTEL_BINARY_FILE,
    ENV_PERF_TEST_DEADLINE, ENV_SKIP_VERIFY, ENV_SPLUNK_HEC_TOKEN, ENV_SPLUNK_HOST,
    ENV_SPLUNK_MGMT_PORT, ENV_SPLUNK_PASSWORD, ENV_SPLUNK_USERNAME, ENV_TEST_DEADLINE,
    ENV_TEST_TICK,
};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Read a variable that must be present.
pub(crate) fn required_env(key: &str) -> Result<String, ConfigError> {
    env_var_or_none(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an optional variable, reporting `message` when it does not parse.
pub(crate) fn parse_env<T: FromStr>(key: &str, message: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: message.to_string(),
            })
        })
        .transpose()
}

/// Parse an optional duration given in (fractional) seconds.
pub(crate) fn parse_secs_env(key: &str) -> Result<Option<Duration>, ConfigError> {
    parse_env::<f64>(key, "must be a number of seconds")?
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: "must be a non-negative number of seconds".to_string(),
            })
        })
        .transpose()
}

/// Apply environment variable configuration to the loader.
///
/// Values already set through builder methods are overwritten only when the
/// variable is present.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(host) = env_var_or_none(ENV_SPLUNK_HOST) {
        loader.set_host(Some(host));
    }
    if let Some(port) = parse_env::<u16>(ENV_SPLUNK_MGMT_PORT, "must be a port number")? {
        loader.set_management_port(Some(port));
    }
    if let Some(port) = parse_env::<u16>(ENV_HEC_PORT, "must be a port number")? {
        loader.set_hec_port(Some(port));
    }
    if let Some(username) = env_var_or_none(ENV_SPLUNK_USERNAME) {
        loader.set_username(Some(username));
    }
    if let Some(password) = env_var_or_none(ENV_SPLUNK_PASSWORD) {
        loader.set_password(Some(SecretString::new(password.into())));
    }
    if let Some(token) = env_var_or_none(ENV_SPLUNK_HEC_TOKEN) {
        loader.set_hec_token(Some(SecretString::new(token.into())));
    }
    if let Some(address) = env_var_or_none(ENV_KAFKA_BROKER_ADDRESS) {
        loader.set_broker_address(Some(address));
    }
    if let Some(container) = env_var_or_none(ENV_KAFKA_CONTAINER) {
        loader.set_kafka_container(Some(container));
    }
    if let Some(bootstrap) = env_var_or_none(ENV_KAFKA_INTERNAL_BOOTSTRAP) {
        loader.set_internal_bootstrap(Some(bootstrap));
    }
    if let Some(binary) = env_var_or_none(ENV_OTEL_BINARY_FILE) {
        loader.set_binary(Some(PathBuf::from(binary)));
    }
    if let Some(dir) = env_var_or_none(ENV_CONFIG_DIR) {
        loader.set_config_dir(Some(PathBuf::from(dir)));
    }
    if let Some(skip) = parse_env::<bool>(ENV_SKIP_VERIFY, "must be true or false")? {
        loader.set_skip_verify(Some(skip));
    }
    if let Some(secs) = parse_env::<u64>(ENV_HTTP_TIMEOUT, "must be a number")? {
        loader.set_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(deadline) = parse_secs_env(ENV_TEST_DEADLINE)? {
        loader.timing_mut().test_case_duration = deadline;
    }
    if let Some(deadline) = parse_secs_env(ENV_PERF_TEST_DEADLINE)? {
        loader.timing_mut().perf_test_case_duration = deadline;
    }
    if let Some(tick) = parse_secs_env(ENV_TEST_TICK)? {
        loader.timing_mut().tick = tick;
    }
    Ok(())
}
