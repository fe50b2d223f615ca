//! Performance scenario settings.
//!
//! These are read separately from [`super::HarnessConfig`] because only the
//! throughput and lag scenarios need them; functional runs must not fail for
//! their absence.

use crate::constants::{
    DEFAULT_MAX_INGEST_LAG_SECS, DEFAULT_RATE_TOLERANCE, ENV_MAX_INGEST_LAG, ENV_NUM_MSG,
    ENV_RATE_TOLERANCE, ENV_RECORD_SIZE, ENV_TOPIC_NAME,
};
use crate::loader::ConfigError;
use crate::loader::env::{parse_env, required_env};

/// Load profile for the performance scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceConfig {
    /// Number of records produced.
    pub num_msg: u64,
    /// Size of each record in bytes.
    pub record_size: u64,
    /// Topic the records are produced to.
    pub topic_name: String,
    /// Multiplier applied to the minimum ingestion rate.
    pub rate_tolerance: f64,
    /// Maximum accepted ingestion lag in seconds.
    pub max_ingest_lag_secs: f64,
}

impl PerformanceConfig {
    /// Read the performance settings from the environment.
    ///
    /// `NUM_MSG`, `RECORD_SIZE` and `TOPIC_NAME` are required; tolerance and
    /// maximum lag fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let num_msg: u64 = parse_env(ENV_NUM_MSG, "must be a positive integer")?
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_NUM_MSG.to_string()))?;
        let record_size: u64 = parse_env(ENV_RECORD_SIZE, "must be a positive integer")?
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_RECORD_SIZE.to_string()))?;
        let topic_name = required_env(ENV_TOPIC_NAME)?;
        let rate_tolerance: f64 =
            parse_env(ENV_RATE_TOLERANCE, "must be a number")?.unwrap_or(DEFAULT_RATE_TOLERANCE);
        let max_ingest_lag_secs: f64 = parse_env(ENV_MAX_INGEST_LAG, "must be a number")?
            .unwrap_or(DEFAULT_MAX_INGEST_LAG_SECS);

        let config = Self {
            num_msg,
            record_size,
            topic_name,
            rate_tolerance,
            max_ingest_lag_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Total bytes produced by one run.
    pub fn volume_bytes(&self) -> u64 {
        self.num_msg.saturating_mul(self.record_size)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_msg == 0 {
            return Err(ConfigError::InvalidValue {
                var: ENV_NUM_MSG.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.record_size == 0 {
            return Err(ConfigError::InvalidValue {
                var: ENV_RECORD_SIZE.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if !(self.rate_tolerance.is_finite() && self.rate_tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                var: ENV_RATE_TOLERANCE.to_string(),
                message: "must be a positive number".to_string(),
            });
        }
        if !(self.max_ingest_lag_secs.is_finite() && self.max_ingest_lag_secs >= 0.0) {
            return Err(ConfigError::InvalidValue {
                var: ENV_MAX_INGEST_LAG.to_string(),
                message: "must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_reads_required_values() {
        temp_env::with_vars(
            [
                (ENV_NUM_MSG, Some("1000000")),
                (ENV_RECORD_SIZE, Some("100")),
                (ENV_TOPIC_NAME, Some("kafka-perf-test")),
                (ENV_RATE_TOLERANCE, None),
                (ENV_MAX_INGEST_LAG, None),
            ],
            || {
                let config = PerformanceConfig::from_env().unwrap();
                assert_eq!(config.num_msg, 1_000_000);
                assert_eq!(config.record_size, 100);
                assert_eq!(config.topic_name, "kafka-perf-test");
                assert_eq!(config.rate_tolerance, DEFAULT_RATE_TOLERANCE);
                assert_eq!(config.max_ingest_lag_secs, DEFAULT_MAX_INGEST_LAG_SECS);
                assert_eq!(config.volume_bytes(), 100_000_000);
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_missing_topic_is_error() {
        temp_env::with_vars(
            [
                (ENV_NUM_MSG, Some("10")),
                (ENV_RECORD_SIZE, Some("100")),
                (ENV_TOPIC_NAME, None),
            ],
            || {
                let err = PerformanceConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == ENV_TOPIC_NAME));
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_non_numeric_count() {
        temp_env::with_vars(
            [
                (ENV_NUM_MSG, Some("lots")),
                (ENV_RECORD_SIZE, Some("100")),
                (ENV_TOPIC_NAME, Some("t")),
            ],
            || {
                let err = PerformanceConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == ENV_NUM_MSG));
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_tolerance() {
        temp_env::with_vars(
            [
                (ENV_NUM_MSG, Some("10")),
                (ENV_RECORD_SIZE, Some("100")),
                (ENV_TOPIC_NAME, Some("t")),
                (ENV_RATE_TOLERANCE, Some("0")),
            ],
            || {
                let err = PerformanceConfig::from_env().unwrap_err();
                assert!(
                    matches!(err, ConfigError::InvalidValue { ref var, .. } if var == ENV_RATE_TOLERANCE)
                );
            },
        );
    }
}
