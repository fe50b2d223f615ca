//! Configuration management for the connector harness.
//!
//! This crate builds one explicit [`HarnessConfig`] from environment
//! variables (optionally seeded from a `.env` file). Every other component
//! receives it by reference instead of reading the environment itself.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{
    ConnectorConfig, HarnessConfig, KafkaConfig, PerformanceConfig, SplunkConnection,
    TimingConfig,
};
