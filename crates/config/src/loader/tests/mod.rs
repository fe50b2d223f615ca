//! Tests for the configuration loader builder.
//!
//! Invariants:
//! - Tests use `serial_test` to prevent environment variable pollution.
//! - Tests use `global_test_lock()` for additional synchronization.

use std::sync::Mutex;


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// Every required variable set to a plausible value.
pub fn required_vars() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("CI_SPLUNK_HOST", Some("splunk.local")),
        ("CI_SPLUNK_MGMT_PORT", Some("8089")),
        ("CI_SPLUNK_USERNAME", Some("admin")),
        ("CI_SPLUNK_PASSWORD", Some("changeme")),
        ("CI_SPLUNK_HEC_TOKEN", Some("00000000-0000-0000-0000-000000000000")),
        ("CI_KAFKA_BROKER_ADDRESS", Some("kafka:9092")),
        ("CI_OTEL_BINARY_FILE", Some("bin/otelcol")),
    ]
}
