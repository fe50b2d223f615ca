//! Centralized constants for the connector harness workspace.
//!
//! Default values shared by the config loader, the search client and the
//! scenario runner, so timing contracts live in one place.

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Hostname of the Splunk instance under test.
pub const ENV_SPLUNK_HOST: &str = "CI_SPLUNK_HOST";

/// Splunk user for management API basic auth.
pub const ENV_SPLUNK_USERNAME: &str = "CI_SPLUNK_USERNAME";

/// Splunk password for management API basic auth.
pub const ENV_SPLUNK_PASSWORD: &str = "CI_SPLUNK_PASSWORD";

/// HEC token rendered into connector configs.
pub const ENV_SPLUNK_HEC_TOKEN: &str = "CI_SPLUNK_HEC_TOKEN";

/// Splunk management port (usually 8089).
pub const ENV_SPLUNK_MGMT_PORT: &str = "CI_SPLUNK_MGMT_PORT";

/// Kafka bootstrap address as seen by the connector.
pub const ENV_KAFKA_BROKER_ADDRESS: &str = "CI_KAFKA_BROKER_ADDRESS";

/// Path to the connector binary under test.
pub const ENV_OTEL_BINARY_FILE: &str = "CI_OTEL_BINARY_FILE";

/// Directory holding `*.yaml.tmpl` connector config templates.
pub const ENV_CONFIG_DIR: &str = "HARNESS_CONFIG_DIR";

/// Docker container that ships the Kafka command line tools.
pub const ENV_KAFKA_CONTAINER: &str = "HARNESS_KAFKA_CONTAINER";

/// Bootstrap address used by the Kafka tools inside the container.
pub const ENV_KAFKA_INTERNAL_BOOTSTRAP: &str = "HARNESS_KAFKA_INTERNAL_BOOTSTRAP";

/// Whether TLS verification is skipped for the search API.
pub const ENV_SKIP_VERIFY: &str = "HARNESS_SKIP_VERIFY";

/// HTTP request timeout in seconds.
pub const ENV_HTTP_TIMEOUT: &str = "HARNESS_HTTP_TIMEOUT";

/// Splunk HEC port rendered into connector configs.
pub const ENV_HEC_PORT: &str = "HARNESS_HEC_PORT";

/// Deadline in seconds for a functional scenario's search assertion.
pub const ENV_TEST_DEADLINE: &str = "HARNESS_TEST_DEADLINE";

/// Deadline in seconds for a performance scenario's search assertion.
pub const ENV_PERF_TEST_DEADLINE: &str = "HARNESS_PERF_TEST_DEADLINE";

/// Seconds between assertion attempts.
pub const ENV_TEST_TICK: &str = "HARNESS_TEST_TICK";

/// Number of messages produced by the performance scenarios.
pub const ENV_NUM_MSG: &str = "NUM_MSG";

/// Size in bytes of each produced performance record.
pub const ENV_RECORD_SIZE: &str = "RECORD_SIZE";

/// Topic used by the performance scenarios.
pub const ENV_TOPIC_NAME: &str = "TOPIC_NAME";

/// Multiplier applied to the minimum ingestion rate table.
pub const ENV_RATE_TOLERANCE: &str = "HARNESS_RATE_TOLERANCE";

/// Maximum accepted ingestion lag in seconds.
pub const ENV_MAX_INGEST_LAG: &str = "HARNESS_MAX_INGEST_LAG";

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed HTTP request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default Splunk HEC port.
pub const DEFAULT_HEC_PORT: u16 = 8088;

/// Default directory for connector config templates, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "testdata/configs";

/// Default name of the Kafka tools container.
pub const DEFAULT_KAFKA_CONTAINER: &str = "cp-kafka-container";

/// Default bootstrap address inside the Kafka tools container.
pub const DEFAULT_KAFKA_INTERNAL_BOOTSTRAP: &str = "localhost:9092";

// =============================================================================
// Polling Defaults
// =============================================================================

/// Deadline for one functional scenario assertion, in seconds.
pub const DEFAULT_TEST_CASE_DURATION_SECS: u64 = 30;

/// Deadline for the performance scenario assertion, in seconds.
pub const DEFAULT_PERF_TEST_CASE_DURATION_SECS: u64 = 300;

/// Interval between assertion attempts, in seconds.
pub const DEFAULT_TEST_CASE_TICK_SECS: u64 = 5;

/// Maximum number of job status checks per search.
pub const DEFAULT_SEARCH_MAX_ATTEMPTS: u32 = 20;

/// Interval between job status checks, in milliseconds.
pub const DEFAULT_SEARCH_POLL_INTERVAL_MS: u64 = 1000;

/// Deadline for a created topic to appear in the broker listing, in seconds.
pub const DEFAULT_TOPIC_READY_SECS: u64 = 30;

// =============================================================================
// Connector Process Defaults
// =============================================================================

/// Pause after spawning the connector so its pipeline can initialize, in seconds.
pub const DEFAULT_WARMUP_SECS: u64 = 5;

/// Time the connector gets to exit after SIGTERM before it is killed, in seconds.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 10;

// =============================================================================
// Performance Defaults
// =============================================================================

/// Default tolerance factor applied to minimum ingestion rates.
pub const DEFAULT_RATE_TOLERANCE: f64 = 1.0;

/// Default maximum ingestion lag in seconds.
pub const DEFAULT_MAX_INGEST_LAG_SECS: f64 = 1.0;
