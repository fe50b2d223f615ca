//! Shared test utilities for connector-harness CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic command factory that prevents dotenv loading.
//! - Supply a complete set of required `CI_*` variables.
//!
//! Does NOT:
//! - Start Kafka, Splunk or the connector.
//!
//! Invariants / Assumptions:
//! - `HARNESS_SPLUNK_URL` is cleared unless a test points it at a mock server.

use assert_cmd::Command;

#[allow(unused_imports)]
pub use search_client::testing::{job_status, load_fixture};

pub const SID: &str = "1717171717.101";
pub const JOBS: &str = "/services/search/v2/jobs";

const REQUIRED: [(&str, &str); 7] = [
    ("CI_SPLUNK_HOST", "127.0.0.1"),
    ("CI_SPLUNK_MGMT_PORT", "8089"),
    ("CI_SPLUNK_USERNAME", "admin"),
    ("CI_SPLUNK_PASSWORD", "changeme"),
    ("CI_SPLUNK_HEC_TOKEN", "00000000-0000-0000-0000-000000000000"),
    ("CI_KAFKA_BROKER_ADDRESS", "kafka:9092"),
    ("CI_OTEL_BINARY_FILE", "/usr/local/bin/otelcol-kafka"),
];

/// A `connector-harness` command with no configuration at all.
pub fn bare_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("connector-harness");
    cmd.env("DOTENV_DISABLED", "1");
    for (var, _) in REQUIRED {
        cmd.env_remove(var);
    }
    cmd.env_remove("HARNESS_SPLUNK_URL")
        .env_remove("HARNESS_OTLP_ENDPOINT")
        .env_remove("HARNESS_METRICS_BIND")
        .env_remove("HARNESS_FEATURE_GATES")
        .env_remove("NUM_MSG")
        .env_remove("RECORD_SIZE")
        .env_remove("TOPIC_NAME")
        .env_remove("RUST_LOG");
    cmd
}

/// A `connector-harness` command with every required variable set.
pub fn harness_cmd() -> Command {
    let mut cmd = bare_cmd();
    for (var, value) in REQUIRED {
        cmd.env(var, value);
    }
    cmd
}

/// [`harness_cmd`] talking to `url` for searches.
#[allow(dead_code)]
pub fn harness_cmd_with_splunk_url(url: &str) -> Command {
    let mut cmd = harness_cmd();
    cmd.env("HARNESS_SPLUNK_URL", url);
    cmd
}
