//! Common test utilities for harness integration tests.
//!
//! Provides a recording in-memory broker, a harness configuration whose
//! config directory is a scratch copy of the real templates, a `/bin/sh`
//! stand-in for the connector, and `wiremock` mounts for the search API.
//!
//! # Invariants
//! - Templates are copied from `testdata/configs` at the workspace root, so
//!   every scenario renders the templates that ship with the harness.
//! - Deadlines are short; a scenario that cannot pass fails within seconds.
//!
//! # What this does NOT handle
//! - Talking to real Kafka, Splunk or connector processes.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use connector_harness::{BulkPublish, ConnectorSupervisor, Header, MessageBroker, Result};
use harness_config::{ConfigLoader, HarnessConfig, TimingConfig};
use secrecy::SecretString;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(unused_imports)]
pub use search_client::testing::{job_status, load_fixture};

pub const SID: &str = "1717171717.101";
pub const JOBS: &str = "/services/search/v2/jobs";

/// Connector stand-in that exits 0 on SIGTERM.
pub const GRACEFUL: &str = "trap 'exit 0' TERM; while :; do sleep 0.05; done";

/// A call the fake broker received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    CreateTopic(String),
    Publish {
        topic: String,
        payload: String,
        headers: Vec<Header>,
    },
    PublishBulk {
        topic: String,
        count: u64,
        record_size: u64,
    },
}

/// In-memory [`MessageBroker`] that records every call.
#[derive(Debug)]
pub struct FakeBroker {
    calls: Mutex<Vec<BrokerCall>>,
    first_sent_at: DateTime<Utc>,
}

impl FakeBroker {
    /// Broker whose bulk publishes report `first_sent_epoch` as their start.
    pub fn new(first_sent_epoch: i64) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            first_sent_at: Utc
                .timestamp_opt(first_sent_epoch, 0)
                .single()
                .expect("valid epoch"),
        }
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: BrokerCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl Default for FakeBroker {
    fn default() -> Self {
        Self::new(1_717_171_690)
    }
}

impl MessageBroker for FakeBroker {
    async fn create_topic(&self, name: &str, _partitions: u32, _replication_factor: u32) -> Result<()> {
        self.record(BrokerCall::CreateTopic(name.to_string()));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str, headers: &[Header]) -> Result<()> {
        self.record(BrokerCall::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
            headers: headers.to_vec(),
        });
        Ok(())
    }

    async fn publish_bulk(&self, topic: &str, count: u64, record_size: u64) -> Result<BulkPublish> {
        self.record(BrokerCall::PublishBulk {
            topic: topic.to_string(),
            count,
            record_size,
        });
        Ok(BulkPublish {
            first_sent_at: self.first_sent_at,
            last_sent_at: self.first_sent_at + chrono::Duration::seconds(5),
        })
    }
}

/// Scratch config directory holding copies of the shipped templates.
pub fn template_dir() -> TempDir {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata/configs");
    let dir = tempfile::tempdir().expect("tempdir");
    for entry in std::fs::read_dir(&source).expect("testdata/configs exists") {
        let entry = entry.expect("dir entry");
        std::fs::copy(entry.path(), dir.path().join(entry.file_name())).expect("copy template");
    }
    dir
}

/// Timing short enough for tests: 1.5s assertion deadline, 100ms ticks.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        test_case_duration: Duration::from_millis(1_500),
        perf_test_case_duration: Duration::from_millis(1_500),
        tick: Duration::from_millis(100),
        search_max_attempts: 3,
        search_poll_interval: Duration::from_millis(10),
        topic_ready: Duration::from_secs(1),
    }
}

pub fn harness_config(config_dir: &Path) -> HarnessConfig {
    ConfigLoader::new()
        .with_host("127.0.0.1")
        .with_management_port(8089)
        .with_username("admin")
        .with_password("changeme")
        .with_hec_token("00000000-0000-0000-0000-000000000000")
        .with_broker_address("kafka:9092")
        .with_binary("otelcol-kafka")
        .with_config_dir(config_dir)
        .with_warmup(Duration::from_millis(100))
        .with_grace_period(Duration::from_secs(2))
        .with_timing(fast_timing())
        .build()
        .expect("test config should build")
}

/// Search client for `config` pointed at the mock server.
pub fn search_client(config: &HarnessConfig, server: &MockServer) -> search_client::SearchJobClient {
    search_client::SearchJobClient::builder()
        .from_config(config)
        .base_url(server.uri())
        .credentials("admin", SecretString::new("changeme".to_string().into()))
        .build()
        .expect("test client should build")
}

/// Supervisor running `script` under `/bin/sh` in place of the connector.
pub fn sh_supervisor(config: &HarnessConfig, script: &str) -> ConnectorSupervisor {
    ConnectorSupervisor::from_config(&config.connector).with_launcher(["/bin/sh", "-c", script])
}

/// Mount job submission and a finished job status.
pub async fn mount_job(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(JOBS))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(load_fixture("search/create_job.json")),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_status(SID, true)))
        .mount(server)
        .await;
}

/// Serve `fixture` from the job's events endpoint.
pub async fn mount_events(server: &MockServer, fixture: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture(fixture)))
        .mount(server)
        .await;
}

/// Serve `fixture` from the job's results endpoint.
pub async fn mount_results(server: &MockServer, fixture: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/results")))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture(fixture)))
        .mount(server)
        .await;
}

/// Route submissions whose form body contains `fragment` to job `sid`, a
/// finished job serving `events`.
#[allow(dead_code)]
pub async fn mount_routed_events(
    server: &MockServer,
    fragment: &str,
    sid: &str,
    events: serde_json::Value,
) {
    Mock::given(method("POST"))
        .and(path(JOBS))
        .and(body_string_contains(fragment))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "sid": sid })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{sid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_status(sid, true)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{sid}/events")))
        .respond_with(ResponseTemplate::new(200).set_body_json(events))
        .mount(server)
        .await;
}

/// Form bodies of every job submission the server received.
#[allow(dead_code)]
pub async fn submitted_searches(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == JOBS)
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

/// The rendered config for `template` inside `dir`.
#[allow(dead_code)]
pub fn rendered(dir: &Path, template: &str) -> PathBuf {
    dir.join(template.trim_end_matches(".tmpl"))
}
