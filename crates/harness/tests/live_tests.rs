//! Live scenario tests against a real Kafka, Splunk and connector binary.
//!
//! These tests require the full stack: the `CI_*` variables (or `.env.test`
//! at the workspace root), a Kafka broker at `CI_KAFKA_BROKER_ADDRESS` whose
//! container is reachable through `docker exec`, and the connector binary named by `CI_OTEL_BINARY_FILE`.
//!
//! Run with: cargo test -p connector-harness --test live_tests -- --ignored --test-threads=1

use connector_harness::{KafkaBroker, Scenario, ScenarioRunner, ShutdownOutcome};
use harness_config::{ConfigLoader, HarnessConfig};
use search_client::SearchJobClient;

fn live_config() -> HarnessConfig {
    let env_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../.env.test");
    dotenvy::from_path_override(env_path).ok();

    ConfigLoader::new()
        .from_env()
        .and_then(|loader| loader.build())
        .expect("CI_* variables must be set (use .env.test)")
}

async fn run_live(scenario: Scenario) {
    let config = live_config();
    let client = SearchJobClient::builder()
        .from_config(&config)
        .build()
        .expect("Failed to create client");
    let broker = KafkaBroker::from_config(&config.kafka, &config.timing)
        .expect("Failed to create Kafka clients");
    let runner = ScenarioRunner::new(&config, client, broker);

    let report = runner.run(scenario).await.expect("scenario should pass");
    assert_eq!(report.shutdown, ShutdownOutcome::Stopped);
}

#[tokio::test]
#[ignore = "requires live Kafka, Splunk and connector"]
async fn test_live_basic_single_topic() {
    run_live(Scenario::BasicSingleTopic).await;
}

#[tokio::test]
#[ignore = "requires live Kafka, Splunk and connector"]
async fn test_live_multiple_topics() {
    run_live(Scenario::MultipleTopics).await;
}

#[tokio::test]
#[ignore = "requires live Kafka, Splunk and connector"]
async fn test_live_custom_headers() {
    run_live(Scenario::CustomHeaders).await;
}

#[tokio::test]
#[ignore = "requires live Kafka, Splunk and connector"]
async fn test_live_timestamp_extraction() {
    run_live(Scenario::TimestampExtraction).await;
}
