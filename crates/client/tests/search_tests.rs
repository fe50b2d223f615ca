//! End-to-end search flow tests.
//!
//! This module tests `SearchJobClient::search` and its wrappers:
//! - submit → wait → fetch on one fresh job per call
//! - Timeout when the job never finishes within the attempt limit
//! - Error annotation with the query and job id
//!
//! # What this does NOT handle
//! - Single endpoint behavior (see jobs_tests.rs)

mod common;

use common::*;
use search_client::models::SearchQuery;
use wiremock::matchers::{method, path};

const JOBS: &str = "/services/search/v2/jobs";

async fn mount_submit(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(JOBS))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(load_fixture("search/create_job.json")),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, done: bool) {
    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_status(SID, done)))
        .mount(server)
        .await;
}

fn basic_query() -> SearchQuery {
    SearchQuery::events_matching(
        [
            ("index", "kafka"),
            ("sourcetype", "otel-basic-test"),
            ("source", "otel"),
        ],
        "-1m@m",
    )
}

#[tokio::test]
async fn test_events_full_flow() {
    let mock_server = MockServer::start().await;
    mount_submit(&mock_server, 1).await;
    mount_status(&mock_server, true).await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/events")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/events_basic.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 5);
    let events = client.events(&basic_query()).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].raw, "Hello, Kafka!");
}

#[tokio::test]
async fn test_statistics_full_flow() {
    let mock_server = MockServer::start().await;
    mount_submit(&mock_server, 1).await;
    mount_status(&mock_server, true).await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/results")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/results_tstats.json")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 5);
    let query = SearchQuery::new(
        "| tstats earliest(_time) as earliest_time, latest(_time) as latest_time, count where index=kafka",
        "-10m@m",
    );
    let stats = client.statistics(&query).await.unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].latest_time, "1717171760.000000");
}

#[tokio::test]
async fn test_each_search_allocates_a_new_job() {
    let mock_server = MockServer::start().await;
    mount_submit(&mock_server, 2).await;
    mount_status(&mock_server, true).await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/events")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/results_empty.json")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 5);
    assert!(client.events(&basic_query()).await.unwrap().is_empty());
    assert!(client.events(&basic_query()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_times_out_when_job_never_finishes() {
    let mock_server = MockServer::start().await;
    mount_submit(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_status(SID, false)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 3);
    let err = client.events(&basic_query()).await.unwrap_err();

    assert_eq!(err.category(), "TimeoutError");
    assert_eq!(err.sid(), Some(SID));
    match &err {
        ClientError::Search { query, source, .. } => {
            assert_eq!(
                query,
                "| search index=kafka sourcetype=otel-basic-test source=otel"
            );
            assert!(matches!(
                source.as_ref(),
                ClientError::Timeout { attempts: 3, .. }
            ));
        }
        other => panic!("expected annotated search error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_failure_has_no_sid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(JOBS))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "messages": [{"type": "WARN", "text": "call not properly authenticated"}]
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 3);
    let err = client.events(&basic_query()).await.unwrap_err();

    assert!(err.sid().is_none());
    assert!(matches!(err.root(), ClientError::Api { status: 401, .. }));
    assert!(err.to_string().contains("call not properly authenticated"));
}

#[tokio::test]
async fn test_decode_failure_carries_sid() {
    let mock_server = MockServer::start().await;
    mount_submit(&mock_server, 1).await;
    mount_status(&mock_server, true).await;

    Mock::given(method("GET"))
        .and(path(format!("{JOBS}/{SID}/events")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/events_malformed.json")),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri(), 3);
    let err = client.events(&basic_query()).await.unwrap_err();

    assert_eq!(err.category(), "DecodeError");
    assert_eq!(err.sid(), Some(SID));
}
