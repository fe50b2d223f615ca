//! Functional scenarios: routing, multiple topics, header overrides and
//! timestamp extraction.

use chrono::{DateTime, Utc};
use search_client::{Attempt, EventRecord, ResultsKind, SearchQuery};
use tracing::info;

use super::{INDEX, ScenarioRunner, Verified, expect_count};
use crate::broker::{Header, MessageBroker};
use crate::error::{HarnessError, Result};

/// Search window for events produced during the scenario.
const RECENT: &str = "-1m@m";

pub const BASIC_TOPIC: &str = "kafka-test-topic";
pub const BASIC_EVENT: &str = "Hello, Kafka!";
pub(crate) const BASIC_SOURCETYPE: &str = "otel-basic-test";
pub(crate) const BASIC_SOURCE: &str = "otel";

/// `(topic, source)` pairs; each topic's event is `Hello <topic>`.
pub const MULTIPLE_TOPICS: [(&str, &str); 2] = [
    ("kafka-test-topic-1", "otel-1"),
    ("kafka-test-topic-2", "otel-2"),
];
pub(crate) const MULTIPLE_SOURCETYPE: &str = "otel-multiple-topics";
const MULTIPLE_EVENT_PREFIX: &str = "Hello ";

pub const CUSTOM_HEADERS_TOPIC: &str = "kafka-custom-headers-test";
pub const CUSTOM_HEADERS_EVENT: &str = "This event should have extra headers!";
pub(crate) const CUSTOM_HEADERS_SOURCETYPE: &str = "otel-custom-headers-test";
pub(crate) const CUSTOM_HEADER_KEY: &str = "custom-header";
const CUSTOM_HEADER_VALUE: &str = "test-header-value";
const HEADER_INDEX: &str = "kafka-header-index";
const HEADER_SOURCE: &str = "source-value-from-header";
const HEADER_SOURCETYPE: &str = "sourcetype-value-from-header";
const HEADER_HOST: &str = "host-value-from-header";

pub const TIMESTAMP_TOPIC: &str = "kafka-timestamp-extraction";
pub const TIMESTAMP_EVENT: &str =
    "[2020-01-01 12:00:00] This event should have a custom timestamp!";
pub(crate) const TIMESTAMP_SOURCETYPE: &str = "otel-timestamp-extraction-test";
/// Regex for the connector's timestamp extraction, escaped for a
/// double-quoted YAML string.
pub(crate) const TIMESTAMP_EXTRACT_PATTERN: &str =
    r"\\[(?P<timestamp>[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\\]";
/// Layout of the embedded timestamp in the connector's (Go) notation.
pub(crate) const TIMESTAMP_LAYOUT: &str = "2006-01-02 15:04:05";
const TIMESTAMP_WINDOW: (&str, &str) = ("2020-01-01T11:55:00", "2020-01-01T12:05:00");
/// 2020-01-01T12:00:00Z
const TIMESTAMP_EXPECTED_EPOCH: i64 = 1_577_880_000;

/// Headers that reroute the custom-headers event, plus one custom header.
pub fn custom_headers() -> Vec<Header> {
    vec![
        Header::new(CUSTOM_HEADER_KEY, CUSTOM_HEADER_VALUE),
        Header::new("index", HEADER_INDEX),
        Header::new("source", HEADER_SOURCE),
        Header::new("sourcetype", HEADER_SOURCETYPE),
        Header::new("host", HEADER_HOST),
    ]
}

/// Per-run source for the timestamp scenario, so old runs never match.
pub(crate) fn timestamp_source() -> String {
    format!("otel-{}", Utc::now().format("%Y%m%d%H%M%S"))
}

/// The only event, once exactly one arrived, checked against `body`.
fn single_event<'e>(events: &'e [EventRecord], body: &str) -> Result<Option<&'e EventRecord>> {
    if !expect_count(events, 1, "event")? {
        return Ok(None);
    }
    let event = &events[0];
    if event.raw != body {
        return Err(HarnessError::Assertion(format!(
            "expected event body {body:?}, got {:?}",
            event.raw
        )));
    }
    Ok(Some(event))
}

fn pending(events: &[EventRecord], expected: usize) -> Attempt<()> {
    Attempt::Pending(format!("{} of {expected} events indexed", events.len()))
}

fn sorted<'s>(values: impl IntoIterator<Item = Option<&'s str>>) -> Vec<Option<&'s str>> {
    let mut values: Vec<_> = values.into_iter().collect();
    values.sort_unstable();
    values
}

impl<B: MessageBroker> ScenarioRunner<'_, B> {
    pub(super) async fn basic_single_topic(&self) -> Result<Verified> {
        self.broker.create_topic(BASIC_TOPIC, 1, 1).await?;
        self.broker.publish(BASIC_TOPIC, BASIC_EVENT, &[]).await?;

        let query = SearchQuery::events_matching(
            [
                ("index", INDEX),
                ("sourcetype", BASIC_SOURCETYPE),
                ("source", BASIC_SOURCE),
            ],
            RECENT,
        );
        let outcome = self
            .await_records(
                &query,
                ResultsKind::Events,
                self.config.timing.test_case_duration,
                |events: &[EventRecord]| {
                    Ok(match single_event(events, BASIC_EVENT)? {
                        Some(_) => Attempt::Ready(()),
                        None => pending(events, 1),
                    })
                },
            )
            .await?;
        Ok(outcome.into())
    }

    pub(super) async fn multiple_topics(&self) -> Result<Verified> {
        for (topic, _) in MULTIPLE_TOPICS {
            self.broker.create_topic(topic, 1, 1).await?;
        }
        for (topic, _) in MULTIPLE_TOPICS {
            self.broker
                .publish(topic, &format!("{MULTIPLE_EVENT_PREFIX}{topic}"), &[])
                .await?;
        }

        let expected_bodies: Vec<String> = MULTIPLE_TOPICS
            .iter()
            .map(|(topic, _)| format!("{MULTIPLE_EVENT_PREFIX}{topic}"))
            .collect();
        let expected_bodies = sorted(expected_bodies.iter().map(|b| Some(b.as_str())));
        let expected_sources = sorted(MULTIPLE_TOPICS.iter().map(|(_, source)| Some(*source)));

        let query = SearchQuery::events_matching(
            [
                ("index", INDEX),
                ("sourcetype", MULTIPLE_SOURCETYPE),
                ("source", "otel*"),
            ],
            RECENT,
        );
        let outcome = self
            .await_records(
                &query,
                ResultsKind::Events,
                self.config.timing.test_case_duration,
                |events: &[EventRecord]| {
                    if !expect_count(events, MULTIPLE_TOPICS.len(), "events")? {
                        return Ok(pending(events, MULTIPLE_TOPICS.len()));
                    }
                    let bodies = sorted(events.iter().map(|e| Some(e.raw.as_str())));
                    if bodies != expected_bodies {
                        return Err(HarnessError::Assertion(format!(
                            "expected event bodies {expected_bodies:?}, got {bodies:?}"
                        )));
                    }
                    let sources = sorted(events.iter().map(|e| e.source.as_deref()));
                    if sources != expected_sources {
                        return Err(HarnessError::Assertion(format!(
                            "expected sources {expected_sources:?}, got {sources:?}"
                        )));
                    }
                    Ok(Attempt::Ready(()))
                },
            )
            .await?;
        Ok(outcome.into())
    }

    pub(super) async fn custom_headers(&self) -> Result<Verified> {
        self.broker.create_topic(CUSTOM_HEADERS_TOPIC, 1, 1).await?;
        self.broker
            .publish(CUSTOM_HEADERS_TOPIC, CUSTOM_HEADERS_EVENT, &custom_headers())
            .await?;

        let header_field = format!("kafka.header.{CUSTOM_HEADER_KEY}");
        let rerouted = SearchQuery::events_matching(
            [
                ("index", HEADER_INDEX),
                ("sourcetype", HEADER_SOURCETYPE),
                ("source", HEADER_SOURCE),
                ("host", HEADER_HOST),
                (header_field.as_str(), CUSTOM_HEADER_VALUE),
            ],
            RECENT,
        );
        let outcome = self
            .await_records(
                &rerouted,
                ResultsKind::Events,
                self.config.timing.test_case_duration,
                |events: &[EventRecord]| {
                    let Some(event) = single_event(events, CUSTOM_HEADERS_EVENT)? else {
                        return Ok(pending(events, 1));
                    };
                    match event.header(CUSTOM_HEADER_KEY) {
                        Some(CUSTOM_HEADER_VALUE) => Ok(Attempt::Ready(())),
                        other => Err(HarnessError::Assertion(format!(
                            "expected header {CUSTOM_HEADER_KEY}={CUSTOM_HEADER_VALUE:?}, got {other:?}"
                        ))),
                    }
                },
            )
            .await?;

        // Headers must fully override routing: nothing under the original values.
        let original = SearchQuery::events_matching(
            [
                ("index", INDEX),
                ("sourcetype", CUSTOM_HEADERS_SOURCETYPE),
                ("source", BASIC_SOURCE),
            ],
            RECENT,
        );
        let stray = self.client.events(&original).await?;
        if !stray.is_empty() {
            return Err(HarnessError::Assertion(format!(
                "expected 0 events under original routing, got {} for {original}",
                stray.len()
            )));
        }
        info!("No events left under original routing");
        Ok(outcome.into())
    }

    pub(super) async fn timestamp_extraction(&self, source: &str) -> Result<Verified> {
        self.broker.create_topic(TIMESTAMP_TOPIC, 1, 1).await?;
        self.broker.publish(TIMESTAMP_TOPIC, TIMESTAMP_EVENT, &[]).await?;

        let (earliest, latest) = TIMESTAMP_WINDOW;
        let query = SearchQuery::events_matching(
            [
                ("index", INDEX),
                ("sourcetype", TIMESTAMP_SOURCETYPE),
                ("source", source),
            ],
            earliest,
        )
        .latest(latest);
        let expected = DateTime::<Utc>::from_timestamp(TIMESTAMP_EXPECTED_EPOCH, 0);

        let outcome = self
            .await_records(
                &query,
                ResultsKind::Events,
                self.config.timing.test_case_duration,
                |events: &[EventRecord]| {
                    let Some(event) = single_event(events, TIMESTAMP_EVENT)? else {
                        return Ok(pending(events, 1));
                    };
                    if event.timestamp() != expected {
                        return Err(HarnessError::Assertion(format!(
                            "expected _time 2020-01-01T12:00:00Z, got {:?}",
                            event.time
                        )));
                    }
                    Ok(Attempt::Ready(()))
                },
            )
            .await?;
        Ok(outcome.into())
    }
}
