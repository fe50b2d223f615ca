//! Scenario orchestration.
//!
//! Responsibilities:
//! - Run one scenario end to end: render the connector config, start the
//!   connector, produce data, and poll Splunk until the data shows up.
//! - Stop the connector on every path, including failed assertions.
//!
//! Does NOT handle:
//! - Running scenarios in parallel. Scenarios share topics and an index.
//!
//! Invariants:
//! - Messages are produced only after the connector finished its warm-up.
//! - Fewer records than expected means "not yet"; wrong or extra records
//!   fail the scenario at once.

mod functional;
mod performance;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use harness_config::constants::ENV_NUM_MSG;
use harness_config::{ConfigError, HarnessConfig, PerformanceConfig};
use search_client::{Attempt, PollOutcome, PollPolicy, ResultsKind, SearchJobClient, SearchQuery, poll};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::broker::MessageBroker;
use crate::error::{HarnessError, Result};
use crate::ingest::RateThresholds;
use crate::supervisor::{ConnectorSupervisor, ShutdownOutcome};
use crate::template::{self, Substitutions};

pub use functional::{
    BASIC_EVENT, BASIC_TOPIC, CUSTOM_HEADERS_EVENT, CUSTOM_HEADERS_TOPIC, MULTIPLE_TOPICS,
    TIMESTAMP_EVENT, TIMESTAMP_TOPIC, custom_headers,
};
pub use performance::{PERF_SOURCE, PERF_SOURCETYPE, ingestion_lag_query, throughput_query};

/// Index every scenario writes to, unless headers reroute the event.
pub const INDEX: &str = "kafka";

/// Verification scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    BasicSingleTopic,
    MultipleTopics,
    CustomHeaders,
    TimestampExtraction,
    Throughput,
    IngestionLag,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::BasicSingleTopic,
        Scenario::MultipleTopics,
        Scenario::CustomHeaders,
        Scenario::TimestampExtraction,
        Scenario::Throughput,
        Scenario::IngestionLag,
    ];

    /// Functional scenarios, in the order they run by default.
    pub const FUNCTIONAL: [Scenario; 4] = [
        Scenario::BasicSingleTopic,
        Scenario::MultipleTopics,
        Scenario::CustomHeaders,
        Scenario::TimestampExtraction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BasicSingleTopic => "basic",
            Self::MultipleTopics => "multiple-topics",
            Self::CustomHeaders => "custom-headers",
            Self::TimestampExtraction => "timestamp-extraction",
            Self::Throughput => "throughput",
            Self::IngestionLag => "ingestion-lag",
        }
    }

    /// Connector config template, relative to the config directory.
    pub fn template(self) -> &'static str {
        match self {
            Self::BasicSingleTopic => "basic_test.yaml.tmpl",
            Self::MultipleTopics => "multiple_topics_test.yaml.tmpl",
            Self::CustomHeaders => "custom_headers_test.yaml.tmpl",
            Self::TimestampExtraction => "timestamp_extraction_test.yaml.tmpl",
            Self::Throughput | Self::IngestionLag => "basic_perf_test.yaml.tmpl",
        }
    }

    /// Whether the scenario needs [`PerformanceConfig`].
    pub fn is_performance(self) -> bool {
        matches!(self, Self::Throughput | Self::IngestionLag)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Summary of a passed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    /// Search attempts until the data matched.
    pub attempts: u32,
    /// Time from the first search to the matching one.
    pub elapsed: Duration,
    /// How the connector ended.
    pub shutdown: ShutdownOutcome,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: passed after {} search attempt(s) in {:.1}s, connector {}",
            self.scenario,
            self.attempts,
            self.elapsed.as_secs_f64(),
            self.shutdown
        )
    }
}

/// What a scenario's verification produced.
pub(crate) struct Verified {
    attempts: u32,
    elapsed: Duration,
}

impl<T> From<PollOutcome<T>> for Verified {
    fn from(outcome: PollOutcome<T>) -> Self {
        Self {
            attempts: outcome.attempts,
            elapsed: outcome.elapsed,
        }
    }
}

/// Runs scenarios against one Splunk instance, broker and connector binary.
pub struct ScenarioRunner<'a, B> {
    config: &'a HarnessConfig,
    client: SearchJobClient,
    broker: B,
    supervisor: ConnectorSupervisor,
    performance: Option<PerformanceConfig>,
    thresholds: RateThresholds,
    feature_gates: Option<String>,
}

impl<'a, B: MessageBroker> ScenarioRunner<'a, B> {
    pub fn new(config: &'a HarnessConfig, client: SearchJobClient, broker: B) -> Self {
        Self {
            config,
            client,
            broker,
            supervisor: ConnectorSupervisor::from_config(&config.connector),
            performance: None,
            thresholds: RateThresholds::default(),
            feature_gates: None,
        }
    }

    pub fn with_supervisor(mut self, supervisor: ConnectorSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Load profile for the throughput and lag scenarios.
    pub fn with_performance(mut self, performance: PerformanceConfig) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn with_thresholds(mut self, thresholds: RateThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Feature gates passed to the connector as `--feature-gates=<gates>`.
    pub fn with_feature_gates(mut self, gates: Option<String>) -> Self {
        self.feature_gates = gates;
        self
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Run one scenario, always stopping the connector afterwards.
    ///
    /// # Errors
    ///
    /// The first failure in render, start, produce or verify order. If
    /// verification fails and the stop also fails, the verification error
    /// is returned and the stop error is logged.
    pub async fn run(&self, scenario: Scenario) -> Result<ScenarioReport> {
        let span = info_span!("scenario", name = %scenario);
        async move {
            let performance = if scenario.is_performance() {
                Some(self.performance_config()?)
            } else {
                None
            };

            let source = if scenario.is_performance() {
                performance::run_source(scenario)
            } else {
                functional::timestamp_source()
            };
            let substitutions = self.substitutions(scenario, performance, &source);
            let template_path = self.config.connector.template_path(scenario.template());
            let config_path = template::render(&template_path, &substitutions)?;

            let mut process = self
                .supervisor
                .start(&config_path, self.feature_gates.as_deref())
                .await?;
            info!(pid = process.pid(), "Connector running");

            let verified = match (scenario, performance) {
                (Scenario::BasicSingleTopic, _) => self.basic_single_topic().await,
                (Scenario::MultipleTopics, _) => self.multiple_topics().await,
                (Scenario::CustomHeaders, _) => self.custom_headers().await,
                (Scenario::TimestampExtraction, _) => {
                    self.timestamp_extraction(&source).await
                }
                (Scenario::Throughput, Some(perf)) => self.throughput(perf, &source).await,
                (Scenario::IngestionLag, Some(perf)) => self.ingestion_lag(perf, &source).await,
                (Scenario::Throughput | Scenario::IngestionLag, None) => {
                    Err(missing_performance_config())
                }
            };
            let shutdown = process.stop().await;

            match (verified, shutdown) {
                (Ok(verified), Ok(shutdown)) => {
                    let report = ScenarioReport {
                        scenario,
                        attempts: verified.attempts,
                        elapsed: verified.elapsed,
                        shutdown,
                    };
                    info!(%report, "Scenario passed");
                    Ok(report)
                }
                (Ok(_), Err(stop_err)) => Err(stop_err),
                (Err(e), Ok(_)) => Err(e),
                (Err(e), Err(stop_err)) => {
                    warn!(error = %stop_err, "Connector stop failed after scenario failure");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    fn performance_config(&self) -> Result<&PerformanceConfig> {
        self.performance
            .as_ref()
            .ok_or_else(missing_performance_config)
    }

    fn substitutions(
        &self,
        scenario: Scenario,
        perf: Option<&PerformanceConfig>,
        run_source: &str,
    ) -> Substitutions {
        let mut subs = Substitutions::new();
        let mut set = |key: &str, value: &str| {
            subs.insert(key.to_string(), value.to_string());
        };
        set("KafkaBrokerAddress", &self.config.kafka.broker_address);
        set("SplunkHECToken", self.config.splunk.hec_token.expose_secret());
        set("SplunkHECEndpoint", &self.config.splunk.hec_endpoint());
        set("Index", INDEX);

        match scenario {
            Scenario::BasicSingleTopic => {
                set("KafkaTopicName", BASIC_TOPIC);
                set("Sourcetype", functional::BASIC_SOURCETYPE);
                set("Source", functional::BASIC_SOURCE);
            }
            Scenario::MultipleTopics => {
                let [(topic1, source1), (topic2, source2)] = MULTIPLE_TOPICS;
                set("KafkaTopicName1", topic1);
                set("KafkaTopicName2", topic2);
                set("Source1", source1);
                set("Source2", source2);
                set("Sourcetype", functional::MULTIPLE_SOURCETYPE);
            }
            Scenario::CustomHeaders => {
                set("KafkaTopicName", CUSTOM_HEADERS_TOPIC);
                set("Sourcetype", functional::CUSTOM_HEADERS_SOURCETYPE);
                set("Source", functional::BASIC_SOURCE);
                set("CustomHeader", functional::CUSTOM_HEADER_KEY);
            }
            Scenario::TimestampExtraction => {
                set("KafkaTopicName", TIMESTAMP_TOPIC);
                set("Sourcetype", functional::TIMESTAMP_SOURCETYPE);
                set("Source", run_source);
                set("ExtractPattern", functional::TIMESTAMP_EXTRACT_PATTERN);
                set("FormatStr", functional::TIMESTAMP_LAYOUT);
            }
            Scenario::Throughput | Scenario::IngestionLag => {
                if let Some(perf) = perf {
                    set("KafkaTopicName", &perf.topic_name);
                }
                set("Sourcetype", PERF_SOURCETYPE);
                set("Source", run_source);
            }
        }
        subs
    }

    /// Search until `check` accepts the decoded records or the deadline passes.
    ///
    /// Each attempt runs a fresh search. `check` returns `Pending` while the
    /// data is incomplete and an error when it is wrong.
    pub(crate) async fn await_records<T, V, F>(
        &self,
        query: &SearchQuery,
        kind: ResultsKind,
        deadline: Duration,
        check: F,
    ) -> Result<PollOutcome<V>>
    where
        T: DeserializeOwned,
        F: Fn(&[T]) -> Result<Attempt<V>>,
    {
        let policy = PollPolicy::deadline(deadline, self.config.timing.tick);
        let client = &self.client;
        let check = &check;

        poll(&policy, move |attempt| async move {
            let records: Vec<T> = client.search(query, kind).await?;
            debug!(attempt, records = records.len(), "Search attempt");
            Ok::<_, HarnessError>(match check(records.as_slice())? {
                Attempt::Pending(diagnostic) => {
                    Attempt::Pending(format!("{diagnostic}; query: {query}"))
                }
                ready => ready,
            })
        })
        .await
        .map_err(|e| HarnessError::from_poll(e, format!("search results for {query}")))
    }
}

fn missing_performance_config() -> HarnessError {
    HarnessError::Config(ConfigError::MissingEnvVar(ENV_NUM_MSG.to_string()))
}

/// `Pending` while fewer than `expected` records arrived, an assertion
/// failure when more did.
pub(crate) fn expect_count<T>(records: &[T], expected: usize, what: &str) -> Result<bool> {
    match records.len() {
        n if n < expected => Ok(false),
        n if n == expected => Ok(true),
        n => Err(HarnessError::Assertion(format!(
            "expected {expected} {what}, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn test_unknown_scenario_lists_names() {
        let err = "smoke".parse::<Scenario>().unwrap_err();
        assert!(err.contains("basic"));
        assert!(err.contains("ingestion-lag"));
    }

    #[test]
    fn test_performance_scenarios_share_template() {
        assert!(Scenario::Throughput.is_performance());
        assert!(!Scenario::CustomHeaders.is_performance());
        assert_eq!(
            Scenario::Throughput.template(),
            Scenario::IngestionLag.template()
        );
    }

    #[test]
    fn test_expect_count() {
        assert!(!expect_count(&[1], 2, "events").unwrap());
        assert!(expect_count(&[1, 2], 2, "events").unwrap());
        let err = expect_count(&[1, 2, 3], 2, "events").unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: expected 2 events, got 3");
    }

    #[test]
    fn test_report_display() {
        let report = ScenarioReport {
            scenario: Scenario::BasicSingleTopic,
            attempts: 2,
            elapsed: Duration::from_millis(5_200),
            shutdown: ShutdownOutcome::Stopped,
        };
        assert_eq!(
            report.to_string(),
            "basic: passed after 2 search attempt(s) in 5.2s, connector stopped"
        );
    }
}
