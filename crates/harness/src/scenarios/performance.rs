//! Performance scenarios: ingestion throughput and ingestion lag.

use chrono::Utc;
use harness_config::PerformanceConfig;
use search_client::{Attempt, ResultsKind, SearchQuery, Statistic};
use tracing::info;

use super::{INDEX, Scenario, ScenarioRunner, Verified};
use crate::broker::MessageBroker;
use crate::error::{HarnessError, Result};
use crate::ingest::{
    IngestStats, MetricsError, Verdict, epoch_seconds, evaluate_lag, evaluate_throughput,
    ingestion_lag,
};

pub const PERF_SOURCETYPE: &str = "otel-perf-tests";
/// Prefix of every performance run's source.
pub const PERF_SOURCE: &str = "otel";

/// Source for one performance run: `otel-<scenario>-<start stamp>`.
///
/// Each run counts only its own records, so back-to-back runs on the same
/// index and sourcetype never see each other's load.
pub(crate) fn run_source(scenario: Scenario) -> String {
    format!(
        "{PERF_SOURCE}-{}-{}",
        scenario.name(),
        Utc::now().format("%Y%m%d%H%M%S%3f")
    )
}

/// `tstats` over the last ten minutes of records from `source`.
pub fn throughput_query(source: &str) -> SearchQuery {
    SearchQuery::new(
        format!(
            "| tstats earliest(_time) as earliest_time, latest(_time) as latest_time, count \
             where index={INDEX} sourcetype={PERF_SOURCETYPE} source={source}"
        ),
        "-10m@m",
    )
}

/// `stats` over the last two minutes of records from `source`.
pub fn ingestion_lag_query(source: &str) -> SearchQuery {
    SearchQuery::new(
        format!(
            "| search index={INDEX} source={source} sourcetype={PERF_SOURCETYPE} \
             | stats earliest(_time) as earliest_time, latest(_time) as latest_time, \
             count as total_events"
        ),
        "-2m@m",
    )
}

/// Parsed statistics once all `expected` records are indexed.
pub(crate) fn complete_statistics(rows: &[Statistic], expected: u64) -> Result<Attempt<IngestStats>> {
    let row = match rows {
        [] => return Ok(Attempt::Pending("no statistics yet".to_string())),
        [row] => row,
        many => {
            return Err(HarnessError::Assertion(format!(
                "expected one statistics row, got {}",
                many.len()
            )));
        }
    };

    let count = row.event_count().ok_or_else(|| MetricsError::Parse {
        field: "total_events",
        value: row.total_events.clone(),
        expected: "an unsigned integer",
    })?;
    if count < expected {
        return Ok(Attempt::Pending(format!(
            "{count} of {expected} events indexed"
        )));
    }
    if count > expected {
        return Err(HarnessError::Assertion(format!(
            "expected {expected} events, got {count}"
        )));
    }
    Ok(Attempt::Ready(IngestStats::from_statistic(row)?))
}

fn into_result(verdict: Verdict) -> Result<()> {
    match verdict {
        Verdict::Pass => Ok(()),
        Verdict::Fail(reason) => Err(HarnessError::Assertion(reason)),
    }
}

impl<B: MessageBroker> ScenarioRunner<'_, B> {
    pub(super) async fn throughput(&self, perf: &PerformanceConfig, source: &str) -> Result<Verified> {
        self.broker.create_topic(&perf.topic_name, 1, 1).await?;
        self.broker
            .publish_bulk(&perf.topic_name, perf.num_msg, perf.record_size)
            .await?;

        let outcome = self
            .await_records(
                &throughput_query(source),
                ResultsKind::Results,
                self.config.timing.perf_test_case_duration,
                |rows: &[Statistic]| complete_statistics(rows, perf.num_msg),
            )
            .await?;

        into_result(evaluate_throughput(perf, &outcome.value, &self.thresholds)?)?;
        Ok(outcome.into())
    }

    pub(super) async fn ingestion_lag(
        &self,
        perf: &PerformanceConfig,
        source: &str,
    ) -> Result<Verified> {
        self.broker.create_topic(&perf.topic_name, 1, 1).await?;
        let sent = self
            .broker
            .publish_bulk(&perf.topic_name, perf.num_msg, perf.record_size)
            .await?;

        let outcome = self
            .await_records(
                &ingestion_lag_query(source),
                ResultsKind::Results,
                self.config.timing.perf_test_case_duration,
                |rows: &[Statistic]| complete_statistics(rows, perf.num_msg),
            )
            .await?;

        let lag = ingestion_lag(outcome.value.earliest_time, epoch_seconds(sent.first_sent_at));
        info!(
            lag_secs = lag,
            max_lag_secs = perf.max_ingest_lag_secs,
            "Ingestion lag measured"
        );
        into_result(evaluate_lag(lag, perf.max_ingest_lag_secs))?;
        Ok(outcome.into())
    }
}
