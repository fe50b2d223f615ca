//! Throughput and ingestion-lag metrics.
//!
//! Responsibilities:
//! - Parse the earliest/latest/count statistics Splunk computes for a run.
//! - Derive ingestion rate and lag, and judge them against thresholds.
//!
//! Does NOT handle:
//! - Fetching the statistics (see the throughput and lag scenarios).
//! - Clock skew between the producing host and Splunk. Both clocks are
//!   assumed synchronised, and a negative lag is reported as measured.
//!
//! Invariants:
//! - A zero, negative or non-finite ingestion window is rejected before any
//!   division, so no rate is ever NaN or infinite.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use harness_config::PerformanceConfig;
use search_client::Statistic;
use thiserror::Error;

/// Bytes in one MiB.
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Errors raised while evaluating ingestion statistics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Invalid ingestion window: latest {latest} is not after earliest {earliest}")]
    InvalidWindow { earliest: f64, latest: f64 },

    #[error("Cannot parse {field} value {value:?} as {expected}")]
    Parse {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("No minimum ingestion rate defined for {num_msg} messages of {record_size} bytes")]
    NoThreshold { num_msg: u64, record_size: u64 },
}

/// Parsed ingestion statistics for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestStats {
    /// Epoch seconds of the earliest indexed record.
    pub earliest_time: f64,
    /// Epoch seconds of the latest indexed record.
    pub latest_time: f64,
    /// Number of indexed records.
    pub total_events: u64,
}

impl IngestStats {
    /// Parse a `stats`/`tstats` result row.
    pub fn from_statistic(stat: &Statistic) -> Result<Self, MetricsError> {
        Ok(Self {
            earliest_time: parse_seconds("earliest_time", &stat.earliest_time)?,
            latest_time: parse_seconds("latest_time", &stat.latest_time)?,
            total_events: stat.event_count().ok_or_else(|| MetricsError::Parse {
                field: "total_events",
                value: stat.total_events.clone(),
                expected: "an unsigned integer",
            })?,
        })
    }

    /// Seconds between the earliest and latest record.
    pub fn window(&self) -> Result<f64, MetricsError> {
        let window = self.latest_time - self.earliest_time;
        if window.is_finite() && window > 0.0 {
            Ok(window)
        } else {
            Err(MetricsError::InvalidWindow {
                earliest: self.earliest_time,
                latest: self.latest_time,
            })
        }
    }
}

fn parse_seconds(field: &'static str, value: &str) -> Result<f64, MetricsError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetricsError::Parse {
            field,
            value: value.to_string(),
            expected: "decimal seconds",
        })
}

/// Epoch seconds with microsecond precision.
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Ingestion rate in bytes per second: `volume / (latest - earliest)`.
pub fn ingestion_rate(volume_bytes: u64, stats: &IngestStats) -> Result<f64, MetricsError> {
    Ok(volume_bytes as f64 / stats.window()?)
}

/// Ingestion rate in MiB per second.
pub fn ingestion_rate_mib(volume_bytes: u64, stats: &IngestStats) -> Result<f64, MetricsError> {
    Ok(ingestion_rate(volume_bytes, stats)? / BYTES_PER_MIB)
}

/// Seconds between the first send and the earliest indexed record.
pub fn ingestion_lag(earliest_ingested: f64, first_sent: f64) -> f64 {
    earliest_ingested - first_sent
}

/// Minimum acceptable ingestion rates keyed by `(num_msg, record_size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateThresholds {
    minimum_mib_per_sec: HashMap<(u64, u64), f64>,
}

impl Default for RateThresholds {
    fn default() -> Self {
        Self::from_entries([
            ((100_000, 100), 1.0),
            ((1_000_000, 100), 2.0),
            ((100_000, 1024), 5.0),
            ((1_000_000, 1024), 8.0),
        ])
    }
}

impl RateThresholds {
    pub fn from_entries(entries: impl IntoIterator<Item = ((u64, u64), f64)>) -> Self {
        Self {
            minimum_mib_per_sec: entries.into_iter().collect(),
        }
    }

    /// Minimum rate in MiB/s for a load profile, multiplied by `tolerance`.
    pub fn minimum(
        &self,
        num_msg: u64,
        record_size: u64,
        tolerance: f64,
    ) -> Result<f64, MetricsError> {
        self.minimum_mib_per_sec
            .get(&(num_msg, record_size))
            .map(|base| base * tolerance)
            .ok_or(MetricsError::NoThreshold {
                num_msg,
                record_size,
            })
    }
}

/// Outcome of a threshold check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail(reason) => write!(f, "fail: {reason}"),
        }
    }
}

/// Compare the measured rate with the threshold for this load profile.
pub fn evaluate_throughput(
    perf: &PerformanceConfig,
    stats: &IngestStats,
    thresholds: &RateThresholds,
) -> Result<Verdict, MetricsError> {
    let rate = ingestion_rate_mib(perf.volume_bytes(), stats)?;
    let minimum = thresholds.minimum(perf.num_msg, perf.record_size, perf.rate_tolerance)?;
    tracing::info!(
        events = stats.total_events,
        record_size = perf.record_size,
        window_secs = stats.window()?,
        rate_mib_per_sec = rate,
        minimum_mib_per_sec = minimum,
        "Ingestion rate measured"
    );

    if rate >= minimum {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail(format!(
            "ingestion rate {rate:.3} MiB/s is below the minimum of {minimum:.3} MiB/s"
        )))
    }
}

/// Compare the measured lag with the allowed maximum.
pub fn evaluate_lag(lag_secs: f64, max_lag_secs: f64) -> Verdict {
    if lag_secs <= max_lag_secs {
        Verdict::Pass
    } else {
        Verdict::Fail(format!(
            "ingestion lag {lag_secs:.3}s exceeds the maximum of {max_lag_secs:.3}s"
        ))
    }
}
