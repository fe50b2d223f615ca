//! Deadlines and polling intervals.

use std::time::Duration;

use crate::constants::{
    DEFAULT_PERF_TEST_CASE_DURATION_SECS, DEFAULT_SEARCH_MAX_ATTEMPTS,
    DEFAULT_SEARCH_POLL_INTERVAL_MS, DEFAULT_TEST_CASE_DURATION_SECS,
    DEFAULT_TEST_CASE_TICK_SECS, DEFAULT_TOPIC_READY_SECS,
};

/// Timing contract for every bounded wait the harness performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Deadline for a functional scenario's search assertion.
    pub test_case_duration: Duration,
    /// Deadline for the performance scenario's search assertion.
    pub perf_test_case_duration: Duration,
    /// Interval between assertion attempts.
    pub tick: Duration,
    /// Maximum job status checks per search.
    pub search_max_attempts: u32,
    /// Interval between job status checks.
    pub search_poll_interval: Duration,
    /// Deadline for a created topic to be listed by the broker.
    pub topic_ready: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            test_case_duration: Duration::from_secs(DEFAULT_TEST_CASE_DURATION_SECS),
            perf_test_case_duration: Duration::from_secs(DEFAULT_PERF_TEST_CASE_DURATION_SECS),
            tick: Duration::from_secs(DEFAULT_TEST_CASE_TICK_SECS),
            search_max_attempts: DEFAULT_SEARCH_MAX_ATTEMPTS,
            search_poll_interval: Duration::from_millis(DEFAULT_SEARCH_POLL_INTERVAL_MS),
            topic_ready: Duration::from_secs(DEFAULT_TOPIC_READY_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_scenario_contract() {
        let timing = TimingConfig::default();
        assert_eq!(timing.test_case_duration, Duration::from_secs(30));
        assert_eq!(timing.tick, Duration::from_secs(5));
        assert_eq!(timing.search_max_attempts, 20);
        assert_eq!(timing.search_poll_interval, Duration::from_secs(1));
    }
}
