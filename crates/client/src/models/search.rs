//! Search request models.
//!
//! Responsibilities:
//! - Describe one immutable search request (`SearchQuery`).
//! - Select which job sub-resource results are read from (`ResultsKind`).
//!
//! Invariants:
//! - A `SearchQuery` is never modified after it has been submitted; the
//!   builder methods consume and return a new value.

use std::fmt;
use std::str::FromStr;

/// Leading command for event searches built by [`SearchQuery::events_matching`].
pub const EVENT_SEARCH_PREFIX: &str = "| search ";

/// End-time bound used when none is given.
pub const DEFAULT_LATEST: &str = "now";

/// A search request: query text plus time bounds in Splunk time syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    earliest: String,
    latest: String,
}

impl SearchQuery {
    /// Create a query ending at `now`.
    pub fn new(text: impl Into<String>, earliest: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            earliest: earliest.into(),
            latest: DEFAULT_LATEST.to_string(),
        }
    }

    /// Build `| search key=value key=value ...` from field filters.
    ///
    /// ```rust,ignore
    /// let q = SearchQuery::events_matching(
    ///     [("index", "kafka"), ("sourcetype", "otel-basic-test"), ("source", "otel")],
    ///     "-1m@m",
    /// );
    /// assert_eq!(q.text(), "| search index=kafka sourcetype=otel-basic-test source=otel");
    /// ```
    pub fn events_matching<I, K, V>(filters: I, earliest: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let terms = filters
            .into_iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(format!("{EVENT_SEARCH_PREFIX}{terms}"), earliest)
    }

    /// Set the end-time bound.
    pub fn latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = latest.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn earliest_time(&self) -> &str {
        &self.earliest
    }

    pub fn latest_time(&self) -> &str {
        &self.latest
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [earliest={}, latest={}]",
            self.text, self.earliest, self.latest
        )
    }
}

/// Which job sub-resource results are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsKind {
    /// Raw events (`/events`), used for event searches.
    #[default]
    Events,
    /// Transformed rows (`/results`), used for `stats`/`tstats` searches.
    Results,
}

impl ResultsKind {
    /// Path segment appended to the job URL.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for ResultsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ResultsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "results" => Ok(Self::Results),
            other => Err(format!(
                "unknown results kind '{other}' (expected 'events' or 'results')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_defaults_to_now() {
        let q = SearchQuery::new("index=kafka", "-1m@m");
        assert_eq!(q.earliest_time(), "-1m@m");
        assert_eq!(q.latest_time(), "now");
    }

    #[test]
    fn test_latest_override() {
        let q = SearchQuery::new("index=kafka", "2020-01-01T11:55:00").latest("2020-01-01T12:05:00");
        assert_eq!(q.latest_time(), "2020-01-01T12:05:00");
    }

    #[test]
    fn test_events_matching_builds_search_command() {
        let q = SearchQuery::events_matching(
            [
                ("index", "kafka"),
                ("sourcetype", "otel-basic-test"),
                ("source", "otel"),
            ],
            "-1m@m",
        );
        assert_eq!(
            q.text(),
            "| search index=kafka sourcetype=otel-basic-test source=otel"
        );
    }

    #[test]
    fn test_results_kind_parsing() {
        assert_eq!("events".parse::<ResultsKind>(), Ok(ResultsKind::Events));
        assert_eq!(" Results ".parse::<ResultsKind>(), Ok(ResultsKind::Results));
        assert!("rows".parse::<ResultsKind>().is_err());
        assert_eq!(ResultsKind::Results.path_segment(), "results");
    }
}
