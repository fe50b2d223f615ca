//! Search methods for [`SearchJobClient`].

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info_span};

use crate::client::SearchJobClient;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::{EventRecord, ResultsKind, SearchQuery, Statistic};

impl SearchJobClient {
    /// Submit a search job and return its id.
    pub async fn submit_search(&self, query: &SearchQuery) -> Result<String> {
        endpoints::submit_search(
            &self.http,
            &self.base_url,
            &self.auth,
            query,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Whether the job has finished.
    pub async fn job_is_done(&self, sid: &str) -> Result<bool> {
        endpoints::get_job_status(
            &self.http,
            &self.base_url,
            &self.auth,
            sid,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Check job status up to `max_attempts` times, `interval` apart.
    ///
    /// Returns `false` if the job is still running after the last check.
    pub async fn poll_until_done(
        &self,
        sid: &str,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<bool> {
        endpoints::poll_until_done(
            &self.http,
            &self.base_url,
            &self.auth,
            sid,
            max_attempts,
            interval,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Fetch and decode a finished job's records.
    pub async fn fetch_results<T: DeserializeOwned>(
        &self,
        sid: &str,
        kind: ResultsKind,
    ) -> Result<Vec<T>> {
        endpoints::fetch_results(
            &self.http,
            &self.base_url,
            &self.auth,
            sid,
            kind,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Run one full search: submit, wait for completion, fetch and decode.
    ///
    /// Every call allocates a new job. Errors are wrapped in
    /// [`ClientError::Search`] carrying the query and, once known, the job id.
    ///
    /// # Errors
    ///
    /// [`ClientError::Timeout`] (wrapped) if the job is not done after the
    /// client's configured number of status checks.
    pub async fn search<T: DeserializeOwned>(
        &self,
        query: &SearchQuery,
        kind: ResultsKind,
    ) -> Result<Vec<T>> {
        let span = info_span!(
            "search",
            query = %query.text(),
            kind = %kind,
            sid = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();

            let sid = self
                .submit_search(query)
                .await
                .map_err(|e| e.in_search(query.text(), None))?;
            tracing::Span::current().record("sid", sid.as_str());

            let done = self
                .poll_until_done(&sid, self.max_attempts, self.poll_interval)
                .await
                .map_err(|e| e.in_search(query.text(), Some(&sid)))?;
            if !done {
                return Err(ClientError::Timeout {
                    operation: "search job completion",
                    attempts: self.max_attempts,
                }
                .in_search(query.text(), Some(&sid)));
            }

            let records = self
                .fetch_results(&sid, kind)
                .await
                .map_err(|e| e.in_search(query.text(), Some(&sid)))?;

            debug!(
                count = records.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Search completed"
            );
            Ok(records)
        }
        .instrument(span)
        .await
    }

    /// Run an event search.
    pub async fn events(&self, query: &SearchQuery) -> Result<Vec<EventRecord>> {
        self.search(query, ResultsKind::Events).await
    }

    /// Run a `stats`/`tstats` search returning earliest/latest/count rows.
    pub async fn statistics(&self, query: &SearchQuery) -> Result<Vec<Statistic>> {
        self.search(query, ResultsKind::Results).await
    }
}
