//! Search job endpoints.
//!
//! # What this module handles:
//! - Submitting a search job and extracting its `sid`
//! - Reading the job's completion flag
//! - Bounded waiting for completion
//! - Fetching and decoding `events` or `results`
//!
//! # What this module does NOT handle:
//! - Retrying a whole search until data appears (see [`crate::poll`] and the
//!   scenario layer)
//! - Job cancellation or cleanup; jobs expire on the server
//!
//! # Invariants
//! - Every request carries `output_mode=json`
//! - Each call to [`submit_search`] allocates a new job; ids are never reused

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::auth::BasicAuth;
use crate::decode::{decode_results, results_array};
use crate::endpoints::request::{read_json, read_text, send_request};
use crate::endpoints::{JOBS_PATH, OUTPUT_MODE, encode_path_segment};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{ResultsKind, SearchQuery};
use crate::poll::{Attempt, PollError, PollPolicy, poll};

/// Submit a search job and return its id.
pub async fn submit_search(
    client: &Client,
    base_url: &str,
    auth: &BasicAuth,
    query: &SearchQuery,
    metrics: Option<&MetricsCollector>,
) -> Result<String> {
    debug!(%query, "Submitting search job");

    let url = format!("{}{}", base_url, JOBS_PATH);
    let form = [
        ("search", query.text()),
        ("earliest_time", query.earliest_time()),
        ("latest_time", query.latest_time()),
    ];

    let builder = auth
        .apply(client.post(&url))
        .query(&[OUTPUT_MODE])
        .form(&form);
    let response = send_request(builder, &url, JOBS_PATH, "POST", metrics).await?;
    let resp = read_json(response, &url).await?;

    // Splunk returns either `{ "sid": ... }` or `{ "entry": [ { "content": { "sid": ... } } ] }`
    let sid = resp
        .get("sid")
        .and_then(Value::as_str)
        .or_else(|| resp.get("entry")?.get(0)?.get("content")?.get("sid")?.as_str())
        .filter(|sid| !sid.is_empty())
        .ok_or_else(|| ClientError::protocol("Missing sid in response", &resp.to_string()))?;

    debug!(sid, "Search job created");
    Ok(sid.to_string())
}

/// Read `entry[0].content.isDone` for a job.
pub async fn get_job_status(
    client: &Client,
    base_url: &str,
    auth: &BasicAuth,
    sid: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<bool> {
    let url = format!("{}{}/{}", base_url, JOBS_PATH, encode_path_segment(sid));
    let endpoint = format!("{JOBS_PATH}/{{sid}}");

    let builder = auth.apply(client.get(&url)).query(&[OUTPUT_MODE]);
    let response = send_request(builder, &url, &endpoint, "GET", metrics).await?;
    let resp = read_json(response, &url).await?;

    let done = resp
        .get("entry")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("content"))
        .and_then(|c| c.get("isDone"))
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            ClientError::protocol("Missing entry[0].content.isDone in response", &resp.to_string())
        })?;

    if let Some(m) = metrics {
        m.record_status_poll(done);
    }
    debug!(sid, done, "Search job status");
    Ok(done)
}

/// Check the job status up to `max_attempts` times, `interval` apart.
///
/// Returns `true` as soon as the job reports done and `false` if it never
/// does within the attempt limit. Request failures abort immediately.
pub async fn poll_until_done(
    client: &Client,
    base_url: &str,
    auth: &BasicAuth,
    sid: &str,
    max_attempts: u32,
    interval: Duration,
    metrics: Option<&MetricsCollector>,
) -> Result<bool> {
    let policy = PollPolicy::attempts(max_attempts, interval);
    let outcome = poll(&policy, |attempt| async move {
        let done = get_job_status(client, base_url, auth, sid, metrics).await?;
        Ok(if done {
            Attempt::Ready(())
        } else {
            Attempt::Pending(format!("job {sid} not done after attempt {attempt}"))
        })
    })
    .await;

    match outcome {
        Ok(_) => Ok(true),
        Err(PollError::Exhausted { attempts, .. }) => {
            debug!(sid, attempts, "Search job still running after attempt limit");
            Ok(false)
        }
        Err(PollError::Aborted(e)) => Err(e),
    }
}

/// Fetch a job's `events` or `results` and decode every record into `T`.
pub async fn fetch_results<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    auth: &BasicAuth,
    sid: &str,
    kind: ResultsKind,
    metrics: Option<&MetricsCollector>,
) -> Result<Vec<T>> {
    let url = format!(
        "{}{}/{}/{}",
        base_url,
        JOBS_PATH,
        encode_path_segment(sid),
        kind.path_segment()
    );
    let endpoint = format!("{JOBS_PATH}/{{sid}}/{}", kind.path_segment());

    // count=0 asks for every result instead of the default page of 100
    let builder = auth
        .apply(client.get(&url))
        .query(&[OUTPUT_MODE, ("count", "0")]);
    let response = send_request(builder, &url, &endpoint, "GET", metrics).await?;
    let body = read_text(response, &url).await?;

    let records = results_array(&body)?;
    let decoded = decode_results(&records);
    if let Some(m) = metrics {
        match &decoded {
            Ok(rows) => m.record_decoded(kind.path_segment(), rows.len()),
            Err(e) => m.record_client_error(&endpoint, "GET", e),
        }
    }
    debug!(sid, %kind, count = records.len(), "Fetched search results");
    decoded
}
