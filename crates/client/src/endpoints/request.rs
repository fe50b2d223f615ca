//! Request execution shared by all endpoints.
//!
//! Sends one HTTP request, records latency and error metrics, and maps
//! failures onto [`ClientError`]. Nothing here retries: a transport failure
//! or non-success status propagates to the caller as-is.

use std::time::Instant;

use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::SplunkMessages;
use crate::telemetry::inject_trace_context;

/// Send a request and return the response if its status is 2xx.
///
/// `endpoint` is the templated path used as the metrics label
/// (e.g. `/services/search/v2/jobs/{sid}`).
pub async fn send_request(
    builder: RequestBuilder,
    url: &str,
    endpoint: &str,
    method: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    let start = Instant::now();
    if let Some(m) = metrics {
        m.record_request(endpoint, method);
    }

    let response = match inject_trace_context(builder).send().await {
        Ok(response) => response,
        Err(source) => {
            let err = ClientError::Transport {
                url: url.to_string(),
                source,
            };
            if let Some(m) = metrics {
                m.record_request_duration(endpoint, method, start.elapsed(), None);
                m.record_client_error(endpoint, method, &err);
            }
            return Err(err);
        }
    };

    let status = response.status().as_u16();
    if let Some(m) = metrics {
        m.record_request_duration(endpoint, method, start.elapsed(), Some(status));
    }
    debug!(%method, %url, status, "Search API response");

    if response.status().is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    // Prefer Splunk's structured messages for a cleaner display
    let message = match serde_json::from_str::<SplunkMessages>(&body) {
        Ok(m) if !m.messages.is_empty() => m.summary(),
        _ => crate::error::fragment(&body),
    };

    let err = ClientError::Api {
        status,
        url: url.to_string(),
        message,
    };
    if let Some(m) = metrics {
        m.record_client_error(endpoint, method, &err);
    }
    Err(err)
}

/// Read a response body and parse it as JSON.
pub async fn read_json(response: Response, url: &str) -> Result<Value> {
    let body = read_text(response, url).await?;
    serde_json::from_str(&body)
        .map_err(|e| ClientError::protocol(format!("Response is not valid JSON: {e}"), &body))
}

/// Read a response body as text.
pub async fn read_text(response: Response, url: &str) -> Result<String> {
    response.text().await.map_err(|source| ClientError::Transport {
        url: url.to_string(),
        source,
    })
}
