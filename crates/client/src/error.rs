//! Error types for the search client.
//!
//! Responsibilities:
//! - Define the transport / protocol / decode / timeout taxonomy for search calls.
//! - Carry enough context (URL, job id, raw response fragment, query) to
//!   diagnose a failed search without re-running it.
//!
//! Invariants:
//! - Response fragments are truncated to [`MAX_FRAGMENT_CHARS`] characters.
//! - `Search` wraps exactly one inner error and is never nested twice.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Longest raw response fragment kept inside an error.
pub const MAX_FRAGMENT_CHARS: usize = 512;

/// Errors that can occur while talking to the search service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, TLS or I/O failure before a response was received.
    #[error("Transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status from the search service.
    #[error("API error ({status}) at {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body was not JSON or lacked an expected field.
    #[error("Protocol error: {message} (response: {fragment})")]
    Protocol { message: String, fragment: String },

    /// A result record could not be mapped into the requested type.
    #[error("Failed to decode result {index} as {target}: {source} (record: {fragment})")]
    Decode {
        index: usize,
        target: &'static str,
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    /// A bounded wait ran out of attempts or time.
    #[error("Timed out waiting for {operation} after {attempts} attempts")]
    Timeout {
        operation: &'static str,
        attempts: u32,
    },

    /// Client could not be constructed from the given settings.
    #[error("Client configuration error: {0}")]
    Config(String),

    /// Failure inside a search, annotated with the query and job id.
    #[error("Search {query:?}{} failed: {source}", .sid.as_ref().map(|s| format!(" (job {s})")).unwrap_or_default())]
    Search {
        query: String,
        sid: Option<String>,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Build a protocol error keeping a truncated copy of the offending body.
    pub fn protocol(message: impl Into<String>, body: &str) -> Self {
        Self::Protocol {
            message: message.into(),
            fragment: fragment(body),
        }
    }

    /// Attach the search query and, when allocated, the job id.
    ///
    /// Already-annotated errors are returned unchanged.
    pub fn in_search(self, query: &str, sid: Option<&str>) -> Self {
        match self {
            already @ Self::Search { .. } => already,
            other => Self::Search {
                query: query.to_string(),
                sid: sid.map(str::to_string),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping search annotations.
    pub fn root(&self) -> &ClientError {
        match self {
            Self::Search { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the failure category this error belongs to.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Search { source, .. } => source.category(),
            Self::Transport { .. } => "TransportError",
            Self::Config(_) => "ConfigError",
            Self::Api { .. } | Self::Protocol { .. } => "ProtocolError",
            Self::Decode { .. } => "DecodeError",
            Self::Timeout { .. } => "TimeoutError",
        }
    }

    /// Job id attached to this error, if any.
    pub fn sid(&self) -> Option<&str> {
        match self {
            Self::Search { sid, .. } => sid.as_deref(),
            _ => None,
        }
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn fragment(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_FRAGMENT_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_keeps_short_bodies() {
        assert_eq!(fragment("  {\"sid\": 1} "), "{\"sid\": 1}");
    }

    #[test]
    fn test_fragment_truncates_long_bodies() {
        let body = "x".repeat(MAX_FRAGMENT_CHARS + 100);
        let f = fragment(&body);
        assert_eq!(f.len(), MAX_FRAGMENT_CHARS + 3);
        assert!(f.ends_with("..."));
    }

    #[test]
    fn test_fragment_respects_char_boundaries() {
        let body = "é".repeat(MAX_FRAGMENT_CHARS + 1);
        let f = fragment(&body);
        assert_eq!(f.chars().count(), MAX_FRAGMENT_CHARS + 3);
    }

    #[test]
    fn test_in_search_annotates_once() {
        let err = ClientError::protocol("Missing sid in response", "{}")
            .in_search("index=kafka", None)
            .in_search("other", Some("1234.5"));

        match &err {
            ClientError::Search { query, sid, .. } => {
                assert_eq!(query, "index=kafka");
                assert!(sid.is_none());
            }
            other => panic!("expected search annotation, got {other:?}"),
        }
        assert_eq!(err.category(), "ProtocolError");
    }

    #[test]
    fn test_display_includes_query_and_sid() {
        let err = ClientError::Timeout {
            operation: "search job completion",
            attempts: 20,
        }
        .in_search("index=kafka source=otel", Some("1700000000.42"));

        let message = err.to_string();
        assert!(message.contains("\"index=kafka source=otel\""));
        assert!(message.contains("job 1700000000.42"));
        assert!(message.contains("after 20 attempts"));
        assert_eq!(err.sid(), Some("1700000000.42"));
        assert_eq!(err.category(), "TimeoutError");
    }

    #[test]
    fn test_categories() {
        let api = ClientError::Api {
            status: 500,
            url: "u".to_string(),
            message: "m".to_string(),
        };
        assert_eq!(api.category(), "ProtocolError");
        assert_eq!(
            ClientError::Config("base_url is required".to_string()).category(),
            "ConfigError"
        );
    }
}
