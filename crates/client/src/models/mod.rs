//! Data models for search API requests and responses.
//!
//! Types are organized by concern in submodules and re-exported here
//! for convenient access.

pub mod common;
pub mod records;
pub mod search;

pub use common::{MessageType, SplunkMessage, SplunkMessages};
pub use records::{EventRecord, KAFKA_HEADER_FIELD_PREFIX, Statistic};
pub use search::{DEFAULT_LATEST, EVENT_SEARCH_PREFIX, ResultsKind, SearchQuery};
