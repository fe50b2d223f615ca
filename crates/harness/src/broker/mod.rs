//! Message broker capability used by scenarios.
//!
//! Responsibilities:
//! - Define what a scenario needs from the broker: create a topic, publish
//!   one message with headers, publish a bulk load.
//!
//! Does NOT handle:
//! - Consuming messages. Verification happens on the Splunk side.

mod kafka;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::Result;

pub use kafka::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, KafkaBroker};

/// A record header as a key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Send window of a bulk publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPublish {
    pub first_sent_at: DateTime<Utc>,
    pub last_sent_at: DateTime<Utc>,
}

/// Topic administration and production.
pub trait MessageBroker {
    /// Create `name` and wait until the broker lists it. An existing topic
    /// is reused.
    fn create_topic(
        &self,
        name: &str,
        partitions: u32,
        replication_factor: u32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Publish a single message and wait for the broker to accept it.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        headers: &[Header],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Publish `count` records of `record_size` bytes as fast as possible.
    fn publish_bulk(
        &self,
        topic: &str,
        count: u64,
        record_size: u64,
    ) -> impl Future<Output = Result<BulkPublish>> + Send;
}
