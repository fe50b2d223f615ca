//! Typed result records.
//!
//! `EventRecord` is the shape of rows from `/events`; `Statistic` is the
//! shape of the single row produced by the `stats`/`tstats` searches used for
//! throughput and lag measurements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix the connector uses for indexed Kafka header fields.
pub const KAFKA_HEADER_FIELD_PREFIX: &str = "kafka.header.";

/// One indexed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "_raw")]
    pub raw: String,
    #[serde(rename = "_time", default)]
    pub time: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sourcetype: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    /// Every other field of the record, keyed by its Splunk field name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventRecord {
    /// Value of an extra field. Multi-valued fields yield their first value.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self.extra.get(name)? {
            Value::String(s) => Some(s),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Value of an indexed Kafka header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.field(&format!("{KAFKA_HEADER_FIELD_PREFIX}{name}"))
    }

    /// `_time` as a UTC timestamp, if present and RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let time = self.time.as_deref()?;
        DateTime::parse_from_rfc3339(time)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Aggregate row with the earliest/latest `_time` and an event count.
///
/// Splunk serializes numbers in result rows as strings, so the fields stay
/// strings here; numeric parsing is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    #[serde(default)]
    pub earliest_time: String,
    #[serde(default)]
    pub latest_time: String,
    #[serde(alias = "count")]
    pub total_events: String,
}

impl Statistic {
    /// The event count, when it is a valid unsigned integer.
    pub fn event_count(&self) -> Option<u64> {
        self.total_events.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_record_keeps_extra_fields() {
        let record: EventRecord = serde_json::from_value(json!({
            "_raw": "This event should have extra headers!",
            "_time": "2024-05-01T10:00:00.000+00:00",
            "index": "kafka-header-index",
            "source": "source-value-from-header",
            "sourcetype": "sourcetype-value-from-header",
            "host": "host-value-from-header",
            "kafka.header.custom-header": "test-header-value",
            "_bkt": "kafka-header-index~0~ABC",
            "splunk_server": "so1"
        }))
        .unwrap();

        assert_eq!(record.header("custom-header"), Some("test-header-value"));
        assert_eq!(record.field("splunk_server"), Some("so1"));
        assert_eq!(record.index.as_deref(), Some("kafka-header-index"));
        assert!(record.field("missing").is_none());
    }

    #[test]
    fn test_event_record_multivalue_field() {
        let record: EventRecord = serde_json::from_value(json!({
            "_raw": "x",
            "kafka.header.custom-header": ["first", "second"]
        }))
        .unwrap();
        assert_eq!(record.header("custom-header"), Some("first"));
    }

    #[test]
    fn test_event_record_timestamp() {
        let record: EventRecord = serde_json::from_value(json!({
            "_raw": "[2020-01-01 12:00:00] This event should have a custom timestamp!",
            "_time": "2020-01-01T12:00:00.000+00:00"
        }))
        .unwrap();
        let expected = DateTime::parse_from_rfc3339("2020-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(record.timestamp(), Some(expected));
    }

    #[test]
    fn test_event_record_requires_raw() {
        let result = serde_json::from_value::<EventRecord>(json!({"source": "otel"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_statistic_accepts_count_alias() {
        let stat: Statistic = serde_json::from_value(json!({
            "earliest_time": "1700000000.000000",
            "latest_time": "1700000010.500000",
            "count": "1000000"
        }))
        .unwrap();
        assert_eq!(stat.total_events, "1000000");
        assert_eq!(stat.event_count(), Some(1_000_000));
    }

    #[test]
    fn test_statistic_without_bounds() {
        let stat: Statistic = serde_json::from_value(json!({"total_events": "0"})).unwrap();
        assert!(stat.earliest_time.is_empty());
        assert_eq!(stat.event_count(), Some(0));
    }
}
