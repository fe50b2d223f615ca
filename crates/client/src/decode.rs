//! Search result decoding.
//!
//! Responsibilities:
//! - Extract the `results` array from a job results envelope.
//! - Map each untyped record into a caller-supplied `DeserializeOwned` type.
//!
//! Invariants:
//! - Raw records are only borrowed; decoding never mutates them.
//! - Decoding is all-or-nothing: one bad record fails the whole batch and no
//!   partial sequence escapes.
//! - Output order equals input order.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result, fragment};

/// Decode one record into `T`.
///
/// `index` is the record's position in its batch and is reported on failure.
pub fn decode_record<T: DeserializeOwned>(index: usize, record: &Value) -> Result<T> {
    T::deserialize(record).map_err(|source| ClientError::Decode {
        index,
        target: std::any::type_name::<T>(),
        fragment: fragment(&record.to_string()),
        source,
    })
}

/// Decode every record, failing on the first one that does not fit `T`.
pub fn decode_results<T: DeserializeOwned>(records: &[Value]) -> Result<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record))
        .collect()
}

/// Pull the `results` array out of a results response body.
///
/// An empty body is treated as an empty result set, which Splunk returns for
/// jobs that matched nothing.
pub fn results_array(body: &str) -> Result<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut envelope: Value = serde_json::from_str(body)
        .map_err(|e| ClientError::protocol(format!("Results body is not JSON: {e}"), body))?;

    match envelope.get_mut("results").map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(ClientError::protocol(
            "Field 'results' is not an array",
            body,
        )),
        None => Err(ClientError::protocol(
            "Missing 'results' in response",
            body,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRecord, Statistic};
    use serde_json::json;

    #[test]
    fn test_decode_results_preserves_order() {
        let records = vec![
            json!({"_raw": "Hello kafka-test-topic-1", "source": "otel-1"}),
            json!({"_raw": "Hello kafka-test-topic-2", "source": "otel-2"}),
        ];
        let decoded: Vec<EventRecord> = decode_results(&records).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].raw, "Hello kafka-test-topic-1");
        assert_eq!(decoded[1].source.as_deref(), Some("otel-2"));
    }

    #[test]
    fn test_decode_results_is_all_or_nothing() {
        let records = vec![
            json!({"_raw": "ok"}),
            json!({"_raw": 42}),
            json!({"_raw": "also ok"}),
        ];
        let err = decode_results::<EventRecord>(&records).unwrap_err();
        match err {
            ClientError::Decode {
                index,
                target,
                fragment,
                ..
            } => {
                assert_eq!(index, 1);
                assert!(target.ends_with("EventRecord"));
                assert!(fragment.contains("42"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_does_not_mutate_input() {
        let records = vec![json!({
            "earliest_time": "100.0",
            "latest_time": "110.0",
            "count": "10"
        })];
        let before = records.clone();
        let _: Vec<Statistic> = decode_results(&records).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_results_array_empty_body() {
        assert!(results_array("  ").unwrap().is_empty());
    }

    #[test]
    fn test_results_array_rejects_non_json() {
        let err = results_array("<html>proxy error</html>").unwrap_err();
        assert_eq!(err.category(), "ProtocolError");
        assert!(err.to_string().contains("<html>proxy error</html>"));
    }

    #[test]
    fn test_results_array_requires_results_field() {
        let err = results_array(r#"{"preview": false}"#).unwrap_err();
        assert!(err.to_string().contains("Missing 'results'"));
    }
}
