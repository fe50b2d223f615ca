//! Property-based tests for result decoding.
//!
//! # Invariants
//! - N well-formed records decode to N values in input order
//! - A single malformed record fails the whole batch at its index

use proptest::prelude::*;
use search_client::ClientError;
use search_client::decode::{decode_results, results_array};
use search_client::models::EventRecord;
use serde_json::{Value, json};

fn event(raw: &str, source: &str) -> Value {
    json!({ "_raw": raw, "source": source, "sourcetype": "otel-basic-test" })
}

proptest! {
    #[test]
    fn prop_decode_preserves_length_and_order(
        raws in prop::collection::vec("[ -~]{0,40}", 0..50),
    ) {
        let records: Vec<Value> = raws.iter().map(|r| event(r, "otel")).collect();
        let decoded: Vec<EventRecord> = decode_results(&records).unwrap();

        prop_assert_eq!(decoded.len(), raws.len());
        for (record, raw) in decoded.iter().zip(&raws) {
            prop_assert_eq!(&record.raw, raw);
        }
    }

    #[test]
    fn prop_one_bad_record_fails_batch(
        raws in prop::collection::vec("[a-z ]{1,20}", 1..30),
        bad_at in any::<prop::sample::Index>(),
    ) {
        let mut records: Vec<Value> = raws.iter().map(|r| event(r, "otel")).collect();
        let bad = bad_at.index(records.len());
        records[bad] = json!({ "_raw": ["not", "a", "string"], "source": "otel" });

        match decode_results::<EventRecord>(&records) {
            Err(ClientError::Decode { index, .. }) => prop_assert_eq!(index, bad),
            other => prop_assert!(false, "expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn prop_envelope_round_trips_record_count(count in 0usize..40) {
        let records: Vec<Value> = (0..count).map(|i| event(&format!("event {i}"), "otel")).collect();
        let body = json!({ "preview": false, "results": records }).to_string();

        let extracted = results_array(&body).unwrap();
        prop_assert_eq!(extracted.len(), count);
    }
}
