//! Testing utilities for search client tests.
//!
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use search_client::testing::load_fixture;
//!
//! let fixture = load_fixture("search/job_done.json");
//! ```

use std::path::Path;

/// Load a JSON fixture file from the fixtures directory.
///
/// # Panics
/// - If the fixture file cannot be read
/// - If the file content is not valid JSON
pub fn load_fixture(fixture_path: &str) -> serde_json::Value {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let full_path = manifest_dir.join("fixtures").join(fixture_path);
    let content = std::fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", full_path.display()));
    serde_json::from_str(&content).expect("Invalid JSON in fixture")
}

/// Job status body with the given completion flag.
pub fn job_status(sid: &str, done: bool) -> serde_json::Value {
    serde_json::json!({
        "entry": [{
            "name": sid,
            "content": {
                "sid": sid,
                "isDone": done,
                "dispatchState": if done { "DONE" } else { "RUNNING" },
            }
        }]
    })
}
