//! Search REST API endpoint implementations.
//!
//! Free functions taking the HTTP client, base URL and credentials, so the
//! three search phases can be driven separately in tests.

mod jobs;
mod request;
mod url_encoding;

pub use jobs::{fetch_results, get_job_status, poll_until_done, submit_search};
pub use request::{read_json, read_text, send_request};
pub use url_encoding::encode_path_segment;

/// Jobs collection path (v2 API).
pub const JOBS_PATH: &str = "/services/search/v2/jobs";

/// Query parameter appended to every request.
pub const OUTPUT_MODE: (&str, &str) = ("output_mode", "json");
