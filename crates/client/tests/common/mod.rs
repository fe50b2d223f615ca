//! Common test utilities for integration tests.
//!
//! Shared helpers and re-exports for testing the search client against a
//! `wiremock` server.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//! - Test clients use fast status polling so real-time tests stay quick
//!
//! # What this does NOT handle
//! - Test-specific mocks or assertions

use std::time::Duration;

#[allow(unused_imports)]
pub use search_client::testing::{job_status, load_fixture};

#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use search_client::{BasicAuth, ClientError, SearchJobClient, endpoints};
#[allow(unused_imports)]
pub use secrecy::SecretString;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "changeme";
pub const SID: &str = "1717171717.101";

/// Credentials matching [`USERNAME`]/[`PASSWORD`].
#[allow(dead_code)]
pub fn test_auth() -> BasicAuth {
    BasicAuth::new(USERNAME, SecretString::new(PASSWORD.to_string().into()))
}

/// Client pointed at `uri` with `max_attempts` status checks 10ms apart.
#[allow(dead_code)]
pub fn test_client(uri: &str, max_attempts: u32) -> SearchJobClient {
    SearchJobClient::builder()
        .base_url(uri)
        .credentials(USERNAME, SecretString::new(PASSWORD.to_string().into()))
        .max_attempts(max_attempts)
        .poll_interval(Duration::from_millis(10))
        .build()
        .expect("test client should build")
}

/// Advance Tokio's paused clock and yield so sleepers can observe the change.
#[allow(dead_code)]
pub async fn advance_and_yield(duration: Duration) {
    tokio::time::advance(duration).await;
    tokio::task::yield_now().await;
}
