//! Splunk connection settings.
//!
//! Responsibilities:
//! - Hold host, ports, credentials, and TLS/timeout settings for Splunk.
//! - Build the management base URL and the HEC collector endpoint.
//!
//! Does NOT handle:
//! - Environment variable parsing (see `loader::env`).
//! - HTTP client construction (see the client crate's builder).

use secrecy::SecretString;
use std::time::Duration;

/// Connection settings for the Splunk instance under test.
#[derive(Debug, Clone)]
pub struct SplunkConnection {
    /// Hostname or IP address, without scheme.
    pub host: String,
    /// Management API port (search jobs live here).
    pub management_port: u16,
    /// HEC port the connector sends events to.
    pub hec_port: u16,
    /// Username for basic auth against the management API.
    pub username: String,
    /// Password for basic auth against the management API.
    pub password: SecretString,
    /// HEC token rendered into connector configs.
    pub hec_token: SecretString,
    /// Skip TLS verification. Test instances use self-signed certificates.
    pub skip_verify: bool,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl SplunkConnection {
    /// Base URL of the management API, e.g. `https://splunk:8089`.
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.management_port)
    }

    /// HEC collector endpoint rendered into connector configs.
    pub fn hec_endpoint(&self) -> String {
        format!("https://{}:{}/services/collector", self.host, self.hec_port)
    }
}
