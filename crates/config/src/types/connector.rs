//! Connector process settings.

use std::path::PathBuf;
use std::time::Duration;

/// Where the connector binary and its config templates live, and how long
/// the supervisor waits around start and stop.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Path to the connector binary.
    pub binary: PathBuf,
    /// Directory holding `*.tmpl` config templates; rendered configs land here too.
    pub config_dir: PathBuf,
    /// Pause after spawn before the process is considered running.
    pub warmup: Duration,
    /// Time allowed between SIGTERM and a forced kill.
    pub grace_period: Duration,
}

impl ConnectorConfig {
    /// Full path of a template (or rendered config) inside the config directory.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.config_dir.join(name)
    }
}
