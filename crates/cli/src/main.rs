//! Connector harness CLI.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Set up logging, optional OTLP trace export and the optional Prometheus
//!   metrics endpoint.
//! - Run scenarios, searches and template renders, and turn the outcome into
//!   a structured exit code.
//!
//! Does NOT handle:
//! - Scenario logic (see `crates/harness`) or Splunk REST calls (see `crates/client`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide clap defaults.
//! - On Ctrl+C the running command is dropped, which kills a connector that
//!   is still running.

mod args;
mod commands;
mod dispatch;
mod error;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use harness_config::ConfigLoader;
use search_client::MetricsExporter;
use search_client::telemetry::TracingConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {e}");
        std::process::exit(ExitCode::ConfigError.as_i32());
    }

    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::new().with_service_name("connector-harness");
    if let Some(ref endpoint) = cli.otlp_endpoint {
        tracing_config = tracing_config.with_otlp_endpoint(endpoint);
    }
    let tracing_guard = match tracing_config.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let metrics_exporter = if let Some(ref bind_addr) = cli.metrics_bind {
        match MetricsExporter::install(bind_addr) {
            Ok(exporter) => Some(exporter),
            Err(e) => {
                eprintln!("Failed to start metrics exporter: {e}");
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let exit_code = tokio::select! {
        result = run_command(cli, metrics_exporter.is_some()) => match result {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("Error: {e:#}");
                e.exit_code()
            }
        },
        () = interrupted() => {
            eprintln!("Interrupted, connector stopped.");
            ExitCode::Interrupted
        }
    };

    tracing_guard.shutdown();
    std::process::exit(exit_code.as_i32());
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
