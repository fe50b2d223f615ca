//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the command handlers.
//! - Load the harness configuration and build the search client for the
//!   commands that talk to Splunk.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - `.env` loading and tracing setup (see `main()`).
//!
//! Invariants:
//! - `render` never reads the harness configuration.
//! - Clients carry a metrics collector only when an exporter is installed.

use anyhow::{Context, Result};
use harness_config::{ConfigLoader, HarnessConfig};
use search_client::{MetricsCollector, SearchJobClient, SearchQuery};

use crate::args::{Cli, Commands};
use crate::commands;

pub(crate) async fn run_command(cli: Cli, metrics: bool) -> Result<()> {
    match cli.command {
        Commands::Render { template, set } => commands::render::run(&template, set),
        Commands::Run {
            scenarios,
            feature_gates,
        } => {
            let config = load_config()?;
            let client = build_client(&config, cli.splunk_url.as_deref(), metrics)?;
            commands::run::run(&config, client, &scenarios, feature_gates).await
        }
        Commands::Search {
            query,
            earliest,
            latest,
            kind,
        } => {
            let config = load_config()?;
            let client = build_client(&config, cli.splunk_url.as_deref(), metrics)?;
            let mut query = SearchQuery::new(query, earliest);
            if let Some(latest) = latest {
                query = query.latest(latest);
            }
            commands::search::run(&client, &query, kind).await
        }
    }
}

fn load_config() -> Result<HarnessConfig> {
    ConfigLoader::new()
        .from_env()
        .and_then(ConfigLoader::build)
        .context("Failed to load configuration")
}

fn build_client(
    config: &HarnessConfig,
    splunk_url: Option<&str>,
    metrics: bool,
) -> Result<SearchJobClient> {
    let mut builder = SearchJobClient::builder().from_config(config);
    if let Some(url) = splunk_url.filter(|u| !u.trim().is_empty()) {
        builder = builder.base_url(url);
    }
    if metrics {
        builder = builder.metrics(MetricsCollector::new());
    }
    Ok(builder.build()?)
}
