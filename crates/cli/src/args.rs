//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse `KEY=VALUE` substitutions and scenario selections.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not load the harness configuration (see `main()`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use connector_harness::Scenario;
use search_client::ResultsKind;

#[derive(Parser)]
#[command(name = "connector-harness")]
#[command(about = "Black-box verification harness for the Kafka to Splunk connector", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  connector-harness run basic custom-headers\n  connector-harness run functional\n  connector-harness search '| search index=kafka sourcetype=otel-basic-test' --earliest -1m@m\n  connector-harness render testdata/configs/basic_test.yaml.tmpl --set KafkaTopicName=kafka-test-topic\n"
)]
pub struct Cli {
    /// OTLP gRPC endpoint for trace export (e.g., http://localhost:4317)
    #[arg(long, global = true, env = "HARNESS_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Splunk management URL, overriding https://<CI_SPLUNK_HOST>:<CI_SPLUNK_MGMT_PORT>
    #[arg(long, global = true, env = "HARNESS_SPLUNK_URL")]
    pub splunk_url: Option<String>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9000)
    #[arg(long, global = true, env = "HARNESS_METRICS_BIND")]
    pub metrics_bind: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run verification scenarios one after another
    Run {
        /// Scenario names, or `functional`, `performance` or `all`
        #[arg(required = true, value_name = "SCENARIO")]
        scenarios: Vec<String>,

        /// Feature gates passed to the connector (e.g., receiver.kafka.UseFranzGo)
        #[arg(long, env = "HARNESS_FEATURE_GATES")]
        feature_gates: Option<String>,
    },

    /// Run one search and print the decoded records as JSON
    Search {
        /// The search query (e.g., '| search index=kafka')
        query: String,

        /// Earliest time for the search (e.g., '-1m@m')
        #[arg(short, long, default_value = "-1m@m", allow_hyphen_values = true)]
        earliest: String,

        /// Latest time for the search (default: now)
        #[arg(short, long, allow_hyphen_values = true)]
        latest: Option<String>,

        /// Read raw events or transformed results
        #[arg(long, default_value = "events")]
        kind: ResultsKind,
    },

    /// Render a connector config template and print the written path
    Render {
        /// Template file ending in .tmpl
        template: PathBuf,

        /// Placeholder value, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_substitution)]
        set: Vec<(String, String)>,
    },
}

/// Parse `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_substitution(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Expand group names and parse scenario names, keeping the given order and
/// dropping repeats.
pub fn resolve_scenarios(names: &[String]) -> Result<Vec<Scenario>, String> {
    let mut selected: Vec<Scenario> = Vec::new();
    for name in names {
        let group: Vec<Scenario> = match name.trim().to_ascii_lowercase().as_str() {
            "all" => Scenario::ALL.to_vec(),
            "functional" => Scenario::FUNCTIONAL.to_vec(),
            "performance" => Scenario::ALL
                .into_iter()
                .filter(|s| s.is_performance())
                .collect(),
            _ => vec![name.parse()?],
        };
        for scenario in group {
            if !selected.contains(&scenario) {
                selected.push(scenario);
            }
        }
    }
    Ok(selected)
}
