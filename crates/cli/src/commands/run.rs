//! Run command implementation.
//!
//! Runs the selected scenarios in order against one configuration and stops
//! at the first failure. Performance settings are only read when a
//! performance scenario is selected.

use anyhow::{Context, Result};
use connector_harness::{KafkaBroker, ScenarioRunner};
use harness_config::{HarnessConfig, PerformanceConfig};
use search_client::SearchJobClient;
use tracing::info;

use crate::args::resolve_scenarios;

pub async fn run(
    config: &HarnessConfig,
    client: SearchJobClient,
    names: &[String],
    feature_gates: Option<String>,
) -> Result<()> {
    let scenarios = resolve_scenarios(names).map_err(anyhow::Error::msg)?;

    let performance = if scenarios.iter().any(|s| s.is_performance()) {
        Some(PerformanceConfig::from_env().context("Failed to load performance settings")?)
    } else {
        None
    };

    let broker = KafkaBroker::from_config(&config.kafka, &config.timing)?;
    let mut runner = ScenarioRunner::new(config, client, broker).with_feature_gates(feature_gates);
    if let Some(performance) = performance {
        runner = runner.with_performance(performance);
    }

    let total = scenarios.len();
    for (i, scenario) in scenarios.into_iter().enumerate() {
        info!(%scenario, "Running scenario {}/{}", i + 1, total);
        let report = runner
            .run(scenario)
            .await
            .with_context(|| format!("Scenario {scenario} failed"))?;
        println!("{report}");
    }

    println!("{total} scenario(s) passed");
    Ok(())
}
