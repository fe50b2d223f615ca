//! Render command implementation.

use std::path::Path;

use anyhow::Result;
use connector_harness::{Substitutions, render};

/// Render `template` with the `--set` pairs and print the written path.
/// A repeated key keeps its last value.
pub fn run(template: &Path, set: Vec<(String, String)>) -> Result<()> {
    let substitutions: Substitutions = set.into_iter().collect();
    let rendered = render(template, &substitutions)?;
    println!("{}", rendered.display());
    Ok(())
}
