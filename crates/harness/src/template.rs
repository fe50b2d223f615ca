//! Connector config templating.
//!
//! Responsibilities:
//! - Replace `{{ .Key }}` placeholders in a `*.tmpl` file from a substitution map.
//! - Check the result is valid YAML and write it next to the template.
//!
//! Does NOT handle:
//! - Conditionals, loops or pipelines inside placeholders. Only plain keys.
//!
//! Invariants:
//! - A placeholder without a substitution is an error, never an empty string.
//! - Nothing is written unless the rendered text parses as YAML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{HarnessError, Result};

/// Suffix stripped from a template's file name when rendering.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Placeholder values keyed by name (without the leading dot).
pub type Substitutions = BTreeMap<String, String>;

/// Render `template_path` and return the path of the written config.
///
/// # Errors
///
/// [`HarnessError::Template`] if the file cannot be read or written, lacks
/// the `.tmpl` suffix, references an unknown key, or renders to invalid YAML.
pub fn render(template_path: &Path, substitutions: &Substitutions) -> Result<PathBuf> {
    let template_error = |message: String| HarnessError::Template {
        path: template_path.to_path_buf(),
        message,
    };

    let output_path = rendered_path(template_path).ok_or_else(|| {
        template_error(format!("file name must end with {TEMPLATE_SUFFIX}"))
    })?;

    let source = std::fs::read_to_string(template_path)
        .map_err(|e| template_error(format!("cannot read: {e}")))?;
    let rendered = render_str(&source, substitutions).map_err(template_error)?;

    serde_yaml::from_str::<serde_yaml::Value>(&rendered)
        .map_err(|e| template_error(format!("rendered config is not valid YAML: {e}")))?;

    std::fs::write(&output_path, &rendered).map_err(|e| {
        template_error(format!("cannot write {}: {e}", output_path.display()))
    })?;

    info!(config = %output_path.display(), "Connector config rendered");
    Ok(output_path)
}

/// `dir/name.yaml.tmpl` -> `dir/name.yaml`.
pub fn rendered_path(template_path: &Path) -> Option<PathBuf> {
    let name = template_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(TEMPLATE_SUFFIX).filter(|s| !s.is_empty())?;
    Some(template_path.with_file_name(stem))
}

/// Substitute every `{{ .Key }}` in `template`.
pub fn render_str(template: &str, substitutions: &Substitutions) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or_else(|| format!("unterminated placeholder at byte {}", template.len() - rest.len() + open))?;

        let key = parse_key(&after_open[..close])?;
        let value = substitutions
            .get(key)
            .ok_or_else(|| format!("no value for placeholder {{{{ .{key} }}}}"))?;
        debug!(key, "Substituted placeholder");
        out.push_str(value);
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn parse_key(inner: &str) -> std::result::Result<&str, String> {
    let key = inner
        .trim()
        .strip_prefix('.')
        .ok_or_else(|| format!("unsupported placeholder {{{{{inner}}}}}"))?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("unsupported placeholder {{{{{inner}}}}}"));
    }
    Ok(key)
}
