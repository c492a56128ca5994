//! Configuration loading.
//!
//! Reads the topology-and-rules JSON once at startup, resolving
//! `${NAME}` placeholders from the process environment first so
//! credentials stay out of the file. An empty topology fails fast:
//! an engine with nothing to compare is a deployment mistake.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::topology::ReconciliationConfig;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("PLACEHOLDER_REGEX is a valid regex pattern")
});

/// Load and validate configuration from a JSON file.
pub fn load_config(path: &Path) -> ReconResult<ReconciliationConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ReconError::invalid_config(format!(
            "failed to read reconciliation config from {}: {e}",
            path.display()
        ))
    })?;

    let config = parse_config(&raw)?;
    info!(
        path = %path.display(),
        systems = config.source_systems.len(),
        rules = config.reconciliation_rules.len(),
        "reconciliation config loaded"
    );
    Ok(config)
}

/// Parse and validate configuration from a JSON string.
pub fn parse_config(raw: &str) -> ReconResult<ReconciliationConfig> {
    let resolved = resolve_placeholders(raw);

    let config: ReconciliationConfig = serde_json::from_str(&resolved)
        .map_err(|e| ReconError::invalid_config(format!("invalid reconciliation config: {e}")))?;

    if config.source_systems.is_empty() {
        return Err(ReconError::invalid_config(
            "reconciliation config declares no source systems",
        ));
    }

    Ok(config)
}

/// Replace `${NAME}` placeholders with environment values.
///
/// Unset variables resolve to the empty string.
fn resolve_placeholders(raw: &str) -> String {
    PLACEHOLDER_REGEX
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
