//! Config file loading
//!
//! Accepts YAML (`.yaml`, `.yml`, or anything not `.toml`) and TOML. Keys may
//! sit at the top level or under a `dependency_map` table so the settings can
//! share a file with other tools.

use std::path::Path;

use anyhow::{Context, Result};
use depmap_core::AnalysisConfig;

const SECTION: &str = "dependency_map";

pub fn load(path: &Path) -> Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&text),
        _ => parse_yaml(&text),
    }
    .with_context(|| format!("Invalid config file {}", path.display()))?;

    tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}

fn parse_yaml(text: &str) -> Result<AnalysisConfig> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(AnalysisConfig::default());
    }
    if let Some(section) = value.get(SECTION).cloned() {
        value = section;
    }
    Ok(serde_yaml::from_value(value)?)
}

fn parse_toml(text: &str) -> Result<AnalysisConfig> {
    let mut table: toml::Table = text.parse()?;
    let value = match table.remove(SECTION) {
        Some(section) => section,
        None => toml::Value::Table(table),
    };
    Ok(value.try_into()?)
}
