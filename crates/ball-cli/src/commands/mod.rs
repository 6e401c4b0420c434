//! CLI command implementations.

pub mod estimate;
pub mod project;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use ball_vision::{Scenario, ScenarioPreset};
use serde::Serialize;
use tracing::info;

/// Load a scenario from a JSON file, a preset name, or the default scene.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the preset is
/// unknown.
pub fn load_scenario(path: Option<&Path>, preset: Option<&str>) -> Result<Scenario> {
    if let Some(path) = path {
        info!(path = %path.display(), "Loading scenario");
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        return Scenario::from_json(&json)
            .with_context(|| format!("Invalid scenario {}", path.display()));
    }
    let preset = match preset {
        Some(name) => name.parse::<ScenarioPreset>()?,
        None => ScenarioPreset::Ellipse,
    };
    info!(%preset, "Using preset scenario");
    Ok(Scenario::preset(preset))
}

/// Pretty-print `value` as JSON to `output`, or to stdout.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
