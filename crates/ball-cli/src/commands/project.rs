//! Project command - runs a scenario end to end.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use super::{load_scenario, write_json};

/// Runs the project command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or run.
pub fn run(
    scenario_path: Option<&Path>,
    preset: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let scenario = load_scenario(scenario_path, preset)?;
    let report = scenario.run()?;

    let visible = report.perspective.iter().filter(|f| f.is_visible()).count();
    let failed = report.perspective.iter().filter(|f| f.error.is_some()).count();
    if failed > 0 {
        warn!(failed, "Some frames have no silhouette");
    }
    info!(
        frames = report.perspective.len(),
        visible,
        max_estimate_error = report.validation.max_error,
        "Projection complete"
    );
    write_json(&report, output)
}
