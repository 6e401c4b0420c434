//! Simulate command - integrates a scenario's trajectory.

use std::path::Path;

use anyhow::Result;
use ball_vision::sim_trajectory::ForceFlags;
use tracing::info;

use super::{load_scenario, write_json};

/// Forces switched off from the command line.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DisabledForces {
    pub bounce: bool,
    pub drag: bool,
    pub friction: bool,
    pub magnus: bool,
}

impl DisabledForces {
    /// Switch the disabled forces off in `flags`. Never switches a force on.
    #[must_use]
    pub fn apply(self, flags: ForceFlags) -> ForceFlags {
        flags
            .with_bounce(flags.bounce && !self.bounce)
            .with_drag(flags.drag && !self.drag)
            .with_friction(flags.friction && !self.friction)
            .with_magnus(flags.magnus && !self.magnus)
    }
}

/// Runs the simulate command.
///
/// # Arguments
///
/// * `scenario_path` - Scenario JSON file; takes precedence over `preset`
/// * `preset` - Built-in scenario name
/// * `disabled` - Forces to switch off on top of the scenario's flags
/// * `output` - Output file; stdout if `None`
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or integrated.
pub fn run(
    scenario_path: Option<&Path>,
    preset: Option<&str>,
    disabled: DisabledForces,
    output: Option<&Path>,
) -> Result<()> {
    let scenario = load_scenario(scenario_path, preset)?;
    let flags = disabled.apply(scenario.flags);
    let scenario = scenario.with_flags(flags);

    info!(scenario = %scenario.name, ?flags, "Simulating trajectory");
    let trajectory = scenario.trajectory()?;

    info!(
        samples = trajectory.len(),
        bounces = trajectory.bounces().len(),
        rest_time = ?trajectory.rest_time(),
        max_height = trajectory.max_height(),
        "Simulation complete"
    );
    write_json(&trajectory, output)
}
