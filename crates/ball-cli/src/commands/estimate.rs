//! Estimate command - projection/estimation round trip for one ball position.

use std::path::Path;

use anyhow::{Context, Result};
use ball_vision::{project_position, ViewMode};
use nalgebra::Vector3;
use projective_geometry::EllipseParams;
use serde::Serialize;
use tracing::info;

use super::{load_scenario, write_json};

/// Result of one round trip.
#[derive(Debug, Serialize)]
struct EstimateReport {
    truth: Vector3<f64>,
    camera_center: Vector3<f64>,
    ellipse: EllipseParams,
    estimate: Vector3<f64>,
    estimate_exact: Vector3<f64>,
    error: f64,
}

/// Runs the estimate command.
///
/// Uses the scenario's main camera and ball radius.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded, the ball is behind
/// the camera, or the silhouette is degenerate.
pub fn run(
    position: [f64; 3],
    scenario_path: Option<&Path>,
    preset: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let scenario = load_scenario(scenario_path, preset)?;
    let projector = scenario.projector()?;
    let truth = Vector3::from(position);

    let ellipse = project_position(&projector, &truth, ViewMode::Perspective)
        .with_context(|| format!("No silhouette for ball at {position:?}"))?;
    let conic = ellipse.to_conic();
    let estimate = projector.estimate(&conic)?;
    let estimate_exact = projector.estimate_exact(&conic)?;
    let error = (estimate_exact - truth).norm();

    info!(
        x = estimate.x,
        y = estimate.y,
        z = estimate.z,
        error,
        "Estimated ball location"
    );

    let report = EstimateReport {
        truth,
        camera_center: projector.camera().center(),
        ellipse,
        estimate,
        estimate_exact,
        error,
    };
    write_json(&report, output)
}
