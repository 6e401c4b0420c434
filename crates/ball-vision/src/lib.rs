//! Ball trajectories seen through a camera.
//!
//! Ties [`sim_trajectory`] and [`projective_geometry`] together:
//!
//! - [`Scenario`] / [`ScenarioPreset`] - camera, launch, forces and time
//!   range as one JSON-loadable configuration
//! - [`project_trajectory`] / [`project_observations`] - per-frame ball
//!   silhouettes, with per-frame failures kept on the frame
//! - [`ViewMode`] - perspective view or ground shadow
//! - [`validate_estimates`] - project each position and recover it from its
//!   own ellipse
//! - [`ScenarioReport`] - everything a run produces, serializable
//!
//! # Example
//!
//! ```
//! use ball_vision::{Scenario, ScenarioPreset};
//!
//! let report = Scenario::preset(ScenarioPreset::Ellipse).run().unwrap();
//!
//! assert_eq!(report.perspective.len(), 51);
//! assert_eq!(report.validation.failures, 0);
//! assert!(report.validation.max_error < 1e-2);
//! ```
//!
//! # Data Flow
//!
//! ```text
//! Scenario ─▶ Trajectory (dense grid) ─▶ display grid ─▶ ellipses
//!                  │                                      │
//!                  └─▶ NoiseModel ─▶ observations         └─▶ estimates
//! ```
//!
//! Serialization is always on in this crate.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::doc_markdown
)]

mod error;
mod pipeline;
mod scenario;

pub use error::{Result, VisionError};
pub use pipeline::{
    estimate_position, project_observations, project_position, project_trajectory,
    validate_estimates, EstimateCheck, ProjectedSample, ValidationSummary, ViewMode,
};
pub use scenario::{InitialCondition, Scenario, ScenarioPreset, ScenarioReport, TrajectorySummary};

// Re-export the layer crates for convenience
pub use projective_geometry;
pub use sim_trajectory;

/// Prelude for convenient imports.
///
/// ```
/// use ball_vision::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        project_trajectory, validate_estimates, ProjectedSample, Scenario, ScenarioPreset,
        ScenarioReport, ViewMode, VisionError,
    };
    pub use projective_geometry::{BallProjector, Camera, EllipseParams};
    pub use sim_trajectory::{ForceFlags, KinematicState, TimeGrid, Trajectory};
}
