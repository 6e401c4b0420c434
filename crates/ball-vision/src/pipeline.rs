//! Trajectory → silhouette → estimate pipeline.
//!
//! ```text
//! Trajectory ──position──▶ obtain_ball_conic ──▶ EllipseParams   (draw)
//!                                   │
//!                                   └──▶ cone ──▶ estimate        (validate)
//! ```
//!
//! Per-frame failures (ball behind the camera, camera inside the ball,
//! degenerate conic) are recorded on the frame and do not abort the run.

use nalgebra::Vector3;
use projective_geometry::{BallProjector, EllipseParams};
use serde::{Deserialize, Serialize};
use sim_trajectory::{ObservedTrajectory, Trajectory};
use tracing::{debug, info};

use crate::error::{Result, VisionError};

/// How a ball position is placed before projecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// The ball where it is.
    #[default]
    Perspective,
    /// The ball dropped onto the ground plane, as bird's-eye views draw it.
    GroundShadow,
}

impl ViewMode {
    /// The point that gets projected for a ball at `position`.
    #[must_use]
    pub fn place(self, position: &Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::Perspective => *position,
            Self::GroundShadow => Vector3::new(position.x, position.y, 0.0),
        }
    }
}

/// One projected frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSample {
    /// Frame time in seconds.
    pub time: f64,
    /// Projected ball center, after [`ViewMode::place`]. `None` if the
    /// ball was not observed at this time.
    pub position: Option<Vector3<f64>>,
    /// Silhouette of the ball, if one exists.
    pub ellipse: Option<EllipseParams>,
    /// Why the frame has no silhouette, for frames that should have had one.
    pub error: Option<String>,
}

impl ProjectedSample {
    /// Returns true if the frame has a silhouette to draw.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.ellipse.is_some()
    }
}

/// Silhouette of a ball at `position` under `mode`.
///
/// # Errors
///
/// - [`VisionError::BehindCamera`] if the placed center is not in front of
///   the camera
/// - [`VisionError::Geometry`] if the silhouette is degenerate
pub fn project_position(
    projector: &BallProjector,
    position: &Vector3<f64>,
    mode: ViewMode,
) -> Result<EllipseParams> {
    let placed = mode.place(position);
    if !projector.camera().is_in_front(&placed) {
        return Err(VisionError::BehindCamera {
            x: placed.x,
            y: placed.y,
            z: placed.z,
        });
    }
    Ok(projector.ellipse(&placed)?)
}

fn project_frame(
    projector: &BallProjector,
    time: f64,
    position: Option<Vector3<f64>>,
    mode: ViewMode,
) -> ProjectedSample {
    let Some(position) = position else {
        return ProjectedSample {
            time,
            position: None,
            ellipse: None,
            error: None,
        };
    };
    match project_position(projector, &position, mode) {
        Ok(ellipse) => ProjectedSample {
            time,
            position: Some(mode.place(&position)),
            ellipse: Some(ellipse),
            error: None,
        },
        Err(e) => {
            debug!(time, error = %e, "Frame has no silhouette");
            ProjectedSample {
                time,
                position: Some(mode.place(&position)),
                ellipse: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Project the trajectory at each of `times`.
///
/// Times are matched to the nearest trajectory sample; a time with no
/// sample nearby yields a frame carrying a [`VisionError::NoSample`]
/// reason.
#[must_use]
pub fn project_trajectory(
    trajectory: &Trajectory,
    projector: &BallProjector,
    times: &[f64],
    mode: ViewMode,
) -> Vec<ProjectedSample> {
    let frames: Vec<ProjectedSample> = times
        .iter()
        .map(|&time| match trajectory.position_at_time(time) {
            Some(position) => project_frame(projector, time, Some(position), mode),
            None => ProjectedSample {
                time,
                position: None,
                ellipse: None,
                error: Some(VisionError::NoSample { time }.to_string()),
            },
        })
        .collect();
    log_projection(&frames, mode);
    frames
}

/// Project noisy observations at each of `times`. Missed detections give
/// frames with neither position nor error.
#[must_use]
pub fn project_observations(
    observed: &ObservedTrajectory,
    projector: &BallProjector,
    times: &[f64],
    mode: ViewMode,
) -> Vec<ProjectedSample> {
    let frames: Vec<ProjectedSample> = times
        .iter()
        .map(|&time| {
            let position = observed.position_at_time(time);
            project_frame(projector, time, position, mode)
        })
        .collect();
    log_projection(&frames, mode);
    frames
}

fn log_projection(frames: &[ProjectedSample], mode: ViewMode) {
    let visible = frames.iter().filter(|f| f.is_visible()).count();
    info!(
        ?mode,
        frames = frames.len(),
        visible,
        "Projected trajectory"
    );
}

/// Ground truth against the center recovered from its own silhouette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateCheck {
    /// Frame time in seconds.
    pub time: f64,
    /// True ball center.
    pub truth: Vector3<f64>,
    /// Center recovered from the silhouette ellipse.
    pub estimate: Option<Vector3<f64>>,
    /// Distance between truth and estimate.
    pub error: Option<f64>,
    /// Why no estimate was produced.
    pub failure: Option<String>,
}

/// Aggregate of [`EstimateCheck`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Per-frame checks.
    pub checks: Vec<EstimateCheck>,
    /// Largest error over frames with an estimate.
    pub max_error: f64,
    /// Mean error over frames with an estimate.
    pub mean_error: f64,
    /// Frames without an estimate.
    pub failures: usize,
}

impl ValidationSummary {
    fn from_checks(checks: Vec<EstimateCheck>) -> Self {
        let errors: Vec<f64> = checks.iter().filter_map(|c| c.error).collect();
        let max_error = errors.iter().copied().fold(0.0, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let mean_error = if errors.is_empty() {
            0.0
        } else {
            errors.iter().sum::<f64>() / errors.len() as f64
        };
        let failures = checks.len() - errors.len();
        Self {
            checks,
            max_error,
            mean_error,
            failures,
        }
    }

    /// Number of frames with an estimate.
    #[must_use]
    pub fn estimated(&self) -> usize {
        self.checks.len() - self.failures
    }
}

/// Recover the ball center of one position from its silhouette ellipse.
///
/// # Errors
///
/// See [`project_position`] and [`BallProjector::estimate_from_ellipse`].
pub fn estimate_position(
    projector: &BallProjector,
    position: &Vector3<f64>,
) -> Result<Vector3<f64>> {
    let ellipse = project_position(projector, position, ViewMode::Perspective)?;
    Ok(projector.estimate_from_ellipse(&ellipse)?)
}

/// Project each sampled position, estimate it back from the ellipse, and
/// report the error distance.
#[must_use]
pub fn validate_estimates(
    trajectory: &Trajectory,
    projector: &BallProjector,
    times: &[f64],
) -> ValidationSummary {
    let checks = times
        .iter()
        .filter_map(|&time| trajectory.position_at_time(time).map(|p| (time, p)))
        .map(|(time, truth)| match estimate_position(projector, &truth) {
            Ok(estimate) => EstimateCheck {
                time,
                truth,
                estimate: Some(estimate),
                error: Some((estimate - truth).norm()),
                failure: None,
            },
            Err(e) => EstimateCheck {
                time,
                truth,
                estimate: None,
                error: None,
                failure: Some(e.to_string()),
            },
        })
        .collect();

    let summary = ValidationSummary::from_checks(checks);
    info!(
        frames = summary.checks.len(),
        failures = summary.failures,
        max_error = summary.max_error,
        "Validated ball estimates"
    );
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use projective_geometry::Camera;
    use sim_trajectory::{
        compute_trajectory, ForceFlags, KinematicState, PhysicsConstants, TimeGrid,
    };

    fn radius() -> f64 {
        PhysicsConstants::default().ball_radius
    }

    fn basketball_flight() -> Trajectory {
        let initial = KinematicState::new(
            Vector3::new(-15.0, -7.5, 0.0),
            Vector3::new(10.0, 2.0, 15.0),
            Vector3::new(0.0, 0.0, 20.0),
        );
        let grid = TimeGrid::dense(0.0, 3.0).unwrap();
        compute_trajectory(&initial, grid.times(), ForceFlags::all()).unwrap()
    }

    #[test]
    fn ground_shadow_zeroes_height() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(ViewMode::Perspective.place(&p), p);
        assert_eq!(ViewMode::GroundShadow.place(&p), Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn projects_every_display_time() {
        let projector = BallProjector::new(Camera::basketball_broadcast(), radius()).unwrap();
        let traj = basketball_flight();
        let times = TimeGrid::stepped(0.0, 3.0, 0.1).unwrap();
        let frames =
            project_trajectory(&traj, &projector, times.times(), ViewMode::Perspective);
        assert_eq!(frames.len(), 31);
        assert!(frames.iter().all(ProjectedSample::is_visible));
        for frame in &frames {
            let e = frame.ellipse.unwrap();
            assert!(e.a >= e.b && e.b > 0.0);
        }
    }

    #[test]
    fn bird_eye_shadow_is_a_near_circle() {
        let projector = BallProjector::new(Camera::basketball_bird_eye(), radius()).unwrap();
        let traj = basketball_flight();
        let frames = project_trajectory(&traj, &projector, &[0.5, 1.0], ViewMode::GroundShadow);
        for frame in frames {
            let e = frame.ellipse.unwrap();
            assert!(e.eccentricity() < 0.5);
            assert_eq!(frame.position.unwrap().z, 0.0);
        }
    }

    #[test]
    fn behind_camera_is_a_frame_error() {
        let projector = BallProjector::new(Camera::basketball_broadcast(), radius()).unwrap();
        let behind = Vector3::new(0.0, -40.0, 40.0);
        let err = project_position(&projector, &behind, ViewMode::Perspective).unwrap_err();
        assert!(matches!(err, VisionError::BehindCamera { .. }));
        assert!(err.is_frame_error());
    }

    #[test]
    fn times_outside_the_trajectory_report_no_sample() {
        let projector = BallProjector::new(Camera::basketball_broadcast(), radius()).unwrap();
        let traj = basketball_flight();
        let frames = project_trajectory(&traj, &projector, &[10.0], ViewMode::Perspective);
        assert!(!frames[0].is_visible());
        assert!(frames[0].error.as_deref().unwrap().contains("no sample"));
    }

    #[test]
    fn estimates_match_truth() {
        let projector = BallProjector::new(Camera::basketball_broadcast(), radius()).unwrap();
        let traj = basketball_flight();
        let times = TimeGrid::stepped(0.0, 3.0, 0.25).unwrap();
        let summary = validate_estimates(&traj, &projector, times.times());
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.estimated(), times.len());
        assert!(summary.max_error < 1e-2, "max error {}", summary.max_error);
        assert!(summary.mean_error <= summary.max_error);
    }
}
