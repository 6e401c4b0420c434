//! Error types for the projection pipeline and scenarios.

use projective_geometry::GeometryError;
use sim_trajectory::TrajectoryError;
use thiserror::Error;

/// Errors raised while simulating, projecting or estimating a ball.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Projection or estimation failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Trajectory integration failed.
    #[error("trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    /// The ball center is behind the camera, so no silhouette is drawn.
    #[error("ball at ({x:.2}, {y:.2}, {z:.2}) is behind the camera")]
    BehindCamera {
        /// World X of the ball center.
        x: f64,
        /// World Y of the ball center.
        y: f64,
        /// World Z of the ball center.
        z: f64,
    },

    /// No trajectory sample lies close to the requested time.
    #[error("no sample near t = {time}")]
    NoSample {
        /// Requested time.
        time: f64,
    },

    /// Invalid scenario configuration.
    #[error("invalid scenario: {reason}")]
    InvalidScenario {
        /// What is wrong with it.
        reason: String,
    },

    /// Scenario (de)serialization failed.
    #[error("scenario JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VisionError {
    /// Create an invalid scenario error.
    #[must_use]
    pub fn invalid_scenario(reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            reason: reason.into(),
        }
    }

    /// Returns true if the error concerns a single frame rather than the
    /// whole computation: the frame can be skipped and the rest kept.
    #[must_use]
    pub fn is_frame_error(&self) -> bool {
        match self {
            Self::Geometry(e) => {
                e.is_degenerate() || matches!(e, GeometryError::PointAtInfinity { .. })
            }
            Self::BehindCamera { .. } | Self::NoSample { .. } => true,
            Self::Trajectory(_) | Self::InvalidScenario { .. } | Self::Json(_) => false,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, VisionError>;
