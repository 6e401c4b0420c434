//! Error types for projective geometry operations.

use thiserror::Error;

/// Errors that can occur when projecting spheres, extracting ellipses,
/// or recovering ball locations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// A matrix that must be inverted is singular or too badly conditioned.
    ///
    /// For sphere projection this means the camera center lies on the
    /// sphere surface, so no silhouette conic exists.
    #[error("singular matrix in {context} (reciprocal condition {rcond:e})")]
    Singular {
        /// Where the inversion was attempted.
        context: String,
        /// Ratio of smallest to largest singular value.
        rcond: f64,
    },

    /// The camera center lies on or inside the sphere, so the sphere has
    /// no silhouette.
    #[error("camera center inside sphere: distance {distance} <= radius {radius}")]
    CameraInsideSphere {
        /// Distance from camera center to sphere center.
        distance: f64,
        /// Sphere radius.
        radius: f64,
    },

    /// The conic is a parabola or hyperbola, not an ellipse.
    #[error("conic is not an ellipse: discriminant B^2 - 4AC = {discriminant}")]
    NotAnEllipse {
        /// The discriminant of the quadratic part.
        discriminant: f64,
    },

    /// The conic is an ellipse with no real points.
    #[error("conic describes an imaginary ellipse")]
    ImaginaryEllipse,

    /// The cone eigenvalues do not have the one-against-two sign pattern
    /// of a circular back-projection cone.
    #[error("not a circular cone: eigenvalues {eigenvalues:?}")]
    InvalidConeSignature {
        /// Eigenvalues of the cone matrix, ascending.
        eigenvalues: [f64; 3],
    },

    /// Sphere radius must be positive and finite.
    #[error("invalid radius: {0} (must be positive)")]
    InvalidRadius(f64),

    /// Ellipse semi-axis must be positive and finite.
    #[error("invalid semi-axis: {0} (must be positive)")]
    InvalidSemiAxis(f64),

    /// Focal length must be positive and finite.
    #[error("invalid focal length: {0} (must be positive)")]
    InvalidFocalLength(f64),

    /// Image size must be non-zero.
    #[error("invalid image size: {width}x{height}")]
    InvalidImageSize {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A point projects to infinity (lies on the camera's principal plane).
    #[error("point maps to infinity under {context}")]
    PointAtInfinity {
        /// Which mapping was applied.
        context: String,
    },

    /// Non-finite values encountered.
    #[error("non-finite value in {context}")]
    NonFinite {
        /// Where the value was found.
        context: String,
    },
}

impl GeometryError {
    /// Create a singular matrix error.
    #[must_use]
    pub fn singular(context: impl Into<String>, rcond: f64) -> Self {
        Self::Singular {
            context: context.into(),
            rcond,
        }
    }

    /// Create a point-at-infinity error.
    #[must_use]
    pub fn at_infinity(context: impl Into<String>) -> Self {
        Self::PointAtInfinity {
            context: context.into(),
        }
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFinite {
            context: context.into(),
        }
    }

    /// Returns true if the error stems from degenerate geometry
    /// (singular quadric or a conic/cone of the wrong type).
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(
            self,
            Self::Singular { .. }
                | Self::CameraInsideSphere { .. }
                | Self::NotAnEllipse { .. }
                | Self::ImaginaryEllipse
                | Self::InvalidConeSignature { .. }
        )
    }
}

/// Result type for projective geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
