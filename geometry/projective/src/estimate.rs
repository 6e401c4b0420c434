//! Recovering a ball's 3D center from its back-projection cone.
//!
//! A sphere of radius `r` seen from distance `D` subtends a circular cone of
//! half-angle `θ` with `sin θ = r / D`. The cone matrix has one eigenvalue
//! whose sign differs from the other two: its eigenvector is the cone axis,
//! and the eigenvalue ratio gives
//!
//! ```text
//! sin²θ = λ_axis / (λ_axis - λ_perp)
//! ```

use nalgebra::Vector3;
use tracing::trace;

use crate::camera::Camera;
use crate::conic::{obtain_ball_conic, projection_cone_from_ellipse, Conic, Cone};
use crate::ellipse::EllipseParams;
use crate::error::{GeometryError, Result};
use crate::homography::Homography;
use crate::linalg::round_vector;

/// Decimal places kept by [`estimate_ball_location`].
pub const DISPLAY_DECIMALS: i32 = 1;

/// Eigenvalues smaller than this fraction of the largest are treated as zero.
const ZERO_EIGEN_RATIO: f64 = 1e-12;

/// Estimated sphere center, rounded to [`DISPLAY_DECIMALS`] places.
///
/// # Errors
///
/// See [`estimate_ball_location_exact`].
pub fn estimate_ball_location(
    cone: &Cone,
    radius: f64,
    camera_center: &Vector3<f64>,
) -> Result<Vector3<f64>> {
    let exact = estimate_ball_location_exact(cone, radius, camera_center)?;
    Ok(round_vector(&exact, DISPLAY_DECIMALS))
}

/// Estimated sphere center without display rounding.
///
/// `cone` must be expressed relative to the camera center (see
/// [`Camera::centered`]). The axis is oriented so that it has a
/// non-negative dot product with `camera_center`, and the estimate is
/// `camera_center - axis · r / sin θ`.
///
/// # Errors
///
/// - [`GeometryError::InvalidRadius`] for a non-positive radius.
/// - [`GeometryError::InvalidConeSignature`] if no eigenvalue differs in
///   sign from the other two, or an eigenvalue vanishes.
/// - [`GeometryError::NonFinite`] if the cone has non-finite entries.
pub fn estimate_ball_location_exact(
    cone: &Cone,
    radius: f64,
    camera_center: &Vector3<f64>,
) -> Result<Vector3<f64>> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::InvalidRadius(radius));
    }
    let eig = cone.eigen()?;
    let values = eig.values_array();
    let invalid = || GeometryError::InvalidConeSignature { eigenvalues: values };

    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale <= 0.0 || values.iter().any(|v| v.abs() < ZERO_EIGEN_RATIO * scale) {
        return Err(invalid());
    }

    // Ascending order: the odd one out is either the first or the last.
    let (axis_index, lambda_axis, lambda_perp) = if values[0] < 0.0 && values[1] > 0.0 {
        (0, values[0], 0.5 * (values[1] + values[2]))
    } else if values[2] > 0.0 && values[1] < 0.0 {
        (2, values[2], 0.5 * (values[0] + values[1]))
    } else {
        return Err(invalid());
    };

    let sin2 = lambda_axis / (lambda_axis - lambda_perp);
    let sin_theta = sin2.sqrt();
    let distance = radius / sin_theta;

    let mut axis = eig.vector(axis_index);
    if camera_center.dot(&axis) < 0.0 {
        axis = -axis;
    }

    trace!(
        lambda_axis,
        lambda_perp,
        sin_theta,
        distance,
        "Estimated ball distance from cone"
    );

    Ok(camera_center - axis * distance)
}

/// A camera and ball radius bundled for projection and estimation.
///
/// Holds both the camera's homography (for projecting) and the homography
/// of its centered twin (for back-projecting cones).
///
/// # Example
///
/// ```
/// use projective_geometry::{BallProjector, Camera};
/// use nalgebra::Vector3;
///
/// let radius = 29.5 / 36.0 / (2.0 * std::f64::consts::PI);
/// let projector = BallProjector::new(Camera::basketball_broadcast(), radius).unwrap();
/// let conic = projector.conic(&Vector3::new(0.0, 0.0, 5.0)).unwrap();
/// let estimate = projector.estimate(&conic).unwrap();
/// assert!((estimate - Vector3::new(0.0, 0.0, 5.0)).norm() < 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallProjector {
    camera: Camera,
    homography: Homography,
    centered: Homography,
    radius: f64,
}

impl BallProjector {
    /// Creates a projector.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid camera or non-positive radius.
    pub fn new(camera: Camera, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        let homography = camera.homography()?;
        let centered = camera.centered().homography()?;
        Ok(Self {
            camera,
            homography,
            centered,
            radius,
        })
    }

    /// The camera.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Homography of the camera.
    #[must_use]
    pub const fn homography(&self) -> &Homography {
        &self.homography
    }

    /// Homography of the camera moved to the origin.
    #[must_use]
    pub const fn centered_homography(&self) -> &Homography {
        &self.centered
    }

    /// Ball radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Silhouette conic of the ball at `center`.
    ///
    /// # Errors
    ///
    /// See [`obtain_ball_conic`].
    pub fn conic(&self, center: &Vector3<f64>) -> Result<Conic> {
        obtain_ball_conic(center, self.radius, &self.homography)
    }

    /// Silhouette ellipse of the ball at `center`.
    ///
    /// # Errors
    ///
    /// Fails if the silhouette cannot be computed or is not a real ellipse.
    pub fn ellipse(&self, center: &Vector3<f64>) -> Result<EllipseParams> {
        self.conic(center)?.ellipse_params()
    }

    /// Back-projection cone of an observed conic, relative to the camera center.
    #[must_use]
    pub fn cone(&self, conic: &Conic) -> Cone {
        projection_cone_from_ellipse(conic, &self.centered)
    }

    /// Rounded ball center from an observed conic.
    ///
    /// # Errors
    ///
    /// See [`estimate_ball_location_exact`].
    pub fn estimate(&self, conic: &Conic) -> Result<Vector3<f64>> {
        estimate_ball_location(&self.cone(conic), self.radius, &self.camera.center())
    }

    /// Unrounded ball center from an observed conic.
    ///
    /// # Errors
    ///
    /// See [`estimate_ball_location_exact`].
    pub fn estimate_exact(&self, conic: &Conic) -> Result<Vector3<f64>> {
        estimate_ball_location_exact(&self.cone(conic), self.radius, &self.camera.center())
    }

    /// Unrounded ball center from observed ellipse parameters.
    ///
    /// # Errors
    ///
    /// Fails for invalid parameters or a degenerate cone.
    pub fn estimate_from_ellipse(&self, ellipse: &EllipseParams) -> Result<Vector3<f64>> {
        ellipse.validate()?;
        self.estimate_exact(&ellipse.to_conic())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    /// Cone `(I - d dᵀ / r²)⁻¹` of a sphere at offset `d` from the apex.
    fn synthetic_cone(offset: Vector3<f64>, radius: f64, scale: f64) -> Cone {
        let m = Matrix3::identity() - offset * offset.transpose() / (radius * radius);
        Cone::new(m.try_inverse().unwrap() * scale)
    }

    #[test]
    fn recovers_offset_from_synthetic_cone() {
        let camera_center = Vector3::new(0.0, -20.0, 25.0);
        let ball = Vector3::new(3.0, 4.0, 2.0);
        let cone = synthetic_cone(ball - camera_center, 0.5, 1.0);
        let est = estimate_ball_location_exact(&cone, 0.5, &camera_center).unwrap();
        assert_relative_eq!(est, ball, epsilon = 1e-8);
    }

    #[test]
    fn estimate_is_scale_and_sign_invariant() {
        let camera_center = Vector3::new(0.0, -28.0, 33.0);
        let ball = Vector3::new(-10.0, 5.0, 1.0);
        for scale in [1e-6, -3.0, 250.0] {
            let cone = synthetic_cone(ball - camera_center, 0.2, scale);
            let est = estimate_ball_location_exact(&cone, 0.2, &camera_center).unwrap();
            assert_relative_eq!(est, ball, epsilon = 1e-6);
        }
    }

    #[test]
    fn rounds_to_one_decimal() {
        let camera_center = Vector3::new(0.0, -20.0, 25.0);
        let ball = Vector3::new(1.234, -0.26, 4.96);
        let cone = synthetic_cone(ball - camera_center, 0.3, 1.0);
        let est = estimate_ball_location(&cone, 0.3, &camera_center).unwrap();
        assert_relative_eq!(est, Vector3::new(1.2, -0.3, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn rejects_definite_matrix() {
        let cone = Cone::new(Matrix3::identity());
        let err = estimate_ball_location(&cone, 1.0, &Vector3::new(0.0, 0.0, 10.0)).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidConeSignature { .. }));
    }

    #[test]
    fn rejects_rank_deficient_cone() {
        let cone = Cone::new(Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, 0.0)));
        assert!(estimate_ball_location(&cone, 1.0, &Vector3::z()).is_err());
    }

    #[test]
    fn rejects_bad_radius() {
        let cone = synthetic_cone(Vector3::new(0.0, 10.0, -10.0), 0.5, 1.0);
        assert!(matches!(
            estimate_ball_location(&cone, 0.0, &Vector3::z()),
            Err(GeometryError::InvalidRadius(_))
        ));
    }

    #[test]
    fn projector_roundtrip() {
        let radius = 29.5 / 36.0 / (2.0 * std::f64::consts::PI);
        let projector = BallProjector::new(Camera::soccer_broadcast(), radius).unwrap();
        let ball = Vector3::new(-20.0, 10.0, 1.5);
        let conic = projector.conic(&ball).unwrap();
        let est = projector.estimate_exact(&conic).unwrap();
        assert_relative_eq!(est, ball, epsilon = 1e-3);

        let ellipse = projector.ellipse(&ball).unwrap();
        let from_params = projector.estimate_from_ellipse(&ellipse).unwrap();
        assert_relative_eq!(from_params, ball, epsilon = 5e-3);
    }

    #[test]
    fn projector_rejects_bad_radius() {
        assert!(BallProjector::new(Camera::basketball_broadcast(), -1.0).is_err());
    }
}
