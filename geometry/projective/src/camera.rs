//! Pinhole camera model.
//!
//! A [`Camera`] is parameterized the way the broadcast-view pages describe
//! it: a single focal length in pixels, the camera position in world
//! coordinates, and a rotation given as three angles in degrees. The
//! principal point sits at the center of the image.
//!
//! # Conventions
//!
//! - World frame: X along the pitch, Y across it, Z up (yards).
//! - Rotation: `R = Rz · Ry · Rx`, each built from degrees. `R` maps camera
//!   axes to world axes, so the extrinsic matrix is `[Rᵀ | -Rᵀ t]`.
//! - Homography: `H = K · [Rᵀ | -Rᵀ t]` (3x4).

use nalgebra::{Matrix3, Matrix3x4, Rotation3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::homography::Homography;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for ImageSize {
    /// 1280x720, the frame size of the broadcast footage.
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ImageSize {
    /// Creates a new image size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center of the image, used as the principal point.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Pinhole camera with intrinsic focal length and extrinsic pose.
///
/// # Example
///
/// ```
/// use projective_geometry::Camera;
/// use nalgebra::Vector3;
///
/// let camera = Camera::basketball_broadcast();
/// let h = camera.homography().unwrap();
/// let pixel = h.project(&Vector3::new(0.0, 0.0, 0.0));
/// assert!(pixel.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Camera {
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Camera center in world coordinates.
    pub translation: Vector3<f64>,
    /// Rotation angles `(rx, ry, rz)` in degrees.
    pub rotation_deg: Vector3<f64>,
    /// Image size; fixes the principal point.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_size: ImageSize,
}

impl Camera {
    /// Creates a camera with the default 1280x720 image.
    #[must_use]
    pub fn new(focal_length: f64, translation: Vector3<f64>, rotation_deg: Vector3<f64>) -> Self {
        Self {
            focal_length,
            translation,
            rotation_deg,
            image_size: ImageSize::default(),
        }
    }

    /// Broadcast view of a basketball court.
    #[must_use]
    pub fn basketball_broadcast() -> Self {
        Self::new(
            1100.0,
            Vector3::new(0.0, -20.0, 25.0),
            Vector3::new(-142.0, 0.0, 0.0),
        )
    }

    /// Top-down view of a basketball court.
    #[must_use]
    pub fn basketball_bird_eye() -> Self {
        Self::new(
            1000.0,
            Vector3::new(0.0, 0.0, 30.0),
            Vector3::new(-180.0, 0.0, 0.0),
        )
    }

    /// Broadcast view of a soccer pitch.
    #[must_use]
    pub fn soccer_broadcast() -> Self {
        Self::new(
            265.0,
            Vector3::new(0.0, -28.0, 33.0),
            Vector3::new(-157.0, 0.0, 0.0),
        )
    }

    /// Top-down view of a soccer pitch.
    #[must_use]
    pub fn soccer_bird_eye() -> Self {
        Self::new(
            250.0,
            Vector3::new(0.0, 0.0, 30.0),
            Vector3::new(-180.0, 0.0, 0.0),
        )
    }

    /// Reference view used for pitch-plane back-projection.
    #[must_use]
    pub fn pitch_reference() -> Self {
        Self::new(
            480.0,
            Vector3::new(0.0, -30.0, 45.0),
            Vector3::new(-130.0, 0.0, 0.0),
        )
    }

    /// Set the image size.
    #[must_use]
    pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
        self.image_size = image_size;
        self
    }

    /// Same intrinsics and orientation, moved to the world origin.
    ///
    /// Back-projecting through this camera yields cones with their apex at
    /// the origin, i.e. expressed relative to the real camera center.
    #[must_use]
    pub fn centered(&self) -> Self {
        Self {
            translation: Vector3::zeros(),
            ..*self
        }
    }

    /// Camera center in world coordinates.
    #[must_use]
    pub fn center(&self) -> Vector3<f64> {
        self.translation
    }

    /// Validate the camera parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive focal length, an empty image,
    /// or non-finite pose values.
    pub fn validate(&self) -> Result<()> {
        if !self.focal_length.is_finite() || self.focal_length <= 0.0 {
            return Err(GeometryError::InvalidFocalLength(self.focal_length));
        }
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(GeometryError::InvalidImageSize {
                width: self.image_size.width,
                height: self.image_size.height,
            });
        }
        if !self.translation.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::non_finite("camera translation"));
        }
        if !self.rotation_deg.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::non_finite("camera rotation"));
        }
        Ok(())
    }

    /// Intrinsic matrix `K`.
    #[must_use]
    pub fn intrinsic_matrix(&self) -> Matrix3<f64> {
        let (cx, cy) = self.image_size.center();
        let f = self.focal_length;
        Matrix3::new(f, 0.0, cx, 0.0, f, cy, 0.0, 0.0, 1.0)
    }

    /// Camera-to-world rotation `R = Rz · Ry · Rx`.
    #[must_use]
    pub fn rotation(&self) -> Rotation3<f64> {
        rotation_from_degrees(&self.rotation_deg)
    }

    /// Extrinsic matrix `[Rᵀ | -Rᵀ t]` mapping world points to camera coordinates.
    #[must_use]
    pub fn extrinsic_matrix(&self) -> Matrix3x4<f64> {
        let rt = self.rotation().transpose();
        let rt_m = *rt.matrix();
        let t = -(rt_m * self.translation);

        let mut e = Matrix3x4::zeros();
        e.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt_m);
        e.set_column(3, &t);
        e
    }

    /// Full projection `H = K · [Rᵀ | -Rᵀ t]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera parameters are invalid.
    pub fn homography(&self) -> Result<Homography> {
        self.validate()?;
        Ok(Homography::new(self.intrinsic_matrix() * self.extrinsic_matrix()))
    }

    /// Point in camera coordinates (Z along the optical axis).
    #[must_use]
    pub fn to_camera_frame(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.rotation().inverse() * (world - self.translation)
    }

    /// Returns true if the point lies in front of the camera.
    #[must_use]
    pub fn is_in_front(&self, world: &Vector3<f64>) -> bool {
        self.to_camera_frame(world).z > 0.0
    }
}

/// Rotation `Rz · Ry · Rx` from angles in degrees.
#[must_use]
pub fn rotation_from_degrees(angles_deg: &Vector3<f64>) -> Rotation3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angles_deg.x.to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), angles_deg.y.to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angles_deg.z.to_radians());
    rz * ry * rx
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn intrinsic_principal_point_at_center() {
        let camera = Camera::basketball_broadcast();
        let k = camera.intrinsic_matrix();
        assert_relative_eq!(k[(0, 0)], 1100.0);
        assert_relative_eq!(k[(1, 1)], 1100.0);
        assert_relative_eq!(k[(0, 2)], 640.0);
        assert_relative_eq!(k[(1, 2)], 360.0);
        assert_relative_eq!(k[(2, 2)], 1.0);
    }

    #[test]
    fn rotation_composition_order() {
        // Rz(90) · Rx(90): x-rotation applied first.
        let r = rotation_from_degrees(&Vector3::new(90.0, 0.0, 90.0));
        let v = r * Vector3::new(0.0, 1.0, 0.0);
        // Rx(90) sends y to z; Rz(90) leaves z alone.
        assert_relative_eq!(v, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn extrinsic_maps_center_to_origin() {
        let camera = Camera::soccer_broadcast();
        let e = camera.extrinsic_matrix();
        let c = camera.center();
        let p = e * c.push(1.0);
        assert_relative_eq!(p, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn broadcast_camera_sees_court_center() {
        let camera = Camera::basketball_broadcast();
        assert!(camera.is_in_front(&Vector3::new(0.0, 0.0, 5.0)));
        assert!(!camera.is_in_front(&Vector3::new(0.0, -30.0, 35.0)));
    }

    #[test]
    fn bird_eye_looks_straight_down() {
        let camera = Camera::basketball_bird_eye();
        let below = camera.to_camera_frame(&Vector3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(below, Vector3::new(0.0, 0.0, 30.0), epsilon = 1e-9);
    }

    #[test]
    fn centered_keeps_orientation() {
        let camera = Camera::basketball_broadcast();
        let centered = camera.centered();
        assert_relative_eq!(centered.center(), Vector3::zeros());
        assert_relative_eq!(centered.rotation_deg, camera.rotation_deg);
        assert_relative_eq!(centered.focal_length, camera.focal_length);
    }

    #[test]
    fn validate_rejects_bad_focal_length() {
        let camera = Camera::new(0.0, Vector3::zeros(), Vector3::zeros());
        assert!(matches!(
            camera.validate(),
            Err(GeometryError::InvalidFocalLength(_))
        ));
        assert!(camera.homography().is_err());
    }

    #[test]
    fn validate_rejects_empty_image() {
        let camera = Camera::pitch_reference().with_image_size(ImageSize::new(0, 480));
        assert!(matches!(
            camera.validate(),
            Err(GeometryError::InvalidImageSize { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn camera_serialization() {
        let camera = Camera::soccer_bird_eye();
        let json = serde_json::to_string(&camera).ok();
        assert!(json.is_some());
    }
}
