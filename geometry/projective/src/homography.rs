//! 3x4 projective mapping from world to image coordinates.

use nalgebra::{Matrix3, Matrix3x4, Point2, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::linalg::try_inverse3;

/// Homogeneous coordinates with `|w|` below this are treated as points at infinity.
const W_EPS: f64 = 1e-12;

/// A 3x4 projective matrix mapping homogeneous world points to homogeneous
/// image points.
///
/// Built by [`Camera::homography`](crate::Camera::homography); immutable
/// once derived.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Homography(Matrix3x4<f64>);

impl Homography {
    /// Wraps an existing 3x4 matrix.
    #[must_use]
    pub const fn new(matrix: Matrix3x4<f64>) -> Self {
        Self(matrix)
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3x4<f64> {
        &self.0
    }

    /// Projects a world point to pixel coordinates.
    ///
    /// Returns `None` for points on the camera's principal plane.
    #[must_use]
    pub fn project(&self, world: &Vector3<f64>) -> Option<Point2<f64>> {
        let p = self.0 * world.push(1.0);
        if p.z.abs() < W_EPS {
            return None;
        }
        Some(Point2::new(p.x / p.z, p.y / p.z))
    }

    /// World point mapped to the zero vector: the camera center.
    ///
    /// Solves `M · c + h = 0` for `H = [M | h]`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Singular`] if the left 3x3 block is singular.
    pub fn camera_center(&self) -> Result<Vector3<f64>> {
        let m = self.0.fixed_view::<3, 3>(0, 0).into_owned();
        let m_inv = try_inverse3(&m, "projection block")?;
        Ok(-(m_inv * self.0.column(3)))
    }

    /// Rescales the image plane, e.g. to a drawing surface of another size.
    ///
    /// Returns `diag(sx, sy, 1) · H`.
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let s = Matrix3::from_diagonal(&Vector3::new(sx, sy, 1.0));
        Self(s * self.0)
    }

    /// Rescales from one image size to another.
    #[must_use]
    pub fn resized(&self, from: (f64, f64), to: (f64, f64)) -> Self {
        self.scaled(to.0 / from.0, to.1 / from.1)
    }

    /// The 3x3 homography of the ground plane `z = 0`.
    ///
    /// Drops the third column: `(x, y, 0, 1)` maps through columns 0, 1 and 3.
    #[must_use]
    pub fn ground_plane(&self) -> Matrix3<f64> {
        let mut g = Matrix3::zeros();
        g.set_column(0, &self.0.column(0));
        g.set_column(1, &self.0.column(1));
        g.set_column(2, &self.0.column(3));
        g
    }

    /// Back-projects a pixel onto the ground plane `z = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ground-plane homography is singular (camera
    /// in the plane) or the pixel's ray is parallel to the ground.
    pub fn back_project_to_ground(&self, pixel: &Point2<f64>) -> Result<Vector2<f64>> {
        let g_inv = try_inverse3(&self.ground_plane(), "ground-plane homography")?;
        let p = g_inv * Vector3::new(pixel.x, pixel.y, 1.0);
        if p.z.abs() < W_EPS {
            return Err(GeometryError::at_infinity("ground back-projection"));
        }
        Ok(Vector2::new(p.x / p.z, p.y / p.z))
    }
}

impl From<Matrix3x4<f64>> for Homography {
    fn from(matrix: Matrix3x4<f64>) -> Self {
        Self(matrix)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::Camera;
    use approx::assert_relative_eq;

    #[test]
    fn projects_camera_axis_to_principal_point() {
        let camera = Camera::basketball_broadcast();
        let h = camera.homography().unwrap();
        let axis = camera.rotation() * Vector3::z();
        let pixel = h.project(&(camera.center() + axis * 10.0)).unwrap();
        assert_relative_eq!(pixel.x, 640.0, epsilon = 1e-9);
        assert_relative_eq!(pixel.y, 360.0, epsilon = 1e-9);
    }

    #[test]
    fn camera_center_projects_to_infinity() {
        let camera = Camera::soccer_broadcast();
        let h = camera.homography().unwrap();
        assert!(h.project(&camera.center()).is_none());
    }

    #[test]
    fn recovers_camera_center() {
        let camera = Camera::soccer_broadcast();
        let h = camera.homography().unwrap();
        let center = h.camera_center().unwrap();
        assert_relative_eq!(center, camera.center(), epsilon = 1e-9);
        let scaled = h.scaled(0.5, 0.25).camera_center().unwrap();
        assert_relative_eq!(scaled, camera.center(), epsilon = 1e-9);
    }

    #[test]
    fn scaling_halves_pixels() {
        let h = Camera::basketball_broadcast().homography().unwrap();
        let p = Vector3::new(3.0, 2.0, 1.0);
        let full = h.project(&p).unwrap();
        let half = h.resized((1280.0, 720.0), (640.0, 360.0)).project(&p).unwrap();
        assert_relative_eq!(half.x, full.x / 2.0, epsilon = 1e-9);
        assert_relative_eq!(half.y, full.y / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn ground_back_projection_roundtrip() {
        let h = Camera::pitch_reference().homography().unwrap();
        let ground = Vector3::new(12.5, -7.0, 0.0);
        let pixel = h.project(&ground).unwrap();
        let back = h.back_project_to_ground(&pixel).unwrap();
        assert_relative_eq!(back.x, 12.5, epsilon = 1e-6);
        assert_relative_eq!(back.y, -7.0, epsilon = 1e-6);
    }

    #[test]
    fn ground_plane_singular_for_camera_in_plane() {
        // Camera on the ground looking along the ground: every ground point
        // shares the image row of the horizon.
        let camera = Camera::new(
            500.0,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(-90.0, 0.0, 0.0),
        );
        let h = camera.homography().unwrap();
        assert!(h.back_project_to_ground(&Point2::new(10.0, 10.0)).is_err());
    }
}
