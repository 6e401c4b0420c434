//! Sphere silhouettes as image conics, and their back-projection cones.
//!
//! A sphere with center `c` and radius `r` is the quadric
//!
//! ```text
//!     ⎡ I    -c      ⎤
//! Q = ⎣ -cᵀ  |c|²-r² ⎦
//! ```
//!
//! Its outline under a 3x4 projection `H` is the conic whose dual is
//! `C* = H · Q⁻¹ · Hᵀ`. Going the other way, an image conic `C`
//! back-projects to the cone `Hᵀ · C · H`; with a camera placed at the
//! origin its upper-left 3x3 block is the cone matrix relative to the camera
//! center.

use nalgebra::{Matrix3, Matrix4, Vector3};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ellipse::EllipseParams;
use crate::error::{GeometryError, Result};
use crate::homography::Homography;
use crate::linalg::{symmetric_eigen, symmetrize, try_inverse3, Eigen3};

/// Relative tolerance for treating the camera center as lying on the sphere.
const SURFACE_TOL: f64 = 1e-9;

/// Homogeneous 4x4 quadric of a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereQuadric {
    center: Vector3<f64>,
    radius: f64,
}

impl SphereQuadric {
    /// Creates the quadric for a sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive or any value is non-finite.
    pub fn new(center: Vector3<f64>, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        if !center.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::non_finite("sphere center"));
        }
        Ok(Self { center, radius })
    }

    /// Sphere center.
    #[must_use]
    pub const fn center(&self) -> Vector3<f64> {
        self.center
    }

    /// Sphere radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// The 4x4 quadric matrix.
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f64> {
        let c = self.center;
        let mut q = Matrix4::identity();
        q[(0, 3)] = -c.x;
        q[(1, 3)] = -c.y;
        q[(2, 3)] = -c.z;
        q[(3, 0)] = -c.x;
        q[(3, 1)] = -c.y;
        q[(3, 2)] = -c.z;
        q[(3, 3)] = c.norm_squared() - self.radius * self.radius;
        q
    }

    /// The inverse (dual) quadric `Q⁻¹`, in closed form.
    ///
    /// ```text
    ///        ⎡ I - ccᵀ/r²   -c/r² ⎤
    /// Q⁻¹ =  ⎣ -cᵀ/r²       -1/r² ⎦
    /// ```
    ///
    /// `det Q = -r²`, so the quadric of a valid sphere is never singular;
    /// the closed form avoids the conditioning loss a general inverse
    /// suffers once `|c| ≫ r`.
    #[must_use]
    pub fn dual(&self) -> Matrix4<f64> {
        let c = self.center;
        let r2_inv = 1.0 / (self.radius * self.radius);
        let mut q = Matrix4::identity();
        let block = Matrix3::identity() - c * c.transpose() * r2_inv;
        q.fixed_view_mut::<3, 3>(0, 0).copy_from(&block);
        let edge = -c * r2_inv;
        q.fixed_view_mut::<3, 1>(0, 3).copy_from(&edge);
        q.fixed_view_mut::<1, 3>(3, 0).copy_from(&edge.transpose());
        q[(3, 3)] = -r2_inv;
        q
    }

    /// Returns true if the point lies strictly inside the sphere.
    #[must_use]
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (point - self.center).norm() < self.radius
    }
}

/// Image-plane conic `[x y 1] C [x y 1]ᵀ = 0` as a symmetric 3x3 matrix.
///
/// Conics are homogeneous: `C` and `k·C` describe the same curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Conic(Matrix3<f64>);

impl Conic {
    /// Wraps a matrix, symmetrizing it.
    #[must_use]
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self(symmetrize(&matrix))
    }

    /// Build from the general quadratic `A x² + B xy + C y² + D x + E y + F = 0`.
    #[must_use]
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(Matrix3::new(
            a,
            b * 0.5,
            d * 0.5,
            b * 0.5,
            c,
            e * 0.5,
            d * 0.5,
            e * 0.5,
            f,
        ))
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// General quadratic coefficients `[A, B, C, D, E, F]`.
    #[must_use]
    pub fn coefficients(&self) -> [f64; 6] {
        let m = &self.0;
        [
            m[(0, 0)],
            2.0 * m[(0, 1)],
            m[(1, 1)],
            2.0 * m[(0, 2)],
            2.0 * m[(1, 2)],
            m[(2, 2)],
        ]
    }

    /// Evaluates `[x y 1] C [x y 1]ᵀ`.
    #[must_use]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let p = Vector3::new(x, y, 1.0);
        p.dot(&(self.0 * p))
    }

    /// Rescales so the quadratic part has unit trace (`A + C = 1`).
    ///
    /// Returns `None` if the trace vanishes, which never happens for an ellipse.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let trace = self.0[(0, 0)] + self.0[(1, 1)];
        if !trace.is_finite() || trace.abs() < f64::MIN_POSITIVE {
            return None;
        }
        Some(Self(self.0 / trace))
    }

    /// Explicit ellipse parameters.
    ///
    /// # Errors
    ///
    /// See [`EllipseParams::from_conic`].
    pub fn ellipse_params(&self) -> Result<EllipseParams> {
        EllipseParams::from_conic(self)
    }
}

impl From<EllipseParams> for Conic {
    fn from(params: EllipseParams) -> Self {
        params.to_conic()
    }
}

/// Back-projection cone of an image conic, rooted at the camera center.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cone(Matrix3<f64>);

impl Cone {
    /// Wraps a matrix, symmetrizing it.
    #[must_use]
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self(symmetrize(&matrix))
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    /// Eigendecomposition of the cone matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has non-finite entries.
    pub fn eigen(&self) -> Result<Eigen3> {
        symmetric_eigen(&self.0)
    }

    /// Counts of positive and negative eigenvalues.
    ///
    /// A real circular cone has signature `(2, 1)` or `(1, 2)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has non-finite entries.
    pub fn signature(&self) -> Result<(usize, usize)> {
        let eig = self.eigen()?;
        let positive = eig.values.iter().filter(|&&v| v > 0.0).count();
        let negative = eig.values.iter().filter(|&&v| v < 0.0).count();
        Ok((positive, negative))
    }
}

/// Silhouette conic of a sphere under a projection.
///
/// Computes `C = (H · Q⁻¹ · Hᵀ)⁻¹`.
///
/// # Errors
///
/// - [`GeometryError::InvalidRadius`] for a non-positive radius.
/// - [`GeometryError::CameraInsideSphere`] when the camera center lies on
///   or inside the sphere; no ellipse can be produced for that frame.
/// - [`GeometryError::Singular`] if the dual image conic is still
///   numerically rank-deficient.
pub fn obtain_ball_conic(
    center: &Vector3<f64>,
    radius: f64,
    homography: &Homography,
) -> Result<Conic> {
    let sphere = SphereQuadric::new(*center, radius)?;
    let eye = homography.camera_center()?;
    let distance = (center - eye).norm();
    if distance <= radius * (1.0 + SURFACE_TOL) {
        return Err(GeometryError::CameraInsideSphere { distance, radius });
    }
    let q_inv = sphere.dual();
    let h = homography.matrix();
    let c_inv = h * q_inv * h.transpose();
    let c = try_inverse3(&c_inv, "dual image conic")?;
    trace!(?center, radius, "Projected sphere to conic");
    Ok(Conic::new(c))
}

/// Back-projects an image conic to a cone through the camera center.
///
/// Computes `Hᵀ · C · H` and keeps its upper-left 3x3 block. With a
/// homography from [`Camera::centered`](crate::Camera::centered) the result
/// is expressed relative to the camera center.
#[must_use]
pub fn projection_cone_from_ellipse(conic: &Conic, homography: &Homography) -> Cone {
    let h = homography.matrix();
    let q = h.transpose() * conic.matrix() * h;
    Cone::new(q.fixed_view::<3, 3>(0, 0).into_owned())
}
