//! Explicit ellipse parameters and their conversion to and from conics.
//!
//! An ellipse with center `(x0, y0)`, semi-axes `a` and `b`, and rotation
//! `θ` (degrees, from the image x axis to the `a` axis) is the conic
//!
//! ```text
//! A = (a sinθ)² + (b cosθ)²      D = -2A·x0 - B·y0
//! B = 2(b² - a²) sinθ cosθ       E = -B·x0 - 2C·y0
//! C = (a cosθ)² + (b sinθ)²      F = A·x0² + B·x0·y0 + C·y0² - a²b²
//! ```
//!
//! # Canonical form
//!
//! `(a, b, θ)` and `(b, a, θ + 90°)` describe the same curve, so extraction
//! reports the canonical representative: `a ≥ b` and `θ ∈ [0, 180)`
//! measured to the major axis.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::conic::Conic;
use crate::error::{GeometryError, Result};

/// Off-diagonal magnitude (on the unit-trace conic) below which the ellipse
/// is treated as axis-aligned.
pub const AXIS_ALIGNED_TOL: f64 = 1e-6;

/// Center, semi-axes and rotation of an ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EllipseParams {
    /// Center x coordinate.
    pub x0: f64,
    /// Center y coordinate.
    pub y0: f64,
    /// Semi-axis along the rotated x direction.
    pub a: f64,
    /// Semi-axis along the rotated y direction.
    pub b: f64,
    /// Rotation in degrees from the x axis to the `a` axis.
    pub angle: f64,
}

impl EllipseParams {
    /// Creates ellipse parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidSemiAxis`] if either semi-axis is not
    /// positive, or [`GeometryError::NonFinite`] for a non-finite center or angle.
    pub fn new(x0: f64, y0: f64, a: f64, b: f64, angle: f64) -> Result<Self> {
        let params = Self { x0, y0, a, b, angle };
        params.validate()?;
        Ok(params)
    }

    /// Circle of the given radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn circle(x0: f64, y0: f64, radius: f64) -> Result<Self> {
        Self::new(x0, y0, radius, radius, 0.0)
    }

    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// See [`EllipseParams::new`].
    pub fn validate(&self) -> Result<()> {
        for axis in [self.a, self.b] {
            if !axis.is_finite() || axis <= 0.0 {
                return Err(GeometryError::InvalidSemiAxis(axis));
            }
        }
        if !(self.x0.is_finite() && self.y0.is_finite() && self.angle.is_finite()) {
            return Err(GeometryError::non_finite("ellipse parameters"));
        }
        Ok(())
    }

    /// Extracts the parameters of the ellipse described by a conic.
    ///
    /// The result is in canonical form (see the module docs). The conic is
    /// rescaled to unit trace first, so the result does not depend on the
    /// conic's overall scale or sign.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NotAnEllipse`] if `B² - 4AC >= 0`.
    /// - [`GeometryError::ImaginaryEllipse`] if the ellipse has no real points.
    /// - [`GeometryError::NonFinite`] if the conic contains non-finite values.
    pub fn from_conic(conic: &Conic) -> Result<Self> {
        if !conic.matrix().iter().all(|v| v.is_finite()) {
            return Err(GeometryError::non_finite("conic"));
        }
        let Some(unit) = conic.normalized() else {
            let [a, b, c, ..] = conic.coefficients();
            return Err(GeometryError::NotAnEllipse {
                discriminant: b * b - 4.0 * a * c,
            });
        };
        let [a, b, c, d, e, f] = unit.coefficients();

        let den = b * b - 4.0 * a * c;
        if den >= 0.0 {
            return Err(GeometryError::NotAnEllipse { discriminant: den });
        }

        let x0 = (2.0 * c * d - b * e) / den;
        let y0 = (2.0 * a * e - b * d) / den;

        // Value at the center: the centered conic is `A x² + B xy + C y² + f_c = 0`.
        let f_c = f + 0.5 * (d * x0 + e * y0);
        if f_c >= 0.0 {
            return Err(GeometryError::ImaginaryEllipse);
        }

        // Eigenvalues of the quadratic part; the product is -den/4, which
        // keeps the small one accurate for elongated ellipses.
        let spread = (a - c).hypot(b);
        let lambda_big = 0.5 * (a + c + spread);
        let lambda_small = -0.25 * den / lambda_big;

        let major = (-f_c / lambda_small).sqrt();
        let minor = (-f_c / lambda_big).sqrt();

        let angle = if b.abs() <= AXIS_ALIGNED_TOL {
            if a <= c {
                0.0
            } else {
                90.0
            }
        } else {
            let deg = ((c - a - spread) / b).atan().to_degrees();
            if deg < 0.0 {
                deg + 180.0
            } else {
                deg
            }
        };

        Ok(Self {
            x0,
            y0,
            a: major,
            b: minor,
            angle,
        })
    }

    /// The conic whose zero set is this ellipse.
    ///
    /// Any `a, b > 0` are accepted; the result is not normalized.
    #[must_use]
    pub fn to_conic(&self) -> Conic {
        let (s, c) = self.angle.to_radians().sin_cos();
        let (a, b) = (self.a, self.b);
        let (x0, y0) = (self.x0, self.y0);

        let qa = (a * s).powi(2) + (b * c).powi(2);
        let qb = 2.0 * (b * b - a * a) * s * c;
        let qc = (a * c).powi(2) + (b * s).powi(2);
        let qd = -2.0 * qa * x0 - qb * y0;
        let qe = -qb * x0 - 2.0 * qc * y0;
        let qf = qa * x0 * x0 + qb * x0 * y0 + qc * y0 * y0 - (a * b).powi(2);

        Conic::from_coefficients(qa, qb, qc, qd, qe, qf)
    }

    /// Same ellipse with `a ≥ b` and the angle wrapped into `[0, 180)`.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let (a, b, angle) = if self.b > self.a {
            (self.b, self.a, self.angle + 90.0)
        } else {
            (self.a, self.b, self.angle)
        };
        let mut angle = angle.rem_euclid(180.0);
        if angle >= 180.0 {
            angle = 0.0;
        }
        Self {
            a,
            b,
            angle,
            ..*self
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.x0, self.y0)
    }

    /// Enclosed area, `π·a·b`.
    #[must_use]
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.a * self.b
    }

    /// Eccentricity in `[0, 1)`.
    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        let (major, minor) = if self.a >= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        };
        (1.0 - (minor / major).powi(2)).max(0.0).sqrt()
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    #[must_use]
    pub fn bounding_box(&self) -> (Point2<f64>, Point2<f64>) {
        let (s, c) = self.angle.to_radians().sin_cos();
        let half_w = ((self.a * c).powi(2) + (self.b * s).powi(2)).sqrt();
        let half_h = ((self.a * s).powi(2) + (self.b * c).powi(2)).sqrt();
        (
            Point2::new(self.x0 - half_w, self.y0 - half_h),
            Point2::new(self.x0 + half_w, self.y0 + half_h),
        )
    }

    /// Returns true if the point lies inside or on the ellipse.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (s, c) = self.angle.to_radians().sin_cos();
        let dx = x - self.x0;
        let dy = y - self.y0;
        let u = dx * c + dy * s;
        let v = -dx * s + dy * c;
        (u / self.a).powi(2) + (v / self.b).powi(2) <= 1.0
    }
}

impl TryFrom<&Conic> for EllipseParams {
    type Error = GeometryError;

    fn try_from(conic: &Conic) -> Result<Self> {
        Self::from_conic(conic)
    }
}
