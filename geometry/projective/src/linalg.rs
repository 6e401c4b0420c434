//! Small linear algebra kit on top of `nalgebra`.
//!
//! `nalgebra` already provides products, transposes and determinants. What
//! this module adds is the checked boundary the conic code needs: inversion
//! that refuses badly conditioned matrices instead of returning
//! `inf`/`NaN`, and a sorted symmetric eigendecomposition.

use nalgebra::{Matrix3, Vector3};

use crate::error::{GeometryError, Result};

/// Matrices whose reciprocal condition number falls below this value are
/// treated as singular.
///
/// Well-posed sphere projections stay around `1e-12` even for balls far
/// from a wide-angle camera; a camera sitting on the sphere drops to
/// rounding noise (~`1e-16`).
pub const SINGULAR_RCOND: f64 = 1e-14;

/// Ratio of the smallest to the largest singular value.
///
/// Returns `0.0` for the zero matrix and for matrices containing
/// non-finite entries.
#[must_use]
pub fn reciprocal_condition3(m: &Matrix3<f64>) -> f64 {
    if !m.iter().all(|v| v.is_finite()) {
        return 0.0;
    }
    let s = m.singular_values();
    let max = s.max();
    if max <= 0.0 {
        return 0.0;
    }
    s.min() / max
}

/// Inverts a 3x3 matrix, failing on (near-)singular input.
///
/// # Errors
///
/// Returns [`GeometryError::Singular`] if the reciprocal condition number is
/// below [`SINGULAR_RCOND`] or inversion produced non-finite values.
pub fn try_inverse3(m: &Matrix3<f64>, context: &str) -> Result<Matrix3<f64>> {
    let rcond = reciprocal_condition3(m);
    if rcond < SINGULAR_RCOND {
        return Err(GeometryError::singular(context, rcond));
    }
    let inv = m
        .try_inverse()
        .ok_or_else(|| GeometryError::singular(context, rcond))?;
    if inv.iter().all(|v| v.is_finite()) {
        Ok(inv)
    } else {
        Err(GeometryError::singular(context, rcond))
    }
}

/// Symmetrizes a matrix: `(M + Mᵀ) / 2`.
#[must_use]
pub fn symmetrize(m: &Matrix3<f64>) -> Matrix3<f64> {
    (m + m.transpose()) * 0.5
}

/// Eigendecomposition of a symmetric 3x3 matrix.
///
/// Eigenvalues are sorted ascending; `vectors` holds the matching unit
/// eigenvectors as columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen3 {
    /// Eigenvalues, ascending.
    pub values: Vector3<f64>,
    /// Unit eigenvectors, column `i` pairs with `values[i]`.
    pub vectors: Matrix3<f64>,
}

impl Eigen3 {
    /// The `i`-th eigenvector.
    #[must_use]
    pub fn vector(&self, i: usize) -> Vector3<f64> {
        self.vectors.column(i).into_owned()
    }

    /// Eigenvalues as a plain array.
    #[must_use]
    pub fn values_array(&self) -> [f64; 3] {
        [self.values[0], self.values[1], self.values[2]]
    }
}

/// Eigendecomposition of a symmetric 3x3 matrix.
///
/// The input is symmetrized first so round-off asymmetry from matrix
/// products does not leak into the solver.
///
/// # Errors
///
/// Returns [`GeometryError::NonFinite`] if the matrix has non-finite entries.
pub fn symmetric_eigen(m: &Matrix3<f64>) -> Result<Eigen3> {
    if !m.iter().all(|v| v.is_finite()) {
        return Err(GeometryError::non_finite("symmetric eigendecomposition"));
    }
    let eig = symmetrize(m).symmetric_eigen();

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

    let values = Vector3::new(
        eig.eigenvalues[order[0]],
        eig.eigenvalues[order[1]],
        eig.eigenvalues[order[2]],
    );
    let mut vectors = Matrix3::zeros();
    for (dst, &src) in order.iter().enumerate() {
        let v = eig.eigenvectors.column(src).normalize();
        vectors.set_column(dst, &v);
    }
    Ok(Eigen3 { values, vectors })
}

/// Rounds to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Rounds each component of a vector to a fixed number of decimal places.
#[must_use]
pub fn round_vector(v: &Vector3<f64>, decimals: i32) -> Vector3<f64> {
    v.map(|c| round_to(c, decimals))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse3_of_identity() {
        let inv = try_inverse3(&Matrix3::identity(), "identity").unwrap();
        assert_relative_eq!(inv, Matrix3::identity(), epsilon = 1e-15);
    }

    #[test]
    fn inverse3_rejects_rank_deficient() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0);
        let err = try_inverse3(&m, "rank two").unwrap_err();
        assert!(matches!(err, GeometryError::Singular { .. }));
    }

    #[test]
    fn inverse3_rejects_nan() {
        let mut m = Matrix3::identity();
        m[(1, 1)] = f64::NAN;
        assert!(try_inverse3(&m, "nan").is_err());
    }

    #[test]
    fn condition_of_scaled_identity() {
        let m = Matrix3::identity() * 1e-9;
        assert_relative_eq!(reciprocal_condition3(&m), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn eigen_sorted_ascending() {
        let m = Matrix3::from_diagonal(&Vector3::new(3.0, -1.0, 2.0));
        let eig = symmetric_eigen(&m).unwrap();
        assert_relative_eq!(eig.values, Vector3::new(-1.0, 2.0, 3.0), epsilon = 1e-12);
        // Eigenvector for -1 is the y axis (up to sign).
        assert_relative_eq!(eig.vector(0).y.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn eigen_reconstructs_matrix() {
        let m = Matrix3::new(2.0, -1.0, 0.5, -1.0, 3.0, 0.25, 0.5, 0.25, -4.0);
        let eig = symmetric_eigen(&m).unwrap();
        let rebuilt = eig.vectors * Matrix3::from_diagonal(&eig.values) * eig.vectors.transpose();
        assert_relative_eq!(rebuilt, m, epsilon = 1e-10);
        for i in 0..3 {
            assert_relative_eq!(eig.vector(i).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn eigen_handles_repeated_magnitudes() {
        // |λ| all equal but signs differ; an SVD-based solver cannot tell
        // the eigenvectors apart here.
        let m = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
        let eig = symmetric_eigen(&m).unwrap();
        assert_relative_eq!(eig.values[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(eig.vector(0).z.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rounding() {
        assert_relative_eq!(round_to(4.96, 1), 5.0);
        assert_relative_eq!(round_to(-0.04, 1), 0.0);
        assert_relative_eq!(round_to(1.2345, 2), 1.23);
        let v = round_vector(&Vector3::new(0.04, -19.96, 5.01), 1);
        assert_relative_eq!(v, Vector3::new(0.0, -20.0, 5.0));
    }
}
