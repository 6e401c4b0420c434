//! Kinematic state of a ball and launch parameterization.

use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};

/// Position, velocity and spin of the ball.
///
/// Flattens to the 9-element layout `[pos; vel; ω]` with
/// [`to_array`](Self::to_array) / [`from_array`](Self::from_array).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicState {
    /// Position in yards.
    pub position: Vector3<f64>,
    /// Velocity in yd/s.
    pub velocity: Vector3<f64>,
    /// Angular velocity in rad/s.
    pub angular_velocity: Vector3<f64>,
}

impl KinematicState {
    /// Creates a state.
    #[must_use]
    pub const fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        angular_velocity: Vector3<f64>,
    ) -> Self {
        Self {
            position,
            velocity,
            angular_velocity,
        }
    }

    /// A motionless, spinless ball.
    #[must_use]
    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self::new(position, Vector3::zeros(), Vector3::zeros())
    }

    /// Launch the ball from `params`.
    ///
    /// Velocity is `speed · (hx cos θ, hy cos θ, sin θ)` for unit heading
    /// `(hx, hy)` and elevation `θ`; spin is about the vertical axis.
    ///
    /// # Errors
    ///
    /// See [`LaunchParams::validate`].
    pub fn from_launch(params: &LaunchParams) -> Result<Self> {
        params.validate()?;
        let heading = params.heading.normalize();
        let (sin_e, cos_e) = params.elevation_deg.to_radians().sin_cos();
        let velocity = Vector3::new(
            params.speed * heading.x * cos_e,
            params.speed * heading.y * cos_e,
            params.speed * sin_e,
        );
        Ok(Self::new(
            params.position,
            velocity,
            Vector3::new(0.0, 0.0, params.spin),
        ))
    }

    /// Flatten to `[x, y, z, vx, vy, vz, ωx, ωy, ωz]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 9] {
        let (p, v, w) = (self.position, self.velocity, self.angular_velocity);
        [p.x, p.y, p.z, v.x, v.y, v.z, w.x, w.y, w.z]
    }

    /// Inverse of [`to_array`](Self::to_array).
    #[must_use]
    pub fn from_array(s: [f64; 9]) -> Self {
        Self::new(
            Vector3::new(s[0], s[1], s[2]),
            Vector3::new(s[3], s[4], s[5]),
            Vector3::new(s[6], s[7], s[8]),
        )
    }

    /// Speed (velocity magnitude).
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Speed in the ground plane.
    #[must_use]
    pub fn horizontal_speed(&self) -> f64 {
        self.velocity.xy().norm()
    }

    /// Height of the ball center.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.position.z
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl From<[f64; 9]> for KinematicState {
    fn from(s: [f64; 9]) -> Self {
        Self::from_array(s)
    }
}

impl From<KinematicState> for [f64; 9] {
    fn from(state: KinematicState) -> Self {
        state.to_array()
    }
}

/// How a ball is struck: where, how fast, how steep, in which direction,
/// and with how much sidespin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaunchParams {
    /// Launch position in yards.
    pub position: Vector3<f64>,
    /// Launch speed in yd/s.
    pub speed: f64,
    /// Elevation above the ground plane in degrees.
    pub elevation_deg: f64,
    /// Direction in the ground plane; normalized on use.
    pub heading: Vector2<f64>,
    /// Spin about the vertical axis in rad/s.
    pub spin: f64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            speed: 0.0,
            elevation_deg: 0.0,
            heading: Vector2::x(),
            spin: 0.0,
        }
    }
}

impl LaunchParams {
    /// Launch from `position` with `speed` along `heading`.
    #[must_use]
    pub fn new(position: Vector3<f64>, speed: f64, heading: Vector2<f64>) -> Self {
        Self {
            position,
            speed,
            heading,
            ..Default::default()
        }
    }

    /// Set the elevation angle.
    #[must_use]
    pub fn with_elevation(mut self, degrees: f64) -> Self {
        self.elevation_deg = degrees;
        self
    }

    /// Set the vertical-axis spin.
    #[must_use]
    pub fn with_spin(mut self, spin: f64) -> Self {
        self.spin = spin;
        self
    }

    /// Validate the launch parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite values, a negative speed, or a zero heading.
    pub fn validate(&self) -> Result<()> {
        let all_finite = self.position.iter().all(|v| v.is_finite())
            && self.heading.iter().all(|v| v.is_finite())
            && self.speed.is_finite()
            && self.elevation_deg.is_finite()
            && self.spin.is_finite();
        if !all_finite {
            return Err(TrajectoryError::non_finite("launch parameters"));
        }
        if self.speed < 0.0 {
            return Err(TrajectoryError::invalid_config(format!(
                "launch speed must be non-negative, got {}",
                self.speed
            )));
        }
        if self.heading.norm() <= f64::EPSILON {
            return Err(TrajectoryError::invalid_config("launch heading is zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn array_layout() {
        let state = KinematicState::new(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(4.0, 5.0, 6.0),
            Vector3::new(7.0, 8.0, 9.0),
        );
        let s = state.to_array();
        assert_relative_eq!(s[2], 3.0);
        assert_relative_eq!(s[3], 4.0);
        assert_relative_eq!(s[8], 9.0);
        assert_eq!(KinematicState::from(s), state);
    }

    #[test]
    fn launch_decomposes_speed() {
        let params = LaunchParams::new(Vector3::new(-54.0, 3.0, 0.0), 20.0, Vector2::new(3.0, 4.0))
            .with_elevation(30.0)
            .with_spin(5.0);
        let state = KinematicState::from_launch(&params).unwrap();
        assert_relative_eq!(state.speed(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(state.velocity.z, 10.0, epsilon = 1e-12);
        let horizontal = 20.0 * 30f64.to_radians().cos();
        assert_relative_eq!(state.velocity.x, horizontal * 0.6, epsilon = 1e-12);
        assert_relative_eq!(state.velocity.y, horizontal * 0.8, epsilon = 1e-12);
        assert_relative_eq!(state.angular_velocity, Vector3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(state.position, params.position);
    }

    #[test]
    fn launch_rejects_bad_params() {
        let zero_heading = LaunchParams::new(Vector3::zeros(), 1.0, Vector2::zeros());
        assert!(KinematicState::from_launch(&zero_heading).is_err());

        let negative = LaunchParams::new(Vector3::zeros(), -1.0, Vector2::x());
        assert!(negative.validate().unwrap_err().is_config_error());

        let nan = LaunchParams::new(Vector3::zeros(), f64::NAN, Vector2::x());
        assert!(matches!(
            nan.validate(),
            Err(TrajectoryError::NonFinite { .. })
        ));
    }

    #[test]
    fn speeds() {
        let state = KinematicState::new(
            Vector3::zeros(),
            Vector3::new(3.0, 4.0, 12.0),
            Vector3::zeros(),
        );
        assert_relative_eq!(state.speed(), 13.0);
        assert_relative_eq!(state.horizontal_speed(), 5.0);
        assert!(state.is_finite());
        assert!(KinematicState::at_rest(Vector3::zeros()).speed() < f64::EPSILON);
    }
}
