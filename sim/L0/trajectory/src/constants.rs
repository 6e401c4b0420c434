//! Physical constants for ball flight.
//!
//! Units are yards, seconds and kilograms: the pages this model came from
//! measure courts and pitches in yards, while ball mass and air density stay
//! in kilograms.

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};

/// Regulation ball circumference in yards (29.5 in).
pub const BALL_CIRCUMFERENCE_YD: f64 = 29.5 / 36.0;

/// One yard in meters.
pub const YARD_M: f64 = 0.9144;

/// Atmosphere the ball flies through.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirProperties {
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Air pressure in millibars.
    pub pressure_mb: f64,
    /// Specific gas constant of dry air in J/(kg·K).
    pub gas_constant: f64,
}

impl Default for AirProperties {
    /// Standard sea-level pressure at 20 °C.
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            pressure_mb: 1013.25,
            gas_constant: 287.05,
        }
    }
}

impl AirProperties {
    /// Density in kg/m³ from the ideal gas law.
    #[must_use]
    pub fn density_kg_m3(&self) -> f64 {
        let pressure_pa = self.pressure_mb * 100.0;
        let temperature_k = self.temperature_c + 273.15;
        pressure_pa / (self.gas_constant * temperature_k)
    }

    /// Density in kg/yd³.
    #[must_use]
    pub fn density_kg_yd3(&self) -> f64 {
        self.density_kg_m3() / YARD_M.powi(3)
    }
}

/// Every constant the integrator consults.
///
/// The default reproduces a regulation ball in still air at 20 °C.
///
/// # Example
///
/// ```
/// use sim_trajectory::PhysicsConstants;
///
/// let constants = PhysicsConstants::default().with_restitution(0.5);
/// assert!(constants.validate().is_ok());
/// assert!(constants.air_ball_constant() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsConstants {
    /// Ball radius in yards.
    pub ball_radius: f64,
    /// Ball mass in kilograms.
    pub ball_mass: f64,
    /// Gravitational acceleration magnitude in yd/s².
    pub gravity: f64,
    /// Fraction of vertical speed kept (and reversed) on a bounce.
    pub restitution: f64,
    /// Rolling friction coefficient on the ground.
    pub friction_coefficient: f64,
    /// Speed below which the ball is considered at rest (yd/s).
    pub rest_speed: f64,
    /// Contact tolerance, both for vertical velocity and for placing a
    /// settled ball just below the contact height.
    pub contact_epsilon: f64,
    /// Quadratic drag coefficient.
    pub drag_coefficient: f64,
    /// Magnus lift coefficient.
    pub magnus_coefficient: f64,
    /// Surrounding air.
    #[cfg_attr(feature = "serde", serde(default))]
    pub air: AirProperties,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            ball_radius: BALL_CIRCUMFERENCE_YD / (2.0 * PI),
            ball_mass: 0.62,
            gravity: 10.72,
            restitution: 0.7,
            friction_coefficient: 0.1,
            rest_speed: 1.5,
            contact_epsilon: 1e-3,
            drag_coefficient: 0.47,
            magnus_coefficient: 0.1,
            air: AirProperties::default(),
        }
    }
}

impl PhysicsConstants {
    /// Constants for a ball of the given circumference (yards), all else default.
    #[must_use]
    pub fn with_circumference(circumference: f64) -> Self {
        Self {
            ball_radius: circumference / (2.0 * PI),
            ..Default::default()
        }
    }

    /// Set the ball radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.ball_radius = radius;
        self
    }

    /// Set the ball mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.ball_mass = mass;
        self
    }

    /// Set the gravitational acceleration magnitude.
    #[must_use]
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the coefficient of restitution.
    #[must_use]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, mu: f64) -> Self {
        self.friction_coefficient = mu;
        self
    }

    /// Set the rest speed threshold.
    #[must_use]
    pub fn with_rest_speed(mut self, speed: f64) -> Self {
        self.rest_speed = speed;
        self
    }

    /// Set the air properties.
    #[must_use]
    pub fn with_air(mut self, air: AirProperties) -> Self {
        self.air = air;
        self
    }

    /// Cross-sectional area of the ball in yd².
    #[must_use]
    pub fn ball_area(&self) -> f64 {
        PI * self.ball_radius * self.ball_radius
    }

    /// `½ · ρ · A`, shared by the drag and Magnus terms.
    #[must_use]
    pub fn air_ball_constant(&self) -> f64 {
        0.5 * self.air.density_kg_yd3() * self.ball_area()
    }

    /// Validate the constants.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::InvalidConfig`] for non-positive radius,
    /// mass, gravity, rest speed or contact epsilon, a restitution outside
    /// `[0, 1]`, or negative friction/drag/Magnus coefficients.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ball radius", self.ball_radius),
            ("ball mass", self.ball_mass),
            ("gravity", self.gravity),
            ("rest speed", self.rest_speed),
            ("contact epsilon", self.contact_epsilon),
            ("air temperature (K)", self.air.temperature_c + 273.15),
            ("air pressure", self.air.pressure_mb),
            ("gas constant", self.air.gas_constant),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrajectoryError::invalid_config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("friction coefficient", self.friction_coefficient),
            ("drag coefficient", self.drag_coefficient),
            ("magnus coefficient", self.magnus_coefficient),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TrajectoryError::invalid_config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(TrajectoryError::invalid_config(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
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
    fn default_radius_from_circumference() {
        let c = PhysicsConstants::default();
        assert_relative_eq!(c.ball_radius, 0.130_418_6, epsilon = 1e-6);
        assert_relative_eq!(
            PhysicsConstants::with_circumference(BALL_CIRCUMFERENCE_YD).ball_radius,
            c.ball_radius
        );
    }

    #[test]
    fn air_density_at_standard_conditions() {
        let air = AirProperties::default();
        assert_relative_eq!(air.density_kg_m3(), 1.204_1, epsilon = 1e-4);
        assert_relative_eq!(
            air.density_kg_yd3(),
            air.density_kg_m3() / 0.764_554_857_984,
            max_relative = 1e-12
        );
    }

    #[test]
    fn air_ball_constant_matches_components() {
        let c = PhysicsConstants::default();
        let expected = 0.5 * c.air.density_kg_yd3() * PI * c.ball_radius.powi(2);
        assert_relative_eq!(c.air_ball_constant(), expected);
    }

    #[test]
    fn validate_defaults() {
        assert!(PhysicsConstants::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let c = PhysicsConstants::default().with_restitution(1.5);
        assert!(c.validate().unwrap_err().is_config_error());

        let c = PhysicsConstants::default().with_mass(0.0);
        assert!(c.validate().is_err());

        let c = PhysicsConstants::default().with_friction(-0.1);
        assert!(c.validate().is_err());

        let c = PhysicsConstants::default().with_gravity(f64::NAN);
        assert!(c.validate().is_err());
    }
}
