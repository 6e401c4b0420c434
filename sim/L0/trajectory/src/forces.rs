//! Accelerations acting on the ball.
//!
//! ```text
//! a = a_gravity + a_friction + a_drag + a_magnus
//!
//! a_gravity  = (0, 0, -g)                      airborne only
//! a_friction = -μ·g · v_xy / |v_xy|            ground contact only
//! a_drag     = -(½ρA · Cd · |v|² / m) · v̂
//! a_magnus   = k_M · ½ρA · (ω × v) / m
//! ```
//!
//! Gravity is always evaluated; it is cancelled by the ground while the ball
//! is in [ground contact](crate::contact::is_ground_contact). The other three
//! terms are switched by [`ForceFlags`].

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::PhysicsConstants;
use crate::contact::is_ground_contact;
use crate::state::KinematicState;

/// Which optional forces act on the ball, and whether ground impacts bounce.
///
/// # Example
///
/// ```
/// use sim_trajectory::ForceFlags;
///
/// let flags = ForceFlags::bounce_only().with_drag(true);
/// assert!(flags.bounce && flags.drag);
/// assert!(!flags.magnus);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ForceFlags {
    /// Rolling friction while on the ground.
    pub friction: bool,
    /// Quadratic air drag.
    pub drag: bool,
    /// Magnus lift from spin.
    pub magnus: bool,
    /// Restitutive bounce on ground impact; otherwise the ball stops dead.
    pub bounce: bool,
}

impl Default for ForceFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl ForceFlags {
    /// Every force on, bouncing.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            friction: true,
            drag: true,
            magnus: true,
            bounce: true,
        }
    }

    /// Gravity only; the ball stops at the first ground impact.
    #[must_use]
    pub const fn gravity_only() -> Self {
        Self {
            friction: false,
            drag: false,
            magnus: false,
            bounce: false,
        }
    }

    /// Gravity with bounces, no friction or air.
    #[must_use]
    pub const fn bounce_only() -> Self {
        Self {
            bounce: true,
            ..Self::gravity_only()
        }
    }

    /// Everything except Magnus lift.
    #[must_use]
    pub const fn without_spin() -> Self {
        Self {
            magnus: false,
            ..Self::all()
        }
    }

    /// Toggle friction.
    #[must_use]
    pub const fn with_friction(mut self, on: bool) -> Self {
        self.friction = on;
        self
    }

    /// Toggle drag.
    #[must_use]
    pub const fn with_drag(mut self, on: bool) -> Self {
        self.drag = on;
        self
    }

    /// Toggle Magnus lift.
    #[must_use]
    pub const fn with_magnus(mut self, on: bool) -> Self {
        self.magnus = on;
        self
    }

    /// Toggle bouncing.
    #[must_use]
    pub const fn with_bounce(mut self, on: bool) -> Self {
        self.bounce = on;
        self
    }
}

/// Gravity for a ball that is not held up by the ground.
#[must_use]
pub fn gravity_acceleration(constants: &PhysicsConstants) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -constants.gravity)
}

/// Coulomb friction opposing horizontal motion, magnitude `μ·g`.
///
/// Zero when the ball has no horizontal velocity.
#[must_use]
pub fn friction_acceleration(
    velocity: &Vector3<f64>,
    constants: &PhysicsConstants,
) -> Vector3<f64> {
    let horizontal = velocity.xy();
    let speed = horizontal.norm();
    if speed <= 0.0 {
        return Vector3::zeros();
    }
    let magnitude = constants.friction_coefficient * constants.gravity;
    let dir = horizontal / speed;
    Vector3::new(-magnitude * dir.x, -magnitude * dir.y, 0.0)
}

/// Quadratic air drag. Zero below the contact epsilon to avoid dividing by
/// a vanishing speed.
#[must_use]
pub fn drag_acceleration(velocity: &Vector3<f64>, constants: &PhysicsConstants) -> Vector3<f64> {
    let speed = velocity.norm();
    if speed < constants.contact_epsilon {
        return Vector3::zeros();
    }
    let force = constants.air_ball_constant() * constants.drag_coefficient * speed * speed;
    -(force / constants.ball_mass) * (velocity / speed)
}

/// Magnus lift `k_M · ½ρA · (ω × v) / m`.
#[must_use]
pub fn magnus_acceleration(
    velocity: &Vector3<f64>,
    angular_velocity: &Vector3<f64>,
    constants: &PhysicsConstants,
) -> Vector3<f64> {
    let scale = constants.magnus_coefficient * constants.air_ball_constant() / constants.ball_mass;
    angular_velocity.cross(velocity) * scale
}

/// Total linear acceleration of the ball.
///
/// In ground contact gravity is cancelled; friction is computed only while
/// the vertical speed is within the contact epsilon and then added if
/// `flags.friction` is set. Angular acceleration is always zero: spin is
/// constant over a flight.
#[must_use]
pub fn acceleration(
    state: &KinematicState,
    constants: &PhysicsConstants,
    flags: &ForceFlags,
) -> Vector3<f64> {
    let velocity = &state.velocity;

    let (gravity, friction) = if is_ground_contact(state, constants) {
        let friction = if velocity.z.abs() < constants.contact_epsilon {
            friction_acceleration(velocity, constants)
        } else {
            Vector3::zeros()
        };
        (Vector3::zeros(), friction)
    } else {
        (gravity_acceleration(constants), Vector3::zeros())
    };

    let mut total = gravity;
    if flags.friction {
        total += friction;
    }
    if flags.drag {
        total += drag_acceleration(velocity, constants);
    }
    if flags.magnus {
        total += magnus_acceleration(velocity, &state.angular_velocity, constants);
    }
    total
}
