//! Ground contact: phase classification and collision resolution.
//!
//! The ball moves through three phases. Transitions on landing:
//!
//! - `Airborne → Airborne` when the rebound is at least the rest speed
//! - `Airborne → GroundContact` when the rebound is slower (it settles)
//! - `Airborne → Resting` when bouncing is disabled
//!
//! and `GroundContact → Resting` once friction and drag bring the speed
//! below the rest speed.
//!
//! `Resting` is absorbing: once entered the integrator freezes the state.

use nalgebra::Vector3;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::PhysicsConstants;
use crate::state::KinematicState;

/// Contact phase of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContactPhase {
    /// In flight under gravity.
    Airborne,
    /// On the ground without upward velocity; gravity is cancelled by the
    /// ground and friction applies.
    GroundContact,
    /// Slower than the rest speed; position is frozen.
    Resting,
}

impl ContactPhase {
    /// Classify a state. Rest takes precedence over ground contact.
    #[must_use]
    pub fn classify(state: &KinematicState, constants: &PhysicsConstants) -> Self {
        if state.speed() < constants.rest_speed {
            Self::Resting
        } else if is_ground_contact(state, constants) {
            Self::GroundContact
        } else {
            Self::Airborne
        }
    }

    /// Returns true for [`ContactPhase::Resting`].
    #[must_use]
    pub const fn is_resting(self) -> bool {
        matches!(self, Self::Resting)
    }
}

/// Ball touches the ground and is not moving upward faster than the
/// contact tolerance.
#[must_use]
pub fn is_ground_contact(state: &KinematicState, constants: &PhysicsConstants) -> bool {
    state.position.z <= constants.ball_radius && state.velocity.z < constants.contact_epsilon
}

/// What happened when a candidate state met the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ImpactKind {
    /// Vertical velocity reversed and scaled by the restitution.
    Bounce,
    /// Rebound too slow: vertical velocity absorbed, ball keeps rolling.
    Settle,
    /// Bounce disabled: the ball stopped dead.
    Stop,
}

/// Result of [`resolve_ground_collision`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    /// No downward ground crossing; the candidate stands.
    Clear(KinematicState),
    /// The ball hit the ground.
    Impact {
        /// State after the impact.
        state: KinematicState,
        /// How the impact was resolved.
        kind: ImpactKind,
        /// Vertical speed just before the impact.
        impact_speed: f64,
        /// Vertical speed just after the impact.
        rebound_speed: f64,
    },
}

impl CollisionOutcome {
    /// The resulting state.
    #[must_use]
    pub fn state(&self) -> &KinematicState {
        match self {
            Self::Clear(state) | Self::Impact { state, .. } => state,
        }
    }

    /// Consume into the resulting state.
    #[must_use]
    pub fn into_state(self) -> KinematicState {
        match self {
            Self::Clear(state) | Self::Impact { state, .. } => state,
        }
    }

    /// Returns true if the impact stopped the ball for good.
    #[must_use]
    pub const fn stops(&self) -> bool {
        matches!(
            self,
            Self::Impact {
                kind: ImpactKind::Stop,
                ..
            }
        )
    }
}

/// Resolve a ground crossing of an Euler-advanced candidate state.
///
/// A collision happens when the candidate is at or below contact height
/// (`z ≤ r`) while moving down. With `bounce`:
///
/// - `vz' = -e·vz` and the penetration is mirrored and scaled:
///   `z' = r + e·(r - z)`
/// - if `|vz'|` is below the rest speed, `vz' = 0` and `z' = r - ε`
///
/// Without `bounce` the velocity is zeroed and `z' = r - ε`.
#[must_use]
pub fn resolve_ground_collision(
    candidate: &KinematicState,
    constants: &PhysicsConstants,
    bounce: bool,
) -> CollisionOutcome {
    let r = constants.ball_radius;
    if candidate.position.z > r || candidate.velocity.z >= 0.0 {
        return CollisionOutcome::Clear(*candidate);
    }

    let impact_speed = candidate.velocity.z.abs();
    let mut state = *candidate;

    if !bounce {
        state.velocity = Vector3::zeros();
        state.position.z = r - constants.contact_epsilon;
        debug!(impact_speed, "Ground impact without bounce, ball stopped");
        return CollisionOutcome::Impact {
            state,
            kind: ImpactKind::Stop,
            impact_speed,
            rebound_speed: 0.0,
        };
    }

    let e = constants.restitution;
    state.velocity.z = -e * candidate.velocity.z;
    state.position.z = r + e * (r - candidate.position.z);

    let kind = if state.velocity.z.abs() < constants.rest_speed {
        state.velocity.z = 0.0;
        state.position.z = r - constants.contact_epsilon;
        ImpactKind::Settle
    } else {
        ImpactKind::Bounce
    };

    let rebound_speed = state.velocity.z.abs();
    debug!(?kind, impact_speed, rebound_speed, "Ground impact");

    CollisionOutcome::Impact {
        state,
        kind,
        impact_speed,
        rebound_speed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn falling(z: f64, vz: f64) -> KinematicState {
        KinematicState::new(
            Vector3::new(0.0, 0.0, z),
            Vector3::new(2.0, 0.0, vz),
            Vector3::zeros(),
        )
    }

    #[test]
    fn classify_phases() {
        let c = PhysicsConstants::default();
        assert_eq!(ContactPhase::classify(&falling(5.0, -3.0), &c), ContactPhase::Airborne);
        assert_eq!(
            ContactPhase::classify(&falling(c.ball_radius - 1e-3, 0.0), &c),
            ContactPhase::GroundContact
        );
        let slow = KinematicState::new(
            Vector3::new(0.0, 0.0, 4.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zeros(),
        );
        assert!(ContactPhase::classify(&slow, &c).is_resting());
    }

    #[test]
    fn rising_ball_on_ground_is_airborne() {
        let c = PhysicsConstants::default();
        let rising = falling(0.0, 10.0);
        assert!(!is_ground_contact(&rising, &c));
        assert!(matches!(
            resolve_ground_collision(&rising, &c, true),
            CollisionOutcome::Clear(_)
        ));
    }

    #[test]
    fn bounce_reflects_with_restitution() {
        let c = PhysicsConstants::default();
        let r = c.ball_radius;
        let outcome = resolve_ground_collision(&falling(r - 0.05, -10.0), &c, true);
        let CollisionOutcome::Impact {
            state,
            kind,
            impact_speed,
            rebound_speed,
        } = outcome
        else {
            panic!("expected impact");
        };
        assert_eq!(kind, ImpactKind::Bounce);
        assert_relative_eq!(impact_speed, 10.0);
        assert_relative_eq!(rebound_speed, 7.0, epsilon = 1e-12);
        assert_relative_eq!(state.velocity.z, 7.0, epsilon = 1e-12);
        assert_relative_eq!(state.position.z, r + 0.7 * 0.05, epsilon = 1e-12);
        assert_relative_eq!(state.velocity.x, 2.0);
    }

    #[test]
    fn slow_rebound_settles() {
        let c = PhysicsConstants::default();
        let outcome = resolve_ground_collision(&falling(0.1, -2.0), &c, true);
        let state = outcome.state();
        assert_eq!(state.velocity.z, 0.0);
        assert_relative_eq!(state.position.z, c.ball_radius - c.contact_epsilon);
        assert!(!outcome.stops());
        assert!(matches!(
            outcome,
            CollisionOutcome::Impact {
                kind: ImpactKind::Settle,
                ..
            }
        ));
    }

    #[test]
    fn no_bounce_stops_dead() {
        let c = PhysicsConstants::default();
        let outcome = resolve_ground_collision(&falling(0.05, -8.0), &c, false);
        assert!(outcome.stops());
        let state = outcome.into_state();
        assert_eq!(state.velocity, Vector3::zeros());
        assert_relative_eq!(state.position.z, c.ball_radius - c.contact_epsilon);
    }
}
