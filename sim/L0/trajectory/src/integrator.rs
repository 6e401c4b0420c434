//! Forward Euler integration of ball flight with ground contact.
//!
//! Each step records the current sample, then advances
//!
//! ```text
//! p' = p + v·dt
//! v' = v + a(p, v, ω)·dt
//! ω' = ω
//! ```
//!
//! and resolves a ground crossing of the advanced state with
//! [`resolve_ground_collision`]. Once the speed drops below the rest speed,
//! or an impact without bounce stops the ball, the state is frozen for
//! every later sample.

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::constants::PhysicsConstants;
use crate::contact::{resolve_ground_collision, CollisionOutcome, ContactPhase, ImpactKind};
use crate::error::{Result, TrajectoryError};
use crate::forces::{acceleration, ForceFlags};
use crate::grid::validate_times;
use crate::state::KinematicState;
use crate::trajectory::{BounceEvent, Trajectory, TrajectorySample};

/// Relative deviation from the first step above which a grid is reported
/// as non-uniform.
const UNIFORM_STEP_TOL: f64 = 1e-6;

/// Integrates ball trajectories for one set of constants and force flags.
///
/// # Example
///
/// ```
/// use sim_trajectory::{ForceFlags, KinematicState, TimeGrid, TrajectoryIntegrator};
/// use nalgebra::Vector3;
///
/// let integrator = TrajectoryIntegrator::default().with_flags(ForceFlags::bounce_only());
/// let initial = KinematicState::new(
///     Vector3::new(0.0, 0.0, 5.0),
///     Vector3::new(4.0, 0.0, 0.0),
///     Vector3::zeros(),
/// );
/// let grid = TimeGrid::dense(0.0, 3.0).unwrap();
/// let trajectory = integrator.integrate(&initial, grid.times()).unwrap();
///
/// assert_eq!(trajectory.len(), grid.len());
/// assert!(!trajectory.bounces().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectoryIntegrator {
    constants: PhysicsConstants,
    flags: ForceFlags,
}

impl TrajectoryIntegrator {
    /// Create an integrator.
    ///
    /// # Errors
    ///
    /// Returns an error if `constants` fail [`PhysicsConstants::validate`].
    pub fn new(constants: PhysicsConstants, flags: ForceFlags) -> Result<Self> {
        constants.validate()?;
        Ok(Self { constants, flags })
    }

    /// Replace the force flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ForceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Physical constants in use.
    #[must_use]
    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    /// Force flags in use.
    #[must_use]
    pub fn flags(&self) -> &ForceFlags {
        &self.flags
    }

    /// Time derivative of `state`: `(v, a, 0)`.
    #[must_use]
    pub fn derivative(&self, state: &KinematicState) -> KinematicState {
        KinematicState::new(
            state.velocity,
            acceleration(state, &self.constants, &self.flags),
            Vector3::zeros(),
        )
    }

    /// One Euler step of length `dt` followed by ground collision handling.
    #[must_use]
    pub fn step(&self, state: &KinematicState, dt: f64) -> CollisionOutcome {
        let d = self.derivative(state);
        let candidate = KinematicState::new(
            state.position + d.position * dt,
            state.velocity + d.velocity * dt,
            state.angular_velocity + d.angular_velocity * dt,
        );
        resolve_ground_collision(&candidate, &self.constants, self.flags.bounce)
    }

    /// Integrate from `initial`, recording one sample per entry of `times`.
    ///
    /// The step is the spacing of the first two times; later spacings are
    /// not consulted, and a non-uniform grid is only logged.
    ///
    /// # Errors
    ///
    /// - [`TrajectoryError::InsufficientSamples`] for fewer than two times
    /// - [`TrajectoryError::NonIncreasingTimes`] or
    ///   [`TrajectoryError::NonFinite`] for a bad time grid
    /// - [`TrajectoryError::NonFinite`] for a non-finite initial state
    pub fn integrate(&self, initial: &KinematicState, times: &[f64]) -> Result<Trajectory> {
        validate_times(times)?;
        if !initial.is_finite() {
            return Err(TrajectoryError::non_finite("initial state"));
        }

        let dt = times[1] - times[0];
        if let Some(offset) = times
            .windows(2)
            .position(|w| ((w[1] - w[0]) - dt).abs() > UNIFORM_STEP_TOL * dt)
        {
            warn!(
                index = offset + 1,
                step = dt,
                "Non-uniform time grid, integrating with the first step"
            );
        }

        let c = &self.constants;
        let mut state = *initial;
        let mut at_rest = false;
        let mut rest_index = None;
        let mut previous_phase = None;
        let mut samples = Vec::with_capacity(times.len());
        let mut bounces = Vec::new();

        for (i, &time) in times.iter().enumerate() {
            if !at_rest && state.speed() < c.rest_speed {
                at_rest = true;
                rest_index = Some(i);
                debug!(index = i, time, "Ball at rest");
            }

            let phase = if at_rest {
                ContactPhase::Resting
            } else {
                ContactPhase::classify(&state, c)
            };
            if previous_phase == Some(ContactPhase::Airborne)
                && phase == ContactPhase::GroundContact
            {
                debug!(index = i, time, "Ball rolling on the ground");
            }
            previous_phase = Some(phase);
            samples.push(TrajectorySample { time, state, phase });

            if at_rest || i + 1 == times.len() {
                continue;
            }

            state = match self.step(&state, dt) {
                CollisionOutcome::Clear(next) => next,
                CollisionOutcome::Impact {
                    state: next,
                    kind,
                    impact_speed,
                    rebound_speed,
                } => {
                    bounces.push(BounceEvent {
                        index: i + 1,
                        time: times[i + 1],
                        impact_speed,
                        rebound_speed,
                        kind,
                    });
                    if kind == ImpactKind::Stop {
                        at_rest = true;
                        rest_index = Some(i + 1);
                    }
                    next
                }
            };
        }

        let trajectory = Trajectory::from_parts(samples, bounces, rest_index);
        info!(
            samples = trajectory.len(),
            bounces = trajectory.bounces().len(),
            rest_index = ?trajectory.rest_index(),
            max_height = format!("{:.2}", trajectory.max_height()),
            "Trajectory computed"
        );
        Ok(trajectory)
    }
}

/// Integrate with the default constants.
///
/// # Errors
///
/// See [`TrajectoryIntegrator::integrate`].
pub fn compute_trajectory(
    initial: &KinematicState,
    times: &[f64],
    flags: ForceFlags,
) -> Result<Trajectory> {
    TrajectoryIntegrator::default()
        .with_flags(flags)
        .integrate(initial, times)
}
