//! Ball flight simulation with drag, Magnus lift, ground friction and bounce.
//!
//! This crate provides:
//!
//! - [`PhysicsConstants`] - ball, gravity and air properties
//! - [`KinematicState`] / [`LaunchParams`] - ball state and how it is struck
//! - [`ForceFlags`] - which forces act and whether impacts bounce
//! - [`TrajectoryIntegrator`] / [`compute_trajectory`] - forward Euler
//!   integration over a time grid
//! - [`ContactPhase`] / [`resolve_ground_collision`] - the ground contact
//!   state machine
//! - [`Trajectory`] - samples keyed by index, with time lookups, bounce
//!   events and rest detection
//! - [`TimeGrid`] - dense and sparse sample grids
//! - [`NoiseModel`] - noisy, partially missed observations of a trajectory
//!
//! # Example
//!
//! ```
//! use sim_trajectory::{compute_trajectory, ForceFlags, KinematicState, LaunchParams, TimeGrid};
//! use nalgebra::{Vector2, Vector3};
//!
//! let launch = LaunchParams::new(Vector3::new(-54.0, 0.0, 0.0), 25.0, Vector2::new(1.0, 0.05))
//!     .with_elevation(35.0)
//!     .with_spin(5.0);
//! let initial = KinematicState::from_launch(&launch).unwrap();
//!
//! let grid = TimeGrid::dense(0.0, 5.0).unwrap();
//! let trajectory = compute_trajectory(&initial, grid.times(), ForceFlags::all()).unwrap();
//!
//! assert_eq!(trajectory.len(), 1001);
//! assert!(trajectory.max_height() > 5.0);
//! assert!(!trajectory.bounces().is_empty());
//! ```
//!
//! # Units
//!
//! Lengths in yards, time in seconds, mass in kilograms, angles in degrees at
//! the API surface. Z is up and the ground is the plane `z = 0`; a ball
//! touches the ground when its center is at `z = r`.
//!
//! # Layer 0 Crate
//!
//! Pure computation on `nalgebra` types. Randomness is confined to
//! [`NoiseModel::apply`], which takes the RNG as an argument.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for constants, states,
//!   flags, trajectories and noise models

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::doc_markdown
)]

mod constants;
mod contact;
mod error;
mod forces;
mod grid;
mod integrator;
mod noise;
mod state;
mod trajectory;

pub use constants::{AirProperties, PhysicsConstants, BALL_CIRCUMFERENCE_YD, YARD_M};
pub use contact::{
    is_ground_contact, resolve_ground_collision, CollisionOutcome, ContactPhase, ImpactKind,
};
pub use error::{Result, TrajectoryError};
pub use forces::{
    acceleration, drag_acceleration, friction_acceleration, gravity_acceleration,
    magnus_acceleration, ForceFlags,
};
pub use grid::{validate_times, TimeGrid, DENSE_SAMPLES, MAX_GRID_SAMPLES};
pub use integrator::{compute_trajectory, TrajectoryIntegrator};
pub use noise::{NoiseModel, ObservedTrajectory};
pub use state::{KinematicState, LaunchParams};
pub use trajectory::{BounceEvent, Trajectory, TrajectorySample};

// Re-export nalgebra types for convenience
pub use nalgebra::{Vector2, Vector3};

/// Prelude for convenient imports.
///
/// ```
/// use sim_trajectory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        compute_trajectory, ContactPhase, ForceFlags, KinematicState, LaunchParams,
        NoiseModel, PhysicsConstants, TimeGrid, Trajectory, TrajectoryError,
        TrajectoryIntegrator,
    };
}
