//! Scenario configuration: camera, launch, forces and time range in one
//! JSON-loadable value.
//!
//! [`ScenarioPreset`] reproduces the demonstration scenes: a gravity-only
//! kick, a bouncing kick, a slowed ball, the basketball ellipse and
//! bounding-box scenes, and a noisy observed kick.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Vector2, Vector3};
use projective_geometry::{BallProjector, Camera};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sim_trajectory::{
    ForceFlags, KinematicState, LaunchParams, NoiseModel, PhysicsConstants, TimeGrid, Trajectory,
    TrajectoryIntegrator, DENSE_SAMPLES, MAX_GRID_SAMPLES,
};
use tracing::info;

use crate::error::{Result, VisionError};
use crate::pipeline::{
    project_observations, project_trajectory, validate_estimates, ProjectedSample,
    ValidationSummary, ViewMode,
};

/// Unit direction of the demonstration kicks, `(x, y, z)`.
const KICK_DIRECTION: [f64; 3] = [0.867_176_5, 0.049_552_94, 0.495_529_43];

/// Horizontal heading of the demonstration launches.
const KICK_HEADING: [f64; 2] = [0.998_371_33, 0.057_049_7];

/// How the ball starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCondition {
    /// An explicit position, velocity and spin.
    State(KinematicState),
    /// A kick described by speed, elevation and heading.
    Launch(LaunchParams),
}

impl InitialCondition {
    /// The initial kinematic state.
    ///
    /// # Errors
    ///
    /// Returns an error if the launch parameters are invalid.
    pub fn to_state(&self) -> Result<KinematicState> {
        match self {
            Self::State(state) => Ok(*state),
            Self::Launch(params) => Ok(KinematicState::from_launch(params)?),
        }
    }
}

impl From<KinematicState> for InitialCondition {
    fn from(state: KinematicState) -> Self {
        Self::State(state)
    }
}

impl From<LaunchParams> for InitialCondition {
    fn from(params: LaunchParams) -> Self {
        Self::Launch(params)
    }
}

/// A complete, reproducible simulation setup.
///
/// The trajectory is integrated on a dense grid of `dense_samples` times
/// over `[start_time, end_time]`; frames are drawn on a sparser grid with
/// spacing `display_step`.
///
/// # Example
///
/// ```
/// use ball_vision::{Scenario, ScenarioPreset};
///
/// let scenario = Scenario::preset(ScenarioPreset::Bounce);
/// let report = scenario.run().unwrap();
/// assert!(!report.summary.bounces.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Label carried into the report.
    pub name: String,
    /// Camera the ball is drawn through.
    pub camera: Camera,
    /// Optional top-down camera drawing the ground shadow.
    pub bird_eye: Option<Camera>,
    /// Physical constants.
    pub constants: PhysicsConstants,
    /// Initial condition.
    pub initial: InitialCondition,
    /// Active forces.
    pub flags: ForceFlags,
    /// First sample time in seconds.
    pub start_time: f64,
    /// Last sample time in seconds.
    pub end_time: f64,
    /// Spacing of the display grid in seconds.
    pub display_step: f64,
    /// Number of integration samples.
    pub dense_samples: usize,
    /// Observation noise; `None` for a clean view.
    pub noise: Option<NoiseModel>,
    /// Seed for the noise RNG.
    pub seed: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::preset(ScenarioPreset::Ellipse)
    }
}

impl Scenario {
    /// Build one of the demonstration scenarios.
    #[must_use]
    pub fn preset(preset: ScenarioPreset) -> Self {
        let basketball = Self {
            name: preset.name().to_string(),
            camera: Camera::basketball_broadcast(),
            bird_eye: Some(Camera::basketball_bird_eye()),
            constants: PhysicsConstants::default(),
            initial: KinematicState::new(
                Vector3::new(-15.0, -7.5, 0.0),
                Vector3::new(10.0, 2.0, 15.0),
                Vector3::new(0.0, 0.0, 20.0),
            )
            .into(),
            flags: ForceFlags::all(),
            start_time: 0.0,
            end_time: 5.0,
            display_step: 0.1,
            dense_samples: DENSE_SAMPLES,
            noise: None,
            seed: 0,
        };
        let soccer = Self {
            camera: Camera::soccer_broadcast(),
            bird_eye: Some(Camera::soccer_bird_eye()),
            initial: kick(25.0).into(),
            ..basketball.clone()
        };
        let launch = |speed: f64, elevation: f64, spin: f64| {
            LaunchParams::new(
                Vector3::new(-54.0, 0.0, 0.0),
                speed,
                Vector2::new(KICK_HEADING[0], KICK_HEADING[1]),
            )
            .with_elevation(elevation)
            .with_spin(spin)
        };

        match preset {
            ScenarioPreset::Ellipse => basketball,
            ScenarioPreset::BoundingBox => Self {
                initial: KinematicState::new(
                    Vector3::new(-15.0, -7.5, 0.0),
                    Vector3::new(3.0, 2.0, 10.0),
                    Vector3::new(0.0, 0.0, 20.0),
                )
                .into(),
                ..basketball
            },
            ScenarioPreset::Gravity => Self {
                flags: ForceFlags::gravity_only(),
                ..soccer
            },
            ScenarioPreset::Bounce => Self {
                flags: ForceFlags::bounce_only(),
                ..soccer
            },
            ScenarioPreset::Slow => Self {
                initial: launch(20.0, 30.0, 0.0).into(),
                flags: ForceFlags::without_spin(),
                ..soccer
            },
            ScenarioPreset::Noise => Self {
                initial: launch(25.0, 35.0, 5.0).into(),
                noise: Some(NoiseModel {
                    std_dev: 0.3,
                    miss_probability: 0.1,
                }),
                seed: 42,
                ..soccer
            },
        }
    }

    /// Load a scenario from JSON. Missing fields take the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the scenario is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Override the active forces.
    #[must_use]
    pub fn with_flags(mut self, flags: ForceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Override the observation noise.
    #[must_use]
    pub fn with_noise(mut self, noise: Option<NoiseModel>) -> Self {
        self.noise = noise;
        self
    }

    /// Override the time range.
    #[must_use]
    pub fn with_time_range(mut self, start: f64, end: f64) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Validate the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or reversed time range, a non-positive
    /// display step, a grid outside `2..=MAX_GRID_SAMPLES` samples, or
    /// invalid cameras, constants, launch or noise.
    pub fn validate(&self) -> Result<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(VisionError::invalid_scenario("time range must be finite"));
        }
        if self.end_time <= self.start_time {
            return Err(VisionError::invalid_scenario(format!(
                "end time {} must be after start time {}",
                self.end_time, self.start_time
            )));
        }
        if !self.display_step.is_finite() || self.display_step <= 0.0 {
            return Err(VisionError::invalid_scenario(format!(
                "display step must be positive, got {}",
                self.display_step
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        let max_frames = MAX_GRID_SAMPLES as f64;
        let display_frames = (self.end_time - self.start_time) / self.display_step;
        if display_frames >= max_frames {
            return Err(VisionError::invalid_scenario(format!(
                "display step {} gives more than {MAX_GRID_SAMPLES} frames",
                self.display_step
            )));
        }
        if !(2..=MAX_GRID_SAMPLES).contains(&self.dense_samples) {
            return Err(VisionError::invalid_scenario(format!(
                "dense samples must be between 2 and {MAX_GRID_SAMPLES}, got {}",
                self.dense_samples
            )));
        }
        self.camera.validate()?;
        if let Some(bird_eye) = &self.bird_eye {
            bird_eye.validate()?;
        }
        self.constants.validate()?;
        if let InitialCondition::Launch(params) = &self.initial {
            params.validate()?;
        }
        if let Some(noise) = &self.noise {
            noise.validate()?;
        }
        Ok(())
    }

    /// Initial kinematic state.
    ///
    /// # Errors
    ///
    /// Returns an error if the launch parameters are invalid.
    pub fn initial_state(&self) -> Result<KinematicState> {
        self.initial.to_state()
    }

    /// Integration grid.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid time range.
    pub fn dense_grid(&self) -> Result<TimeGrid> {
        Ok(TimeGrid::linspace(
            self.start_time,
            self.end_time,
            self.dense_samples,
        )?)
    }

    /// Frame grid.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid time range or step.
    pub fn display_grid(&self) -> Result<TimeGrid> {
        Ok(TimeGrid::stepped(
            self.start_time,
            self.end_time,
            self.display_step,
        )?)
    }

    /// Integrate the trajectory on the dense grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario is invalid.
    pub fn trajectory(&self) -> Result<Trajectory> {
        self.validate()?;
        let integrator = TrajectoryIntegrator::new(self.constants, self.flags)?;
        let initial = self.initial_state()?;
        Ok(integrator.integrate(&initial, self.dense_grid()?.times())?)
    }

    /// Projector for the main camera.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid camera or ball radius.
    pub fn projector(&self) -> Result<BallProjector> {
        Ok(BallProjector::new(self.camera, self.constants.ball_radius)?)
    }

    /// Projector for the bird's-eye camera, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid camera or ball radius.
    pub fn bird_eye_projector(&self) -> Result<Option<BallProjector>> {
        self.bird_eye
            .map(|camera| BallProjector::new(camera, self.constants.ball_radius))
            .transpose()
            .map_err(VisionError::from)
    }

    /// Simulate, project and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario is invalid. Per-frame failures are
    /// recorded in the report instead.
    pub fn run(&self) -> Result<ScenarioReport> {
        let trajectory = self.trajectory()?;
        let display = self.display_grid()?;
        let projector = self.projector()?;

        let perspective =
            project_trajectory(&trajectory, &projector, display.times(), ViewMode::Perspective);
        let ground_shadow = self
            .bird_eye_projector()?
            .map(|bird| {
                project_trajectory(&trajectory, &bird, display.times(), ViewMode::GroundShadow)
            });
        let observations = match self.noise {
            Some(noise) => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let observed = noise.apply(&trajectory, &mut rng)?;
                Some(project_observations(
                    &observed,
                    &projector,
                    display.times(),
                    ViewMode::Perspective,
                ))
            }
            None => None,
        };
        let validation = validate_estimates(&trajectory, &projector, display.times());

        let summary = TrajectorySummary::from(&trajectory);
        let frames = display.len();
        info!(
            scenario = %self.name,
            frames,
            bounces = summary.bounces.len(),
            "Scenario complete"
        );

        Ok(ScenarioReport {
            name: self.name.clone(),
            summary,
            perspective,
            ground_shadow,
            observations,
            validation,
        })
    }
}

/// Kick along the demonstration direction from the left touchline area.
fn kick(speed: f64) -> KinematicState {
    let [dx, dy, dz] = KICK_DIRECTION;
    KinematicState::new(
        Vector3::new(-54.0, 0.0, 0.0),
        Vector3::new(dx, dy, dz) * speed,
        Vector3::zeros(),
    )
}

/// The demonstration scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioPreset {
    /// Kick under gravity alone; the ball stops where it lands.
    Gravity,
    /// Kick under gravity with bounces.
    Bounce,
    /// Kick slowed by drag and friction, no spin.
    Slow,
    /// Spinning basketball throw, every force on.
    Ellipse,
    /// Slower, flatter basketball throw with the same spin.
    BoundingBox,
    /// Spinning kick seen through a noisy, lossy detector.
    Noise,
}

impl ScenarioPreset {
    /// Every preset.
    pub const ALL: [Self; 6] = [
        Self::Gravity,
        Self::Bounce,
        Self::Slow,
        Self::Ellipse,
        Self::BoundingBox,
        Self::Noise,
    ];

    /// Preset name as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gravity => "gravity",
            Self::Bounce => "bounce",
            Self::Slow => "slow",
            Self::Ellipse => "ellipse",
            Self::BoundingBox => "bounding-box",
            Self::Noise => "noise",
        }
    }
}

impl fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioPreset {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "gravity" => Ok(Self::Gravity),
            "bounce" => Ok(Self::Bounce),
            "slow" => Ok(Self::Slow),
            "ellipse" => Ok(Self::Ellipse),
            "bounding-box" | "bbox" => Ok(Self::BoundingBox),
            "noise" => Ok(Self::Noise),
            _ => Err(VisionError::invalid_scenario(format!(
                "unknown preset: {s}"
            ))),
        }
    }
}

/// Headline numbers of a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    /// Number of samples.
    pub samples: usize,
    /// Time span covered, in seconds.
    pub duration: f64,
    /// Times of the ground impacts.
    pub bounces: Vec<f64>,
    /// Time the ball came to rest.
    pub rest_time: Option<f64>,
    /// Highest center height.
    pub max_height: f64,
    /// Horizontal distance from first to last sample.
    pub horizontal_range: f64,
    /// Last position.
    pub final_position: Option<Vector3<f64>>,
}

impl From<&Trajectory> for TrajectorySummary {
    fn from(trajectory: &Trajectory) -> Self {
        let samples = trajectory.samples();
        let duration = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        };
        Self {
            samples: trajectory.len(),
            duration,
            bounces: trajectory.bounces().iter().map(|b| b.time).collect(),
            rest_time: trajectory.rest_time(),
            max_height: trajectory.max_height(),
            horizontal_range: trajectory.horizontal_range(),
            final_position: trajectory.final_state().map(|s| s.position),
        }
    }
}

/// Everything a scenario run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Trajectory summary.
    pub summary: TrajectorySummary,
    /// Frames through the main camera.
    pub perspective: Vec<ProjectedSample>,
    /// Ground shadow through the bird's-eye camera.
    pub ground_shadow: Option<Vec<ProjectedSample>>,
    /// Noisy detections through the main camera.
    pub observations: Option<Vec<ProjectedSample>>,
    /// Estimation round trip on the clean trajectory.
    pub validation: ValidationSummary,
}
