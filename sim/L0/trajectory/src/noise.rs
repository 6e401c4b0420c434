//! Observation noise and dropped detections.
//!
//! A detector sees the ball with per-axis error and sometimes not at all.
//! [`NoiseModel::apply`] corrupts a clean trajectory accordingly; it is a
//! separate step so the integrator itself stays deterministic.

use nalgebra::Vector3;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};
use crate::trajectory::{nearest_sample_index, Trajectory};

/// Uniform per-axis noise plus random misses.
///
/// Each axis gets an independent offset uniform on `[-w, w]` with
/// `w = √3·σ`, which has standard deviation `σ`.
///
/// # Example
///
/// ```
/// use sim_trajectory::NoiseModel;
///
/// assert!(NoiseModel::new(0.5, 0.1).is_ok());
/// assert!(NoiseModel::new(0.5, 1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoiseModel {
    /// Standard deviation of the per-axis position error in yards.
    pub std_dev: f64,
    /// Probability that a sample is not observed.
    pub miss_probability: f64,
}

impl NoiseModel {
    /// Create a validated noise model.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(std_dev: f64, miss_probability: f64) -> Result<Self> {
        let model = Self {
            std_dev,
            miss_probability,
        };
        model.validate()?;
        Ok(model)
    }

    /// Validate the model.
    ///
    /// # Errors
    ///
    /// - [`TrajectoryError::InvalidConfig`] for a negative or non-finite
    ///   standard deviation
    /// - [`TrajectoryError::InvalidProbability`] for a miss probability
    ///   outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(TrajectoryError::invalid_config(format!(
                "noise standard deviation must be non-negative, got {}",
                self.std_dev
            )));
        }
        if !(0.0..=1.0).contains(&self.miss_probability) {
            return Err(TrajectoryError::InvalidProbability(self.miss_probability));
        }
        Ok(())
    }

    /// Half-width of the uniform per-axis offset.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.std_dev * 3f64.sqrt()
    }

    /// Corrupt every sample of `trajectory`.
    ///
    /// Per sample one draw decides a miss; observed samples then take one
    /// draw per axis, in x, y, z order. A seeded RNG therefore reproduces
    /// the same observations.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn apply<R: Rng + ?Sized>(
        &self,
        trajectory: &Trajectory,
        rng: &mut R,
    ) -> Result<ObservedTrajectory> {
        self.validate()?;
        let w = self.half_width();
        let offset = Uniform::new_inclusive(-w, w);
        let mut times = Vec::with_capacity(trajectory.len());
        let mut positions = Vec::with_capacity(trajectory.len());
        for sample in trajectory.samples() {
            times.push(sample.time);
            if rng.gen::<f64>() < self.miss_probability {
                positions.push(None);
                continue;
            }
            let dx = offset.sample(rng);
            let dy = offset.sample(rng);
            let dz = offset.sample(rng);
            positions.push(Some(sample.position() + Vector3::new(dx, dy, dz)));
        }
        Ok(ObservedTrajectory { times, positions })
    }
}

/// A trajectory as a detector reports it: noisy positions, some missing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservedTrajectory {
    times: Vec<f64>,
    positions: Vec<Option<Vector3<f64>>>,
}

impl ObservedTrajectory {
    /// Number of samples, observed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sample times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Observed positions, `None` for misses.
    #[must_use]
    pub fn positions(&self) -> &[Option<Vector3<f64>>] {
        &self.positions
    }

    /// Number of samples actually observed.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }

    /// Fraction of samples missed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn miss_rate(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        (self.len() - self.observed_count()) as f64 / self.len() as f64
    }

    /// Observation at `index`; `None` if missed or out of range.
    #[must_use]
    pub fn at_index(&self, index: usize) -> Option<Vector3<f64>> {
        self.positions.get(index).copied().flatten()
    }

    /// Observation nearest to `time`; `None` if missed or out of range.
    #[must_use]
    pub fn position_at_time(&self, time: f64) -> Option<Vector3<f64>> {
        nearest_sample_index(&self.times, time).and_then(|i| self.at_index(i))
    }

    /// `(time, observation)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, Option<Vector3<f64>>)> + '_ {
        self.times.iter().copied().zip(self.positions.iter().copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::forces::ForceFlags;
    use crate::grid::TimeGrid;
    use crate::integrator::compute_trajectory;
    use crate::state::KinematicState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flight() -> Trajectory {
        let initial = KinematicState::new(
            Vector3::new(-15.0, -7.5, 0.5),
            Vector3::new(10.0, 2.0, 15.0),
            Vector3::new(0.0, 0.0, 20.0),
        );
        let grid = TimeGrid::dense(0.0, 3.0).unwrap();
        compute_trajectory(&initial, grid.times(), ForceFlags::all()).unwrap()
    }

    #[test]
    fn zero_noise_is_identity() {
        let traj = flight();
        let mut rng = StdRng::seed_from_u64(7);
        let observed = NoiseModel::default().apply(&traj, &mut rng).unwrap();
        assert_eq!(observed.len(), traj.len());
        assert_eq!(observed.observed_count(), traj.len());
        for (i, p) in traj.positions().iter().enumerate() {
            assert_eq!(observed.at_index(i), Some(*p));
        }
    }

    #[test]
    fn noise_is_bounded_by_half_width() {
        let traj = flight();
        let model = NoiseModel::new(0.4, 0.0).unwrap();
        let w = model.half_width();
        let mut rng = StdRng::seed_from_u64(11);
        let observed = model.apply(&traj, &mut rng).unwrap();
        let mut max_offset: f64 = 0.0;
        for (clean, noisy) in traj.positions().iter().zip(observed.positions()) {
            let d = noisy.unwrap() - clean;
            assert!(d.amax() <= w + 1e-12);
            max_offset = max_offset.max(d.amax());
        }
        // Over a thousand samples the extremes are approached.
        assert!(max_offset > 0.9 * w);
    }

    #[test]
    fn misses_follow_probability() {
        let traj = flight();
        let model = NoiseModel::new(0.0, 0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let observed = model.apply(&traj, &mut rng).unwrap();
        assert!((observed.miss_rate() - 0.3).abs() < 0.06);

        let all_missed = NoiseModel::new(0.0, 1.0)
            .unwrap()
            .apply(&traj, &mut rng)
            .unwrap();
        assert_eq!(all_missed.observed_count(), 0);
        assert!(all_missed.position_at_time(1.0).is_none());
    }

    #[test]
    fn seeded_rng_reproduces_observations() {
        let traj = flight();
        let model = NoiseModel::new(0.2, 0.1).unwrap();
        let a = model.apply(&traj, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = model.apply(&traj, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().count(), traj.len());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            NoiseModel::new(0.1, -0.1),
            Err(TrajectoryError::InvalidProbability(_))
        ));
        assert!(NoiseModel::new(-1.0, 0.1).unwrap_err().is_config_error());
        assert!(NoiseModel::new(f64::NAN, 0.1).is_err());

        let unchecked = NoiseModel {
            std_dev: f64::INFINITY,
            miss_probability: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let err = unchecked.apply(&flight(), &mut rng).unwrap_err();
        assert!(err.is_config_error());
    }
}
