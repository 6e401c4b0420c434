//! Sample-time grids.
//!
//! The integrator steps with the spacing of the first two samples, so a
//! grid is normally uniform. Two flavors are used together: a dense grid
//! the physics runs on and a sparse grid for displaying a handful of balls
//! along the path.

use crate::error::{Result, TrajectoryError};

/// Samples in a default dense grid (1000 steps).
pub const DENSE_SAMPLES: usize = 1001;

/// Largest grid [`TimeGrid`] will build.
pub const MAX_GRID_SAMPLES: usize = 1_000_000;

/// Slack when counting how many steps fit in a span, so that e.g. a span of
/// `3.0` with step `0.1` yields 31 samples and not 30.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// A strictly increasing sequence of sample times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// `count` evenly spaced times from `start` to `end` inclusive.
    ///
    /// Each time is computed as `start + i·(end - start)/(count - 1)` rather
    /// than by accumulation; the last sample is exactly `end`.
    ///
    /// # Errors
    ///
    /// - [`TrajectoryError::InsufficientSamples`] if `count < 2`
    /// - [`TrajectoryError::NonFinite`] for non-finite bounds
    /// - [`TrajectoryError::InvalidConfig`] unless `end > start`, or if
    ///   `count` exceeds [`MAX_GRID_SAMPLES`]
    ///
    /// # Example
    ///
    /// ```
    /// use sim_trajectory::TimeGrid;
    ///
    /// let grid = TimeGrid::linspace(0.0, 1.0, 5).unwrap();
    /// assert_eq!(grid.times(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    /// ```
    #[allow(clippy::cast_precision_loss)]
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(TrajectoryError::InsufficientSamples {
                required: 2,
                actual: count,
            });
        }
        if count > MAX_GRID_SAMPLES {
            return Err(TrajectoryError::invalid_config(format!(
                "{count} samples exceeds the limit of {MAX_GRID_SAMPLES}"
            )));
        }
        check_span(start, end)?;

        let span = end - start;
        let denom = (count - 1) as f64;
        let mut times: Vec<f64> = (0..count)
            .map(|i| start + i as f64 * span / denom)
            .collect();
        if let Some(last) = times.last_mut() {
            *last = end;
        }
        Ok(Self { times })
    }

    /// Times from `start` to `end` roughly every `step` seconds.
    ///
    /// The sample count is `⌊(end - start)/step⌋ + 1` and the samples are
    /// then spread evenly over the full span, so the spacing is at least
    /// `step` and the last sample is exactly `end`.
    ///
    /// # Errors
    ///
    /// As for [`linspace`](Self::linspace), plus
    /// [`TrajectoryError::InvalidConfig`] for a non-positive step or one so
    /// small that the grid would exceed [`MAX_GRID_SAMPLES`].
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn stepped(start: f64, end: f64, step: f64) -> Result<Self> {
        if !step.is_finite() {
            return Err(TrajectoryError::non_finite("time step"));
        }
        if step <= 0.0 {
            return Err(TrajectoryError::invalid_config(format!(
                "time step must be positive, got {step}"
            )));
        }
        check_span(start, end)?;

        let steps = ((end - start) / step + STEP_COUNT_SLACK).floor();
        let count = if steps.is_finite() && steps < MAX_GRID_SAMPLES as f64 {
            (steps as usize).checked_add(1)
        } else {
            None
        };
        let Some(count) = count else {
            return Err(TrajectoryError::invalid_config(format!(
                "time step {step} over [{start}, {end}] exceeds {MAX_GRID_SAMPLES} samples"
            )));
        };
        Self::linspace(start, end, count)
    }

    /// The default dense grid over `[start, end]`.
    ///
    /// # Errors
    ///
    /// See [`linspace`](Self::linspace).
    pub fn dense(start: f64, end: f64) -> Result<Self> {
        Self::linspace(start, end, DENSE_SAMPLES)
    }

    /// Wrap caller-supplied times after checking them.
    ///
    /// # Errors
    ///
    /// See [`validate_times`].
    pub fn from_times(times: Vec<f64>) -> Result<Self> {
        validate_times(&times)?;
        Ok(Self { times })
    }

    /// The sample times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First sample time.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.times.first().copied().unwrap_or_default()
    }

    /// Last sample time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.times.last().copied().unwrap_or_default()
    }

    /// Spacing of the first two samples: the integration step.
    #[must_use]
    pub fn step(&self) -> f64 {
        match self.times.as_slice() {
            [t0, t1, ..] => t1 - t0,
            _ => 0.0,
        }
    }

    /// Consume into the raw times.
    #[must_use]
    pub fn into_times(self) -> Vec<f64> {
        self.times
    }
}

impl AsRef<[f64]> for TimeGrid {
    fn as_ref(&self) -> &[f64] {
        &self.times
    }
}

/// Check that `times` has at least two finite, strictly increasing entries.
///
/// # Errors
///
/// - [`TrajectoryError::InsufficientSamples`] for fewer than two times
/// - [`TrajectoryError::NonFinite`] for a NaN or infinite time
/// - [`TrajectoryError::NonIncreasingTimes`] at the first index whose time
///   does not exceed its predecessor
pub fn validate_times(times: &[f64]) -> Result<()> {
    if times.len() < 2 {
        return Err(TrajectoryError::InsufficientSamples {
            required: 2,
            actual: times.len(),
        });
    }
    if let Some(index) = times.iter().position(|t| !t.is_finite()) {
        return Err(TrajectoryError::non_finite(format!("sample time {index}")));
    }
    if let Some(offset) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(TrajectoryError::NonIncreasingTimes { index: offset + 1 });
    }
    Ok(())
}

fn check_span(start: f64, end: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(TrajectoryError::non_finite("time range"));
    }
    if end <= start {
        return Err(TrajectoryError::invalid_config(format!(
            "time range end {end} must exceed start {start}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dense_grid_has_thousand_steps() {
        let grid = TimeGrid::dense(0.0, 10.0).unwrap();
        assert_eq!(grid.len(), DENSE_SAMPLES);
        assert_eq!(grid.start(), 0.0);
        assert_eq!(grid.end(), 10.0);
        assert_relative_eq!(grid.step(), 0.01, epsilon = 1e-15);
    }

    #[test]
    fn stepped_counts_whole_steps() {
        let grid = TimeGrid::stepped(0.0, 3.0, 0.1).unwrap();
        assert_eq!(grid.len(), 31);
        assert_eq!(grid.end(), 3.0);

        // 2.5 / 0.4 = 6.25 -> 7 samples spread over the full span.
        let grid = TimeGrid::stepped(0.0, 2.5, 0.4).unwrap();
        assert_eq!(grid.len(), 7);
        assert_relative_eq!(grid.step(), 2.5 / 6.0, epsilon = 1e-15);
        assert_eq!(grid.end(), 2.5);
    }

    #[test]
    fn stepped_rejects_bad_step() {
        assert!(TimeGrid::stepped(0.0, 1.0, 0.0).unwrap_err().is_config_error());
        assert!(TimeGrid::stepped(0.0, 1.0, f64::NAN).is_err());
        // Step longer than the span leaves a single sample.
        assert!(matches!(
            TimeGrid::stepped(0.0, 1.0, 2.0),
            Err(TrajectoryError::InsufficientSamples { actual: 1, .. })
        ));
    }

    #[test]
    fn tiny_steps_are_rejected_not_allocated() {
        let err = TimeGrid::stepped(0.0, 5.0, f64::MIN_POSITIVE).unwrap_err();
        assert!(err.is_config_error());
        assert!(TimeGrid::stepped(0.0, 5.0, 1e-10).unwrap_err().is_config_error());
        assert!(TimeGrid::linspace(0.0, 1.0, MAX_GRID_SAMPLES + 1)
            .unwrap_err()
            .is_config_error());
        assert_eq!(
            TimeGrid::stepped(0.0, 1.0, 1.0 / 999_999.0).unwrap().len(),
            MAX_GRID_SAMPLES
        );
    }

    #[test]
    fn linspace_rejects_degenerate_ranges() {
        assert!(matches!(
            TimeGrid::linspace(0.0, 1.0, 1),
            Err(TrajectoryError::InsufficientSamples { required: 2, actual: 1 })
        ));
        assert!(TimeGrid::linspace(1.0, 1.0, 10).unwrap_err().is_config_error());
        assert!(TimeGrid::linspace(0.0, f64::INFINITY, 10).is_err());
    }

    #[test]
    fn validate_times_reports_first_bad_index() {
        assert!(validate_times(&[0.0, 0.1, 0.2]).is_ok());
        assert_eq!(
            validate_times(&[0.0, 0.1, 0.1, 0.3]),
            Err(TrajectoryError::NonIncreasingTimes { index: 2 })
        );
        assert_eq!(
            validate_times(&[0.0]),
            Err(TrajectoryError::InsufficientSamples {
                required: 2,
                actual: 1
            })
        );
        assert!(matches!(
            validate_times(&[0.0, f64::NAN]),
            Err(TrajectoryError::NonFinite { .. })
        ));
    }

    #[test]
    fn from_times_keeps_values() {
        let grid = TimeGrid::from_times(vec![0.0, 0.5, 2.0]).unwrap();
        assert_eq!(grid.as_ref(), &[0.0, 0.5, 2.0]);
        assert_eq!(grid.step(), 0.5);
        assert_eq!(grid.into_times().len(), 3);
    }
}
