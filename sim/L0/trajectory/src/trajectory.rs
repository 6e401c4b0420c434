//! Integrated ball trajectories.
//!
//! Samples are keyed by index with their time stored alongside. Time
//! lookups resolve to the nearest sample within half a step, so a sparse
//! display grid computed independently of the dense integration grid still
//! finds its samples.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::contact::{ContactPhase, ImpactKind};
use crate::state::KinematicState;

/// One recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectorySample {
    /// Sample time in seconds.
    pub time: f64,
    /// State at `time`.
    pub state: KinematicState,
    /// Contact phase at `time`.
    pub phase: ContactPhase,
}

impl TrajectorySample {
    /// Ball center at this sample.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }
}

/// A ground impact between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BounceEvent {
    /// Index of the first sample after the impact.
    pub index: usize,
    /// Time of that sample.
    pub time: f64,
    /// Vertical speed before the impact.
    pub impact_speed: f64,
    /// Vertical speed after the impact.
    pub rebound_speed: f64,
    /// How the impact was resolved.
    pub kind: ImpactKind,
}

/// A trajectory sampled at strictly increasing times.
///
/// Always holds at least two samples when produced by the integrator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    bounces: Vec<BounceEvent>,
    rest_index: Option<usize>,
}

impl Trajectory {
    pub(crate) fn from_parts(
        samples: Vec<TrajectorySample>,
        bounces: Vec<BounceEvent>,
        rest_index: Option<usize>,
    ) -> Self {
        Self {
            samples,
            bounces,
            rest_index,
        }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    /// Sample times.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Ball centers in time order.
    #[must_use]
    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.samples.iter().map(TrajectorySample::position).collect()
    }

    /// Sample at `index`.
    #[must_use]
    pub fn at_index(&self, index: usize) -> Option<&TrajectorySample> {
        self.samples.get(index)
    }

    /// Index of the sample nearest to `time`, if it lies within half a
    /// step of it.
    #[must_use]
    pub fn nearest_index(&self, time: f64) -> Option<usize> {
        nearest_index_by(&self.samples, time, |s| s.time)
    }

    /// Sample nearest to `time`; see [`nearest_index`](Self::nearest_index).
    #[must_use]
    pub fn at_time(&self, time: f64) -> Option<&TrajectorySample> {
        self.nearest_index(time).and_then(|i| self.samples.get(i))
    }

    /// Position of the sample nearest to `time`.
    #[must_use]
    pub fn position_at_time(&self, time: f64) -> Option<Vector3<f64>> {
        self.at_time(time).map(TrajectorySample::position)
    }

    /// Position linearly interpolated between the samples bracketing
    /// `time`. `None` outside the sampled range.
    #[must_use]
    pub fn interpolate_position(&self, time: f64) -> Option<Vector3<f64>> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if !time.is_finite() || time < first.time || time > last.time {
            return None;
        }
        let upper = self.samples.partition_point(|s| s.time < time);
        if upper == 0 {
            return Some(first.position());
        }
        let (a, b) = (&self.samples[upper - 1], &self.samples[upper]);
        let u = (time - a.time) / (b.time - a.time);
        Some(a.position().lerp(&b.position(), u))
    }

    /// Index of the first sample at rest, if the ball came to rest.
    #[must_use]
    pub fn rest_index(&self) -> Option<usize> {
        self.rest_index
    }

    /// Time the ball came to rest.
    #[must_use]
    pub fn rest_time(&self) -> Option<f64> {
        self.rest_index
            .and_then(|i| self.samples.get(i))
            .map(|s| s.time)
    }

    /// Ground impacts in time order.
    #[must_use]
    pub fn bounces(&self) -> &[BounceEvent] {
        &self.bounces
    }

    /// Positions dropped onto the ground plane (`z = 0`), as drawn in
    /// bird's-eye views.
    #[must_use]
    pub fn ground_shadow(&self) -> Vec<Vector3<f64>> {
        self.samples
            .iter()
            .map(|s| Vector3::new(s.state.position.x, s.state.position.y, 0.0))
            .collect()
    }

    /// Highest ball-center height reached.
    #[must_use]
    pub fn max_height(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.state.position.z)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Horizontal distance from the first to the last sample.
    #[must_use]
    pub fn horizontal_range(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(a), Some(b)) => (b.state.position - a.state.position).xy().norm(),
            _ => 0.0,
        }
    }

    /// State at the last sample.
    #[must_use]
    pub fn final_state(&self) -> Option<&KinematicState> {
        self.samples.last().map(|s| &s.state)
    }

    /// Positions at each of `times`, `None` where no sample is close
    /// enough.
    #[must_use]
    pub fn resample(&self, times: &[f64]) -> Vec<Option<Vector3<f64>>> {
        times.iter().map(|&t| self.position_at_time(t)).collect()
    }
}

/// Index of the time in sorted `times` nearest to `time`, accepted when it
/// is within half the spacing on that side of the sample.
pub(crate) fn nearest_sample_index(times: &[f64], time: f64) -> Option<usize> {
    nearest_index_by(times, time, |t| *t)
}

/// [`nearest_sample_index`] over any time-sorted slice, reading each
/// item's time through `time_of`.
pub(crate) fn nearest_index_by<T>(
    items: &[T],
    time: f64,
    time_of: impl Fn(&T) -> f64,
) -> Option<usize> {
    if items.is_empty() || !time.is_finite() {
        return None;
    }
    let at = |i: usize| time_of(&items[i]);
    let upper = items.partition_point(|item| time_of(item) < time);
    let index = match upper.checked_sub(1) {
        Some(lo) if upper < items.len() => {
            if time - at(lo) <= at(upper) - time {
                lo
            } else {
                upper
            }
        }
        Some(lo) => lo,
        None => 0,
    };

    let t = at(index);
    let spacing = if time >= t {
        (index + 1 < items.len()).then(|| at(index + 1) - t)
    } else {
        index.checked_sub(1).map(|prev| t - at(prev))
    };
    // Past either end the spacing of the adjacent interval applies.
    let spacing = spacing.or_else(|| {
        if index == 0 {
            (items.len() > 1).then(|| at(1) - t)
        } else {
            Some(t - at(index - 1))
        }
    })?;

    ((time - t).abs() <= 0.5 * spacing).then_some(index)
}
