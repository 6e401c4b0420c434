//! Error types for trajectory computation.

use thiserror::Error;

/// Errors that can occur when building time grids, integrating
/// trajectories, or corrupting them with observation noise.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    /// Too few sample times to define a step.
    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples {
        /// Minimum number of samples.
        required: usize,
        /// Number supplied.
        actual: usize,
    },

    /// Sample times must be strictly increasing.
    #[error("sample times not strictly increasing at index {index}")]
    NonIncreasingTimes {
        /// First index whose time does not exceed its predecessor.
        index: usize,
    },

    /// Non-finite value in an input.
    #[error("non-finite value in {context}")]
    NonFinite {
        /// Where the value was found.
        context: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A probability outside `[0, 1]`.
    #[error("invalid probability: {0} (must be in [0, 1])")]
    InvalidProbability(f64),
}

impl TrajectoryError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFinite {
            context: context.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::InvalidProbability(_)
        )
    }
}

/// Result type for trajectory operations.
pub type Result<T> = std::result::Result<T, TrajectoryError>;
