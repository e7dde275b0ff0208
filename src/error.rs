//! Error kinds
//!
//! Every error is detected synchronously at the point of misuse
//! (construction, configuration or pre-step validation). None of them is
//! transient, so nothing in the crate retries.
//!
//! The only place where errors do not propagate is the exploration engine:
//! there, a failed sample is stored next to the successful ones
//! (see [`crate::exploration::SampleOutcome`]).

use thiserror::Error;

use crate::physics::EquationType;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors raised while configuring or running a simulation
///
/// The type is `Clone + PartialEq` so that per-sample outcomes of a
/// parameter sweep can be stored, compared and re-reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Grid shape with a zero dimension
    #[error("invalid grid shape {nx}x{ny}: both dimensions must be positive")]
    InvalidGridShape { nx: usize, ny: usize },

    /// A field whose shape differs from the solver's grid
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A parameter required by the equation type was not supplied
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    /// A parameter name the equation type does not know
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// A parameter with a non-finite, non-positive or otherwise invalid value
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Time step too large for the explicit scheme
    #[error(
        "unstable {equation} configuration: stability number {number:.4} exceeds limit {limit}"
    )]
    UnstableConfiguration {
        equation: EquationType,
        number: f64,
        limit: f64,
    },

    /// `solve` called before initial conditions and parameters were set
    #[error("solver not configured: {0}")]
    NotConfigured(String),

    /// NaN or infinity appeared in the field while stepping
    #[error("non-finite value detected at step {step}")]
    NumericalInstability { step: usize },

    /// Exploration sample skipped because the sweep was cancelled
    #[error("sample cancelled before it started")]
    Cancelled,
}

impl SimulationError {
    /// Shorthand for [`SimulationError::InvalidParameter`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let error = SimulationError::InvalidGridShape { nx: 0, ny: 4 };
        assert_eq!(
            error.to_string(),
            "invalid grid shape 0x4: both dimensions must be positive"
        );

        let error = SimulationError::MissingParameter("dt".into());
        assert_eq!(error.to_string(), "missing parameter 'dt'");

        let error = SimulationError::UnstableConfiguration {
            equation: EquationType::Heat,
            number: 2.0,
            limit: 0.5,
        };
        assert_eq!(
            error.to_string(),
            "unstable heat configuration: stability number 2.0000 exceeds limit 0.5"
        );
    }

    #[test]
    fn test_invalid_shorthand() {
        let error = SimulationError::invalid("alpha", "must be positive");
        assert_eq!(
            error,
            SimulationError::InvalidParameter {
                name: "alpha".into(),
                reason: "must be positive".into(),
            }
        );
    }
}
