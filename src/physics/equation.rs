//! Equation types and their parameters
//!
//! The crate knows exactly two equations, fixed at solver construction:
//!
//! | Equation | PDE                   | Parameters        | Stability bound                    |
//! |----------|-----------------------|-------------------|------------------------------------|
//! | Heat     | `∂u/∂t = α ∇²u`       | `alpha`, `dt`     | `α·dt·(1/dx² + 1/dy²) ≤ 0.5`       |
//! | Wave     | `∂²u/∂t² = c² ∇²u`    | `c`, `dt`         | `c·dt·sqrt(1/dx² + 1/dy²) ≤ 1`     |
//!
//! Parameters arrive as named numeric values (the way a sweep or a config
//! file supplies them) and are turned into the typed [`EquationParameters`]
//! after validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::physics::Spacing;

// =================================================================================================
// Equation type
// =================================================================================================

/// Closed set of supported equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationType {
    /// Parabolic diffusion, first order in time
    Heat,

    /// Hyperbolic propagation, second order in time
    Wave,
}

impl EquationType {
    /// Names of the parameters this equation requires
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            EquationType::Heat => &["alpha", "dt"],
            EquationType::Wave => &["c", "dt"],
        }
    }

    /// Largest admissible stability number for the explicit scheme
    pub fn stability_limit(&self) -> f64 {
        match self {
            EquationType::Heat => 0.5,
            EquationType::Wave => 1.0,
        }
    }
}

impl fmt::Display for EquationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EquationType::Heat => write!(f, "heat"),
            EquationType::Wave => write!(f, "wave"),
        }
    }
}

impl FromStr for EquationType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heat" => Ok(EquationType::Heat),
            "wave" => Ok(EquationType::Wave),
            other => Err(SimulationError::invalid(
                "equation",
                format!("unknown equation type '{other}', expected 'heat' or 'wave'"),
            )),
        }
    }
}

// =================================================================================================
// Equation parameters
// =================================================================================================

/// Validated parameters of one equation
///
/// # Examples
///
/// ```rust
/// use pde_rs::physics::{EquationParameters, EquationType, Spacing};
///
/// let params = EquationParameters::from_named(
///     EquationType::Heat,
///     &[("alpha", 0.25), ("dt", 0.1)],
/// ).unwrap();
///
/// assert_eq!(params.dt(), 0.1);
/// assert!(params.check_stability(Spacing::default()).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "equation", rename_all = "lowercase")]
pub enum EquationParameters {
    /// Diffusivity `alpha` and time step `dt`
    Heat { alpha: f64, dt: f64 },

    /// Wave speed `c` and time step `dt`
    Wave { c: f64, dt: f64 },
}

impl EquationParameters {
    /// Typed heat parameters
    pub fn heat(alpha: f64, dt: f64) -> Result<Self> {
        let params = Self::Heat { alpha, dt };
        params.validate()?;
        Ok(params)
    }

    /// Typed wave parameters
    pub fn wave(c: f64, dt: f64) -> Result<Self> {
        let params = Self::Wave { c, dt };
        params.validate()?;
        Ok(params)
    }

    /// Parameters used when a caller does not supply any
    ///
    /// Heat: `alpha = 0.25, dt = 0.1`. Wave: `c = 1.0, dt = 0.05`.
    pub fn defaults(equation: EquationType) -> Self {
        match equation {
            EquationType::Heat => Self::Heat { alpha: 0.25, dt: 0.1 },
            EquationType::Wave => Self::Wave { c: 1.0, dt: 0.05 },
        }
    }

    /// Build from named values
    ///
    /// Unknown names fail with `UnknownParameter`, absent required names with
    /// `MissingParameter`, and non-positive or non-finite values with
    /// `InvalidParameter`. When a name appears twice the last value wins.
    pub fn from_named(equation: EquationType, values: &[(&str, f64)]) -> Result<Self> {
        let names = equation.parameter_names();

        if let Some((unknown, _)) = values.iter().find(|(name, _)| !names.contains(name)) {
            return Err(SimulationError::UnknownParameter(unknown.to_string()));
        }

        let lookup = |wanted: &str| -> Result<f64> {
            values
                .iter()
                .rev()
                .find(|(name, _)| *name == wanted)
                .map(|(_, value)| *value)
                .ok_or_else(|| SimulationError::MissingParameter(wanted.to_string()))
        };

        let params = match equation {
            EquationType::Heat => Self::Heat {
                alpha: lookup("alpha")?,
                dt: lookup("dt")?,
            },
            EquationType::Wave => Self::Wave {
                c: lookup("c")?,
                dt: lookup("dt")?,
            },
        };

        params.validate()?;
        Ok(params)
    }

    /// Copy with one parameter replaced
    pub fn with_override(&self, name: &str, value: f64) -> Result<Self> {
        let mut params = *self;
        match (&mut params, name) {
            (Self::Heat { alpha, .. }, "alpha") => *alpha = value,
            (Self::Wave { c, .. }, "c") => *c = value,
            (Self::Heat { dt, .. }, "dt") | (Self::Wave { dt, .. }, "dt") => *dt = value,
            _ => return Err(SimulationError::UnknownParameter(name.to_string())),
        }
        params.validate()?;
        Ok(params)
    }

    /// Equation these parameters belong to
    pub fn equation(&self) -> EquationType {
        match self {
            Self::Heat { .. } => EquationType::Heat,
            Self::Wave { .. } => EquationType::Wave,
        }
    }

    /// Time step
    pub fn dt(&self) -> f64 {
        match self {
            Self::Heat { dt, .. } | Self::Wave { dt, .. } => *dt,
        }
    }

    /// Value by name, `None` if the equation has no such parameter
    pub fn get(&self, name: &str) -> Option<f64> {
        match (self, name) {
            (Self::Heat { alpha, .. }, "alpha") => Some(*alpha),
            (Self::Wave { c, .. }, "c") => Some(*c),
            (_, "dt") => Some(self.dt()),
            _ => None,
        }
    }

    /// All parameters as `(name, value)` pairs
    pub fn to_named(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::Heat { alpha, dt } => vec![("alpha", *alpha), ("dt", *dt)],
            Self::Wave { c, dt } => vec![("c", *c), ("dt", *dt)],
        }
    }

    /// Check every value is positive and finite
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.to_named() {
            if !value.is_finite() {
                return Err(SimulationError::invalid(
                    name,
                    format!("must be finite, got {value}"),
                ));
            }
            if value <= 0.0 {
                return Err(SimulationError::invalid(
                    name,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        Ok(())
    }

    // ======================================== Stability ========================================

    /// Stability number of the explicit scheme on the given grid
    ///
    /// - Heat (Fourier number): `α·dt·(1/dx² + 1/dy²)`
    /// - Wave (Courant number): `c·dt·sqrt(1/dx² + 1/dy²)`
    pub fn stability_number(&self, spacing: Spacing) -> f64 {
        let inverse = spacing.inverse_square_sum();
        match self {
            Self::Heat { alpha, dt } => alpha * dt * inverse,
            Self::Wave { c, dt } => c * dt * inverse.sqrt(),
        }
    }

    /// Fail with `UnstableConfiguration` when the bound is violated
    pub fn check_stability(&self, spacing: Spacing) -> Result<()> {
        let equation = self.equation();
        let number = self.stability_number(spacing);
        let limit = equation.stability_limit();

        if number > limit {
            return Err(SimulationError::UnstableConfiguration {
                equation,
                number,
                limit,
            });
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
