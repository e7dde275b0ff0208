//! Initial condition profiles
//!
//! Defines the starting field u(x, y, t=0).
//!
//! Each profile is a pure function of the cell index `(i, j)`; calling
//! [`InitialCondition::generate`] samples it on a grid and returns a
//! [`Field`]. Coordinates are expressed in cell units, not physical units,
//! so a profile describes the same picture on any grid spacing.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::physics::InitialCondition;
//!
//! // Gaussian hot spot in the middle of a 50×50 grid
//! let profile = InitialCondition::gaussian_pulse((25.0, 25.0), 5.0, 100.0);
//! let field = profile.generate((50, 50)).unwrap();
//!
//! assert!((field.get(25, 25) - 100.0).abs() < 1e-10);
//! assert!(field.get(0, 0) < 1e-3);
//! ```

use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::{Result, SimulationError};
use crate::physics::Field;

/// Direction of a plane sine wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveDirection {
    /// Varies along the column index `j`
    Horizontal,

    /// Varies along the row index `i`
    Vertical,

    /// Varies along `i + j`
    Diagonal,
}

/// Point source `(i, j, amplitude)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSource {
    pub i: usize,
    pub j: usize,
    pub amplitude: f64,
}

impl PointSource {
    pub fn new(i: usize, j: usize, amplitude: f64) -> Self {
        Self { i, j, amplitude }
    }
}

/// Initial field profile
///
/// # Types
///
/// - **Zeros**: Quiescent field
/// - **Uniform**: Constant value everywhere
/// - **GaussianPulse**: Smooth bell-shaped bump
/// - **CircularWave**: Gaussian ring around a centre
/// - **PointSources**: Isolated impulses on a zero background
/// - **SineWave**: Plane sine wave
/// - **Custom**: User-defined function of `(i, j)`
pub enum InitialCondition {
    /// All cells at zero
    Zeros,

    /// All cells at `value`
    Uniform(f64),

    /// Gaussian bump
    ///
    /// # Formula
    ///
    /// ```text
    /// u(i, j) = A · exp(-((i - ci)² + (j - cj)²) / (2σ²))
    /// ```
    GaussianPulse {
        center: (f64, f64),
        sigma: f64,
        amplitude: f64,
    },

    /// Gaussian ring of radius `radius`
    ///
    /// # Formula
    ///
    /// ```text
    /// r = sqrt((i - ci)² + (j - cj)²)
    /// w = max(radius / 4, 1)
    /// u(i, j) = A · exp(-(r - radius)² / (2w²))
    /// ```
    CircularWave {
        center: (f64, f64),
        radius: f64,
        amplitude: f64,
    },

    /// Impulses at given cells, zero elsewhere
    ///
    /// Later sources overwrite earlier ones on the same cell.
    PointSources(Vec<PointSource>),

    /// `A · sin(2π · s / λ)` with `s` chosen by `direction`
    SineWave {
        wavelength: f64,
        amplitude: f64,
        direction: WaveDirection,
    },

    /// Custom profile from user function
    Custom(Arc<dyn Fn(usize, usize) -> f64 + Send + Sync>),
}

// ==================== Manual Clone Implementation ====================

impl Clone for InitialCondition {
    fn clone(&self) -> Self {
        match self {
            Self::Zeros => Self::Zeros,
            Self::Uniform(value) => Self::Uniform(*value),
            Self::GaussianPulse { center, sigma, amplitude } => Self::GaussianPulse {
                center: *center,
                sigma: *sigma,
                amplitude: *amplitude,
            },
            Self::CircularWave { center, radius, amplitude } => Self::CircularWave {
                center: *center,
                radius: *radius,
                amplitude: *amplitude,
            },
            Self::PointSources(sources) => Self::PointSources(sources.clone()),
            Self::SineWave { wavelength, amplitude, direction } => Self::SineWave {
                wavelength: *wavelength,
                amplitude: *amplitude,
                direction: *direction,
            },
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

// ==================== Manual Debug Implementation ====================

impl std::fmt::Debug for InitialCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zeros => f.debug_struct("Zeros").finish(),
            Self::Uniform(value) => f.debug_tuple("Uniform").field(value).finish(),
            Self::GaussianPulse { center, sigma, amplitude } => f
                .debug_struct("GaussianPulse")
                .field("center", center)
                .field("sigma", sigma)
                .field("amplitude", amplitude)
                .finish(),
            Self::CircularWave { center, radius, amplitude } => f
                .debug_struct("CircularWave")
                .field("center", center)
                .field("radius", radius)
                .field("amplitude", amplitude)
                .finish(),
            Self::PointSources(sources) => f.debug_tuple("PointSources").field(sources).finish(),
            Self::SineWave { wavelength, amplitude, direction } => f
                .debug_struct("SineWave")
                .field("wavelength", wavelength)
                .field("amplitude", amplitude)
                .field("direction", direction)
                .finish(),
            Self::Custom(_) => f
                .debug_struct("Custom")
                .field("function", &"<user-defined>")
                .finish(),
        }
    }
}

// ==================== Implementation ====================

impl InitialCondition {
    pub fn zeros() -> Self {
        Self::Zeros
    }

    pub fn uniform(value: f64) -> Self {
        Self::Uniform(value)
    }

    /// Gaussian pulse centred at `(ci, cj)` (cell units)
    pub fn gaussian_pulse(center: (f64, f64), sigma: f64, amplitude: f64) -> Self {
        Self::GaussianPulse { center, sigma, amplitude }
    }

    /// Gaussian ring centred at `(ci, cj)`
    pub fn circular_wave(center: (f64, f64), radius: f64, amplitude: f64) -> Self {
        Self::CircularWave { center, radius, amplitude }
    }

    /// Impulses at `(i, j, amplitude)` triples
    pub fn multiple_sources(sources: &[(usize, usize, f64)]) -> Self {
        Self::PointSources(
            sources
                .iter()
                .map(|&(i, j, amplitude)| PointSource::new(i, j, amplitude))
                .collect(),
        )
    }

    /// Plane sine wave
    pub fn sine_wave(wavelength: f64, amplitude: f64, direction: WaveDirection) -> Self {
        Self::SineWave { wavelength, amplitude, direction }
    }

    /// Custom profile
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize, usize) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Check the profile parameters
    pub fn validate(&self) -> Result<()> {
        let check_finite = |name: &str, value: f64| -> Result<()> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(SimulationError::invalid(name, format!("must be finite, got {value}")))
            }
        };

        match self {
            Self::Zeros | Self::Custom(_) => Ok(()),
            Self::Uniform(value) => check_finite("value", *value),
            Self::GaussianPulse { center, sigma, amplitude } => {
                check_finite("center", center.0)?;
                check_finite("center", center.1)?;
                check_finite("amplitude", *amplitude)?;
                if !sigma.is_finite() || *sigma <= 0.0 {
                    return Err(SimulationError::invalid("sigma", "must be positive and finite"));
                }
                Ok(())
            }
            Self::CircularWave { center, radius, amplitude } => {
                check_finite("center", center.0)?;
                check_finite("center", center.1)?;
                check_finite("amplitude", *amplitude)?;
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(SimulationError::invalid("radius", "must be positive and finite"));
                }
                Ok(())
            }
            Self::PointSources(sources) => {
                for source in sources {
                    check_finite("amplitude", source.amplitude)?;
                }
                Ok(())
            }
            Self::SineWave { wavelength, amplitude, .. } => {
                check_finite("amplitude", *amplitude)?;
                if !wavelength.is_finite() || *wavelength <= 0.0 {
                    return Err(SimulationError::invalid("wavelength", "must be positive and finite"));
                }
                Ok(())
            }
        }
    }

    /// Evaluate the profile at cell `(i, j)`
    pub fn evaluate(&self, i: usize, j: usize) -> f64 {
        let (x, y) = (i as f64, j as f64);

        match self {
            Self::Zeros => 0.0,

            Self::Uniform(value) => *value,

            Self::GaussianPulse { center, sigma, amplitude } => {
                let r2 = (x - center.0).powi(2) + (y - center.1).powi(2);
                amplitude * (-r2 / (2.0 * sigma * sigma)).exp()
            }

            Self::CircularWave { center, radius, amplitude } => {
                let r = ((x - center.0).powi(2) + (y - center.1).powi(2)).sqrt();
                let width = (radius / 4.0).max(1.0);
                amplitude * (-(r - radius).powi(2) / (2.0 * width * width)).exp()
            }

            Self::PointSources(sources) => sources
                .iter()
                .rev()
                .find(|source| source.i == i && source.j == j)
                .map_or(0.0, |source| source.amplitude),

            Self::SineWave { wavelength, amplitude, direction } => {
                let s = match direction {
                    WaveDirection::Horizontal => y,
                    WaveDirection::Vertical => x,
                    WaveDirection::Diagonal => x + y,
                };
                amplitude * (2.0 * PI * s / wavelength).sin()
            }

            Self::Custom(f) => f(i, j),
        }
    }

    /// Sample the profile on a grid
    ///
    /// Fails with `InvalidGridShape` for a zero dimension and with
    /// `InvalidParameter` for invalid profile parameters or a point source
    /// outside the grid.
    pub fn generate(&self, shape: (usize, usize)) -> Result<Field> {
        self.validate()?;

        if let Self::PointSources(sources) = self
            && let Some(outside) = sources.iter().find(|s| s.i >= shape.0 || s.j >= shape.1)
        {
            return Err(SimulationError::invalid(
                "sources",
                format!(
                    "source at ({}, {}) lies outside the {}x{} grid",
                    outside.i, outside.j, shape.0, shape.1
                ),
            ));
        }

        Field::from_fn(shape, |i, j| self.evaluate(i, j))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
