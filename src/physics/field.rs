//! Scalar field on a uniform 2D grid
//!
//! A [`Field`] is the simulated quantity (temperature, displacement, ...)
//! sampled on a fixed `nx × ny` grid, together with the grid spacing.
//!
//! # Index Convention
//!
//! - `i` is the row index, `0 ≤ i < nx`, spaced by `dx`
//! - `j` is the column index, `0 ≤ j < ny`, spaced by `dy`
//!
//! Values are stored in a column-major [`DMatrix`], so a column `j` is a
//! contiguous slice of `nx` values.
//!
//! # Ownership
//!
//! A field is owned by exactly one solver. Cloning produces an independent
//! copy; no two solvers ever alias the same storage.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimulationError};

// =================================================================================================
// Grid spacing
// =================================================================================================

/// Uniform grid spacing along both axes
///
/// Both values default to `1.0` (normalised grid).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Spacing between rows
    pub dx: f64,

    /// Spacing between columns
    pub dy: f64,
}

impl Spacing {
    /// Create a validated spacing
    pub fn new(dx: f64, dy: f64) -> Result<Self> {
        let spacing = Self { dx, dy };
        spacing.validate()?;
        Ok(spacing)
    }

    /// Same spacing on both axes
    pub fn uniform(h: f64) -> Result<Self> {
        Self::new(h, h)
    }

    /// `1/dx² + 1/dy²`, the factor shared by both stability bounds
    pub fn inverse_square_sum(&self) -> f64 {
        1.0 / (self.dx * self.dx) + 1.0 / (self.dy * self.dy)
    }

    /// Check both values are positive and finite
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("dx", self.dx), ("dy", self.dy)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::invalid(
                    name,
                    format!("grid spacing must be positive and finite, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self { dx: 1.0, dy: 1.0 }
    }
}

// =================================================================================================
// Field
// =================================================================================================

/// 2D scalar field with spacing metadata
///
/// # Examples
///
/// ```rust
/// use pde_rs::physics::Field;
///
/// let mut field = Field::zeros((5, 5)).unwrap();
/// field.set(2, 2, 1.0);
///
/// assert_eq!(field.shape(), (5, 5));
/// assert_eq!(field.max(), 1.0);
/// assert_eq!(field.energy(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    values: DMatrix<f64>,
    spacing: Spacing,
}

impl Field {
    // ======================================= constructors =======================================

    /// Field of zeros
    pub fn zeros(shape: (usize, usize)) -> Result<Self> {
        Self::from_element(shape, 0.0)
    }

    /// Uniform field
    pub fn from_element(shape: (usize, usize), value: f64) -> Result<Self> {
        check_shape(shape)?;
        Ok(Self {
            values: DMatrix::from_element(shape.0, shape.1, value),
            spacing: Spacing::default(),
        })
    }

    /// Wrap an existing matrix (rows = `nx`, columns = `ny`)
    pub fn from_matrix(values: DMatrix<f64>) -> Result<Self> {
        check_shape((values.nrows(), values.ncols()))?;
        Ok(Self {
            values,
            spacing: Spacing::default(),
        })
    }

    /// Build from values listed row by row
    ///
    /// Fails with `ShapeMismatch` when `data.len() != nx * ny`.
    pub fn from_row_slice(shape: (usize, usize), data: &[f64]) -> Result<Self> {
        check_shape(shape)?;
        if data.len() != shape.0 * shape.1 {
            return Err(SimulationError::ShapeMismatch {
                expected: shape,
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            values: DMatrix::from_row_slice(shape.0, shape.1, data),
            spacing: Spacing::default(),
        })
    }

    /// Evaluate `f(i, j)` on every cell
    pub fn from_fn<F>(shape: (usize, usize), f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        check_shape(shape)?;
        Ok(Self {
            values: DMatrix::from_fn(shape.0, shape.1, f),
            spacing: Spacing::default(),
        })
    }

    /// Replace the spacing metadata
    pub fn with_spacing(mut self, spacing: Spacing) -> Result<Self> {
        spacing.validate()?;
        self.spacing = spacing;
        Ok(self)
    }

    // ========================================== Queries ==========================================

    /// `(nx, ny)`
    pub fn shape(&self) -> (usize, usize) {
        (self.values.nrows(), self.values.ncols())
    }

    /// Number of rows
    pub fn nx(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns
    pub fn ny(&self) -> usize {
        self.values.ncols()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed field; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Value at `(i, j)`
    ///
    /// # Panics
    ///
    /// Panics when the index is outside the grid.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Value at `(i, j)`, `None` outside the grid
    pub fn try_get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied()
    }

    /// Set the value at `(i, j)`
    ///
    /// # Panics
    ///
    /// Panics when the index is outside the grid.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[(i, j)] = value;
    }

    /// Underlying matrix
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub(crate) fn as_matrix_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.values
    }

    /// Consume the field and return its matrix
    pub fn into_matrix(self) -> DMatrix<f64> {
        self.values
    }

    /// True when `(i, j)` lies on the outermost ring
    pub fn is_border(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i + 1 == self.nx() || j + 1 == self.ny()
    }

    // ========================================== Metrics ==========================================

    /// Largest value
    pub fn max(&self) -> f64 {
        self.values.max()
    }

    /// Smallest value
    pub fn min(&self) -> f64 {
        self.values.min()
    }

    /// Largest absolute value
    pub fn max_abs(&self) -> f64 {
        self.values.amax()
    }

    /// Sum of all values (total heat for diffusion problems)
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    /// Sum of squared values
    pub fn energy(&self) -> f64 {
        self.values.norm_squared()
    }

    /// Sum of squared values over the outermost ring
    pub fn boundary_energy(&self) -> f64 {
        let (nx, ny) = self.shape();
        let mut total = 0.0;
        for i in 0..nx {
            for j in 0..ny {
                if self.is_border(i, j) {
                    total += self.values[(i, j)].powi(2);
                }
            }
        }
        total
    }

    /// Value at the grid centre `(nx / 2, ny / 2)`
    pub fn center_value(&self) -> f64 {
        self.values[(self.nx() / 2, self.ny() / 2)]
    }

    /// True when no value is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|x| x.is_finite())
    }

    // ====================================== Apply functions ======================================

    /// Apply `f` to every value in place
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        self.values.iter_mut().for_each(|x| *x = f(*x));
    }

    /// `self + factor * other`, used to seed the wave stepper from a velocity
    pub(crate) fn axpy(&self, factor: f64, other: &Field) -> Result<Field> {
        if self.shape() != other.shape() {
            return Err(SimulationError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(Field {
            values: &self.values + &other.values * factor,
            spacing: self.spacing,
        })
    }
}

fn check_shape((nx, ny): (usize, usize)) -> Result<()> {
    if nx == 0 || ny == 0 {
        return Err(SimulationError::InvalidGridShape { nx, ny });
    }
    Ok(())
}

// ======================== Display ============================

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field [{} * {}] (dx = {}, dy = {})",
            self.nx(),
            self.ny(),
            self.spacing.dx,
            self.spacing.dy
        )
    }
}

// ==================== Tests ====================
