//! Boundary conditions on the four grid edges
//!
//! # Design Philosophy
//!
//! A boundary condition is a closed set of policies applied uniformly to all
//! four edges. There is no per-edge mixing.
//!
//! Two families exist:
//!
//! - **Clamping policies** (`Dirichlet`, `Neumann`): rewrite the outermost
//!   ring of cells before each update. The steppers never compute the ring
//!   themselves.
//! - **Indexing policies** (`Periodic`, `Absorbing`): leave the ring alone
//!   and change how the stepper treats it. `Periodic` wraps neighbour indices
//!   modulo the grid shape; `Absorbing` lets the stepper apply an outgoing
//!   edge rule.
//!
//! # Corner Cells
//!
//! Neumann edges are written in a fixed order: top row, bottom row, left
//! column, right column. Corners therefore carry the column rule (the last
//! writer), computed from the already updated row values. Re-applying the
//! condition reproduces the same values, so application is idempotent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimulationError};
use crate::physics::Field;

// =================================================================================================
// Boundary Condition
// =================================================================================================

/// Edge behaviour of the simulation domain
///
/// # Examples
///
/// ```rust
/// use pde_rs::physics::Field;
/// use pde_rs::solver::BoundaryCondition;
///
/// let mut field = Field::from_element((4, 4), 1.0).unwrap();
/// BoundaryCondition::dirichlet(0.0).unwrap().apply(&mut field);
///
/// assert_eq!(field.get(0, 2), 0.0);
/// assert_eq!(field.get(1, 2), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BoundaryCondition {
    /// Fixed value on every border cell
    Dirichlet(f64),

    /// Fixed outward gradient; `0.0` is an insulated (zero-flux) edge
    Neumann(f64),

    /// Opposite edges are neighbours
    Periodic,

    /// Outgoing-wave edge (first-order Mur rule for the wave equation,
    /// zero-gradient for the heat equation)
    Absorbing,
}

impl BoundaryCondition {
    // ====================================== Factory methods ======================================

    /// Fixed value `value` on every edge
    pub fn dirichlet(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(SimulationError::invalid(
                "dirichlet",
                format!("boundary value must be finite, got {value}"),
            ));
        }
        Ok(Self::Dirichlet(value))
    }

    /// Fixed gradient `flux` on every edge
    pub fn neumann(flux: f64) -> Result<Self> {
        if !flux.is_finite() {
            return Err(SimulationError::invalid(
                "neumann",
                format!("boundary flux must be finite, got {flux}"),
            ));
        }
        Ok(Self::Neumann(flux))
    }

    /// Zero-flux Neumann edge
    pub fn insulated() -> Self {
        Self::Neumann(0.0)
    }

    pub fn periodic() -> Self {
        Self::Periodic
    }

    pub fn absorbing() -> Self {
        Self::Absorbing
    }

    // ===================================== Query methods =========================================

    /// Whether neighbour lookup wraps around the grid
    pub fn wraps(&self) -> bool {
        matches!(self, Self::Periodic)
    }

    /// Short name for logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dirichlet(_) => "dirichlet",
            Self::Neumann(_) => "neumann",
            Self::Periodic => "periodic",
            Self::Absorbing => "absorbing",
        }
    }

    /// Validate the object contents
    ///
    /// Enum values can be built directly, bypassing the factories, so
    /// deserialised conditions go through this check.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Dirichlet(value) => Self::dirichlet(*value).map(|_| ()),
            Self::Neumann(flux) => Self::neumann(*flux).map(|_| ()),
            Self::Periodic | Self::Absorbing => Ok(()),
        }
    }

    // ======================================== Application ========================================

    /// Enforce the condition on the field's outermost ring
    ///
    /// - `Dirichlet(v)`: every border cell ← `v`
    /// - `Neumann(g)`: every border cell ← nearest interior cell `+ g · h`,
    ///   with `h` the spacing normal to the edge
    /// - `Periodic`, `Absorbing`: no-op, handled by the stepper
    ///
    /// Never changes the shape. `Neumann` handles each axis on its own: the
    /// top and bottom rows need at least 3 rows, the left and right columns
    /// at least 3 columns. An axis shorter than that keeps its edge values.
    pub fn apply(&self, field: &mut Field) {
        match *self {
            Self::Dirichlet(value) => apply_dirichlet(field, value),
            Self::Neumann(flux) => apply_neumann(field, flux),
            Self::Periodic | Self::Absorbing => {}
        }
    }
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        Self::Dirichlet(0.0)
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Dirichlet(value) => write!(f, "Dirichlet ({})", value),
            Self::Neumann(flux) => write!(f, "Neumann ({})", flux),
            Self::Periodic => write!(f, "Periodic"),
            Self::Absorbing => write!(f, "Absorbing"),
        }
    }
}

fn apply_dirichlet(field: &mut Field, value: f64) {
    let (nx, ny) = field.shape();
    let values = field.as_matrix_mut();

    values.row_mut(0).fill(value);
    values.row_mut(nx - 1).fill(value);
    values.column_mut(0).fill(value);
    values.column_mut(ny - 1).fill(value);
}

fn apply_neumann(field: &mut Field, flux: f64) {
    let (nx, ny) = field.shape();
    let spacing = field.spacing();
    let values = field.as_matrix_mut();

    // Rows first: top then bottom
    if nx >= 3 {
        for j in 0..ny {
            values[(0, j)] = values[(1, j)] + flux * spacing.dx;
            values[(nx - 1, j)] = values[(nx - 2, j)] + flux * spacing.dx;
        }
    }

    // Columns last, so corners follow the column rule
    if ny >= 3 {
        for i in 0..nx {
            values[(i, 0)] = values[(i, 1)] + flux * spacing.dy;
            values[(i, ny - 1)] = values[(i, ny - 2)] + flux * spacing.dy;
        }
    }
}

// =================================================================================================
// Neighbour lookup
// =================================================================================================

/// Indices of the four orthogonal neighbours of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Neighbours {
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

impl Neighbours {
    /// Neighbours with indices wrapped modulo the grid shape
    pub(crate) fn wrapped(i: usize, j: usize, (nx, ny): (usize, usize)) -> Self {
        Self {
            up: (i + nx - 1) % nx,
            down: (i + 1) % nx,
            left: (j + ny - 1) % ny,
            right: (j + 1) % ny,
        }
    }

    /// Neighbours of an interior cell (caller guarantees `0 < i < nx - 1`,
    /// `0 < j < ny - 1`)
    pub(crate) fn interior(i: usize, j: usize) -> Self {
        Self {
            up: i - 1,
            down: i + 1,
            left: j - 1,
            right: j + 1,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(shape: (usize, usize)) -> Field {
        Field::from_fn(shape, |i, j| (i * 10 + j) as f64).unwrap()
    }

    // ======================================== Factories ========================================

    #[test]
    fn test_non_finite_values_rejected() {
        assert!(matches!(
            BoundaryCondition::dirichlet(f64::NAN),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            BoundaryCondition::neumann(f64::INFINITY),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(BoundaryCondition::Dirichlet(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_default_is_cold_dirichlet() {
        assert_eq!(BoundaryCondition::default(), BoundaryCondition::Dirichlet(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BoundaryCondition::insulated()), "Neumann (0)");
        assert_eq!(format!("{}", BoundaryCondition::periodic()), "Periodic");
    }

    // ======================================== Dirichlet ========================================

    #[test]
    fn test_dirichlet_sets_ring_only() {
        let mut field = ramp((4, 5));
        BoundaryCondition::dirichlet(-1.0).unwrap().apply(&mut field);

        for i in 0..4 {
            for j in 0..5 {
                if field.is_border(i, j) {
                    assert_eq!(field.get(i, j), -1.0);
                } else {
                    assert_eq!(field.get(i, j), (i * 10 + j) as f64);
                }
            }
        }
    }

    #[test]
    fn test_dirichlet_on_tiny_grid() {
        let mut field = Field::from_element((1, 3), 5.0).unwrap();
        BoundaryCondition::dirichlet(2.0).unwrap().apply(&mut field);
        assert_eq!(field.sum(), 6.0);
    }

    // ========================================= Neumann =========================================

    #[test]
    fn test_insulated_copies_interior() {
        let mut field = ramp((4, 4));
        BoundaryCondition::insulated().apply(&mut field);

        // Top row copied from row 1, then columns from columns 1 and 2
        assert_eq!(field.get(0, 1), 11.0);
        assert_eq!(field.get(3, 2), 22.0);
        assert_eq!(field.get(2, 0), 21.0);
        assert_eq!(field.get(2, 3), 22.0);

        // Corner follows the column rule: (0, 0) <- (0, 1) = 11
        assert_eq!(field.get(0, 0), 11.0);
        assert_eq!(field.get(3, 3), 22.0);
    }

    #[test]
    fn test_neumann_flux_uses_spacing() {
        let spacing = crate::physics::Spacing::new(0.5, 2.0).unwrap();
        let mut field = Field::zeros((4, 4)).unwrap().with_spacing(spacing).unwrap();
        BoundaryCondition::neumann(1.0).unwrap().apply(&mut field);

        assert_eq!(field.get(0, 1), 0.5);
        assert_eq!(field.get(1, 0), 2.0);
        // Corner: column rule on top of row value 0.5
        assert_eq!(field.get(0, 0), 2.5);
    }

    #[test]
    fn test_neumann_on_two_row_grid_sets_columns_only() {
        let mut field = ramp((2, 5));
        BoundaryCondition::insulated().apply(&mut field);

        // No interior row, so rows keep their values; columns still copy inward
        assert_eq!(field.get(0, 2), 2.0);
        assert_eq!(field.get(1, 2), 12.0);
        assert_eq!(field.get(0, 0), 1.0);
        assert_eq!(field.get(1, 0), 11.0);
        assert_eq!(field.get(0, 4), 3.0);
        assert_eq!(field.get(1, 4), 13.0);
    }

    #[test]
    fn test_neumann_on_tiny_grid_is_noop() {
        let mut field = ramp((2, 2));
        let before = field.clone();
        BoundaryCondition::insulated().apply(&mut field);
        assert_eq!(field, before);
    }

    // ======================================= Idempotence =======================================

    #[test]
    fn test_application_is_idempotent() {
        for condition in [
            BoundaryCondition::Dirichlet(3.0),
            BoundaryCondition::Neumann(0.0),
            BoundaryCondition::Neumann(-0.7),
            BoundaryCondition::Periodic,
            BoundaryCondition::Absorbing,
        ] {
            let mut once = ramp((5, 6));
            condition.apply(&mut once);

            let mut twice = once.clone();
            condition.apply(&mut twice);

            assert_eq!(once, twice, "{} is not idempotent", condition);
            assert_eq!(twice.shape(), (5, 6));
        }
    }

    #[test]
    fn test_periodic_leaves_field_untouched() {
        let mut field = ramp((3, 3));
        let before = field.clone();
        BoundaryCondition::periodic().apply(&mut field);
        assert_eq!(field, before);
        assert!(BoundaryCondition::periodic().wraps());
        assert!(!BoundaryCondition::absorbing().wraps());
    }

    // ======================================== Neighbours ========================================

    #[test]
    fn test_wrapped_neighbours() {
        let corner = Neighbours::wrapped(0, 0, (5, 4));
        assert_eq!(corner, Neighbours { up: 4, down: 1, left: 3, right: 1 });

        let single_row = Neighbours::wrapped(0, 2, (1, 4));
        assert_eq!(single_row.up, 0);
        assert_eq!(single_row.down, 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let condition = BoundaryCondition::Neumann(0.25);
        let json = serde_json::to_string(&condition).unwrap();
        assert_eq!(json, r#"{"kind":"neumann","value":0.25}"#);

        let back: BoundaryCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, condition);

        let periodic: BoundaryCondition = serde_json::from_str(r#"{"kind":"periodic"}"#).unwrap();
        assert_eq!(periodic, BoundaryCondition::Periodic);
    }
}
