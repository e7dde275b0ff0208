//! Explicit heat-equation stepper (FTCS)
//!
//! # Mathematical Background
//!
//! The heat equation
//!
//! ```text
//! ∂u/∂t = α ∇²u
//! ```
//!
//! is discretised with forward differences in time and the five-point
//! Laplacian in space:
//!
//! ```text
//! u'[i,j] = u[i,j] + rx · (u[i-1,j] + u[i+1,j] - 2u[i,j])
//!                  + ry · (u[i,j-1] + u[i,j+1] - 2u[i,j])
//!
//! rx = α·dt/dx²,  ry = α·dt/dy²
//! ```
//!
//! # Characteristics
//!
//! - **Order**: first order in time, second order in space
//! - **Stability**: `rx + ry ≤ 1/2` (Fourier number `r = α·dt·(1/dx² + 1/dy²)`)
//! - **Memory**: one scratch field per step (double buffering)
//!
//! Under the bound every new value is a convex combination of old values, so
//! no new extrema can appear. This is what keeps the maximum of a
//! Dirichlet-zero problem non-increasing.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::physics::{Field, Spacing};
//! use pde_rs::solver::{BoundaryCondition, HeatStepper};
//!
//! let stepper = HeatStepper::new(0.25, 0.5, Spacing::default()).unwrap();
//!
//! let mut field = Field::zeros((5, 5)).unwrap();
//! field.set(2, 2, 1.0);
//!
//! let next = stepper.step_field(&field, &BoundaryCondition::periodic());
//! assert_eq!(next.get(1, 2), 0.125);
//! ```

use crate::error::{Result, SimulationError};
use crate::physics::{EquationParameters, EquationType, Field, Spacing};
use crate::solver::{BoundaryCondition, Neighbours, SolverState, Stepper, fill_cells};

// =================================================================================================
// Heat Stepper
// =================================================================================================

/// Forward-time central-space stepper for `∂u/∂t = α ∇²u`
///
/// # Boundary Handling
///
/// - `Periodic`: every cell is updated with wrapped neighbours
/// - `Dirichlet`, `Neumann`: interior cells are updated; the boundary is
///   applied before the update and re-asserted on the new field
/// - `Absorbing`: treated as a zero-gradient edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatStepper {
    alpha: f64,
    dt: f64,
    spacing: Spacing,
    rx: f64,
    ry: f64,
}

impl HeatStepper {
    /// Build a stepper, rejecting configurations beyond the stability bound
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for non-positive or non-finite values
    /// - `UnstableConfiguration` when `α·dt·(1/dx² + 1/dy²) > 0.5`
    pub fn new(alpha: f64, dt: f64, spacing: Spacing) -> Result<Self> {
        spacing.validate()?;
        EquationParameters::heat(alpha, dt)?.check_stability(spacing)?;

        Ok(Self {
            alpha,
            dt,
            spacing,
            rx: alpha * dt / (spacing.dx * spacing.dx),
            ry: alpha * dt / (spacing.dy * spacing.dy),
        })
    }

    /// Build from typed parameters; wave parameters are rejected
    pub fn from_parameters(params: &EquationParameters, spacing: Spacing) -> Result<Self> {
        match *params {
            EquationParameters::Heat { alpha, dt } => Self::new(alpha, dt, spacing),
            EquationParameters::Wave { .. } => Err(SimulationError::invalid(
                "equation",
                "heat stepper needs heat parameters",
            )),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// One step on a copy of `field`; the input is left unchanged
    pub fn step_field(&self, field: &Field, boundary: &BoundaryCondition) -> Field {
        let boundary = effective_boundary(boundary);
        let mut current = field.clone();
        boundary.apply(&mut current);

        let mut next = self.advance(&current, boundary.wraps());
        boundary.apply(&mut next);
        next
    }

    /// Compute the new field from `current` alone
    fn advance(&self, current: &Field, wraps: bool) -> Field {
        let shape = current.shape();
        let (nx, ny) = shape;
        let (rx, ry) = (self.rx, self.ry);
        let u = current.as_matrix();

        let mut next = current.clone();
        fill_cells(next.as_matrix_mut(), |i, j| {
            let centre = u[(i, j)];
            let n = if wraps {
                Neighbours::wrapped(i, j, shape)
            } else if i > 0 && j > 0 && i + 1 < nx && j + 1 < ny {
                Neighbours::interior(i, j)
            } else {
                return centre;
            };

            centre
                + rx * (u[(n.up, j)] + u[(n.down, j)] - 2.0 * centre)
                + ry * (u[(i, n.left)] + u[(i, n.right)] - 2.0 * centre)
        });
        next
    }
}

/// Absorbing edges have no outgoing-wave meaning for diffusion
fn effective_boundary(boundary: &BoundaryCondition) -> BoundaryCondition {
    match *boundary {
        BoundaryCondition::Absorbing => BoundaryCondition::insulated(),
        other => other,
    }
}

impl Stepper for HeatStepper {
    fn name(&self) -> &'static str {
        "FTCS Heat"
    }

    fn equation(&self) -> EquationType {
        EquationType::Heat
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn stability_number(&self) -> f64 {
        self.rx + self.ry
    }

    fn initial_state(&self, initial: Field, _velocity: Option<&Field>) -> Result<SolverState> {
        Ok(SolverState::new(initial.with_spacing(self.spacing)?))
    }

    fn step(&self, state: &mut SolverState, boundary: &BoundaryCondition) {
        let boundary = effective_boundary(boundary);
        boundary.apply(state.current_mut());

        let mut next = self.advance(state.current(), boundary.wraps());
        boundary.apply(&mut next);
        state.replace(next);
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::ThresholdOverride;
    use approx::assert_relative_eq;

    fn impulse(shape: (usize, usize), at: (usize, usize)) -> Field {
        let mut field = Field::zeros(shape).unwrap();
        field.set(at.0, at.1, 1.0);
        field
    }

    // ====== Construction Tests ======

    #[test]
    fn test_unstable_configuration_rejected() {
        let result = HeatStepper::new(1.0, 1.0, Spacing::default());
        match result {
            Err(SimulationError::UnstableConfiguration { equation, number, limit }) => {
                assert_eq!(equation, EquationType::Heat);
                assert_eq!(number, 2.0);
                assert_eq!(limit, 0.5);
            }
            other => panic!("expected UnstableConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_bound_is_inclusive() {
        let stepper = HeatStepper::new(0.25, 1.0, Spacing::default()).unwrap();
        assert_eq!(stepper.stability_number(), 0.5);
    }

    #[test]
    fn test_spacing_relaxes_bound() {
        assert!(HeatStepper::new(1.0, 1.0, Spacing::uniform(1.0).unwrap()).is_err());
        assert!(HeatStepper::new(1.0, 1.0, Spacing::uniform(2.0).unwrap()).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            HeatStepper::new(-1.0, 0.1, Spacing::default()),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(HeatStepper::new(0.1, f64::NAN, Spacing::default()).is_err());
    }

    #[test]
    fn test_from_wave_parameters_rejected() {
        let params = EquationParameters::wave(1.0, 0.1).unwrap();
        assert!(HeatStepper::from_parameters(&params, Spacing::default()).is_err());
    }

    // ====== Update Rule Tests ======

    #[test]
    fn test_periodic_impulse_redistribution() {
        let (alpha, dt) = (0.2, 0.5);
        let r = alpha * dt;
        let stepper = HeatStepper::new(alpha, dt, Spacing::default()).unwrap();

        let next = stepper.step_field(&impulse((5, 5), (2, 2)), &BoundaryCondition::periodic());

        assert_relative_eq!(next.get(2, 2), 1.0 - 4.0 * r, epsilon = 1e-12);
        for (i, j) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert_relative_eq!(next.get(i, j), r, epsilon = 1e-12);
        }
        for (i, j) in [(0, 0), (0, 4), (4, 0), (4, 4), (1, 1), (3, 3)] {
            assert_eq!(next.get(i, j), 0.0);
        }
        assert_relative_eq!(next.sum(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_periodic_wraps_across_edges() {
        let stepper = HeatStepper::new(0.1, 1.0, Spacing::default()).unwrap();
        let next = stepper.step_field(&impulse((5, 5), (0, 0)), &BoundaryCondition::periodic());

        assert_relative_eq!(next.get(4, 0), 0.1);
        assert_relative_eq!(next.get(0, 4), 0.1);
        assert_relative_eq!(next.get(1, 0), 0.1);
        assert_relative_eq!(next.get(0, 1), 0.1);
    }

    #[test]
    fn test_anisotropic_spacing() {
        let spacing = Spacing::new(0.5, 1.0).unwrap();
        let stepper = HeatStepper::new(0.05, 1.0, spacing).unwrap();

        let field = impulse((5, 5), (2, 2)).with_spacing(spacing).unwrap();
        let next = stepper.step_field(&field, &BoundaryCondition::periodic());

        // rx = 0.05 / 0.25 = 0.2 along rows, ry = 0.05 along columns
        assert_relative_eq!(next.get(1, 2), 0.2);
        assert_relative_eq!(next.get(2, 1), 0.05);
    }

    #[test]
    fn test_step_field_leaves_input_untouched() {
        let stepper = HeatStepper::new(0.2, 0.5, Spacing::default()).unwrap();
        let field = Field::from_element((4, 4), 3.0).unwrap();
        let before = field.clone();

        let _ = stepper.step_field(&field, &BoundaryCondition::default());
        assert_eq!(field, before);
    }

    #[test]
    fn test_dirichlet_maximum_non_increasing() {
        let stepper = HeatStepper::new(0.24, 1.0, Spacing::default()).unwrap();
        let mut state = stepper
            .initial_state(impulse((9, 9), (4, 4)), None)
            .unwrap();
        let boundary = BoundaryCondition::default();

        let mut previous_max = state.current().max();
        for _ in 0..50 {
            stepper.step(&mut state, &boundary);
            let max = state.current().max();
            assert!(max <= previous_max + 1e-15, "max grew from {} to {}", previous_max, max);
            previous_max = max;
        }
    }

    #[test]
    fn test_periodic_conserves_total_heat() {
        let stepper = HeatStepper::new(0.2, 1.0, Spacing::default()).unwrap();
        let initial = Field::from_fn((8, 6), |i, j| ((i * 7 + j * 3) % 5) as f64).unwrap();
        let total = initial.sum();

        let mut state = stepper.initial_state(initial, None).unwrap();
        for _ in 0..100 {
            stepper.step(&mut state, &BoundaryCondition::periodic());
        }
        assert_relative_eq!(state.current().sum(), total, max_relative = 1e-12);
    }

    #[test]
    fn test_insulated_uniform_field_is_steady() {
        let stepper = HeatStepper::new(0.2, 1.0, Spacing::default()).unwrap();
        let uniform = Field::from_element((6, 6), 2.5).unwrap();
        let next = stepper.step_field(&uniform, &BoundaryCondition::insulated());
        assert_eq!(next, uniform);
    }

    #[test]
    fn test_absorbing_matches_insulated() {
        let stepper = HeatStepper::new(0.2, 1.0, Spacing::default()).unwrap();
        let field = impulse((7, 7), (2, 3));
        assert_eq!(
            stepper.step_field(&field, &BoundaryCondition::absorbing()),
            stepper.step_field(&field, &BoundaryCondition::insulated())
        );
    }

    #[test]
    fn test_dirichlet_border_held() {
        let stepper = HeatStepper::new(0.2, 1.0, Spacing::default()).unwrap();
        let field = Field::from_element((5, 5), 1.0).unwrap();
        let next = stepper.step_field(&field, &BoundaryCondition::dirichlet(4.0).unwrap());

        assert_eq!(next.get(0, 3), 4.0);
        assert_eq!(next.get(4, 4), 4.0);
        // (1, 1) sees two hot neighbours
        assert_relative_eq!(next.get(1, 1), 1.0 + 0.2 * 6.0, epsilon = 1e-12);
        assert_relative_eq!(next.get(2, 2), 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let stepper = HeatStepper::new(0.2, 1.0, Spacing::default()).unwrap();
        let field = Field::from_fn((64, 48), |i, j| ((i * j) % 11) as f64).unwrap();

        let sequential = {
            let _override = ThresholdOverride::set(usize::MAX);
            stepper.step_field(&field, &BoundaryCondition::insulated())
        };
        let parallel = {
            let _override = ThresholdOverride::set(8);
            stepper.step_field(&field, &BoundaryCondition::insulated())
        };

        assert_eq!(sequential, parallel);
    }
}
