//! Helper functions for integration tests

#![allow(dead_code)]

use pde_rs::physics::{EquationType, Field, InitialCondition};
use pde_rs::solver::{BoundaryCondition, PdeSolver};

/// Centred Gaussian pulse on a grid of `shape`
pub fn gaussian_field(shape: (usize, usize), sigma: f64, amplitude: f64) -> Field {
    let center = ((shape.0 / 2) as f64, (shape.1 / 2) as f64);
    InitialCondition::gaussian_pulse(center, sigma, amplitude)
        .generate(shape)
        .unwrap()
}

/// Ready heat solver on unit spacing
pub fn heat_solver(
    initial: Field,
    alpha: f64,
    dt: f64,
    boundary: BoundaryCondition,
) -> PdeSolver {
    let mut solver = PdeSolver::new(EquationType::Heat, initial.shape())
        .unwrap()
        .with_boundary(boundary);
    solver.set_initial_conditions(initial).unwrap();
    solver.set_parameters(&[("alpha", alpha), ("dt", dt)]).unwrap();
    solver
}

/// Ready wave solver on unit spacing, starting at rest
pub fn wave_solver(initial: Field, c: f64, dt: f64, boundary: BoundaryCondition) -> PdeSolver {
    let mut solver = PdeSolver::new(EquationType::Wave, initial.shape())
        .unwrap()
        .with_boundary(boundary);
    solver.set_initial_conditions(initial).unwrap();
    solver.set_parameters(&[("c", c), ("dt", dt)]).unwrap();
    solver
}

/// Largest absolute cell difference
pub fn max_difference(a: &Field, b: &Field) -> f64 {
    assert_eq!(a.shape(), b.shape(), "Dimension mismatch");
    (a.as_matrix() - b.as_matrix()).amax()
}

/// Assert that two fields agree cell by cell within `tolerance`
pub fn assert_fields_close(a: &Field, b: &Field, tolerance: f64, message: &str) {
    let diff = max_difference(a, b);
    assert!(
        diff <= tolerance,
        "{}: fields differ by {} (tolerance {})",
        message, diff, tolerance
    );
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
