//! Integration tests for the wave equation
//!
//! The leapfrog scheme has no numerical damping, so on a periodic grid its
//! discrete energy is an exact invariant. The plain sum of squares is not:
//! it trades with kinetic energy as the pulse moves. The remaining tests
//! cover symmetry, absorbing edges and divergence detection.

use approx::assert_relative_eq;
use pde_rs::error::SimulationError;
use pde_rs::physics::{EquationType, Field, InitialCondition, Spacing};
use pde_rs::solver::{BoundaryCondition, PdeSolver, Stepper, WaveStepper};

mod common;
use common::{gaussian_field, max_difference, wave_solver};

#[test]
fn test_leapfrog_energy_conserved_while_squared_amplitude_drifts() {
    // Σu² is exchanged with kinetic energy as the pulse spreads; the
    // leapfrog energy (kinetic plus staggered potential) is the invariant
    let stepper = WaveStepper::new(1.0, 0.02, Spacing::default()).unwrap();
    let boundary = BoundaryCondition::periodic();

    let initial = gaussian_field((32, 32), 4.0, 1.0);
    let squared_start = initial.energy();
    let mut state = stepper.initial_state(initial, None).unwrap();

    stepper.step(&mut state, &boundary);
    let reference = stepper.discrete_energy(&state);

    for _ in 1..100 {
        stepper.step(&mut state, &boundary);
    }

    assert_relative_eq!(stepper.discrete_energy(&state), reference, max_relative = 1e-9);
    assert!(state.current().energy() < 0.95 * squared_start);
}

#[test]
fn test_discrete_energy_conserved_with_velocity() {
    let shape = (40, 40);
    let stepper = WaveStepper::new(1.5, 0.4, Spacing::default()).unwrap();
    let boundary = BoundaryCondition::periodic();

    let displacement = gaussian_field(shape, 3.0, 1.0);
    let velocity = InitialCondition::gaussian_pulse((10.0, 25.0), 2.0, 0.5)
        .generate(shape)
        .unwrap();
    let mut state = stepper.initial_state(displacement, Some(&velocity)).unwrap();

    stepper.step(&mut state, &boundary);
    let reference = stepper.discrete_energy(&state);
    assert!(reference > 0.0);

    for _ in 0..300 {
        stepper.step(&mut state, &boundary);
    }
    assert_relative_eq!(stepper.discrete_energy(&state), reference, max_relative = 1e-9);
}

#[test]
fn test_symmetric_pulse_stays_symmetric() {
    let n = 31;
    let mut solver = wave_solver(
        gaussian_field((n, n), 2.5, 1.0),
        1.0,
        0.5,
        BoundaryCondition::Dirichlet(0.0),
    );
    let field = solver.solve(60).unwrap();

    for i in 0..n {
        for j in 0..n {
            let value = field.get(i, j);
            assert!((value - field.get(j, i)).abs() < 1e-12);
            assert!((value - field.get(n - 1 - i, j)).abs() < 1e-12);
        }
    }
}

#[test]
fn test_absorbing_edges_drain_the_domain() {
    let initial = gaussian_field((41, 41), 2.0, 1.0);

    let mut closed = wave_solver(initial.clone(), 1.0, 0.5, BoundaryCondition::insulated());
    let mut open = wave_solver(initial, 1.0, 0.5, BoundaryCondition::absorbing());

    let closed_energy = closed.solve(150).unwrap().energy();
    let open_energy = open.solve(150).unwrap().energy();
    assert!(open_energy < 0.5 * closed_energy);
}

#[test]
fn test_solves_compose() {
    let initial = gaussian_field((20, 24), 2.0, 1.0);

    let mut split = wave_solver(initial.clone(), 1.0, 0.3, BoundaryCondition::absorbing());
    split.solve(17).unwrap();
    let split_result = split.solve(23).unwrap();

    let mut whole = wave_solver(initial, 1.0, 0.3, BoundaryCondition::absorbing());
    let whole_result = whole.solve(40).unwrap();

    assert_eq!(max_difference(&split_result, &whole_result), 0.0);
}

#[test]
fn test_courant_limit_enforced() {
    let mut solver = PdeSolver::new(EquationType::Wave, (10, 10)).unwrap();
    solver
        .set_initial_conditions(Field::zeros((10, 10)).unwrap())
        .unwrap();

    // c·dt·sqrt(2) ≈ 1.06
    assert!(matches!(
        solver.set_parameters(&[("c", 1.0), ("dt", 0.75)]),
        Err(SimulationError::UnstableConfiguration { .. })
    ));
    assert!(solver.set_parameters(&[("c", 1.0), ("dt", 0.7)]).is_ok());
}

#[test]
fn test_overflow_reported_as_instability() {
    let mut initial = Field::zeros((9, 9)).unwrap();
    initial.set(4, 4, 1e308);
    let mut solver = wave_solver(initial, 1.0, 0.5, BoundaryCondition::Dirichlet(0.0));

    assert_eq!(
        solver.solve(10).unwrap_err(),
        SimulationError::NumericalInstability { step: 1 }
    );
    assert_eq!(solver.steps_taken(), 1);
}

#[test]
fn test_animation_frames() {
    let mut solver = wave_solver(
        gaussian_field((16, 16), 2.0, 1.0),
        1.0,
        0.25,
        BoundaryCondition::absorbing(),
    );

    let animation = solver
        .animate(5, 4, std::time::Duration::from_millis(50))
        .unwrap();

    assert_eq!(animation.frame_count(), 4);
    assert_eq!(animation.history.steps(), vec![5, 10, 15, 20]);
    assert_relative_eq!(animation.history.times()[3], 5.0);
    assert_eq!(animation.duration(), std::time::Duration::from_millis(200));
    assert_eq!(animation.history.metadata("equation"), Some("wave"));
    assert_eq!(solver.steps_taken(), 20);
}
