//! pde-rs: Explicit PDE Solvers on 2D Grids
//!
//! Finite-difference time stepping for the 2D heat and wave equations on
//! uniform rectangular grids, with a batch engine for exploring how results
//! depend on the physical parameters.
//!
//! # Architecture
//!
//! pde-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - [`physics`] describes the problem: fields, equation parameters,
//!      initial profiles
//!    - [`solver`] advances it: one stepper per equation, boundary rules,
//!      and a stateful facade
//!
//! 2. **Errors as Values**
//!    - Invalid input and unstable configurations are rejected before any
//!      step is taken
//!    - A diverging run stops with an error naming the step
//!
//! On top of these, [`exploration`] runs many independent solvers over
//! parameter sweeps and grids and reduces each run to a handful of metrics.
//!
//! # Quick Start
//!
//! ```rust
//! use pde_rs::prelude::*;
//!
//! # fn main() -> pde_rs::error::Result<()> {
//! // 1. Configure the problem
//! let mut solver = PdeSolver::new(EquationType::Wave, (40, 40))?
//!     .with_boundary(BoundaryCondition::absorbing());
//! solver.set_initial_conditions(
//!     InitialCondition::gaussian_pulse((20.0, 20.0), 2.0, 1.0).generate((40, 40))?,
//! )?;
//! solver.set_parameters(&[("c", 1.0), ("dt", 0.5)])?;
//!
//! // 2. Run
//! let field = solver.solve(200)?;
//!
//! // 3. Inspect
//! assert!(field.max_abs() < 0.5);
//! assert_eq!(solver.steps_taken(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type shared by the whole crate
//! - [`physics`]: Fields, equations and initial conditions
//! - [`solver`]: Time stepping and boundary conditions
//! - [`exploration`]: Parameter sweeps, grids and sensitivity

// Core modules
pub mod error;
pub mod physics;

pub mod exploration;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use pde_rs::prelude::*;
    //! ```
    pub use crate::error::{Result, SimulationError};
    pub use crate::exploration::{Metric, ParameterExplorer, SweepOptions};
    pub use crate::physics::{EquationParameters, EquationType, Field, InitialCondition, Spacing};
    pub use crate::solver::{BoundaryCondition, PdeSolver, SolverState, Stepper};
}
