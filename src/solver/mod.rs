//! Time-stepping engine
//!
//! This module turns a configured problem into a sequence of fields. It
//! separates three concerns:
//!
//! 1. **Boundary** (`BoundaryCondition`) - WHAT happens at the edges
//!    - Dirichlet, Neumann, Periodic or Absorbing
//!    - Uniform on all four edges
//!
//! 2. **Steppers** (`Stepper` trait) - HOW one time step is computed
//!    - `HeatStepper`: forward-time central-space (FTCS) diffusion
//!    - `WaveStepper`: leapfrog propagation with a two-slot rolling buffer
//!    - Stateless with respect to the field: the state is passed in
//!
//! 3. **Facade** (`PdeSolver`) - WHEN steps run
//!    - Owns the configuration and the rolling state
//!    - Runs the step loop and records the history
//!
//! # Module Organization
//!
//! - **`boundary`**: `BoundaryCondition` and neighbour lookup
//! - **`traits`**: `Stepper` trait and `SolverState` rolling buffer
//! - **`methods`**: `HeatStepper`, `WaveStepper`, `EquationStepper` dispatch
//! - **`history`**: `History`, `Snapshot`, `Animation`
//! - **`facade`**: `PdeSolver`
//!
//! # Quick Start Example
//!
//! ```rust
//! use pde_rs::physics::{EquationType, InitialCondition};
//! use pde_rs::solver::{BoundaryCondition, PdeSolver};
//!
//! let mut solver = PdeSolver::new(EquationType::Heat, (32, 32)).unwrap()
//!     .with_boundary(BoundaryCondition::insulated());
//!
//! let u0 = InitialCondition::gaussian_pulse((16.0, 16.0), 3.0, 1.0)
//!     .generate((32, 32))
//!     .unwrap();
//!
//! solver.set_initial_conditions(u0).unwrap();
//! solver.set_parameters(&[("alpha", 0.2), ("dt", 0.5)]).unwrap();
//!
//! let field = solver.solve(50).unwrap();
//! assert!(field.max() < 1.0);
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐   ┌────────────────────┐
//! │ Initial field   │   │ Named parameters   │
//! └────────┬────────┘   └─────────┬──────────┘
//!          │                      │ stability pre-check
//!          └──────────┬───────────┘
//!                     │
//!            ┌────────▼────────┐
//!            │ PdeSolver       │ ← Unconfigured / Ready
//!            └────────┬────────┘
//!                     │ solve(steps)
//!        ┌────────────▼─────────────┐
//!        │ apply boundary           │
//!        │ compute next field       │ ← EquationStepper
//!        │ shift rolling state      │
//!        │ validate / record frame  │
//!        └────────────┬─────────────┘
//!                     │
//!            ┌────────▼────────┐
//!            │ Field + History │
//!            └─────────────────┘
//! ```
//!
//! # Stability
//!
//! Both schemes are explicit and conditionally stable. The stability bound
//! is checked when parameters are set, so an unstable configuration is
//! rejected before any field is touched. A non-finite value appearing later
//! (for example from a user field holding huge values) stops `solve` with
//! `NumericalInstability`.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod boundary;
mod facade;
mod history;
mod methods;
mod traits;

// =================================================================================================
// Parallel Cell Threshold
// =================================================================================================
//
// Grids with more cells than this are filled on the Rayon pool. The value
// only selects a code path, so Relaxed loads and stores are enough.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Largest grid (in cells) that is still filled sequentially by default
const DEFAULT_PARALLEL_THRESHOLD: usize = 4095;

static CELL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Cell count above which stencil fills go parallel
///
/// Only meaningful with the `parallel` feature. Both paths write each cell
/// exactly once, so results do not depend on the threshold.
///
/// ```rust
/// use pde_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() >= 1);
/// ```
pub fn parallel_threshold() -> usize {
    CELL_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the cell threshold for the whole process
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// ```rust
/// use pde_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let saved = parallel_threshold();
/// set_parallel_threshold(64 * 64);
/// assert_eq!(parallel_threshold(), 4096);
/// set_parallel_threshold(saved);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    CELL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Test-only scoped override of the cell threshold
///
/// Holding one also holds a process-wide lock, so overrides from different
/// tests never interleave. Never create two in the same scope.
#[cfg(test)]
pub(crate) struct ThresholdOverride {
    saved: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
static OVERRIDE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
impl ThresholdOverride {
    pub(crate) fn set(threshold: usize) -> Self {
        let lock = OVERRIDE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved = parallel_threshold();
        set_parallel_threshold(threshold);
        Self { saved, _lock: lock }
    }
}

#[cfg(test)]
impl Drop for ThresholdOverride {
    fn drop(&mut self) {
        // Runs before `_lock` is released
        CELL_THRESHOLD.store(self.saved, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use boundary::BoundaryCondition;
pub use facade::PdeSolver;
pub use history::{Animation, History, Snapshot};
pub use methods::{EquationStepper, HeatStepper, WaveStepper};
pub use traits::{SolverState, Stepper};

pub(crate) use boundary::Neighbours;

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, SimulationError};
use crate::physics::Field;

/// Validate a field for numerical issues
///
/// Fails with `NumericalInstability` when any value is NaN or infinite,
/// reporting the step at which it was produced.
///
/// ```rust,ignore
/// validate_field(&field, 42)?;  // Validates field at step 42
/// ```
pub(crate) fn validate_field(field: &Field, step: usize) -> Result<()> {
    if field.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::NumericalInstability { step })
    }
}

/// Overwrite every cell of `target` with `rule(i, j)`
///
/// Columns are contiguous in the column-major storage, so the work is split
/// by column. Above the parallel threshold the columns are filled on the
/// Rayon pool. `rule` must only read from data other than `target`.
pub(crate) fn fill_cells<F>(target: &mut DMatrix<f64>, rule: F)
where
    F: Fn(usize, usize) -> f64 + Sync + Send,
{
    let nx = target.nrows();
    let fill_column = |(j, column): (usize, &mut [f64])| {
        for (i, cell) in column.iter_mut().enumerate() {
            *cell = rule(i, j);
        }
    };

    #[cfg(feature = "parallel")]
    {
        if target.len() > parallel_threshold() {
            target
                .as_mut_slice()
                .par_chunks_mut(nx)
                .enumerate()
                .for_each(fill_column);
            return;
        }
    }

    target
        .as_mut_slice()
        .chunks_mut(nx)
        .enumerate()
        .for_each(fill_column);
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ====== Threshold ======

    #[test]
    fn test_sixty_four_square_grid_runs_in_parallel() {
        assert!(64 * 64 > DEFAULT_PARALLEL_THRESHOLD);
        assert!(63 * 64 <= DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_rejected() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_override_is_scoped() {
        {
            let _override = ThresholdOverride::set(77);
            assert_eq!(parallel_threshold(), 77);
        }
        let next = ThresholdOverride::set(3);
        assert_eq!(next.saved, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_override_seen_by_worker_threads() {
        let _override = ThresholdOverride::set(999);

        let seen: Vec<usize> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4).map(|_| scope.spawn(parallel_threshold)).collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert!(seen.iter().all(|&t| t == 999));
    }

    // ====== fill_cells ======

    #[test]
    fn test_fill_cells_sequential_and_parallel_agree() {
        let rule = |i: usize, j: usize| (i as f64) * 0.5 - (j as f64).sqrt();

        let mut sequential = DMatrix::zeros(70, 90);
        {
            let _override = ThresholdOverride::set(usize::MAX);
            fill_cells(&mut sequential, rule);
        }

        let mut parallel = DMatrix::zeros(70, 90);
        {
            let _override = ThresholdOverride::set(16);
            fill_cells(&mut parallel, rule);
        }

        assert_eq!(sequential, parallel);
        assert_eq!(sequential[(4, 9)], 2.0 - 3.0);
    }

    #[test]
    fn test_validate_field_reports_step() {
        let mut field = Field::zeros((3, 3)).unwrap();
        assert!(validate_field(&field, 1).is_ok());

        field.set(0, 0, f64::INFINITY);
        assert_eq!(
            validate_field(&field, 12),
            Err(SimulationError::NumericalInstability { step: 12 })
        );
    }
}
