//! Core stepper abstractions
//!
//! This module defines the stable interface shared by every time-stepping
//! scheme, and the rolling state the schemes advance.
//!
//! # Key Concepts
//!
//! - **Stepper**: holds the coefficients of one scheme (already checked
//!   against the stability bound) and knows how to advance a state by one
//!   step. It never stores a field.
//! - **SolverState**: the two-slot rolling buffer `{current, previous}`.
//!   The heat scheme only reads `current`; the leapfrog wave scheme needs
//!   both slots.
//!
//! Keeping the field out of the stepper means a stepper can be rebuilt with
//! new parameters without losing the progress of a running simulation.

use crate::error::{Result, SimulationError};
use crate::physics::{EquationType, Field};
use crate::solver::BoundaryCondition;

// =================================================================================================
// Solver State
// =================================================================================================

/// Rolling two-slot state of a simulation
///
/// `previous` is `None` until a scheme that needs it seeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverState {
    current: Field,
    previous: Option<Field>,
}

impl SolverState {
    /// State holding only the current field
    pub fn new(current: Field) -> Self {
        Self {
            current,
            previous: None,
        }
    }

    /// State holding both slots
    ///
    /// Fails with `ShapeMismatch` when the fields differ in shape.
    pub fn with_previous(current: Field, previous: Field) -> Result<Self> {
        if current.shape() != previous.shape() {
            return Err(SimulationError::ShapeMismatch {
                expected: current.shape(),
                actual: previous.shape(),
            });
        }
        Ok(Self {
            current,
            previous: Some(previous),
        })
    }

    pub fn current(&self) -> &Field {
        &self.current
    }

    pub fn previous(&self) -> Option<&Field> {
        self.previous.as_ref()
    }

    pub fn into_current(self) -> Field {
        self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut Field {
        &mut self.current
    }

    /// Replace the current field, leaving `previous` untouched
    pub(crate) fn replace(&mut self, next: Field) {
        self.current = next;
    }

    /// `previous ← current`, `current ← next`
    pub(crate) fn shift(&mut self, next: Field) {
        let old = std::mem::replace(&mut self.current, next);
        self.previous = Some(old);
    }
}

// =================================================================================================
// Stepper Trait
// =================================================================================================

/// Core trait for explicit time-stepping schemes
///
/// Implementors are immutable once built: their coefficients were checked
/// against the stability bound at construction, so `step` cannot fail for
/// configuration reasons.
///
/// # Required Methods
///
/// - `name()`: scheme name for logs and metadata
/// - `equation()`: equation the scheme integrates
/// - `dt()`: time step
/// - `stability_number()`: Fourier or Courant number on the configured grid
/// - `initial_state()`: seed the rolling state from an initial field
/// - `step()`: advance the state by one time step
pub trait Stepper: Send + Sync {
    fn name(&self) -> &'static str;

    fn equation(&self) -> EquationType;

    fn dt(&self) -> f64;

    fn stability_number(&self) -> f64;

    /// Seed the rolling state
    ///
    /// `velocity` is only meaningful for second-order schemes; first-order
    /// schemes ignore it.
    fn initial_state(&self, initial: Field, velocity: Option<&Field>) -> Result<SolverState>;

    /// Advance `state` by one step under `boundary`
    fn step(&self, state: &mut SolverState, boundary: &BoundaryCondition);
}

// =================================================================================================
// Tests
// =================================================================================================
