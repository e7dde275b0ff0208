//! Unified solver facade
//!
//! [`PdeSolver`] selects the stepper for its equation type, owns the
//! configuration (parameters, boundary, initial field) and the rolling state,
//! runs the step loop and records the history.
//!
//! # State Machine
//!
//! ```text
//!                  set_initial_conditions + set_parameters
//! ┌──────────────┐ ─────────────────────────────────────▶ ┌───────────┐
//! │ Unconfigured │                                         │   Ready   │ ◀─┐
//! └──────────────┘                                         └─────┬─────┘   │ solve(steps)
//!                                                                └─────────┘ steps accumulate
//! ```
//!
//! `solve` on an unconfigured solver fails with `NotConfigured`. Setting the
//! initial field again returns a ready solver to a fresh state (step counter
//! and history reset). Setting new parameters on a ready solver rebuilds the
//! stepper and keeps the reached state.

use log::{debug, trace};
use std::time::Duration;

use crate::error::{Result, SimulationError};
use crate::physics::{EquationParameters, EquationType, Field, Spacing};
use crate::solver::{
    Animation, BoundaryCondition, EquationStepper, History, Snapshot, SolverState, Stepper,
    validate_field,
};

/// Configuration progress of a solver
#[derive(Debug, Clone)]
enum Stage {
    Unconfigured,
    Ready {
        stepper: EquationStepper,
        state: SolverState,
    },
}

// =================================================================================================
// PDE Solver
// =================================================================================================

/// Configure-then-run front end for heat and wave simulations
///
/// # Examples
///
/// ```rust
/// use pde_rs::physics::{EquationType, Field};
/// use pde_rs::solver::{BoundaryCondition, PdeSolver};
///
/// let mut solver = PdeSolver::new(EquationType::Wave, (20, 20)).unwrap()
///     .with_boundary(BoundaryCondition::periodic());
///
/// let mut u0 = Field::zeros((20, 20)).unwrap();
/// u0.set(10, 10, 1.0);
///
/// solver.set_initial_conditions(u0).unwrap();
/// solver.set_parameters(&[("c", 1.0), ("dt", 0.5)]).unwrap();
/// solver.record_every(5);
///
/// solver.solve(20).unwrap();
/// assert_eq!(solver.steps_taken(), 20);
/// assert_eq!(solver.history().steps(), vec![0, 5, 10, 15, 20]);
/// ```
#[derive(Debug, Clone)]
pub struct PdeSolver {
    equation: EquationType,
    shape: (usize, usize),
    spacing: Spacing,
    boundary: BoundaryCondition,
    parameters: Option<EquationParameters>,
    initial: Option<Field>,
    velocity: Option<Field>,
    stage: Stage,
    steps_taken: usize,
    /// Sum of the `dt` of every step taken, so a `dt` change mid-run keeps
    /// time monotone
    time: f64,
    history: History,
}

impl PdeSolver {
    // ====================================== constructors =======================================

    /// Solver for `equation` on an `nx × ny` grid with unit spacing and a
    /// `Dirichlet(0)` boundary
    ///
    /// Fails with `InvalidGridShape` when either dimension is zero.
    pub fn new(equation: EquationType, shape: (usize, usize)) -> Result<Self> {
        let (nx, ny) = shape;
        if nx == 0 || ny == 0 {
            return Err(SimulationError::InvalidGridShape { nx, ny });
        }

        debug!("new {} solver on a {}x{} grid", equation, nx, ny);

        Ok(Self {
            equation,
            shape,
            spacing: Spacing::default(),
            boundary: BoundaryCondition::default(),
            parameters: None,
            initial: None,
            velocity: None,
            stage: Stage::Unconfigured,
            steps_taken: 0,
            time: 0.0,
            history: History::default(),
        })
    }

    /// Replace the grid spacing
    ///
    /// Restarts from the stored initial field. Fails with
    /// `UnstableConfiguration` when the stored parameters violate the bound
    /// on the new grid.
    pub fn with_spacing(mut self, dx: f64, dy: f64) -> Result<Self> {
        self.spacing = Spacing::new(dx, dy)?;
        self.initial = self
            .initial
            .take()
            .map(|field| field.with_spacing(self.spacing))
            .transpose()?;
        self.restart()?;
        Ok(self)
    }

    /// Builder form of [`PdeSolver::set_boundary_conditions`]
    pub fn with_boundary(mut self, condition: BoundaryCondition) -> Self {
        self.set_boundary_conditions(condition);
        self
    }

    // ====================================== Configuration ======================================

    /// Set the initial field, discarding any progress
    ///
    /// The field takes the solver's grid spacing. Fails with `ShapeMismatch`
    /// when its shape differs from the grid.
    pub fn set_initial_conditions(&mut self, field: Field) -> Result<()> {
        self.check_shape(&field)?;
        self.initial = Some(field.with_spacing(self.spacing)?);
        debug!("initial conditions set on {} solver", self.equation);
        self.restart()
    }

    /// Set the initial velocity of a wave simulation
    ///
    /// Applies immediately when no step has been taken since the initial
    /// field was set, and otherwise at the next `set_initial_conditions`.
    /// Heat solvers reject it with `InvalidParameter`.
    pub fn set_initial_velocity(&mut self, velocity: Field) -> Result<()> {
        if self.equation != EquationType::Wave {
            return Err(SimulationError::invalid(
                "velocity",
                "only wave simulations take an initial velocity",
            ));
        }
        self.check_shape(&velocity)?;
        self.velocity = Some(velocity);

        if self.steps_taken == 0 {
            self.restart()?;
        }
        Ok(())
    }

    /// Set parameters from named values
    ///
    /// # Errors
    ///
    /// - `UnknownParameter` for a name the equation does not use
    /// - `MissingParameter` when a required name is absent
    /// - `InvalidParameter` for non-positive or non-finite values
    /// - `UnstableConfiguration` when the stability bound is violated
    pub fn set_parameters(&mut self, values: &[(&str, f64)]) -> Result<()> {
        let params = EquationParameters::from_named(self.equation, values)?;
        self.set_equation_parameters(params)
    }

    /// Set typed parameters
    ///
    /// Fails with `InvalidParameter` when they belong to the other equation.
    pub fn set_equation_parameters(&mut self, params: EquationParameters) -> Result<()> {
        if params.equation() != self.equation {
            return Err(SimulationError::invalid(
                "equation",
                format!(
                    "{} parameters given to a {} solver",
                    params.equation(),
                    self.equation
                ),
            ));
        }
        params.validate()?;

        let stepper = EquationStepper::from_parameters(&params, self.spacing)?;
        debug!(
            "{} stepper built with dt = {} (stability number {:.4})",
            stepper.name(),
            stepper.dt(),
            stepper.stability_number()
        );

        self.parameters = Some(params);
        if let Stage::Ready { stepper: current, .. } = &mut self.stage {
            *current = stepper;
            if !self.history.is_empty() {
                self.history.add_metadata("dt", &stepper.dt().to_string());
            }
            return Ok(());
        }
        self.restart()
    }

    /// Store the boundary condition; it is applied on every step
    pub fn set_boundary_conditions(&mut self, condition: BoundaryCondition) {
        debug!("boundary set to {}", condition);
        self.boundary = condition;
    }

    /// Record a frame every `stride` steps; `0` disables recording
    pub fn record_every(&mut self, stride: usize) {
        self.history.set_stride(stride);
    }

    /// Drop recorded frames
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ======================================== Execution ========================================

    /// Advance `steps` steps and return the reached field
    ///
    /// Repeated calls continue from the reached state. `solve(0)` returns
    /// the current field unchanged.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` before both initial conditions and parameters are set
    /// - `InvalidParameter` for a boundary holding a non-finite value
    /// - `NumericalInstability` when a step produces NaN or infinity; the
    ///   state is left at the failing step
    pub fn solve(&mut self, steps: usize) -> Result<Field> {
        self.boundary.validate()?;

        let (stepper, state) = match &mut self.stage {
            Stage::Ready { stepper, state } => (stepper, state),
            Stage::Unconfigured => {
                return Err(not_configured(
                    self.initial.is_some(),
                    self.parameters.is_some(),
                ));
            }
        };

        let dt = stepper.dt();

        // ====== Setup ======

        if self.history.is_enabled() && self.history.is_empty() {
            self.history.add_metadata("stepper", stepper.name());
            self.history.add_metadata("dt", &dt.to_string());
            self.history.add_metadata("boundary", &self.boundary.to_string());
            self.history.push(Snapshot {
                step: self.steps_taken,
                time: self.time,
                field: state.current().clone(),
            })?;
        }

        debug!(
            "{}: {} steps from step {} under {}",
            stepper.name(),
            steps,
            self.steps_taken,
            self.boundary
        );

        // ====== Time Integration ======

        for _ in 0..steps {
            stepper.step(state, &self.boundary);
            self.steps_taken += 1;
            self.time += dt;

            validate_field(state.current(), self.steps_taken)?;

            if self.history.should_record(self.steps_taken) {
                let time = self.time;
                trace!("frame recorded at step {} (t = {})", self.steps_taken, time);
                self.history.push(Snapshot {
                    step: self.steps_taken,
                    time,
                    field: state.current().clone(),
                })?;
            }
        }

        Ok(state.current().clone())
    }

    /// Solve `frames` chunks of `steps` steps, keeping one frame per chunk
    ///
    /// The solver's own history is untouched by this frame selection; the
    /// returned animation holds exactly `frames` snapshots.
    pub fn animate(&mut self, steps: usize, frames: usize, interval: Duration) -> Result<Animation> {
        if !self.is_ready() {
            return Err(not_configured(
                self.initial.is_some(),
                self.parameters.is_some(),
            ));
        }

        let mut history = History::new(steps);
        history.add_metadata("equation", &self.equation.to_string());
        history.add_metadata("boundary", &self.boundary.to_string());
        history.add_metadata("steps per frame", &steps.to_string());

        for _ in 0..frames {
            let field = self.solve(steps)?;
            history.push(Snapshot {
                step: self.steps_taken,
                time: self.elapsed_time(),
                field,
            })?;
        }

        debug!("animation of {} frames ready", history.len());
        Ok(Animation { history, interval })
    }

    // ========================================= Queries =========================================

    pub fn equation(&self) -> EquationType {
        self.equation
    }

    pub fn grid_shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    pub fn parameters(&self) -> Option<&EquationParameters> {
        self.parameters.as_ref()
    }

    /// Field reached so far, `None` until the solver is ready
    pub fn current_field(&self) -> Option<&Field> {
        match &self.stage {
            Stage::Ready { state, .. } => Some(state.current()),
            Stage::Unconfigured => None,
        }
    }

    /// Rolling state, `None` until the solver is ready
    pub fn state(&self) -> Option<&SolverState> {
        match &self.stage {
            Stage::Ready { state, .. } => Some(state),
            Stage::Unconfigured => None,
        }
    }

    pub fn stepper(&self) -> Option<&EquationStepper> {
        match &self.stage {
            Stage::Ready { stepper, .. } => Some(stepper),
            Stage::Unconfigured => None,
        }
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Simulated time, the sum of `dt` over every step taken
    pub fn elapsed_time(&self) -> f64 {
        self.time
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.stage, Stage::Ready { .. })
    }

    // ========================================= Helpers =========================================

    fn check_shape(&self, field: &Field) -> Result<()> {
        if field.shape() != self.shape {
            return Err(SimulationError::ShapeMismatch {
                expected: self.shape,
                actual: field.shape(),
            });
        }
        Ok(())
    }

    /// Rebuild stepper and state from the stored configuration
    ///
    /// Nothing changes when the rebuild fails.
    fn restart(&mut self) -> Result<()> {
        let stage = match (&self.parameters, &self.initial) {
            (Some(params), Some(initial)) => {
                let stepper = EquationStepper::from_parameters(params, self.spacing)?;
                let state = stepper.initial_state(initial.clone(), self.velocity.as_ref())?;
                Stage::Ready { stepper, state }
            }
            _ => Stage::Unconfigured,
        };

        self.stage = stage;
        self.steps_taken = 0;
        self.time = 0.0;
        self.history.clear();
        Ok(())
    }
}

fn not_configured(has_initial: bool, has_parameters: bool) -> SimulationError {
    let missing = match (has_initial, has_parameters) {
        (false, false) => "initial conditions and parameters are not set",
        (false, true) => "initial conditions are not set",
        _ => "parameters are not set",
    };
    SimulationError::NotConfigured(missing.to_string())
}

// =================================================================================================
// Tests
// =================================================================================================
