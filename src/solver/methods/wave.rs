//! Leapfrog wave-equation stepper
//!
//! # Mathematical Background
//!
//! The wave equation
//!
//! ```text
//! ∂²u/∂t² = c² ∇²u
//! ```
//!
//! is second order in time. Central differences in both time and space give
//! the leapfrog scheme:
//!
//! ```text
//! u[n+1] = 2·u[n] - u[n-1] + (c·dt/dx)²·δxx u[n] + (c·dt/dy)²·δyy u[n]
//! ```
//!
//! Each step needs the two previous fields, held in the [`SolverState`]
//! rolling buffer (`current = u[n]`, `previous = u[n-1]`).
//!
//! # Characteristics
//!
//! - **Order**: second order in time and space
//! - **Stability**: Courant number `ν = c·dt·sqrt(1/dx² + 1/dy²) ≤ 1`
//! - **Memory**: two fields plus one scratch field per step
//! - **Energy**: the discrete energy returned by
//!   [`WaveStepper::discrete_energy`] is constant on periodic grids
//!
//! # Starting the Scheme
//!
//! The first step has no `u[-1]`. With no initial velocity `u[-1] = u[0]`;
//! with a velocity `v`, `u[-1] = u[0] - dt·v`.
//!
//! # Absorbing Edges
//!
//! With `BoundaryCondition::Absorbing` the border is updated with the
//! first-order Mur condition, which lets waves leave the domain:
//!
//! ```text
//! u_b[n+1] = u_i[n] + (k - 1)/(k + 1) · (u_i[n+1] - u_b[n]),   k = c·dt/h
//! ```
//!
//! where `u_i` is the neighbour one cell inward and `h` the spacing normal to
//! the edge.

use crate::error::{Result, SimulationError};
use crate::physics::{EquationParameters, EquationType, Field, Spacing};
use crate::solver::{BoundaryCondition, Neighbours, SolverState, Stepper, fill_cells};

// =================================================================================================
// Wave Stepper
// =================================================================================================

/// Leapfrog stepper for `∂²u/∂t² = c² ∇²u`
///
/// # Example
///
/// ```rust
/// use pde_rs::physics::{Field, Spacing};
/// use pde_rs::solver::{BoundaryCondition, Stepper, WaveStepper};
///
/// let stepper = WaveStepper::new(1.0, 0.5, Spacing::default()).unwrap();
///
/// let mut initial = Field::zeros((5, 5)).unwrap();
/// initial.set(2, 2, 1.0);
///
/// let mut state = stepper.initial_state(initial.clone(), None).unwrap();
/// stepper.step(&mut state, &BoundaryCondition::periodic());
///
/// assert_eq!(state.current().get(2, 1), 0.25);
/// assert_eq!(state.previous(), Some(&initial));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStepper {
    c: f64,
    dt: f64,
    spacing: Spacing,
    cx2: f64,
    cy2: f64,
}

impl WaveStepper {
    /// Build a stepper, rejecting configurations beyond the Courant bound
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for non-positive or non-finite values
    /// - `UnstableConfiguration` when `c·dt·sqrt(1/dx² + 1/dy²) > 1`
    pub fn new(c: f64, dt: f64, spacing: Spacing) -> Result<Self> {
        spacing.validate()?;
        EquationParameters::wave(c, dt)?.check_stability(spacing)?;

        Ok(Self {
            c,
            dt,
            spacing,
            cx2: (c * dt / spacing.dx).powi(2),
            cy2: (c * dt / spacing.dy).powi(2),
        })
    }

    /// Build from typed parameters; heat parameters are rejected
    pub fn from_parameters(params: &EquationParameters, spacing: Spacing) -> Result<Self> {
        match *params {
            EquationParameters::Wave { c, dt } => Self::new(c, dt, spacing),
            EquationParameters::Heat { .. } => Err(SimulationError::invalid(
                "equation",
                "wave stepper needs wave parameters",
            )),
        }
    }

    /// Wave speed
    pub fn speed(&self) -> f64 {
        self.c
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Discrete energy of a leapfrog state
    ///
    /// ```text
    /// E = Σ ((u[n] - u[n-1]) / dt)² + c² · Σ D u[n] · D u[n-1]
    /// ```
    ///
    /// with `D` the forward differences along both axes, taken with wrapped
    /// indices. The scheme keeps `E` constant (up to rounding) on periodic
    /// grids.
    pub fn discrete_energy(&self, state: &SolverState) -> f64 {
        let current = state.current();
        let previous = state.previous().unwrap_or(current);
        let (nx, ny) = current.shape();
        let u = current.as_matrix();
        let p = previous.as_matrix();

        let mut kinetic = 0.0;
        let mut potential = 0.0;
        for j in 0..ny {
            for i in 0..nx {
                let n = Neighbours::wrapped(i, j, (nx, ny));

                kinetic += ((u[(i, j)] - p[(i, j)]) / self.dt).powi(2);

                let du_x = (u[(n.down, j)] - u[(i, j)]) / self.spacing.dx;
                let dp_x = (p[(n.down, j)] - p[(i, j)]) / self.spacing.dx;
                let du_y = (u[(i, n.right)] - u[(i, j)]) / self.spacing.dy;
                let dp_y = (p[(i, n.right)] - p[(i, j)]) / self.spacing.dy;
                potential += du_x * dp_x + du_y * dp_y;
            }
        }

        kinetic + self.c * self.c * potential
    }

    /// Compute `u[n+1]` from `u[n]` and `u[n-1]`
    ///
    /// Border cells copy `current` unless the lookup wraps.
    fn advance(&self, current: &Field, previous: &Field, wraps: bool) -> Field {
        let shape = current.shape();
        let (nx, ny) = shape;
        let (cx2, cy2) = (self.cx2, self.cy2);
        let u = current.as_matrix();
        let p = previous.as_matrix();

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

            2.0 * centre - p[(i, j)]
                + cx2 * (u[(n.up, j)] + u[(n.down, j)] - 2.0 * centre)
                + cy2 * (u[(i, n.left)] + u[(i, n.right)] - 2.0 * centre)
        });
        next
    }

    /// First-order Mur update of the border of `next`
    ///
    /// Rows first, columns last, so corners follow the column rule as with
    /// Neumann edges.
    fn absorb(&self, current: &Field, next: &mut Field) {
        let (nx, ny) = current.shape();
        if nx < 3 || ny < 3 {
            return;
        }

        let mur = |h: f64| {
            let k = self.c * self.dt / h;
            (k - 1.0) / (k + 1.0)
        };
        let (ax, ay) = (mur(self.spacing.dx), mur(self.spacing.dy));

        let u = current.as_matrix();
        let out = next.as_matrix_mut();

        for j in 0..ny {
            let top = u[(1, j)] + ax * (out[(1, j)] - u[(0, j)]);
            let bottom = u[(nx - 2, j)] + ax * (out[(nx - 2, j)] - u[(nx - 1, j)]);
            out[(0, j)] = top;
            out[(nx - 1, j)] = bottom;
        }

        for i in 0..nx {
            let left = u[(i, 1)] + ay * (out[(i, 1)] - u[(i, 0)]);
            let right = u[(i, ny - 2)] + ay * (out[(i, ny - 2)] - u[(i, ny - 1)]);
            out[(i, 0)] = left;
            out[(i, ny - 1)] = right;
        }
    }
}

impl Stepper for WaveStepper {
    fn name(&self) -> &'static str {
        "Leapfrog Wave"
    }

    fn equation(&self) -> EquationType {
        EquationType::Wave
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn stability_number(&self) -> f64 {
        (self.cx2 + self.cy2).sqrt()
    }

    fn initial_state(&self, initial: Field, velocity: Option<&Field>) -> Result<SolverState> {
        let initial = initial.with_spacing(self.spacing)?;
        let previous = match velocity {
            Some(velocity) => initial.axpy(-self.dt, velocity)?,
            None => initial.clone(),
        };
        SolverState::with_previous(initial, previous)
    }

    fn step(&self, state: &mut SolverState, boundary: &BoundaryCondition) {
        boundary.apply(state.current_mut());

        let current = state.current();
        let previous = state.previous().unwrap_or(current);
        let mut next = self.advance(current, previous, boundary.wraps());

        match boundary {
            BoundaryCondition::Absorbing => self.absorb(current, &mut next),
            other => other.apply(&mut next),
        }

        state.shift(next);
    }
}

// =================================================================================================
// Tests
// =================================================================================================
