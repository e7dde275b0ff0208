//! Parameter explorer
//!
//! [`ParameterExplorer`] holds a base configuration (equation, grid,
//! boundary, initial field, parameters, step count) and runs it many times
//! with one or two parameters varied.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::exploration::{
    CancellationToken, GridResult, Landscape, Metric, RunMetrics, SampleOutcome,
    SensitivityReport, SweepResult, fan_out, linspace,
};
use crate::physics::{EquationParameters, EquationType, Field, InitialCondition, Spacing};
use crate::solver::{BoundaryCondition, PdeSolver};

/// Name that varies the step count instead of an equation parameter
const STEPS: &str = "steps";

fn default_steps() -> usize {
    ExplorerConfig::DEFAULT_STEPS
}

// =================================================================================================
// Configuration
// =================================================================================================

/// Base configuration shared by every sample
///
/// The initial field is not part of it; it is set on the explorer.
///
/// # Examples
///
/// ```rust
/// use pde_rs::exploration::ExplorerConfig;
/// use pde_rs::physics::{EquationParameters, EquationType};
///
/// let config = ExplorerConfig::new(EquationType::Wave, (30, 30));
/// assert_eq!(config.parameters, EquationParameters::wave(1.0, 0.05).unwrap());
/// assert_eq!(config.steps, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub equation: EquationType,
    pub grid_shape: (usize, usize),

    #[serde(default)]
    pub spacing: Spacing,

    #[serde(default)]
    pub boundary: BoundaryCondition,

    pub parameters: EquationParameters,

    /// Steps per sample unless a sweep overrides it
    #[serde(default = "default_steps")]
    pub steps: usize,
}

impl ExplorerConfig {
    pub const DEFAULT_STEPS: usize = 100;

    /// Default parameters for `equation`, unit spacing, `Dirichlet(0)`
    pub fn new(equation: EquationType, grid_shape: (usize, usize)) -> Self {
        Self {
            equation,
            grid_shape,
            spacing: Spacing::default(),
            boundary: BoundaryCondition::default(),
            parameters: EquationParameters::defaults(equation),
            steps: Self::DEFAULT_STEPS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (nx, ny) = self.grid_shape;
        if nx == 0 || ny == 0 {
            return Err(SimulationError::InvalidGridShape { nx, ny });
        }
        self.spacing.validate()?;
        self.boundary.validate()?;
        self.parameters.validate()?;

        if self.parameters.equation() != self.equation {
            return Err(SimulationError::invalid(
                "parameters",
                format!(
                    "{} parameters in a {} configuration",
                    self.parameters.equation(),
                    self.equation
                ),
            ));
        }
        Ok(())
    }
}

/// Per-call settings of a sweep
///
/// `steps` replaces the explorer's step count; `overrides` replace base
/// parameters for every sample (the swept parameter still wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepOptions {
    #[serde(default)]
    pub steps: Option<usize>,

    #[serde(default)]
    pub overrides: Vec<(String, f64)>,
}

impl SweepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_override(mut self, name: &str, value: f64) -> Self {
        self.overrides.push((name.to_string(), value));
        self
    }

    /// Build from a flat list where `"steps"` sets the step count
    ///
    /// ```rust
    /// use pde_rs::exploration::SweepOptions;
    ///
    /// let options = SweepOptions::from_named(&[("alpha", 0.3), ("dt", 0.1), ("steps", 100.0)]).unwrap();
    /// assert_eq!(options.steps, Some(100));
    /// assert_eq!(options.overrides.len(), 2);
    /// ```
    pub fn from_named(values: &[(&str, f64)]) -> Result<Self> {
        let mut options = Self::new();
        for &(name, value) in values {
            if name == STEPS {
                options.steps = Some(steps_from_value(value)?);
            } else {
                options.overrides.push((name.to_string(), value));
            }
        }
        Ok(options)
    }
}

fn steps_from_value(value: f64) -> Result<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(SimulationError::invalid(
            STEPS,
            format!("step count must be a non-negative integer, got {value}"),
        ));
    }
    Ok(value as usize)
}

// =================================================================================================
// Sample Plan
// =================================================================================================

/// What one sample runs with
#[derive(Debug, Clone)]
struct SamplePlan {
    /// Varied values reported in the outcome
    values: Vec<(String, f64)>,

    /// Every assignment applied on top of the base, in order
    assignments: Vec<(String, f64)>,

    steps: usize,
}

// =================================================================================================
// Parameter Explorer
// =================================================================================================

/// Runs a base configuration across parameter sweeps and grids
///
/// # Examples
///
/// ```rust
/// use pde_rs::exploration::{ParameterExplorer, SweepOptions};
/// use pde_rs::physics::{EquationType, Field};
///
/// let mut explorer = ParameterExplorer::new(EquationType::Heat, (10, 10)).unwrap();
/// let mut u0 = Field::zeros((10, 10)).unwrap();
/// u0.set(5, 5, 100.0);
/// explorer.set_initial_conditions(u0).unwrap();
///
/// let grid = explorer
///     .parameter_grid("alpha", &[0.5, 1.0], "dt", &[0.1, 0.2], &SweepOptions::new().steps(10))
///     .unwrap();
///
/// assert_eq!(grid.shape(), (2, 2));
/// assert!(grid.get_by_values(1.0, 0.2).unwrap().is_success());
/// ```
#[derive(Debug, Clone)]
pub struct ParameterExplorer {
    config: ExplorerConfig,
    initial: Option<Field>,
    velocity: Option<Field>,
    cancellation: CancellationToken,
}

impl ParameterExplorer {
    // ====================================== constructors =======================================

    /// Explorer with default parameters for `equation`
    pub fn new(equation: EquationType, grid_shape: (usize, usize)) -> Result<Self> {
        Self::from_config(ExplorerConfig::new(equation, grid_shape))
    }

    pub fn from_config(config: ExplorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            initial: None,
            velocity: None,
            cancellation: CancellationToken::new(),
        })
    }

    /// Share a cancellation token with the caller
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    // ====================================== Configuration ======================================

    /// Initial field of every sample; its shape must match the grid
    pub fn set_initial_conditions(&mut self, field: Field) -> Result<()> {
        self.check_shape(&field)?;
        self.initial = Some(field);
        Ok(())
    }

    /// Generate the initial field from a profile
    pub fn set_initial_condition(&mut self, condition: &InitialCondition) -> Result<()> {
        let field = condition.generate(self.config.grid_shape)?;
        self.set_initial_conditions(field)
    }

    /// Initial velocity of every wave sample
    pub fn set_initial_velocity(&mut self, velocity: Field) -> Result<()> {
        if self.config.equation != EquationType::Wave {
            return Err(SimulationError::invalid(
                "velocity",
                "only wave simulations take an initial velocity",
            ));
        }
        self.check_shape(&velocity)?;
        self.velocity = Some(velocity);
        Ok(())
    }

    /// Replace some base parameters, keeping the others
    pub fn set_base_parameters(&mut self, values: &[(&str, f64)]) -> Result<()> {
        let mut params = self.config.parameters;
        for &(name, value) in values {
            params = params.with_override(name, value)?;
        }
        self.config.parameters = params;
        Ok(())
    }

    pub fn set_boundary_conditions(&mut self, condition: BoundaryCondition) -> Result<()> {
        condition.validate()?;
        self.config.boundary = condition;
        Ok(())
    }

    pub fn set_spacing(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.config.spacing = Spacing::new(dx, dy)?;
        Ok(())
    }

    pub fn set_steps(&mut self, steps: usize) {
        self.config.steps = steps;
    }

    // ========================================= Queries =========================================

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn initial_field(&self) -> Option<&Field> {
        self.initial.as_ref()
    }

    /// Handle on the explorer's token; cancelling it stops pending samples
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    // ======================================= Exploration =======================================

    /// Run one sample per value of `name`
    ///
    /// `name` is an equation parameter or `"steps"`. Outcomes are returned
    /// in the order of `values`, failed samples included.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` when no initial field is set
    /// - `UnknownParameter` when `name` or an override is not a parameter
    pub fn parameter_sweep(
        &self,
        name: &str,
        values: &[f64],
        custom: &SweepOptions,
    ) -> Result<SweepResult> {
        self.check_sweep(&[name], custom)?;
        info!("sweeping '{}' over {} values", name, values.len());

        let plans: Vec<SamplePlan> = values
            .iter()
            .map(|&value| self.plan(custom, vec![(name.to_string(), value)]))
            .collect();
        let outcomes = self.run_plans(&plans);

        let result = SweepResult {
            parameter: name.to_string(),
            values: values.to_vec(),
            outcomes,
        };
        info!(
            "sweep of '{}' done: {} succeeded, {} failed",
            name,
            result.successes(),
            result.failures()
        );
        Ok(result)
    }

    /// Run one sample per pair in `values_a × values_b`
    ///
    /// Outcomes are stored row-major, `values_a` outermost. Fails with
    /// `InvalidParameter` when both names are the same.
    pub fn parameter_grid(
        &self,
        name_a: &str,
        values_a: &[f64],
        name_b: &str,
        values_b: &[f64],
        custom: &SweepOptions,
    ) -> Result<GridResult> {
        if name_a == name_b {
            return Err(SimulationError::invalid(
                name_b,
                "a grid needs two different parameters",
            ));
        }
        self.check_sweep(&[name_a, name_b], custom)?;
        info!(
            "grid over '{}' ({} values) × '{}' ({} values)",
            name_a,
            values_a.len(),
            name_b,
            values_b.len()
        );

        let plans: Vec<SamplePlan> = values_a
            .iter()
            .flat_map(|&a| {
                values_b.iter().map(move |&b| {
                    self.plan(
                        custom,
                        vec![(name_a.to_string(), a), (name_b.to_string(), b)],
                    )
                })
            })
            .collect();
        let outcomes = self.run_plans(&plans);

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!("grid done: {} samples, {} failed", outcomes.len(), failed);

        Ok(GridResult {
            parameters: (name_a.to_string(), name_b.to_string()),
            values_a: values_a.to_vec(),
            values_b: values_b.to_vec(),
            outcomes,
        })
    }

    /// Sample one metric over `resolution × resolution` evenly spaced pairs
    ///
    /// Failed samples appear as `NaN`.
    pub fn parameter_landscape(
        &self,
        name_a: &str,
        range_a: (f64, f64),
        name_b: &str,
        range_b: (f64, f64),
        resolution: usize,
        metric: Metric,
    ) -> Result<Landscape> {
        if resolution == 0 {
            return Err(SimulationError::invalid(
                "resolution",
                "a landscape needs at least one sample per axis",
            ));
        }
        for (name, (low, high)) in [(name_a, range_a), (name_b, range_b)] {
            if !low.is_finite() || !high.is_finite() {
                return Err(SimulationError::invalid(name, "range bounds must be finite"));
            }
        }

        let axis_a = linspace(range_a.0, range_a.1, resolution);
        let axis_b = linspace(range_b.0, range_b.1, resolution);
        let grid = self.parameter_grid(name_a, &axis_a, name_b, &axis_b, &SweepOptions::new())?;

        Ok(Landscape {
            parameters: grid.parameters.clone(),
            values: grid.metric_matrix(metric),
            axis_a,
            axis_b,
            metric,
        })
    }

    /// Run labelled full configurations
    ///
    /// Each configuration's overrides and step count apply on top of the
    /// base. Outcomes come back in input order with their labels. Fails with
    /// `InvalidParameter` when the label count differs from the
    /// configuration count.
    pub fn compare_parameters(
        &self,
        configs: &[SweepOptions],
        labels: &[&str],
    ) -> Result<Vec<(String, SampleOutcome)>> {
        if configs.len() != labels.len() {
            return Err(SimulationError::invalid(
                "labels",
                format!("{} labels for {} configurations", labels.len(), configs.len()),
            ));
        }
        for config in configs {
            self.check_sweep(&[], config)?;
        }
        info!("comparing {} configurations", configs.len());

        let plans: Vec<SamplePlan> = configs
            .iter()
            .map(|config| self.plan(config, config.overrides.clone()))
            .collect();
        let outcomes = self.run_plans(&plans);

        Ok(labels
            .iter()
            .map(|label| label.to_string())
            .zip(outcomes)
            .collect())
    }

    /// Sweep `name` over `base·(1 ± p/100)` and derive sensitivities
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` when `base` is not positive and finite, when
    ///   `perturbation_percent` is outside `(0, 100)`, or when fewer than two
    ///   samples are requested
    /// - `UnknownParameter` when `name` is not an equation parameter
    pub fn sensitivity_analysis(
        &self,
        name: &str,
        base: f64,
        perturbation_percent: f64,
        n_samples: usize,
    ) -> Result<SensitivityReport> {
        if !self.config.equation.parameter_names().contains(&name) {
            return Err(SimulationError::UnknownParameter(name.to_string()));
        }
        if !base.is_finite() || base <= 0.0 {
            return Err(SimulationError::invalid(
                name,
                format!("base value must be positive and finite, got {base}"),
            ));
        }
        if !(perturbation_percent > 0.0 && perturbation_percent < 100.0) {
            return Err(SimulationError::invalid(
                "perturbation_percent",
                format!("must lie in (0, 100), got {perturbation_percent}"),
            ));
        }
        if n_samples < 2 {
            return Err(SimulationError::invalid(
                "n_samples",
                "sensitivity needs at least two samples",
            ));
        }

        let p = perturbation_percent / 100.0;
        let values = linspace(base * (1.0 - p), base * (1.0 + p), n_samples);
        let sweep = self.parameter_sweep(name, &values, &SweepOptions::new())?;

        Ok(SensitivityReport::from_sweep(sweep, base, perturbation_percent))
    }

    // ========================================= Helpers =========================================

    fn check_shape(&self, field: &Field) -> Result<()> {
        if field.shape() != self.config.grid_shape {
            return Err(SimulationError::ShapeMismatch {
                expected: self.config.grid_shape,
                actual: field.shape(),
            });
        }
        Ok(())
    }

    /// Checks that fail the whole call rather than a single sample
    fn check_sweep(&self, names: &[&str], custom: &SweepOptions) -> Result<()> {
        if self.initial.is_none() {
            return Err(SimulationError::NotConfigured(
                "explorer has no initial conditions".to_string(),
            ));
        }

        let known = self.config.equation.parameter_names();
        let overrides = custom.overrides.iter().map(|(name, _)| name.as_str());
        for name in names.iter().copied().chain(overrides) {
            if name != STEPS && !known.contains(&name) {
                return Err(SimulationError::UnknownParameter(name.to_string()));
            }
        }
        Ok(())
    }

    fn plan(&self, custom: &SweepOptions, varied: Vec<(String, f64)>) -> SamplePlan {
        let mut assignments = custom.overrides.clone();
        assignments.extend(varied.iter().cloned());

        SamplePlan {
            values: varied,
            assignments,
            steps: custom.steps.unwrap_or(self.config.steps),
        }
    }

    /// Parameters and step count of a plan
    fn resolve(&self, plan: &SamplePlan) -> Result<(EquationParameters, usize)> {
        let mut params = self.config.parameters;
        let mut steps = plan.steps;

        for (name, value) in &plan.assignments {
            if name == STEPS {
                steps = steps_from_value(*value)?;
            } else {
                params = params.with_override(name, *value)?;
            }
        }
        Ok((params, steps))
    }

    /// Build a fresh solver and run one sample
    fn run_sample(&self, params: EquationParameters, steps: usize) -> Result<RunMetrics> {
        let initial = self.initial.clone().ok_or_else(|| {
            SimulationError::NotConfigured("explorer has no initial conditions".to_string())
        })?;

        let Spacing { dx, dy } = self.config.spacing;
        let mut solver = PdeSolver::new(self.config.equation, self.config.grid_shape)?
            .with_spacing(dx, dy)?
            .with_boundary(self.config.boundary);

        solver.set_initial_conditions(initial)?;
        if let Some(velocity) = &self.velocity {
            solver.set_initial_velocity(velocity.clone())?;
        }
        solver.set_equation_parameters(params)?;

        let field = solver.solve(steps)?;
        Ok(RunMetrics::from_field(field))
    }

    fn run_plans(&self, plans: &[SamplePlan]) -> Vec<SampleOutcome> {
        let outcomes = fan_out(plans, |plan| {
            if self.cancellation.is_cancelled() {
                return SampleOutcome {
                    values: plan.values.clone(),
                    steps: plan.steps,
                    result: Err(SimulationError::Cancelled),
                };
            }

            match self.resolve(plan) {
                Ok((params, steps)) => SampleOutcome {
                    values: plan.values.clone(),
                    steps,
                    result: self.run_sample(params, steps),
                },
                Err(error) => SampleOutcome {
                    values: plan.values.clone(),
                    steps: plan.steps,
                    result: Err(error),
                },
            }
        });

        for outcome in &outcomes {
            if let Some(error) = outcome.error() {
                warn!("sample {:?} failed: {}", outcome.values, error);
            }
        }
        outcomes
    }
}

// =================================================================================================
// Tests
// =================================================================================================
