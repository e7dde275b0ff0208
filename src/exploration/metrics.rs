//! Per-run metrics and exploration results
//!
//! Every simulated sample ends up as a [`SampleOutcome`]: the parameter
//! values it ran with, and either the [`RunMetrics`] of its final field or
//! the error that stopped it. Sweeps, grids and landscapes are ordered
//! collections of outcomes.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::physics::Field;

// =================================================================================================
// Metric
// =================================================================================================

/// Scalar summary of a final field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MaxValue,
    MinValue,
    /// Sum of squared values
    TotalEnergy,
    CenterValue,
    /// Sum of values
    TotalHeat,
    /// Sum of squared values on the outer ring
    BoundaryEnergy,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::MaxValue,
        Metric::MinValue,
        Metric::TotalEnergy,
        Metric::CenterValue,
        Metric::TotalHeat,
        Metric::BoundaryEnergy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::MaxValue => "max_value",
            Metric::MinValue => "min_value",
            Metric::TotalEnergy => "total_energy",
            Metric::CenterValue => "center_value",
            Metric::TotalHeat => "total_heat",
            Metric::BoundaryEnergy => "boundary_energy",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| SimulationError::invalid("metric", format!("unknown metric '{s}'")))
    }
}

// =================================================================================================
// Run Metrics
// =================================================================================================

/// Metrics of one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub max_value: f64,
    pub min_value: f64,
    pub total_energy: f64,
    pub center_value: f64,
    pub total_heat: f64,
    pub boundary_energy: f64,
    pub final_field: Field,
}

impl RunMetrics {
    pub fn from_field(final_field: Field) -> Self {
        Self {
            max_value: final_field.max(),
            min_value: final_field.min(),
            total_energy: final_field.energy(),
            center_value: final_field.center_value(),
            total_heat: final_field.sum(),
            boundary_energy: final_field.boundary_energy(),
            final_field,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::MaxValue => self.max_value,
            Metric::MinValue => self.min_value,
            Metric::TotalEnergy => self.total_energy,
            Metric::CenterValue => self.center_value,
            Metric::TotalHeat => self.total_heat,
            Metric::BoundaryEnergy => self.boundary_energy,
        }
    }
}

// =================================================================================================
// Sample Outcome
// =================================================================================================

/// Result of one sample, successful or not
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Parameters varied for this sample, in sweep order
    pub values: Vec<(String, f64)>,

    /// Requested number of steps
    pub steps: usize,

    pub result: Result<RunMetrics>,
}

impl SampleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn metrics(&self) -> Option<&RunMetrics> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SimulationError> {
        self.result.as_ref().err()
    }

    /// Value of a varied parameter
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(varied, _)| varied == name)
            .map(|(_, value)| *value)
    }

    /// One metric, `None` for a failed sample
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics().map(|metrics| metrics.get(metric))
    }
}

// =================================================================================================
// Sweep Result
// =================================================================================================

/// Outcomes of a one-parameter sweep, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub parameter: String,
    pub values: Vec<f64>,
    pub outcomes: Vec<SampleOutcome>,
}

impl SweepResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SampleOutcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleOutcome> {
        self.outcomes.iter()
    }

    /// First outcome whose swept value equals `value`
    pub fn find(&self, value: f64) -> Option<&SampleOutcome> {
        self.values
            .iter()
            .position(|&v| v == value)
            .and_then(|index| self.outcomes.get(index))
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }

    /// One metric per sample, `None` where the sample failed
    pub fn metric_series(&self, metric: Metric) -> Vec<Option<f64>> {
        self.outcomes.iter().map(|o| o.metric(metric)).collect()
    }
}

// =================================================================================================
// Grid Result
// =================================================================================================

/// Outcomes of a two-parameter grid
///
/// Stored row-major: `values_a` varies slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    pub parameters: (String, String),
    pub values_a: Vec<f64>,
    pub values_b: Vec<f64>,
    pub outcomes: Vec<SampleOutcome>,
}

impl GridResult {
    /// `(values_a.len(), values_b.len())`
    pub fn shape(&self) -> (usize, usize) {
        (self.values_a.len(), self.values_b.len())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for `(values_a[i], values_b[j])`
    pub fn get(&self, i: usize, j: usize) -> Option<&SampleOutcome> {
        if i >= self.values_a.len() || j >= self.values_b.len() {
            return None;
        }
        self.outcomes.get(i * self.values_b.len() + j)
    }

    /// Outcome for a pair of values
    pub fn get_by_values(&self, a: f64, b: f64) -> Option<&SampleOutcome> {
        let i = self.values_a.iter().position(|&v| v == a)?;
        let j = self.values_b.iter().position(|&v| v == b)?;
        self.get(i, j)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleOutcome> {
        self.outcomes.iter()
    }

    /// Matrix of one metric, `NaN` where the sample failed
    pub fn metric_matrix(&self, metric: Metric) -> DMatrix<f64> {
        let (rows, cols) = self.shape();
        DMatrix::from_fn(rows, cols, |i, j| {
            self.get(i, j)
                .and_then(|outcome| outcome.metric(metric))
                .unwrap_or(f64::NAN)
        })
    }
}

// =================================================================================================
// Landscape
// =================================================================================================

/// One metric sampled over a regular two-parameter grid
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    pub parameters: (String, String),
    pub axis_a: Vec<f64>,
    pub axis_b: Vec<f64>,
    pub metric: Metric,
    /// `values[(i, j)]` is the metric at `(axis_a[i], axis_b[j])`, `NaN` for
    /// failed samples
    pub values: DMatrix<f64>,
}

impl Landscape {
    /// Largest finite value with its coordinates `(a, b, value)`
    pub fn peak(&self) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for i in 0..self.values.nrows() {
            for j in 0..self.values.ncols() {
                let value = self.values[(i, j)];
                if !value.is_finite() {
                    continue;
                }
                if best.is_none_or(|(_, _, current)| value > current) {
                    best = Some((self.axis_a[i], self.axis_b[j], value));
                }
            }
        }
        best
    }

    /// Number of cells whose sample failed
    pub fn failed_cells(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(value: f64, result: Result<RunMetrics>) -> SampleOutcome {
        SampleOutcome {
            values: vec![("alpha".to_string(), value)],
            steps: 10,
            result,
        }
    }

    fn metrics(scale: f64) -> RunMetrics {
        RunMetrics::from_field(Field::from_element((3, 3), scale).unwrap())
    }

    #[test]
    fn test_metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert!("entropy".parse::<Metric>().is_err());
    }

    #[test]
    fn test_run_metrics_from_field() {
        let field = Field::from_row_slice((3, 3), &[0., 1., 0., 1., 4., 1., 0., 1., 0.]).unwrap();
        let metrics = RunMetrics::from_field(field);

        assert_eq!(metrics.max_value, 4.0);
        assert_eq!(metrics.min_value, 0.0);
        assert_eq!(metrics.total_energy, 20.0);
        assert_eq!(metrics.center_value, 4.0);
        assert_eq!(metrics.total_heat, 8.0);
        assert_eq!(metrics.boundary_energy, 4.0);
        assert_eq!(metrics.get(Metric::TotalHeat), 8.0);
    }

    #[test]
    fn test_sweep_queries() {
        let sweep = SweepResult {
            parameter: "alpha".into(),
            values: vec![0.1, 0.2, 0.3],
            outcomes: vec![
                outcome(0.1, Ok(metrics(1.0))),
                outcome(0.2, Err(SimulationError::Cancelled)),
                outcome(0.3, Ok(metrics(2.0))),
            ],
        };

        assert_eq!(sweep.successes(), 2);
        assert_eq!(sweep.failures(), 1);
        assert_eq!(
            sweep.metric_series(Metric::MaxValue),
            vec![Some(1.0), None, Some(2.0)]
        );
        assert_eq!(sweep.find(0.3).unwrap().value("alpha"), Some(0.3));
        assert_eq!(sweep.find(0.2).unwrap().error(), Some(&SimulationError::Cancelled));
        assert!(sweep.find(0.4).is_none());
    }

    #[test]
    fn test_grid_indexing() {
        let values_a = vec![1.0, 2.0];
        let values_b = vec![10.0, 20.0, 30.0];
        let mut outcomes = Vec::new();
        for &a in &values_a {
            for &b in &values_b {
                let result = if a == 2.0 && b == 30.0 {
                    Err(SimulationError::Cancelled)
                } else {
                    Ok(metrics(a * b))
                };
                outcomes.push(SampleOutcome {
                    values: vec![("a".into(), a), ("b".into(), b)],
                    steps: 1,
                    result,
                });
            }
        }

        let grid = GridResult {
            parameters: ("a".into(), "b".into()),
            values_a,
            values_b,
            outcomes,
        };

        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(1, 0).unwrap().value("b"), Some(10.0));
        assert_eq!(grid.get_by_values(1.0, 20.0).unwrap().metric(Metric::MaxValue), Some(20.0));
        assert!(grid.get(2, 0).is_none());

        let matrix = grid.metric_matrix(Metric::MaxValue);
        assert_eq!(matrix[(0, 2)], 30.0);
        assert!(matrix[(1, 2)].is_nan());
    }

    #[test]
    fn test_landscape_peak_skips_nan() {
        let landscape = Landscape {
            parameters: ("a".into(), "b".into()),
            axis_a: vec![0.0, 1.0],
            axis_b: vec![5.0, 6.0],
            metric: Metric::TotalEnergy,
            values: DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 3.0, 2.0]),
        };

        assert_eq!(landscape.peak(), Some((1.0, 5.0, 3.0)));
        assert_eq!(landscape.failed_cells(), 1);
    }

    #[test]
    fn test_metric_serde() {
        let json = serde_json::to_string(&Metric::TotalEnergy).unwrap();
        assert_eq!(json, "\"total_energy\"");
    }
}
