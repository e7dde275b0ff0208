//! Sensitivity metrics derived from a finished sweep
//!
//! Nothing here runs a simulation: every quantity is computed from the
//! outcomes already collected in a [`SweepResult`].

use std::collections::BTreeMap;

use crate::exploration::{Metric, SweepResult};

/// Finite-difference slope between two adjacent successful samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slope {
    pub from: f64,
    pub to: f64,
    pub slope: f64,
}

/// Slopes of `metric` between adjacent successful samples, in sweep order
///
/// Failed samples are skipped, so the slope spans the gap around them.
/// Pairs with equal parameter values give no slope.
pub fn finite_difference_slopes(sweep: &SweepResult, metric: Metric) -> Vec<Slope> {
    let points: Vec<(f64, f64)> = sweep
        .values
        .iter()
        .zip(&sweep.outcomes)
        .filter_map(|(&x, outcome)| outcome.metric(metric).map(|y| (x, y)))
        .collect();

    points
        .windows(2)
        .filter(|pair| pair[1].0 != pair[0].0)
        .map(|pair| Slope {
            from: pair[0].0,
            to: pair[1].0,
            slope: (pair[1].1 - pair[0].1) / (pair[1].0 - pair[0].0),
        })
        .collect()
}

/// Normalised sensitivity `mean |slope| · base / |metric(base)|`
///
/// `metric(base)` is read from the successful sample closest to `base`.
/// `None` when there is no slope, or when that reference value is zero or
/// not finite.
pub fn sensitivity_coefficient(sweep: &SweepResult, metric: Metric, base: f64) -> Option<f64> {
    let slopes = finite_difference_slopes(sweep, metric);
    if slopes.is_empty() {
        return None;
    }
    let mean_slope = slopes.iter().map(|s| s.slope.abs()).sum::<f64>() / slopes.len() as f64;

    let reference = sweep
        .values
        .iter()
        .zip(&sweep.outcomes)
        .filter_map(|(&x, outcome)| outcome.metric(metric).map(|y| ((x - base).abs(), y)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, y)| y)?;

    if reference == 0.0 || !reference.is_finite() {
        return None;
    }

    let coefficient = mean_slope * base / reference.abs();
    coefficient.is_finite().then_some(coefficient)
}

// =================================================================================================
// Sensitivity Report
// =================================================================================================

/// Sweep around a base value with the derived sensitivities
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityReport {
    pub parameter: String,
    pub base_value: f64,
    pub perturbation_percent: f64,
    pub sweep: SweepResult,
    /// Coefficient per metric; metrics without a defined coefficient are absent
    pub coefficients: BTreeMap<Metric, f64>,
}

impl SensitivityReport {
    pub fn from_sweep(sweep: SweepResult, base_value: f64, perturbation_percent: f64) -> Self {
        let coefficients = Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                sensitivity_coefficient(&sweep, metric, base_value).map(|c| (metric, c))
            })
            .collect();

        Self {
            parameter: sweep.parameter.clone(),
            base_value,
            perturbation_percent,
            sweep,
            coefficients,
        }
    }

    pub fn coefficient(&self, metric: Metric) -> Option<f64> {
        self.coefficients.get(&metric).copied()
    }

    pub fn slopes(&self, metric: Metric) -> Vec<Slope> {
        finite_difference_slopes(&self.sweep, metric)
    }

    /// Metric with the largest coefficient
    pub fn most_sensitive(&self) -> Option<(Metric, f64)> {
        self.coefficients
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(metric, c)| (*metric, *c))
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::exploration::{RunMetrics, SampleOutcome};
    use crate::physics::Field;
    use approx::assert_relative_eq;

    /// Sweep where every metric of the uniform final field equals `f(x)` or a
    /// multiple of it
    fn sweep_of<F: Fn(f64) -> f64>(values: &[f64], f: F, failing: Option<usize>) -> SweepResult {
        let outcomes = values
            .iter()
            .enumerate()
            .map(|(k, &x)| SampleOutcome {
                values: vec![("c".into(), x)],
                steps: 1,
                result: if Some(k) == failing {
                    Err(SimulationError::Cancelled)
                } else {
                    Ok(RunMetrics::from_field(Field::from_element((3, 3), f(x)).unwrap()))
                },
            })
            .collect();

        SweepResult {
            parameter: "c".into(),
            values: values.to_vec(),
            outcomes,
        }
    }

    #[test]
    fn test_slopes_of_linear_metric() {
        let sweep = sweep_of(&[1.0, 2.0, 4.0], |x| 3.0 * x + 1.0, None);
        let slopes = finite_difference_slopes(&sweep, Metric::MaxValue);

        assert_eq!(slopes.len(), 2);
        assert_relative_eq!(slopes[0].slope, 3.0);
        assert_relative_eq!(slopes[1].slope, 3.0);
        assert_eq!((slopes[1].from, slopes[1].to), (2.0, 4.0));
    }

    #[test]
    fn test_slopes_skip_failed_samples() {
        let sweep = sweep_of(&[1.0, 2.0, 3.0], |x| x * x, Some(1));
        let slopes = finite_difference_slopes(&sweep, Metric::MaxValue);

        assert_eq!(slopes.len(), 1);
        assert_eq!((slopes[0].from, slopes[0].to), (1.0, 3.0));
        assert_relative_eq!(slopes[0].slope, 4.0);
    }

    #[test]
    fn test_coefficient_of_power_law() {
        // y = x² has elasticity 2 at any base
        let values = [0.99, 1.0, 1.01];
        let sweep = sweep_of(&values, |x| x * x, None);
        let coefficient = sensitivity_coefficient(&sweep, Metric::MaxValue, 1.0).unwrap();
        assert_relative_eq!(coefficient, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_coefficient_undefined_for_zero_reference() {
        let sweep = sweep_of(&[-1.0, 0.0, 1.0], |x| x, None);
        assert!(sensitivity_coefficient(&sweep, Metric::MaxValue, 0.0).is_none());
    }

    #[test]
    fn test_report() {
        let sweep = sweep_of(&[0.5, 1.0, 1.5], |x| 2.0 * x, None);
        let report = SensitivityReport::from_sweep(sweep, 1.0, 50.0);

        // MaxValue = 2x: slope 2, reference 2, coefficient 1
        assert_relative_eq!(report.coefficient(Metric::MaxValue).unwrap(), 1.0, epsilon = 1e-12);
        // Squared metrics have elasticity 2
        assert_relative_eq!(report.coefficient(Metric::TotalEnergy).unwrap(), 2.0, epsilon = 1e-9);
        let (_, top) = report.most_sensitive().unwrap();
        assert_relative_eq!(top, 2.0, epsilon = 1e-9);
        assert_eq!(report.parameter, "c");
        assert_eq!(report.slopes(Metric::MinValue).len(), 2);
    }
}
