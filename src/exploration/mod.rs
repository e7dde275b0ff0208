//! Batched parameter exploration
//!
//! The exploration engine runs many independent [`PdeSolver`] instances,
//! one per parameter combination, and collects per-run metrics. The solver
//! is a black box here: each sample builds its own solver from the shared
//! base configuration, so no two samples share mutable state.
//!
//! # Failure Isolation
//!
//! A sample that fails (an unstable value, a diverging run, a cancelled
//! sweep) is recorded as an error next to the successful samples. The caller
//! always receives exactly one [`SampleOutcome`] per input, in input order.
//! Only misuse of the sweep itself (no initial field, an unknown parameter
//! name) fails the whole call.
//!
//! # Concurrency
//!
//! With the `parallel` feature, samples are spread over the Rayon pool and
//! collected back in input order. Cancellation is coarse: a sample that has
//! not started when the [`CancellationToken`] is set is recorded as
//! `Cancelled`, but a running sample always finishes.
//!
//! # Example
//!
//! ```rust
//! use pde_rs::exploration::{Metric, ParameterExplorer, SweepOptions};
//! use pde_rs::physics::{EquationType, InitialCondition};
//!
//! let mut explorer = ParameterExplorer::new(EquationType::Heat, (16, 16)).unwrap();
//! explorer
//!     .set_initial_condition(&InitialCondition::gaussian_pulse((8.0, 8.0), 2.0, 1.0))
//!     .unwrap();
//!
//! let sweep = explorer
//!     .parameter_sweep("alpha", &[0.5, 1.0, 5.0], &SweepOptions::new().steps(20))
//!     .unwrap();
//!
//! assert_eq!(sweep.len(), 3);
//! assert!(sweep.outcomes[2].error().is_some()); // α·dt·2 = 1.0 > 0.5
//! let peaks = sweep.metric_series(Metric::MaxValue);
//! assert!(peaks[1] < peaks[0]);
//! ```
//!
//! [`PdeSolver`]: crate::solver::PdeSolver

// module declaration
pub mod explorer;
pub mod metrics;
pub mod sensitivity;

// re-export commonly used types for convenience
pub use explorer::{ExplorerConfig, ParameterExplorer, SweepOptions};
pub use metrics::{GridResult, Landscape, Metric, RunMetrics, SampleOutcome, SweepResult};
pub use sensitivity::{SensitivityReport, Slope, finite_difference_slopes, sensitivity_coefficient};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// =================================================================================================
// Cancellation
// =================================================================================================

/// Shared flag that stops a sweep between samples
///
/// Clones share the same flag.
///
/// ```rust
/// use pde_rs::exploration::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// =================================================================================================
// Helper Functions
// =================================================================================================

/// `n` evenly spaced values from `start` to `end`, both included
///
/// `n = 0` gives an empty vector and `n = 1` gives `[start]`. The last value
/// is exactly `end`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|k| if k + 1 == n { end } else { start + k as f64 * step })
                .collect()
        }
    }
}

/// Map `f` over `items`, on the Rayon pool, preserving order
#[cfg(feature = "parallel")]
pub(crate) fn fan_out<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(f).collect()
}

/// Map `f` over `items` sequentially
#[cfg(not(feature = "parallel"))]
pub(crate) fn fan_out<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.iter().map(f).collect()
}

// =================================================================================================
// Tests
// =================================================================================================
