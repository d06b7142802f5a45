//! Classical optimizers for the variational loop.
//!
//! All optimizers minimize a scalar objective `f: ℝⁿ → ℝ` from a starting
//! point and report the best point they evaluated.  Non-finite objective
//! values are treated as +∞ so a failing evaluation can never be selected.

mod bfgs;
mod cobyla;
mod spsa;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use bfgs::Bfgs;
pub use cobyla::Cobyla;
pub use spsa::Spsa;

/// Common interface of the classical optimizers.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64;
}

/// How an optimization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerStatus {
    /// Convergence criterion met.
    Converged,
    /// Iteration budget spent.
    MaxIterations,
    /// No step satisfying the sufficient-decrease condition was found.
    LineSearchFailed,
    /// The objective was not finite at the starting point.
    NonFiniteObjective,
}

impl OptimizerStatus {
    /// True for statuses that indicate a numerical failure rather than a
    /// normal stop.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            OptimizerStatus::LineSearchFailed | OptimizerStatus::NonFiniteObjective
        )
    }
}

impl fmt::Display for OptimizerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptimizerStatus::Converged => "converged",
            OptimizerStatus::MaxIterations => "max_iterations",
            OptimizerStatus::LineSearchFailed => "line_search_failed",
            OptimizerStatus::NonFiniteObjective => "non_finite_objective",
        };
        write!(f, "{s}")
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// History of best objective values.
    pub history: Vec<f64>,
    /// Termination status.
    pub status: OptimizerStatus,
}

impl OptimizationResult {
    /// Whether the optimization converged.
    pub fn converged(&self) -> bool {
        self.status == OptimizerStatus::Converged
    }
}

/// Map NaN to +∞ so comparisons stay total and failures lose.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_nan() { f64::INFINITY } else { value }
}

/// Serializable optimizer selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Derivative-free trust-region simplex.
    Cobyla(Cobyla),
    /// Quasi-Newton with finite-difference gradients.
    Bfgs(Bfgs),
    /// Simultaneous perturbation stochastic approximation.
    Spsa(Spsa),
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Bfgs(Bfgs::default())
    }
}

impl OptimizerKind {
    /// Name of the selected optimizer.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Cobyla(_) => "cobyla",
            OptimizerKind::Bfgs(_) => "bfgs",
            OptimizerKind::Spsa(_) => "spsa",
        }
    }

    /// Run the selected optimizer.
    ///
    /// The returned point is never worse than the best point the optimizer
    /// evaluated, including `initial_params` itself.
    pub fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut best: Option<(Vec<f64>, f64)> = None;
        let tracked = |x: &[f64]| -> f64 {
            let value = sanitize(objective(x));
            if best.as_ref().is_none_or(|(_, b)| value < *b) {
                best = Some((x.to_vec(), value));
            }
            value
        };

        let mut result = match self {
            OptimizerKind::Cobyla(o) => o.minimize(tracked, initial_params),
            OptimizerKind::Bfgs(o) => o.minimize(tracked, initial_params),
            OptimizerKind::Spsa(o) => o.minimize(tracked, initial_params),
        };

        if let Some((params, value)) = best {
            if value < result.optimal_value {
                debug!(
                    reported = result.optimal_value,
                    best = value,
                    "optimizer returned a worse point than it evaluated; using best"
                );
                result.optimal_params = params;
                result.optimal_value = value;
            }
        }
        result
    }
}

impl From<Cobyla> for OptimizerKind {
    fn from(o: Cobyla) -> Self {
        OptimizerKind::Cobyla(o)
    }
}

impl From<Bfgs> for OptimizerKind {
    fn from(o: Bfgs) -> Self {
        OptimizerKind::Bfgs(o)
    }
}

impl From<Spsa> for OptimizerKind {
    fn from(o: Spsa) -> Self {
        OptimizerKind::Spsa(o)
    }
}
