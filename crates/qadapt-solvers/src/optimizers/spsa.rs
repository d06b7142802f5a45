//! SPSA (Simultaneous Perturbation Stochastic Approximation).
//!
//! Estimates the full gradient from two evaluations per iteration regardless
//! of dimension, which makes it the usual choice with the shot backend.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{OptimizationResult, Optimizer, OptimizerStatus, sanitize};

/// SPSA optimizer configuration.
///
/// Gains follow the standard schedule `a_k = a / (k + 1 + A)^alpha` and
/// `c_k = c / (k + 1)^gamma`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spsa {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Step size numerator.
    pub a: f64,
    /// Perturbation size.
    pub c: f64,
    /// Learning rate decay parameter.
    pub alpha: f64,
    /// Perturbation decay parameter.
    pub gamma: f64,
    /// Stability constant `A`.
    pub stability: f64,
    /// Seed of the perturbation RNG.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 200,
            a: 0.2,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            stability: 10.0,
            seed: 42,
        }
    }
}

impl Spsa {
    /// Create a new SPSA optimizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the perturbation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Optimizer for Spsa {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut x = initial_params;
        let mut f_x = sanitize(objective(&x));
        let mut history = vec![f_x];
        let mut num_evaluations = 1;

        if n == 0 || !f_x.is_finite() {
            let status = if f_x.is_finite() {
                OptimizerStatus::Converged
            } else {
                OptimizerStatus::NonFiniteObjective
            };
            return OptimizationResult {
                optimal_params: x,
                optimal_value: f_x,
                num_evaluations,
                num_iterations: 0,
                history,
                status,
            };
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best_x = x.clone();
        let mut best_f = f_x;

        for k in 0..self.maxiter {
            let a_k = self.a / (k as f64 + 1.0 + self.stability).powf(self.alpha);
            let c_k = self.c / (k as f64 + 1.0).powf(self.gamma);

            // Bernoulli ±1 perturbation
            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();

            let x_plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi + c_k * di).collect();
            let x_minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi - c_k * di).collect();

            let f_plus = sanitize(objective(&x_plus));
            let f_minus = sanitize(objective(&x_minus));
            num_evaluations += 2;

            let diff = f_plus - f_minus;
            if !diff.is_finite() {
                continue;
            }
            for (xi, di) in x.iter_mut().zip(&delta) {
                *xi -= a_k * diff / (2.0 * c_k * di);
            }

            f_x = sanitize(objective(&x));
            num_evaluations += 1;
            if f_x < best_f {
                best_f = f_x;
                best_x.clone_from(&x);
            }
            history.push(best_f);
        }

        OptimizationResult {
            optimal_params: best_x,
            optimal_value: best_f,
            num_evaluations,
            num_iterations: self.maxiter,
            history,
            status: OptimizerStatus::MaxIterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(p: &[f64]) -> f64 {
        (p[0] - 0.3).powi(2) + (p[1] + 0.2).powi(2)
    }

    #[test]
    fn test_spsa_descends() {
        let result = Spsa::new().with_maxiter(300).minimize(bowl, vec![1.0, 1.0]);
        assert!(result.optimal_value < 0.05);
        assert_eq!(result.num_evaluations, 1 + 3 * 300);
        assert_eq!(result.status, OptimizerStatus::MaxIterations);
    }

    #[test]
    fn test_spsa_is_reproducible() {
        let a = Spsa::new().with_seed(7).minimize(bowl, vec![0.0, 0.0]);
        let b = Spsa::new().with_seed(7).minimize(bowl, vec![0.0, 0.0]);
        assert_eq!(a.optimal_params, b.optimal_params);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_spsa_history_is_monotone() {
        let result = Spsa::new().minimize(bowl, vec![2.0, -2.0]);
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
    }
}
