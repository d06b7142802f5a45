//! COBYLA-style derivative-free optimizer.
//!
//! A simplex search whose steps are bounded by a shrinking trust-region
//! radius `rho`, in the spirit of COBYLA (Constrained Optimization BY Linear
//! Approximation).  Suitable for noisy expectation values where gradients
//! are expensive.

use serde::{Deserialize, Serialize};

use super::{OptimizationResult, Optimizer, OptimizerStatus};

/// COBYLA optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cobyla {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Convergence tolerance on the simplex value spread.
    pub tol: f64,
    /// Initial trust region radius.
    pub rhobeg: f64,
    /// Final trust region radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 500,
            tol: 1e-8,
            rhobeg: 0.5,
            rhoend: 1e-5,
        }
    }
}

impl Cobyla {
    /// Create a new COBYLA optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set trust region parameters.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

impl Optimizer for Cobyla {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let x = initial_params;
        let f_x0 = super::sanitize(objective(&x));
        let mut history = vec![f_x0];
        let mut num_evaluations = 1;

        if n == 0 || !f_x0.is_finite() {
            let status = if f_x0.is_finite() {
                OptimizerStatus::Converged
            } else {
                OptimizerStatus::NonFiniteObjective
            };
            return OptimizationResult {
                optimal_params: x,
                optimal_value: f_x0,
                num_evaluations,
                num_iterations: 0,
                history,
                status,
            };
        }

        // Initialize simplex
        let mut simplex: Vec<Vec<f64>> = vec![x.clone()];
        let mut f_simplex: Vec<f64> = vec![f_x0];
        for i in 0..n {
            let mut point = x.clone();
            point[i] += self.rhobeg;
            f_simplex.push(super::sanitize(objective(&point)));
            num_evaluations += 1;
            simplex.push(point);
        }

        let mut f_best = f_x0;
        let mut rho = self.rhobeg;
        let mut status = OptimizerStatus::MaxIterations;
        let mut num_iterations = 0;

        for _ in 0..self.maxiter {
            num_iterations += 1;

            // Sort simplex by function value
            let mut indices: Vec<usize> = (0..=n).collect();
            indices.sort_by(|&a, &b| f_simplex[a].total_cmp(&f_simplex[b]));

            let best_idx = indices[0];
            let worst_idx = indices[n];

            let spread = f_simplex[worst_idx] - f_simplex[best_idx];
            if spread < self.tol && rho <= self.rhoend {
                status = OptimizerStatus::Converged;
                break;
            }

            // Contract the trust region and rebuild the simplex around the best point
            if spread < self.tol {
                rho = (rho * 0.5).max(self.rhoend);

                let best = simplex[best_idx].clone();
                let f_best_vertex = f_simplex[best_idx];
                simplex = vec![best.clone()];
                f_simplex = vec![f_best_vertex];

                for i in 0..n {
                    let mut point = best.clone();
                    point[i] += rho;
                    f_simplex.push(super::sanitize(objective(&point)));
                    num_evaluations += 1;
                    simplex.push(point);
                }
                continue;
            }

            // Centroid of all points except worst
            let mut centroid = vec![0.0; n];
            for &idx in &indices[..n] {
                for (c, v) in centroid.iter_mut().zip(&simplex[idx]) {
                    *c += v;
                }
            }
            for val in &mut centroid {
                *val /= n as f64;
            }

            // Reflection, step bounded by the trust radius
            let reflected: Vec<f64> = centroid
                .iter()
                .zip(&simplex[worst_idx])
                .map(|(c, w)| {
                    let diff = c - w;
                    if diff.abs() > rho {
                        c + rho * diff.signum()
                    } else {
                        c + diff
                    }
                })
                .collect();
            let f_reflected = super::sanitize(objective(&reflected));
            num_evaluations += 1;

            if f_reflected < f_simplex[best_idx] {
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(&reflected)
                    .map(|(c, r)| c + 2.0 * (r - c))
                    .collect();
                let f_expanded = super::sanitize(objective(&expanded));
                num_evaluations += 1;

                if f_expanded < f_reflected {
                    simplex[worst_idx] = expanded;
                    f_simplex[worst_idx] = f_expanded;
                } else {
                    simplex[worst_idx] = reflected;
                    f_simplex[worst_idx] = f_reflected;
                }
            } else if f_reflected < f_simplex[indices[n - 1]] {
                simplex[worst_idx] = reflected;
                f_simplex[worst_idx] = f_reflected;
            } else {
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex[worst_idx])
                    .map(|(c, w)| 0.5 * (c + w))
                    .collect();
                let f_contracted = super::sanitize(objective(&contracted));
                num_evaluations += 1;

                if f_contracted < f_simplex[worst_idx] {
                    simplex[worst_idx] = contracted;
                    f_simplex[worst_idx] = f_contracted;
                } else {
                    // Shrink towards the best vertex
                    let best = simplex[best_idx].clone();
                    for i in 0..=n {
                        if i == best_idx {
                            continue;
                        }
                        for (v, b) in simplex[i].iter_mut().zip(&best) {
                            *v = 0.5 * (b + *v);
                        }
                        f_simplex[i] = super::sanitize(objective(&simplex[i]));
                        num_evaluations += 1;
                    }
                }
            }

            let min_idx = argmin(&f_simplex);
            if f_simplex[min_idx] < f_best {
                f_best = f_simplex[min_idx];
                history.push(f_best);
            }
        }

        let min_idx = argmin(&f_simplex);
        OptimizationResult {
            optimal_params: simplex[min_idx].clone(),
            optimal_value: f_simplex[min_idx],
            num_evaluations,
            num_iterations,
            history,
            status,
        }
    }
}
