//! BFGS quasi-Newton optimizer with finite-difference gradients.
//!
//! The inverse Hessian approximation starts at the identity and receives the
//! standard rank-two update whenever the curvature condition `sᵀy > 0`
//! holds.  Steps come from a backtracking line search with the Armijo
//! sufficient-decrease condition; if no acceptable step is found the run ends
//! with [`OptimizerStatus::LineSearchFailed`] at the last accepted point.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{OptimizationResult, Optimizer, OptimizerStatus, sanitize};

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// BFGS optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bfgs {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Stop when the infinity norm of the gradient falls below this.
    pub gtol: f64,
    /// Central finite-difference step.
    pub fd_step: f64,
    /// Largest parameter change allowed in a single step.
    pub max_step: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            maxiter: 200,
            gtol: 1e-6,
            fd_step: 1e-5,
            max_step: 1.0,
        }
    }
}

impl Bfgs {
    /// Create a new BFGS optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }
}

fn gradient<F>(objective: &mut F, x: &Array1<f64>, h: f64, evals: &mut usize) -> Array1<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    let mut g = Array1::zeros(x.len());
    let mut probe = x.to_vec();
    for i in 0..x.len() {
        probe[i] = x[i] + h;
        let f_plus = sanitize(objective(&probe));
        probe[i] = x[i] - h;
        let f_minus = sanitize(objective(&probe));
        probe[i] = x[i];
        *evals += 2;
        g[i] = (f_plus - f_minus) / (2.0 * h);
    }
    g
}

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

impl Optimizer for Bfgs {
    fn minimize<F>(&self, mut objective: F, initial_params: Vec<f64>) -> OptimizationResult
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial_params.len();
        let mut x = Array1::from(initial_params);
        let mut f_x = sanitize(objective(x.as_slice().unwrap_or(&[])));
        let mut num_evaluations = 1;
        let mut history = vec![f_x];

        let done = |x: Array1<f64>, f_x, evals, iters, history, status| OptimizationResult {
            optimal_params: x.to_vec(),
            optimal_value: f_x,
            num_evaluations: evals,
            num_iterations: iters,
            history,
            status,
        };

        if !f_x.is_finite() {
            return done(x, f_x, num_evaluations, 0, history, OptimizerStatus::NonFiniteObjective);
        }
        if n == 0 {
            return done(x, f_x, num_evaluations, 0, history, OptimizerStatus::Converged);
        }

        let mut g = gradient(&mut objective, &x, self.fd_step, &mut num_evaluations);
        if !g.iter().all(|v| v.is_finite()) {
            return done(x, f_x, num_evaluations, 0, history, OptimizerStatus::NonFiniteObjective);
        }
        let mut h_inv: Array2<f64> = Array2::eye(n);
        let mut status = OptimizerStatus::MaxIterations;
        let mut num_iterations = 0;

        for _ in 0..self.maxiter {
            if inf_norm(&g) < self.gtol {
                status = OptimizerStatus::Converged;
                break;
            }
            num_iterations += 1;

            let mut p = -h_inv.dot(&g);
            let mut slope = g.dot(&p);
            if slope >= 0.0 {
                // Not a descent direction: restart from steepest descent.
                h_inv = Array2::eye(n);
                p = -g.clone();
                slope = g.dot(&p);
            }

            let p_norm = inf_norm(&p);
            let mut alpha = if p_norm > self.max_step {
                self.max_step / p_norm
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial = &x + &(alpha * &p);
                let f_trial = sanitize(objective(trial.as_slice().unwrap_or(&[])));
                num_evaluations += 1;
                if f_trial <= f_x + ARMIJO_C1 * alpha * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }

            let Some((x_new, f_new)) = accepted else {
                trace!(iteration = num_iterations, f_x, "line search failed");
                status = OptimizerStatus::LineSearchFailed;
                break;
            };

            let g_new = gradient(&mut objective, &x_new, self.fd_step, &mut num_evaluations);
            if !g_new.iter().all(|v| v.is_finite()) {
                x = x_new;
                f_x = f_new;
                history.push(f_x);
                status = OptimizerStatus::NonFiniteObjective;
                break;
            }
            let s = &x_new - &x;
            let y = &g_new - &g;
            let sy = s.dot(&y);
            if sy > 1e-12 {
                // H⁺ = (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ
                let rho = 1.0 / sy;
                let hy = h_inv.dot(&y);
                let yhy = y.dot(&hy);
                for i in 0..n {
                    for j in 0..n {
                        h_inv[[i, j]] += -rho * (hy[i] * s[j] + s[i] * hy[j])
                            + (rho * rho * yhy + rho) * s[i] * s[j];
                    }
                }
            }

            let improvement = f_x - f_new;
            x = x_new;
            f_x = f_new;
            g = g_new;
            history.push(f_x);

            if improvement.abs() < f64::EPSILON * (1.0 + f_x.abs()) && inf_norm(&s) < 1e-12 {
                status = OptimizerStatus::Converged;
                break;
            }
        }

        done(x, f_x, num_evaluations, num_iterations, history, status)
    }
}
