//! Pool ranking by energy gradient.
//!
//! Appending `A_i` with parameter θ to the ansatz state |ψ⟩ gives
//! `E(θ) = ⟨ψ|e^{−θA_i} H e^{θA_i}|ψ⟩`, so `dE/dθ|₀ = ⟨ψ|[H, A_i]|ψ⟩`.

use qadapt_ops::QubitOperator;
use qadapt_ops::operator::DEFAULT_TOLERANCE;
use qadapt_sim::backend::ExpectationBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ansatz::Ansatz;
use crate::error::{SolverError, SolverResult};
use crate::pool::OperatorPool;

/// Default central-difference step.
pub const DEFAULT_FD_STEP: f64 = 1e-3;

fn default_fd_step() -> f64 {
    DEFAULT_FD_STEP
}

/// How gradients are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GradientMethod {
    /// Expectation of the cached commutator `[H, A_i]`.
    #[default]
    Commutator,
    /// `(E(+h) − E(−h)) / 2h` with `A_i` appended.
    FiniteDifference {
        /// Step `h`.
        #[serde(default = "default_fd_step")]
        step: f64,
    },
}

impl GradientMethod {
    /// Short name.
    pub fn name(&self) -> &'static str {
        match self {
            GradientMethod::Commutator => "commutator",
            GradientMethod::FiniteDifference { .. } => "finite_difference",
        }
    }
}

/// Gradients of one ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Signed gradient per pool index.
    pub gradients: Vec<f64>,
    /// Index with the largest |g|; lowest index on ties.  `None` for an
    /// empty pool.
    pub best: Option<usize>,
    /// `|g[best]|`, or 0 for an empty pool.
    pub max_gradient: f64,
}

impl Ranking {
    /// Select the largest |g|, scanning in pool order with strict `>`.
    pub fn from_gradients(gradients: Vec<f64>) -> Self {
        let mut best = None;
        let mut max_gradient = f64::NEG_INFINITY;
        for (i, g) in gradients.iter().enumerate() {
            if g.abs() > max_gradient {
                max_gradient = g.abs();
                best = Some(i);
            }
        }
        Self {
            gradients,
            best,
            max_gradient: if best.is_some() { max_gradient } else { 0.0 },
        }
    }

    /// Signed gradient of the winner.
    pub fn best_gradient(&self) -> Option<f64> {
        self.best.map(|i| self.gradients[i])
    }
}

/// Scores every pool generator against a fixed ansatz.
///
/// The ranker owns the Hamiltonian and pool it was prepared for, so cached
/// commutators can never be paired with a different operator.
#[derive(Debug, Clone)]
pub struct GradientRanker {
    method: GradientMethod,
    hamiltonian: QubitOperator,
    pool: OperatorPool,
    commutators: Vec<QubitOperator>,
}

impl GradientRanker {
    /// Prepare a ranker.  With [`GradientMethod::Commutator`] every `[H, A_i]`
    /// is built here, once.
    pub fn new(method: GradientMethod, hamiltonian: &QubitOperator, pool: OperatorPool) -> Self {
        let commutators: Vec<QubitOperator> = match method {
            GradientMethod::Commutator => pool
                .iter()
                .map(|a| hamiltonian.commutator(a).simplify(DEFAULT_TOLERANCE))
                .collect(),
            GradientMethod::FiniteDifference { .. } => Vec::new(),
        };
        debug!(
            method = method.name(),
            pool_size = pool.len(),
            commutator_terms = commutators.iter().map(QubitOperator::n_terms).sum::<usize>(),
            "prepared gradient ranker"
        );
        Self {
            method,
            hamiltonian: hamiltonian.clone(),
            pool,
            commutators,
        }
    }

    /// Gradient method in use.
    pub fn method(&self) -> GradientMethod {
        self.method
    }

    /// The Hamiltonian gradients are taken of.
    pub fn hamiltonian(&self) -> &QubitOperator {
        &self.hamiltonian
    }

    /// The pool being ranked.
    pub fn pool(&self) -> &OperatorPool {
        &self.pool
    }

    /// Cached commutators (empty for finite differences).
    pub fn commutators(&self) -> &[QubitOperator] {
        &self.commutators
    }

    /// Rank the pool at the current parameters of `ansatz`.
    pub fn rank<B>(&self, ansatz: &Ansatz, backend: &mut B) -> SolverResult<Ranking>
    where
        B: ExpectationBackend + ?Sized,
    {
        if self.pool.is_empty() {
            return Ok(Ranking::from_gradients(Vec::new()));
        }

        let gradients = match self.method {
            GradientMethod::Commutator => {
                let circuit = ansatz.build_circuit()?;
                let observables: Vec<&QubitOperator> = self.commutators.iter().collect();
                backend.expectations(&circuit, &observables)?
            }
            GradientMethod::FiniteDifference { step } => {
                let mut out = Vec::with_capacity(self.pool.len());
                for generator in &self.pool {
                    let plus = ansatz.circuit_with_extra(generator, step)?;
                    let minus = ansatz.circuit_with_extra(generator, -step)?;
                    let e_plus = backend.expectation(&plus, &self.hamiltonian)?;
                    let e_minus = backend.expectation(&minus, &self.hamiltonian)?;
                    out.push((e_plus - e_minus) / (2.0 * step));
                }
                out
            }
        };

        if let Some((index, &value)) = gradients.iter().enumerate().find(|(_, g)| !g.is_finite()) {
            return Err(SolverError::NonFiniteGradient { index, value });
        }
        trace!(?gradients, "pool gradients");
        Ok(Ranking::from_gradients(gradients))
    }
}
