//! Variational energy minimization over a fixed ansatz.

use qadapt_ops::QubitOperator;
use qadapt_sim::backend::ExpectationBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::ansatz::Ansatz;
use crate::error::{SolverError, SolverResult};
use crate::optimizers::{OptimizerKind, OptimizerStatus};

/// Result of a VQE run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VqeResult {
    /// Energy of `params`, from one evaluation after the optimizer stopped.
    pub energy: f64,
    /// Optimal parameters.
    pub params: Vec<f64>,
    /// Lowest objective value the optimizer saw.  On a sampling backend this
    /// is the minimum over many noisy estimates and is biased low.
    pub optimizer_energy: f64,
    /// Energy at the starting parameters.
    pub initial_energy: f64,
    /// Number of objective evaluations.
    pub num_evaluations: usize,
    /// Number of optimizer iterations.
    pub num_iterations: usize,
    /// Best energy after each iteration.
    pub energy_history: Vec<f64>,
    /// How the optimizer stopped.
    pub status: OptimizerStatus,
}

/// ⟨ψ(params)|H|ψ(params)⟩ for `ansatz`.
pub fn energy<B>(
    hamiltonian: &QubitOperator,
    ansatz: &Ansatz,
    params: &[f64],
    backend: &mut B,
) -> SolverResult<f64>
where
    B: ExpectationBackend + ?Sized,
{
    let circuit = ansatz.circuit_with(params)?;
    Ok(backend.expectation(&circuit, hamiltonian)?)
}

/// Minimizes the energy of a fixed ansatz topology.
#[derive(Debug, Clone, Default)]
pub struct VqeSolver {
    optimizer: OptimizerKind,
}

impl VqeSolver {
    /// Create a solver using `optimizer`.
    pub fn new(optimizer: impl Into<OptimizerKind>) -> Self {
        Self {
            optimizer: optimizer.into(),
        }
    }

    /// The configured optimizer.
    pub fn optimizer(&self) -> &OptimizerKind {
        &self.optimizer
    }

    /// Minimize ⟨H⟩ over the parameters of `ansatz`, starting from
    /// `initial_params`.
    ///
    /// The chosen parameters are evaluated once more after the optimizer
    /// stops and that value is reported as the energy.
    ///
    /// A backend error inside the objective stops further evaluations and
    /// is returned once the optimizer has finished.
    #[instrument(skip_all, fields(optimizer = self.optimizer.name(), n_params = initial_params.len()))]
    pub fn solve<B>(
        &self,
        hamiltonian: &QubitOperator,
        ansatz: &Ansatz,
        initial_params: Vec<f64>,
        backend: &mut B,
    ) -> SolverResult<VqeResult>
    where
        B: ExpectationBackend + ?Sized,
    {
        if initial_params.len() != ansatz.len() {
            return Err(SolverError::ParameterCount {
                expected: ansatz.len(),
                got: initial_params.len(),
            });
        }

        let mut failure: Option<SolverError> = None;
        let objective = |params: &[f64]| -> f64 {
            if failure.is_some() {
                return f64::INFINITY;
            }
            match energy(hamiltonian, ansatz, params, &mut *backend) {
                Ok(e) => e,
                Err(err) => {
                    failure = Some(err);
                    f64::INFINITY
                }
            }
        };

        let result = self.optimizer.minimize(objective, initial_params);
        if let Some(err) = failure {
            return Err(err);
        }

        let initial_energy = result.history.first().copied().unwrap_or(result.optimal_value);
        let final_energy = energy(hamiltonian, ansatz, &result.optimal_params, backend)?;
        debug!(
            energy = final_energy,
            optimizer_energy = result.optimal_value,
            initial_energy,
            evaluations = result.num_evaluations,
            status = %result.status,
            "vqe finished"
        );

        Ok(VqeResult {
            energy: final_energy,
            params: result.optimal_params,
            optimizer_energy: result.optimal_value,
            initial_energy,
            num_evaluations: result.num_evaluations,
            num_iterations: result.num_iterations,
            energy_history: result.history,
            status: result.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64;
    use qadapt_sim::backend::StatevectorBackend;

    use super::*;
    use crate::optimizers::Cobyla;

    #[test]
    fn test_single_rotation_reaches_minimum() {
        // H = Z0 from |0⟩: E(θ) = cos 2θ, minimum at θ = π/2.
        let h = QubitOperator::real_term("Z0".parse().unwrap(), 1.0);
        let mut ansatz = Ansatz::new(vec![false]);
        ansatz.append(QubitOperator::from_term("Y0".parse().unwrap(), Complex64::i()), None);

        let mut backend = StatevectorBackend::new();
        let result = VqeSolver::new(Cobyla::new())
            .solve(&h, &ansatz, vec![0.0], &mut backend)
            .unwrap();
        assert!((result.initial_energy - 1.0).abs() < 1e-12);
        assert!((result.energy + 1.0).abs() < 1e-6);
        assert!((result.energy - result.optimizer_energy).abs() < 1e-12);
    }

    #[test]
    fn test_backend_error_is_propagated() {
        // Observable wider than the register.
        let h = QubitOperator::real_term("Z3".parse().unwrap(), 1.0);
        let mut ansatz = Ansatz::new(vec![false]);
        ansatz.append(QubitOperator::from_term("Y0".parse().unwrap(), Complex64::i()), None);
        let err = VqeSolver::default()
            .solve(&h, &ansatz, vec![0.0], &mut StatevectorBackend::new())
            .unwrap_err();
        assert!(matches!(err, SolverError::Sim(_)));
    }
}
