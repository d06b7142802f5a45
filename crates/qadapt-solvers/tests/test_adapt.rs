//! End-to-end tests for the ADAPT-VQE controller.

use std::collections::HashSet;

use num_complex::Complex64;
use qadapt_ops::QubitOperator;
use qadapt_sim::backend::{BackendKind, ExpectationBackend, StatevectorBackend};
use qadapt_sim::{Circuit, Gate, SimError, SimResult};
use qadapt_solvers::config::PoolKind;
use qadapt_solvers::gradient::GradientMethod;
use qadapt_solvers::problems::{self, h2_sto3g};
use qadapt_solvers::{
    AdaptOptions, AdaptSolver, AdaptState, Cobyla, OptimizerStatus, SolverError,
    TerminationStatus,
};

fn generator(s: &str) -> QubitOperator {
    QubitOperator::from_term(s.parse().unwrap(), Complex64::i())
}

/// How [`Scripted`] distorts single-observable energies of circuits with a
/// non-zero rotation.  Batched calls (gradient ranking) are passed through.
#[derive(Debug, Clone, Copy)]
enum Distortion {
    /// The first evaluation of each point reads 0.5 low, repeats are exact.
    LowFirstSample,
    /// Repeated evaluations of a point are NaN.
    NanOnRepeat,
    /// Every rotated point is NaN.
    NanWhenRotated,
    /// Every rotated point is an error.
    FailWhenRotated,
}

struct Scripted {
    inner: StatevectorBackend,
    distortion: Distortion,
    seen: HashSet<String>,
}

impl Scripted {
    fn new(distortion: Distortion) -> Self {
        Self {
            inner: StatevectorBackend::new(),
            distortion,
            seen: HashSet::new(),
        }
    }
}

impl ExpectationBackend for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn expectation(&mut self, circuit: &Circuit, observable: &QubitOperator) -> SimResult<f64> {
        let rotated = circuit
            .gates()
            .iter()
            .any(|g| matches!(g, Gate::PauliRotation { theta, .. } if *theta != 0.0));
        if !rotated {
            return self.inner.expectation(circuit, observable);
        }
        let first = self.seen.insert(format!("{:?} {observable}", circuit.gates()));
        match self.distortion {
            Distortion::LowFirstSample => {
                let value = self.inner.expectation(circuit, observable)?;
                Ok(if first { value - 0.5 } else { value })
            }
            Distortion::NanOnRepeat if !first => Ok(f64::NAN),
            Distortion::NanOnRepeat => self.inner.expectation(circuit, observable),
            Distortion::NanWhenRotated => Ok(f64::NAN),
            Distortion::FailWhenRotated => Err(SimError::TooManyQubits {
                got: circuit.num_qubits(),
                max: 0,
            }),
        }
    }

    fn expectations(
        &mut self,
        circuit: &Circuit,
        observables: &[&QubitOperator],
    ) -> SimResult<Vec<f64>> {
        self.inner.expectations(circuit, observables)
    }

    fn evaluations(&self) -> u64 {
        self.inner.evaluations()
    }
}

fn scripted_h2(distortion: Distortion, max_cycles: usize) -> AdaptSolver {
    AdaptSolver::new(AdaptOptions::for_model("h2_2q").with_max_cycles(max_cycles))
        .unwrap()
        .with_backend(Scripted::new(distortion))
}

fn assert_monotone(history: &[f64], start: f64) {
    let mut previous = start;
    for &e in history {
        assert!(e <= previous, "energy rose from {previous} to {e}");
        previous = e;
    }
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[test]
fn empty_generated_pool_converges_immediately() {
    // X0 Y1 has an odd number of Y factors and claims no pool generator.
    let h = QubitOperator::real_term("X0 Y1".parse().unwrap(), 0.5);
    let result = AdaptSolver::new(AdaptOptions::for_hamiltonian(h))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.status, TerminationStatus::Converged);
    assert_eq!(result.pool_size, 0);
    assert!(result.ansatz.is_empty());
    assert_eq!(result.n_cycles(), 0);
    assert!(result.energy.abs() < 1e-12);
    assert_eq!(result.final_max_gradient, 0.0);
}

#[test]
fn explicit_empty_pool_is_an_error() {
    let options =
        AdaptOptions::for_model("h2_2q").with_pool(PoolKind::Explicit { operators: vec![] });
    assert!(matches!(AdaptSolver::new(options), Err(SolverError::EmptyPool)));

    let empty = AdaptSolver::new(AdaptOptions::for_model("h2_2q"))
        .unwrap()
        .with_pool_generator(qadapt_solvers::pool::Explicit::new(vec![]));
    assert!(matches!(empty.run(), Err(SolverError::EmptyPool)));
}

#[test]
fn zero_cycle_budget_is_exhausted() {
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_sto3g").with_max_cycles(0))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.status, TerminationStatus::Exhausted);
    assert!(!result.converged());
    assert!(result.ansatz.is_empty());
    assert!((result.energy + 1.116_581_404).abs() < 1e-8);
    assert!(result.final_max_gradient > 1e-3);
}

#[test]
fn four_generator_model_reaches_exact_energy() {
    let exact = problems::model("tilted_4").unwrap().exact_energy().unwrap();
    let options = AdaptOptions::for_model("tilted_4")
        .with_tol(0.01)
        .with_max_cycles(7);
    let result = AdaptSolver::new(options).unwrap().run().unwrap();

    assert_eq!(result.pool_size, 4);
    assert!(result.converged());
    assert!(result.n_cycles() <= 7);
    assert!((result.energy - exact).abs() < 1.6e-3);
    // Largest field first; each site is solved by its own rotation.
    let order: Vec<usize> = result.growth_log.iter().map(|r| r.pool_index).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert!((result.reference_energy + 2.0).abs() < 1e-12);
    assert_monotone(&result.energy_history, result.reference_energy);
}

/// The bond pool cannot represent the ring's singlet ground state, so only
/// the budget and the variational bound are checked here.
#[test]
fn heisenberg_respects_cycle_budget() {
    let options = AdaptOptions::for_model("heisenberg_4")
        .with_tol(0.01)
        .with_max_cycles(7);
    let exact = problems::model("heisenberg_4").unwrap().exact_energy().unwrap();
    let result = AdaptSolver::new(options).unwrap().run().unwrap();

    assert!(result.n_cycles() >= 1);
    assert!(result.n_cycles() <= 7);
    assert_eq!(result.ansatz.len(), result.n_cycles());
    assert_eq!(result.growth_log.len(), result.n_cycles());
    assert_monotone(&result.energy_history, result.reference_energy);
    assert!((result.reference_energy + 4.0).abs() < 1e-12);
    assert!(result.energy < -4.0);
    assert!(result.energy >= exact - 1e-8);
    if result.status == TerminationStatus::Converged {
        assert!(result.final_max_gradient < 0.01);
    } else {
        assert_eq!(result.n_cycles(), 7);
    }
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn h2_reaches_exact_energy_in_one_cycle() {
    let h2 = h2_sto3g();
    let exact = h2.exact_energy().unwrap();
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_sto3g"))
        .unwrap()
        .run()
        .unwrap();

    assert!(result.converged());
    assert_eq!(result.n_cycles(), 1);
    assert!((result.energy - exact).abs() < 1e-6);
    assert_eq!(result.energy, result.physical_energy);
    assert_eq!(result.ansatz.elements()[0].generator, generator("Y0 X1 Y2 Y3"));
    assert_eq!(result.ansatz.elements()[0].pool_index, Some(0));

    let record = &result.growth_log[0];
    assert_eq!(record.cycle, 1);
    assert!((record.gradient.abs() - 0.362).abs() < 1e-3);
    assert!(!record.reverted);
}

#[test]
fn two_qubit_h2_with_finite_difference_gradients() {
    let exact = problems::h2_model_2q().exact_energy().unwrap();
    let options = AdaptOptions::for_model("h2_2q").with_gradient(GradientMethod::FiniteDifference {
        step: 1e-3,
    });
    let result = AdaptSolver::new(options).unwrap().run().unwrap();
    assert!(result.converged());
    assert_eq!(result.n_cycles(), 1);
    assert!((result.energy - exact).abs() < 1e-6);
    assert!((result.reference_energy + 1.09).abs() < 1e-12);
}

#[test]
fn ties_go_to_the_first_pool_operator() {
    let result = AdaptSolver::new(AdaptOptions::for_model("heisenberg_4").with_max_cycles(1))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.growth_log[0].pool_index, 0);
    assert_eq!(result.ansatz.elements()[0].generator, generator("Y0 X1"));
}

#[test]
fn runs_are_idempotent() {
    let options = AdaptOptions::for_model("heisenberg_4").with_max_cycles(3);
    let first = AdaptSolver::new(options.clone()).unwrap().run().unwrap();
    let second = AdaptSolver::new(options).unwrap().run().unwrap();
    assert_eq!(first.energy_history, second.energy_history);
    assert_eq!(first.parameters, second.parameters);
    assert_eq!(first.ansatz, second.ansatz);
}

// ---------------------------------------------------------------------------
// Controller stepping
// ---------------------------------------------------------------------------

#[test]
fn controller_steps_through_states() {
    let mut controller = AdaptSolver::new(AdaptOptions::for_model("h2_sto3g"))
        .unwrap()
        .start()
        .unwrap();
    assert_eq!(controller.state(), AdaptState::Ranking);
    assert_eq!(controller.pool().len(), 1);
    assert_eq!(controller.current_energy(), controller.reference_energy());

    assert_eq!(controller.run_cycle().unwrap(), AdaptState::Ranking);
    assert_eq!(controller.ansatz().len(), 1);
    assert_eq!(controller.energy_history().len(), 1);

    assert_eq!(controller.run_cycle().unwrap(), AdaptState::Converged);
    assert_eq!(controller.run_cycle().unwrap(), AdaptState::Converged);
    assert_eq!(controller.ansatz().len(), 1);

    let result = controller.run().unwrap();
    assert!(result.converged());
    assert_eq!(result.n_cycles(), 1);
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[test]
fn closure_pool_generator() {
    let exact = problems::h2_model_2q().exact_energy().unwrap();
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_2q"))
        .unwrap()
        .with_pool_generator(|_: &QubitOperator, _: u32| vec![generator("X0 Y1")])
        .run()
        .unwrap();
    assert_eq!(result.pool_name, "custom");
    assert_eq!(result.pool_size, 1);
    assert!((result.energy - exact).abs() < 1e-6);
}

#[test]
fn injected_backend_counts_evaluations() {
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_2q").with_optimizer(Cobyla::new()))
        .unwrap()
        .with_backend(StatevectorBackend::new())
        .run()
        .unwrap();
    assert!(result.backend_evaluations > result.optimizer_evaluations as u64);
}

#[test]
fn shot_backend_runs_are_reproducible() {
    let options = AdaptOptions::for_model("h2_2q")
        .with_max_cycles(2)
        .with_optimizer(Cobyla::new().with_maxiter(60))
        .with_backend(BackendKind::Shots {
            shots: 1000,
            seed: 7,
        });
    let first = AdaptSolver::new(options.clone()).unwrap().run().unwrap();
    let second = AdaptSolver::new(options).unwrap().run().unwrap();
    assert_eq!(first.energy_history, second.energy_history);
    assert_eq!(first.parameters, second.parameters);
    assert!(first.energy.is_finite());
}

#[test]
fn shot_noise_does_not_bias_the_reported_energy() {
    let exact = problems::h2_model_2q().exact_energy().unwrap();
    let options = AdaptOptions::for_model("h2_2q")
        .with_max_cycles(2)
        .with_optimizer(Cobyla::new().with_maxiter(60))
        .with_backend(BackendKind::Shots {
            shots: 4000,
            seed: 11,
        });
    let result = AdaptSolver::new(options).unwrap().run().unwrap();
    // σ ≤ sqrt(Σ c²/shots) ≈ 0.01 for one estimate.
    for &e in &result.energy_history {
        assert!(e >= exact - 0.05, "{e} is far below the ground energy {exact}");
    }
    assert!(result.energy >= exact - 0.05);
}

#[test]
fn recorded_energy_is_a_fresh_evaluation() {
    let exact = problems::h2_model_2q().exact_energy().unwrap();
    let result = scripted_h2(Distortion::LowFirstSample, 5).run().unwrap();
    assert!(result.converged());
    assert_eq!(result.n_cycles(), 1);
    assert!(!result.growth_log[0].reverted);
    assert!(result.energy >= exact - 1e-9);
    assert!((result.energy - exact).abs() < 1e-6);
    assert_eq!(result.growth_log[0].energy, result.energy);
}

#[test]
fn unusable_optimum_reverts_to_warm_start() {
    let result = scripted_h2(Distortion::NanOnRepeat, 1).run().unwrap();
    let record = &result.growth_log[0];
    assert!(record.reverted);
    assert_eq!(record.energy, result.reference_energy);
    assert_eq!(result.energy_history, vec![result.reference_energy]);
    assert_eq!(result.parameters, vec![0.0]);
    assert_eq!(result.status, TerminationStatus::Exhausted);
}

#[test]
fn optimizer_failure_keeps_a_consistent_cycle() {
    let result = scripted_h2(Distortion::NanWhenRotated, 1).run().unwrap();
    let record = &result.growth_log[0];
    assert_eq!(record.optimizer_status, OptimizerStatus::NonFiniteObjective);
    assert_eq!(result.parameters, vec![0.0]);
    assert!((result.energy - result.reference_energy).abs() < 1e-12);
    assert_eq!(result.ansatz.len(), result.energy_history.len());
    assert_eq!(result.status, TerminationStatus::Exhausted);
}

#[test]
fn backend_error_leaves_the_controller_consistent() {
    let mut controller = scripted_h2(Distortion::FailWhenRotated, 5).start().unwrap();
    assert!(matches!(controller.run_cycle(), Err(SolverError::Sim(_))));
    assert_eq!(controller.state(), AdaptState::Failed);
    assert!(controller.ansatz().is_empty());
    assert!(controller.energy_history().is_empty());
    assert!(controller.growth_log().is_empty());

    assert!(matches!(controller.run_cycle(), Err(SolverError::ControllerFailed)));
    assert!(matches!(controller.run(), Err(SolverError::ControllerFailed)));
}

#[test]
fn resources_of_the_grown_ansatz() {
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_sto3g"))
        .unwrap()
        .run()
        .unwrap();
    let resources = result.resources().unwrap();
    assert_eq!(resources.n_parameters, 1);
    // One four-qubit Pauli exponential: a CX ladder down and back up.
    assert_eq!(resources.cnot_count, 6);
    assert!(resources.depth > 0);
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn configuration_errors_are_reported_before_running() {
    let h = QubitOperator::real_term("Z0".parse().unwrap(), 1.0);
    assert!(matches!(
        AdaptSolver::new(AdaptOptions::for_hamiltonian(h.clone()).with_tol(0.0)),
        Err(SolverError::InvalidTolerance(_))
    ));
    assert!(matches!(
        AdaptSolver::new(AdaptOptions::for_hamiltonian(h).with_reference("10")),
        Err(SolverError::ReferenceLength { expected: 1, got: 2 })
    ));

    let non_hermitian = QubitOperator::from_term("X0".parse().unwrap(), Complex64::new(1.0, 0.5));
    assert!(matches!(
        AdaptSolver::new(AdaptOptions::for_hamiltonian(non_hermitian)),
        Err(SolverError::NonHermitianHamiltonian(_))
    ));
    assert!(matches!(
        AdaptSolver::new(AdaptOptions::for_hamiltonian(QubitOperator::identity(1.0))),
        Err(SolverError::ZeroQubits)
    ));
    assert!(matches!(
        AdaptSolver::new(AdaptOptions::for_model("tfim_4").with_pool(PoolKind::Uccsd)),
        Err(SolverError::InvalidOption(_))
    ));
}
