//! Tests for fixed-ansatz VQE.

use num_complex::Complex64;
use qadapt_ops::QubitOperator;
use qadapt_sim::backend::StatevectorBackend;
use qadapt_solvers::optimizers::OptimizerKind;
use qadapt_solvers::problems::h2_sto3g;
use qadapt_solvers::vqe::energy;
use qadapt_solvers::{Ansatz, Bfgs, Cobyla, SolverError, Spsa, VqeSolver};

fn h2_double() -> Ansatz {
    let mut ansatz = Ansatz::new(vec![true, true, false, false]);
    ansatz.append(
        QubitOperator::from_term("Y0 X1 Y2 Y3".parse().unwrap(), Complex64::i()),
        None,
    );
    ansatz
}

const HF: f64 = -1.116_581_404;

// ---------------------------------------------------------------------------
// Energy
// ---------------------------------------------------------------------------

#[test]
fn zero_parameters_give_the_reference_energy() {
    let h = h2_sto3g().hamiltonian;
    let e = energy(&h, &h2_double(), &[0.0], &mut StatevectorBackend::new()).unwrap();
    assert!((e - HF).abs() < 1e-8);
}

#[test]
fn parameter_count_is_checked() {
    let h = h2_sto3g().hamiltonian;
    let err = VqeSolver::default()
        .solve(&h, &h2_double(), vec![0.0, 0.0], &mut StatevectorBackend::new())
        .unwrap_err();
    assert!(matches!(
        err,
        SolverError::ParameterCount {
            expected: 1,
            got: 2
        }
    ));
}

// ---------------------------------------------------------------------------
// Optimizers
// ---------------------------------------------------------------------------

#[test]
fn gradient_free_and_quasi_newton_reach_exact() {
    let h2 = h2_sto3g();
    let exact = h2.exact_energy().unwrap();
    let optimizers: Vec<OptimizerKind> = vec![Cobyla::new().into(), Bfgs::new().into()];
    for optimizer in optimizers {
        let name = optimizer.name();
        let result = VqeSolver::new(optimizer)
            .solve(&h2.hamiltonian, &h2_double(), vec![0.0], &mut StatevectorBackend::new())
            .unwrap();
        assert!((result.energy - exact).abs() < 1e-6, "{name}: {}", result.energy);
        assert!((result.initial_energy - HF).abs() < 1e-8);
        assert!(result.num_evaluations > 0);
    }
}

#[test]
fn spsa_improves_on_the_reference() {
    let h2 = h2_sto3g();
    let result = VqeSolver::new(Spsa::new())
        .solve(&h2.hamiltonian, &h2_double(), vec![0.0], &mut StatevectorBackend::new())
        .unwrap();
    assert!(result.energy <= result.initial_energy);
    assert!(result.energy < HF - 0.01);
    for pair in result.energy_history.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
}

#[test]
fn warm_start_at_the_minimum_stays_there() {
    let h2 = h2_sto3g();
    let solver = VqeSolver::new(Bfgs::new());
    let mut backend = StatevectorBackend::new();
    let first = solver
        .solve(&h2.hamiltonian, &h2_double(), vec![0.0], &mut backend)
        .unwrap();
    let second = solver
        .solve(&h2.hamiltonian, &h2_double(), first.params.clone(), &mut backend)
        .unwrap();
    assert!(second.energy <= second.initial_energy);
    assert!((second.energy - first.energy).abs() < 1e-10);
}
