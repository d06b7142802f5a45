//! Tests for symmetry-penalized ADAPT runs.

use qadapt_ops::linalg::basis_state_expectation;
use qadapt_ops::{QubitMapping, SpinOrdering, SymmetryOperator};
use qadapt_solvers::penalty::{PenalizedHamiltonian, PenaltyTerms};
use qadapt_solvers::problems::h2_sto3g;
use qadapt_solvers::{AdaptOptions, AdaptSolver, SolverError};

fn singlet_penalties(weight: f64) -> PenaltyTerms {
    PenaltyTerms::new()
        .with(SymmetryOperator::N, weight, 2.0)
        .with(SymmetryOperator::Sz, weight, 0.0)
        .with(SymmetryOperator::S2, weight, 0.0)
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn penalty_is_zero_on_hartree_fock() {
    let h2 = h2_sto3g();
    let composed = PenalizedHamiltonian::compose(
        h2.hamiltonian.clone(),
        &singlet_penalties(0.5),
        4,
        QubitMapping::JordanWigner,
        SpinOrdering::Interleaved,
    )
    .unwrap();
    assert!(composed.is_penalized());
    assert_eq!(composed.observables.len(), 3);
    assert!(composed.total.is_hermitian(1e-12));

    let hf = [true, true, false, false];
    assert!(basis_state_expectation(&composed.penalty, &hf).abs() < 1e-12);
    let physical = basis_state_expectation(&composed.physical, &hf);
    let total = basis_state_expectation(&composed.total, &hf);
    assert!((physical - total).abs() < 1e-12);

    // Triplet component |1010⟩: N = 2, Sz = 1, so the penalty is positive.
    assert!(basis_state_expectation(&composed.penalty, &[true, false, true, false]) > 0.5);
}

#[test]
fn unpenalized_keeps_the_hamiltonian() {
    let h2 = h2_sto3g();
    let composed = PenalizedHamiltonian::compose(
        h2.hamiltonian.clone(),
        &PenaltyTerms::new(),
        4,
        QubitMapping::JordanWigner,
        SpinOrdering::Interleaved,
    )
    .unwrap();
    assert!(!composed.is_penalized());
    assert_eq!(composed.total, h2.hamiltonian);
    assert!(composed.penalty.is_empty());
}

#[test]
fn odd_register_is_rejected() {
    let h = qadapt_ops::QubitOperator::real_term("Z0 Z2".parse().unwrap(), 1.0);
    let options = AdaptOptions::for_hamiltonian(h)
        .with_penalty(PenaltyTerms::new().with(SymmetryOperator::N, 1.0, 1.0));
    assert!(matches!(
        AdaptSolver::new(options),
        Err(SolverError::InvalidPenalty { .. })
    ));
}

// ---------------------------------------------------------------------------
// Penalized runs
// ---------------------------------------------------------------------------

#[test]
fn penalized_h2_meets_symmetry_targets() {
    let exact = h2_sto3g().exact_energy().unwrap();
    let options = AdaptOptions::for_model("h2_sto3g").with_penalty(singlet_penalties(0.5));
    let result = AdaptSolver::new(options).unwrap().run().unwrap();

    assert!(result.converged());
    assert!((result.physical_energy - exact).abs() < 1e-6);
    assert!((result.energy - result.physical_energy).abs() < 1e-6);

    let n = result.symmetry_expectations[&SymmetryOperator::N];
    let sz = result.symmetry_expectations[&SymmetryOperator::Sz];
    let s2 = result.symmetry_expectations[&SymmetryOperator::S2];
    assert!((n - 2.0).abs() < 1e-8);
    assert!(sz.abs() < 1e-8);
    assert!(s2.abs() < 1e-6);
}

#[test]
fn unpenalized_run_reports_no_symmetries() {
    let result = AdaptSolver::new(AdaptOptions::for_model("h2_2q"))
        .unwrap()
        .run()
        .unwrap();
    assert!(result.symmetry_expectations.is_empty());
    assert_eq!(result.energy, result.physical_energy);
}
