//! Tests for loading run configurations from disk.

use std::fs;

use qadapt_ops::SymmetryOperator;
use qadapt_solvers::{AdaptOptions, AdaptSolver, HamiltonianSource, SolverError};

#[test]
fn yaml_config_with_inline_terms() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dimer.yaml");
    fs::write(
        &path,
        r#"
hamiltonian:
  terms:
    - { pauli: "X0 X1", coeff: [1.0, 0.0] }
    - { pauli: "Y0 Y1", coeff: [1.0, 0.0] }
    - { pauli: "Z0 Z1", coeff: [1.0, 0.0] }
reference: "01"
optimizer:
  kind: cobyla
"#,
    )
    .unwrap();

    let options = AdaptOptions::from_file(&path).unwrap();
    assert!(matches!(options.hamiltonian, HamiltonianSource::Terms(_)));
    let result = AdaptSolver::new(options).unwrap().run().unwrap();
    // Heisenberg dimer ground state is the singlet at −3.
    assert!(result.converged());
    assert!((result.energy + 3.0).abs() < 1e-6);
}

#[test]
fn json_config_with_penalties() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h2.json");
    fs::write(
        &path,
        r#"{"hamiltonian": {"model": "h2_sto3g"}, "penalty": {"n": [0.5, 2], "sz": [0.5, 0]}}"#,
    )
    .unwrap();
    let options = AdaptOptions::from_file(&path).unwrap();
    assert_eq!(options.penalty.len(), 2);
    assert!(options.penalty.get(SymmetryOperator::Sz).is_some());
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        AdaptOptions::from_file(dir.path().join("absent.yaml")),
        Err(SolverError::Io(_))
    ));

    let config = dir.path().join("run.yaml");
    fs::write(&config, "hamiltonian:\n  file: absent.json\n").unwrap();
    let options = AdaptOptions::from_file(&config).unwrap();
    assert!(matches!(AdaptSolver::new(options), Err(SolverError::Io(_))));
}
