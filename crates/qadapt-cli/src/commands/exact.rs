//! Exact command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qadapt_ops::linalg::{basis_state_expectation, exact_ground_energy};
use qadapt_solvers::AdaptSolver;

use super::common::load_options;

/// Execute the exact command.
pub fn execute(config: Option<&Path>, model: Option<&str>) -> Result<()> {
    let options = load_options(config, model)?;
    let solver = AdaptSolver::new(options)?;
    let h = &solver.hamiltonian().physical;
    let n_qubits = solver.n_qubits();

    let exact = exact_ground_energy(h, n_qubits)?;
    let reference = basis_state_expectation(h, solver.reference());
    let bits: String = solver
        .reference()
        .iter()
        .map(|&b| if b { '1' } else { '0' })
        .collect();

    println!(
        "{} {} qubits, {} terms",
        style("→").cyan().bold(),
        n_qubits,
        h.n_terms()
    );
    println!("  Reference |{bits}⟩: {reference:.10}");
    println!("  Exact ground:     {}", style(format!("{exact:.10}")).green().bold());
    println!("  Correlation:      {:.10}", exact - reference);
    Ok(())
}
