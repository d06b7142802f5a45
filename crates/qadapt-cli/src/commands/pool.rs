//! Pool command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qadapt_solvers::AdaptSolver;

use super::common::{format_generator, load_options, parse_pool};

/// Execute the pool command.
pub fn execute(config: Option<&Path>, model: Option<&str>, kind: Option<&str>) -> Result<()> {
    let mut options = load_options(config, model)?;
    if let Some(name) = kind {
        options.pool = parse_pool(name)?;
    }

    let solver = AdaptSolver::new(options)?;
    let pool = solver.build_pool()?;

    println!(
        "{} Pool {} with {} operators on {} qubits:\n",
        style("→").cyan().bold(),
        style(pool.name()).green(),
        pool.len(),
        solver.n_qubits()
    );
    for (i, op) in pool.iter().enumerate() {
        println!("  {:>4}  {}", style(i).dim(), format_generator(op));
    }
    if pool.is_empty() {
        println!("  {}", style("(empty: the reference is already converged)").yellow());
    }
    Ok(())
}
