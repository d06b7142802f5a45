//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qadapt_ops::QubitOperator;
use qadapt_solvers::{AdaptOptions, Bfgs, Cobyla, OptimizerKind, PoolKind, Spsa};

/// Load run options from a configuration file or a built-in model name.
pub fn load_options(config: Option<&Path>, model: Option<&str>) -> Result<AdaptOptions> {
    match (config, model) {
        (Some(path), _) => {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }
            AdaptOptions::from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))
        }
        (None, Some(name)) => Ok(AdaptOptions::for_model(name)),
        (None, None) => anyhow::bail!("Either --config or --model is required"),
    }
}

/// Optimizer selector from its command-line name.
pub fn parse_optimizer(name: &str) -> Result<OptimizerKind> {
    match name.to_lowercase().as_str() {
        "cobyla" => Ok(Cobyla::new().into()),
        "bfgs" => Ok(Bfgs::new().into()),
        "spsa" => Ok(Spsa::new().into()),
        other => anyhow::bail!("Unknown optimizer: '{other}'. Available: cobyla, bfgs, spsa"),
    }
}

/// Pool selector from its command-line name.
pub fn parse_pool(name: &str) -> Result<PoolKind> {
    match name.to_lowercase().as_str() {
        "hamiltonian" | "hamiltonian_inspired" | "qubit" => Ok(PoolKind::HamiltonianInspired),
        "uccsd" => Ok(PoolKind::Uccsd),
        other => anyhow::bail!("Unknown pool: '{other}'. Available: hamiltonian, uccsd"),
    }
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!("\n{} {}", style("→").cyan().bold(), style(title).bold());
}

/// One-line form of a generator: the Pauli strings of `i Σ a_k P_k`.
pub fn format_generator(op: &QubitOperator) -> String {
    let parts: Vec<String> = op
        .terms()
        .iter()
        .map(|t| format!("{:+.4}i {}", t.coeff.im, t.pauli))
        .collect();
    parts.join(" ")
}
