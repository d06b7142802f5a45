//! Run command implementation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use qadapt_ops::linalg::{MAX_EXACT_QUBITS, exact_ground_energy};
use qadapt_sim::BackendKind;
use qadapt_solvers::{AdaptResult, AdaptSolver, AnsatzResources};

use super::common::{format_generator, load_options, parse_optimizer, parse_pool, print_header};

/// Command-line overrides applied on top of the loaded options.
#[derive(Debug, Default)]
pub struct Overrides {
    pub tol: Option<f64>,
    pub max_cycles: Option<usize>,
    pub optimizer: Option<String>,
    pub pool: Option<String>,
    pub shots: Option<u32>,
    pub seed: u64,
    pub verbose: bool,
}

/// JSON report of a run.
#[derive(Debug, Serialize)]
struct RunReport {
    #[serde(flatten)]
    result: AdaptResult,
    exact_energy: Option<f64>,
    resources: AnsatzResources,
}

/// Execute the run command.
pub fn execute(
    config: Option<&Path>,
    model: Option<&str>,
    overrides: &Overrides,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut options = load_options(config, model)?;
    if let Some(tol) = overrides.tol {
        options.tol = tol;
    }
    if let Some(max_cycles) = overrides.max_cycles {
        options.max_cycles = max_cycles;
    }
    if let Some(name) = &overrides.optimizer {
        options.optimizer = parse_optimizer(name)?;
    }
    if let Some(name) = &overrides.pool {
        options.pool = parse_pool(name)?;
    }
    if let Some(shots) = overrides.shots {
        options.backend = BackendKind::Shots {
            shots,
            seed: overrides.seed,
        };
    }
    options.verbose |= overrides.verbose;

    let solver = AdaptSolver::new(options)?;
    let n_qubits = solver.n_qubits();
    let exact_energy = if n_qubits <= MAX_EXACT_QUBITS {
        Some(exact_ground_energy(&solver.hamiltonian().physical, n_qubits)?)
    } else {
        None
    };

    if !json {
        println!(
            "{} ADAPT-VQE on {} ({} qubits, {} optimizer, {} backend)",
            style("→").cyan().bold(),
            style(model.unwrap_or("configured problem")).green(),
            n_qubits,
            style(solver.options().optimizer.name()).yellow(),
            solver.options().backend,
        );
    }

    let mut controller = solver.start()?;
    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "pool {} ({} operators), reference energy {:.8}",
        controller.pool().name(),
        controller.pool().len(),
        controller.reference_energy()
    ));

    while !controller.state().is_terminal() {
        if let Err(err) = controller.run_cycle() {
            spinner.abandon();
            return Err(err.into());
        }
        spinner.set_message(format!(
            "cycle {}: E = {:.10}",
            controller.ansatz().len(),
            controller.current_energy()
        ));
    }
    spinner.finish_and_clear();

    let result = controller.run()?;
    let resources = result.resources()?;
    let report = RunReport {
        result,
        exact_energy,
        resources,
    };

    if let Some(path) = output {
        let text = serde_json::to_string_pretty(&report)?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        if !json {
            println!("  Report written to {}", style(path.display()).green());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let r = &report.result;

    print_header("Growth");
    println!(
        "  {:>5}  {:>5}  {:>12}  {:>16}  {}",
        "cycle", "index", "gradient", "energy", "generator"
    );
    for (record, element) in r.growth_log.iter().zip(r.ansatz.elements()) {
        println!(
            "  {:>5}  {:>5}  {:>12.4e}  {:>16.10}  {}{}",
            record.cycle,
            record.pool_index,
            record.gradient,
            record.energy,
            format_generator(&element.generator),
            if record.reverted {
                style(" (reverted)").yellow().to_string()
            } else {
                String::new()
            }
        );
    }

    print_header("Result");
    let status = if r.converged() {
        style(r.status.to_string()).green().bold()
    } else {
        style(r.status.to_string()).yellow().bold()
    };
    println!("  Status:           {status}");
    println!("  Cycles:           {}", r.n_cycles());
    println!("  Reference energy: {:.10}", r.reference_energy);
    println!("  Final energy:     {:.10}", r.energy);
    if !r.symmetry_expectations.is_empty() {
        println!("  Physical energy:  {:.10}", r.physical_energy);
    }
    if let Some(exact) = report.exact_energy {
        println!("  Exact energy:     {exact:.10}");
        println!("  Error:            {:.3e}", r.physical_energy - exact);
    }
    println!("  Max |gradient|:   {:.3e}", r.final_max_gradient);
    for (op, value) in &r.symmetry_expectations {
        println!("  <{op}>: {value:.6}");
    }

    print_header("Resources");
    println!("  Parameters: {}", report.resources.n_parameters);
    println!("  Gates:      {}", report.resources.n_gates);
    println!("  CNOTs:      {}", report.resources.cnot_count);
    println!("  Depth:      {}", report.resources.depth);
    println!(
        "  Evaluations: {} backend, {} optimizer",
        r.backend_evaluations, r.optimizer_evaluations
    );
}
