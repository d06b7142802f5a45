//! qadapt command-line interface.
//!
//! ```text
//! qadapt run --model h2_sto3g --tol 1e-4
//! qadapt run --config lih.yaml --output report.json
//! qadapt pool --model heisenberg_4
//! qadapt exact --model tfim_4
//! qadapt models
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{exact, models, pool, run, version};

/// qadapt - adaptive variational eigensolvers in Rust
#[derive(Parser)]
#[command(name = "qadapt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the problem comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ProblemArgs {
    /// YAML or JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in model (see `qadapt models`)
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow an ADAPT-VQE ansatz until the gradient criterion is met
    Run {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Gradient tolerance
        #[arg(long)]
        tol: Option<f64>,

        /// Maximum number of ADAPT cycles
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Optimizer (cobyla, bfgs, spsa)
        #[arg(long)]
        optimizer: Option<String>,

        /// Operator pool (hamiltonian, uccsd)
        #[arg(long)]
        pool: Option<String>,

        /// Estimate expectations from this many shots per term
        #[arg(long)]
        shots: Option<u32>,

        /// Seed for shot sampling
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Print the operator pool of a problem
    Pool {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Operator pool (hamiltonian, uccsd)
        #[arg(long)]
        pool: Option<String>,
    },

    /// Exact ground-state energy by diagonalization
    Exact {
        #[command(flatten)]
        problem: ProblemArgs,
    },

    /// List built-in models
    Models,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            problem,
            tol,
            max_cycles,
            optimizer,
            pool,
            shots,
            seed,
            output,
            json,
        } => {
            let overrides = run::Overrides {
                tol,
                max_cycles,
                optimizer,
                pool,
                shots,
                seed,
                verbose: cli.verbose > 0,
            };
            run::execute(
                problem.config.as_deref(),
                problem.model.as_deref(),
                &overrides,
                output.as_deref(),
                json,
            )
        }

        Commands::Pool { problem, pool: kind } => {
            pool::execute(problem.config.as_deref(), problem.model.as_deref(), kind.as_deref())
        }

        Commands::Exact { problem } => {
            exact::execute(problem.config.as_deref(), problem.model.as_deref())
        }

        Commands::Models => {
            models::execute();
            Ok(())
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
