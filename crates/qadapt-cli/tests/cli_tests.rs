//! CLI command parsing and configuration tests.
//!
//! The CLI is a binary crate, so argument parsing is checked on equivalent
//! clap structs and configuration handling through the library crates.

// ============================================================================
// Clap argument parsing
// ============================================================================

mod clap_parsing {
    use std::path::PathBuf;

    use clap::{Args, Parser, Subcommand};

    #[derive(Parser)]
    #[command(name = "qadapt")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Args, Debug)]
    #[group(required = true, multiple = false)]
    struct ProblemArgs {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        model: Option<String>,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Run {
            #[command(flatten)]
            problem: ProblemArgs,
            #[arg(long)]
            tol: Option<f64>,
            #[arg(long)]
            max_cycles: Option<usize>,
            #[arg(long)]
            optimizer: Option<String>,
            #[arg(long)]
            pool: Option<String>,
            #[arg(long)]
            shots: Option<u32>,
            #[arg(long, default_value = "42")]
            seed: u64,
            #[arg(short, long)]
            output: Option<PathBuf>,
            #[arg(long)]
            json: bool,
        },
        Pool {
            #[command(flatten)]
            problem: ProblemArgs,
            #[arg(long)]
            pool: Option<String>,
        },
        Exact {
            #[command(flatten)]
            problem: ProblemArgs,
        },
        Models,
        Version,
    }

    #[test]
    fn test_parse_run_model() {
        let cli = TestCli::try_parse_from(["qadapt", "run", "--model", "h2_sto3g"]).unwrap();
        match cli.command {
            TestCommands::Run {
                problem,
                tol,
                seed,
                json,
                ..
            } => {
                assert_eq!(problem.model.as_deref(), Some("h2_sto3g"));
                assert!(problem.config.is_none());
                assert!(tol.is_none());
                assert_eq!(seed, 42);
                assert!(!json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = TestCli::try_parse_from([
            "qadapt",
            "-vv",
            "run",
            "-c",
            "h2.yaml",
            "--tol",
            "1e-4",
            "--max-cycles",
            "8",
            "--optimizer",
            "cobyla",
            "--shots",
            "2048",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            TestCommands::Run {
                problem,
                tol,
                max_cycles,
                optimizer,
                shots,
                json,
                ..
            } => {
                assert_eq!(problem.config, Some(PathBuf::from("h2.yaml")));
                assert_eq!(tol, Some(1e-4));
                assert_eq!(max_cycles, Some(8));
                assert_eq!(optimizer.as_deref(), Some("cobyla"));
                assert_eq!(shots, Some(2048));
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_run_requires_problem() {
        assert!(TestCli::try_parse_from(["qadapt", "run"]).is_err());
    }

    #[test]
    fn test_parse_config_and_model_conflict() {
        let result =
            TestCli::try_parse_from(["qadapt", "run", "-c", "a.yaml", "-m", "h2_sto3g"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_pool_and_exact() {
        let cli = TestCli::try_parse_from(["qadapt", "pool", "-m", "heisenberg_4", "--pool", "uccsd"])
            .unwrap();
        assert!(matches!(cli.command, TestCommands::Pool { pool: Some(_), .. }));
        let cli = TestCli::try_parse_from(["qadapt", "exact", "-m", "tfim_4"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Exact { .. }));
    }

    #[test]
    fn test_parse_models_and_version() {
        assert!(matches!(
            TestCli::try_parse_from(["qadapt", "models"]).unwrap().command,
            TestCommands::Models
        ));
        assert!(matches!(
            TestCli::try_parse_from(["qadapt", "version"]).unwrap().command,
            TestCommands::Version
        ));
    }

    #[test]
    fn test_parse_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["qadapt", "submit"]).is_err());
    }
}

// ============================================================================
// Configuration loading
// ============================================================================

mod config_loading {
    use std::fs;

    use qadapt_solvers::{AdaptOptions, AdaptSolver, HamiltonianSource, OptimizerKind};

    #[test]
    fn test_load_yaml_config_and_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h2.yaml");
        fs::write(
            &path,
            "hamiltonian:\n  model: h2_2q\nmax_cycles: 3\noptimizer:\n  kind: cobyla\n",
        )
        .unwrap();

        let options = AdaptOptions::from_file(&path).unwrap();
        assert_eq!(options.hamiltonian, HamiltonianSource::Model("h2_2q".into()));
        assert_eq!(options.optimizer.name(), "cobyla");

        let result = AdaptSolver::new(options).unwrap().run().unwrap();
        assert!(result.converged());
        assert!((result.energy + 1.169_07).abs() < 1e-4);
    }

    #[test]
    fn test_relative_hamiltonian_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dimer.json"),
            r#"[{"pauli": "X0 X1", "coeff": [1.0, 0.0]},
                {"pauli": "Y0 Y1", "coeff": [1.0, 0.0]},
                {"pauli": "Z0 Z1", "coeff": [1.0, 0.0]}]"#,
        )
        .unwrap();
        let config = dir.path().join("run.yaml");
        fs::write(&config, "hamiltonian:\n  file: dimer.json\nreference: \"01\"\n").unwrap();

        let options = AdaptOptions::from_file(&config).unwrap();
        let solver = AdaptSolver::new(options).unwrap();
        assert_eq!(solver.n_qubits(), 2);
        assert_eq!(solver.reference(), &[false, true]);
        assert_eq!(solver.hamiltonian().physical.n_terms(), 3);
    }

    #[test]
    fn test_unknown_model_is_reported() {
        let err = AdaptSolver::new(AdaptOptions::for_model("lih")).err().unwrap();
        assert!(err.to_string().contains("lih"));
    }

    #[test]
    fn test_default_optimizer_is_bfgs() {
        assert_eq!(OptimizerKind::default().name(), "bfgs");
    }
}
