//! `qadapt-solvers` — ADAPT-VQE on top of `qadapt-ops` and `qadapt-sim`.
//!
//! - **Operator pools**: Hamiltonian-inspired, UCCSD and explicit (`pool`)
//! - **Gradient ranking** by commutator or finite differences (`gradient`)
//! - **Ansatz growth** and the ADAPT state machine (`ansatz`, `adapt`)
//! - **Symmetry penalties** on N, Sz and S² (`penalty`)
//! - **VQE** with COBYLA, BFGS and SPSA optimizers (`vqe`, `optimizers`)
//! - **Built-in models** and YAML/JSON configuration (`problems`, `config`)
//!
//! # Quick start
//!
//! ```rust,no_run
//! use qadapt_solvers::{AdaptOptions, AdaptSolver};
//!
//! let options = AdaptOptions::for_model("h2_sto3g").with_tol(1e-4);
//! let result = AdaptSolver::new(options)?.run()?;
//! println!("{} after {} cycles: {:.8} Ha", result.status, result.n_cycles(), result.energy);
//! # Ok::<(), qadapt_solvers::SolverError>(())
//! ```

pub mod adapt;
pub mod ansatz;
pub mod config;
pub mod error;
pub mod gradient;
pub mod optimizers;
pub mod penalty;
pub mod pool;
pub mod problems;
pub mod vqe;

pub use adapt::{
    AdaptController, AdaptResult, AdaptSolver, AdaptState, AnsatzResources, GrowthRecord,
    TerminationState, TerminationStatus,
};
pub use ansatz::{Ansatz, AnsatzElement};
pub use config::{AdaptOptions, HamiltonianSource, PoolKind};
pub use error::{SolverError, SolverResult};
pub use gradient::{GradientMethod, GradientRanker, Ranking};
pub use optimizers::{Bfgs, Cobyla, OptimizationResult, Optimizer, OptimizerKind, OptimizerStatus, Spsa};
pub use penalty::{PenalizedHamiltonian, PenaltyTerm, PenaltyTerms};
pub use pool::{OperatorPool, PoolGenerator};
pub use problems::Problem;
pub use vqe::{VqeResult, VqeSolver};
