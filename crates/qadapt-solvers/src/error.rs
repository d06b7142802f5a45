//! Error types for the solvers crate.

use qadapt_ops::OpsError;
use qadapt_sim::SimError;
use thiserror::Error;

/// Errors produced while configuring or running a solver.
///
/// Everything except `Sim`/`Ops` raised from inside an objective evaluation
/// is a configuration error detected before the first ADAPT cycle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolverError {
    /// An explicitly supplied operator pool is empty.
    #[error("Operator pool is empty")]
    EmptyPool,

    /// The problem has no qubits.
    #[error("Hamiltonian acts on zero qubits")]
    ZeroQubits,

    /// A pool generator is not a valid ansatz generator.
    #[error("Pool operator {index} is invalid: {reason}")]
    InvalidGenerator {
        /// Position in the pool.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Malformed penalty term.
    #[error("Invalid penalty for '{operator}': {reason}")]
    InvalidPenalty {
        /// Symmetry operator name.
        operator: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The reference bitstring does not match the register.
    #[error("Reference state has {got} bits but the problem has {expected} qubits")]
    ReferenceLength {
        /// Register width.
        expected: u32,
        /// Length of the supplied reference.
        got: usize,
    },

    /// The reference bitstring contains characters other than 0/1.
    #[error("Invalid reference bitstring '{0}'")]
    InvalidReference(String),

    /// Gradient tolerance must be finite and positive.
    #[error("Gradient tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    /// Any other out-of-range option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Unknown built-in model name.
    #[error("Unknown model '{0}' (run `qadapt models` for the list)")]
    UnknownModel(String),

    /// The Hamiltonian is not Hermitian.
    #[error("Hamiltonian is not Hermitian (max |Im c| = {0:.3e})")]
    NonHermitianHamiltonian(f64),

    /// A gradient evaluated to NaN or infinity.
    #[error("Gradient of pool operator {index} is not finite ({value})")]
    NonFiniteGradient {
        /// Position in the pool.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Parameter vector length does not match the ansatz.
    #[error("Expected {expected} parameters, got {got}")]
    ParameterCount {
        /// Ansatz length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// The controller was stepped after a cycle had already failed.
    #[error("ADAPT controller stopped after an earlier failed cycle")]
    ControllerFailed,

    /// Reading a configuration or Hamiltonian file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Simulation error.
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    /// Operator algebra error.
    #[error("Operator error: {0}")]
    Ops(#[from] OpsError),
}

/// Result type for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;
