//! ADAPT-VQE configuration.
//!
//! [`AdaptOptions`] is the single configuration surface, loadable from YAML
//! or JSON.  A minimal file only names the Hamiltonian:
//!
//! ```yaml
//! hamiltonian:
//!   model: h2_sto3g
//! tol: 1.0e-4
//! optimizer:
//!   kind: bfgs
//! penalty:
//!   n: [0.5, 2]
//!   sz: [0.5, 0]
//! ```

use std::path::{Path, PathBuf};

use qadapt_ops::{QubitMapping, QubitOperator, SpinOrdering};
use qadapt_sim::backend::BackendKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::gradient::GradientMethod;
use crate::optimizers::OptimizerKind;
use crate::penalty::PenaltyTerms;
use crate::pool::{Explicit, HamiltonianInspired, PoolGenerator, Uccsd};
use crate::problems::{self, Problem};

/// Default gradient tolerance.
pub const DEFAULT_TOL: f64 = 1e-3;
/// Default cycle budget.
pub const DEFAULT_MAX_CYCLES: usize = 15;

fn default_tol() -> f64 {
    DEFAULT_TOL
}

fn default_max_cycles() -> usize {
    DEFAULT_MAX_CYCLES
}

/// Where the qubit Hamiltonian comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HamiltonianSource {
    /// A built-in model (see [`problems::MODELS`]).
    Model(String),
    /// An inline term list.
    Terms(QubitOperator),
    /// A YAML or JSON file holding a term list.
    File(PathBuf),
}

impl HamiltonianSource {
    /// Resolve the source into a problem.
    pub fn load(&self) -> SolverResult<Problem> {
        match self {
            HamiltonianSource::Model(name) => problems::model(name),
            HamiltonianSource::Terms(op) => Ok(Problem::from_hamiltonian("inline", op.clone())),
            HamiltonianSource::File(path) => {
                let text = std::fs::read_to_string(path)?;
                let op: QubitOperator = if is_json(path) {
                    serde_json::from_str(&text)?
                } else {
                    serde_yaml_ng::from_str(&text)?
                };
                let name = path
                    .file_stem()
                    .map_or_else(|| "file".to_string(), |s| s.to_string_lossy().into_owned());
                debug!(path = %path.display(), n_terms = op.n_terms(), "loaded hamiltonian");
                Ok(Problem::from_hamiltonian(name, op))
            }
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Operator pool selector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolKind {
    /// One generator per distinct X/Y support of the Hamiltonian.
    #[default]
    HamiltonianInspired,
    /// Spin-conserving singles and doubles; needs `n_electrons`.
    Uccsd,
    /// Caller-supplied generators.
    Explicit {
        /// The generators, in pool order.
        operators: Vec<QubitOperator>,
    },
}

impl PoolKind {
    /// Instantiate the pool strategy.
    pub fn generator(
        &self,
        options: &AdaptOptions,
        problem: &Problem,
    ) -> SolverResult<Box<dyn PoolGenerator>> {
        Ok(match self {
            PoolKind::HamiltonianInspired => Box::new(HamiltonianInspired),
            PoolKind::Uccsd => {
                let n_electrons = options.n_electrons.or(problem.n_electrons).ok_or_else(|| {
                    SolverError::InvalidOption("the uccsd pool requires n_electrons".into())
                })?;
                Box::new(Uccsd {
                    n_electrons,
                    spin: options.spin,
                    mapping: options.qubit_mapping,
                    ordering: options.spin_ordering,
                })
            }
            PoolKind::Explicit { operators } => Box::new(Explicit::new(operators.clone())),
        })
    }
}

/// Options of an ADAPT-VQE run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdaptOptions {
    /// Hamiltonian source.
    pub hamiltonian: HamiltonianSource,
    /// Register width; defaults to the problem's.
    #[serde(default)]
    pub n_qubits: Option<u32>,
    /// Fermion-to-qubit mapping for references, UCCSD and penalties.
    #[serde(default)]
    pub qubit_mapping: QubitMapping,
    /// Spin-orbital layout.
    #[serde(default)]
    pub spin_ordering: SpinOrdering,
    /// Electron count; selects a Hartree–Fock reference.
    #[serde(default)]
    pub n_electrons: Option<u32>,
    /// 2S = N_α − N_β of the Hartree–Fock reference.
    #[serde(default)]
    pub spin: i32,
    /// Explicit reference bitstring, qubit 0 first (e.g. `"1100"`).
    #[serde(default)]
    pub reference: Option<String>,
    /// Stop when max |gradient| falls below this.
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Maximum number of generators to append.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: usize,
    /// Pool strategy.
    #[serde(default)]
    pub pool: PoolKind,
    /// Gradient evaluation method.
    #[serde(default)]
    pub gradient: GradientMethod,
    /// Classical optimizer.
    #[serde(default)]
    pub optimizer: OptimizerKind,
    /// Expectation backend.
    #[serde(default)]
    pub backend: BackendKind,
    /// Log every cycle at info level.
    #[serde(default)]
    pub verbose: bool,
    /// Symmetry penalties.
    #[serde(default, skip_serializing_if = "PenaltyTerms::is_empty")]
    pub penalty: PenaltyTerms,
}

impl AdaptOptions {
    /// Defaults for everything except the Hamiltonian.
    pub fn new(hamiltonian: HamiltonianSource) -> Self {
        Self {
            hamiltonian,
            n_qubits: None,
            qubit_mapping: QubitMapping::default(),
            spin_ordering: SpinOrdering::default(),
            n_electrons: None,
            spin: 0,
            reference: None,
            tol: DEFAULT_TOL,
            max_cycles: DEFAULT_MAX_CYCLES,
            pool: PoolKind::default(),
            gradient: GradientMethod::default(),
            optimizer: OptimizerKind::default(),
            backend: BackendKind::default(),
            verbose: false,
            penalty: PenaltyTerms::default(),
        }
    }

    /// Options for a built-in model.
    pub fn for_model(name: impl Into<String>) -> Self {
        Self::new(HamiltonianSource::Model(name.into()))
    }

    /// Options for an inline Hamiltonian.
    pub fn for_hamiltonian(hamiltonian: QubitOperator) -> Self {
        Self::new(HamiltonianSource::Terms(hamiltonian))
    }

    /// Parse YAML.
    pub fn from_yaml_str(text: &str) -> SolverResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Parse JSON.
    pub fn from_json_str(text: &str) -> SolverResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML.
    /// A relative Hamiltonian file path is resolved against the config's
    /// directory.
    pub fn from_file(path: impl AsRef<Path>) -> SolverResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut options = if is_json(path) {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        if let HamiltonianSource::File(file) = &mut options.hamiltonian {
            if file.is_relative() {
                if let Some(dir) = path.parent() {
                    *file = dir.join(&*file);
                }
            }
        }
        Ok(options)
    }

    /// Check option ranges that do not depend on the Hamiltonian.
    pub fn validate(&self) -> SolverResult<()> {
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(SolverError::InvalidTolerance(self.tol));
        }
        if self.n_qubits == Some(0) {
            return Err(SolverError::ZeroQubits);
        }
        if let GradientMethod::FiniteDifference { step } = self.gradient {
            if !step.is_finite() || step <= 0.0 {
                return Err(SolverError::InvalidOption(format!(
                    "finite-difference step must be finite and positive, got {step}"
                )));
            }
        }
        if let PoolKind::Explicit { operators } = &self.pool {
            if operators.is_empty() {
                return Err(SolverError::EmptyPool);
            }
        }
        if let BackendKind::Shots { shots: 0, .. } = self.backend {
            return Err(SolverError::InvalidOption("shots must be positive".into()));
        }
        if let Some(bits) = &self.reference {
            parse_reference(bits)?;
        }
        Ok(())
    }

    /// Set the gradient tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the cycle budget.
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Set the pool strategy.
    pub fn with_pool(mut self, pool: PoolKind) -> Self {
        self.pool = pool;
        self
    }

    /// Set the gradient method.
    pub fn with_gradient(mut self, gradient: GradientMethod) -> Self {
        self.gradient = gradient;
        self
    }

    /// Set the optimizer.
    pub fn with_optimizer(mut self, optimizer: impl Into<OptimizerKind>) -> Self {
        self.optimizer = optimizer.into();
        self
    }

    /// Set the expectation backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the symmetry penalties.
    pub fn with_penalty(mut self, penalty: PenaltyTerms) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set an explicit reference bitstring.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the electron count and spin of the Hartree–Fock reference.
    pub fn with_electrons(mut self, n_electrons: u32, spin: i32) -> Self {
        self.n_electrons = Some(n_electrons);
        self.spin = spin;
        self
    }

    /// Set the mapping and spin ordering.
    pub fn with_encoding(mut self, mapping: QubitMapping, ordering: SpinOrdering) -> Self {
        self.qubit_mapping = mapping;
        self.spin_ordering = ordering;
        self
    }

    /// Log every cycle at info level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Parse a `0`/`1` bitstring, qubit 0 first.
pub fn parse_reference(bits: &str) -> SolverResult<Vec<bool>> {
    if bits.is_empty() {
        return Err(SolverError::InvalidReference(bits.to_string()));
    }
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(SolverError::InvalidReference(bits.to_string())),
        })
        .collect()
}
