//! ADAPT-VQE: grow an ansatz one generator at a time.
//!
//! ```text
//!   Init ──▶ Ranking ──▶ Converged        (max |g| < tol)
//!              │   ▲
//!              │   └──── Optimizing       (append winner, re-optimize all θ)
//!              └───────▶ Exhausted        (cycle budget spent)
//! ```
//!
//! Any error raised while ranking or optimizing moves the controller to
//! `Failed`; the ansatz and energy history keep their last committed values.
//!
//! [`AdaptSolver`] resolves the configuration and owns the collaborators;
//! [`AdaptSolver::start`] performs `Init` and hands back an
//! [`AdaptController`] that steps the state machine.

use std::collections::BTreeMap;
use std::fmt;

use qadapt_ops::mapping::{hf_occupation, mapped_reference};
use qadapt_ops::{QubitOperator, SymmetryOperator};
use qadapt_sim::backend::ExpectationBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ansatz::Ansatz;
use crate::config::{AdaptOptions, parse_reference};
use crate::error::{SolverError, SolverResult};
use crate::gradient::{GradientRanker, Ranking};
use crate::optimizers::OptimizerStatus;
use crate::penalty::PenalizedHamiltonian;
use crate::pool::{OperatorPool, PoolGenerator};
use crate::problems::Problem;
use crate::vqe::{VqeSolver, energy};

/// Tolerance on the imaginary part of Hamiltonian coefficients.
pub const HERMITICITY_TOLERANCE: f64 = 1e-9;

// =============================================================================
// States
// =============================================================================

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptState {
    /// Nothing built yet.
    Init,
    /// Ready to rank the pool.
    Ranking,
    /// Re-optimizing after an append.
    Optimizing,
    /// Largest gradient below tolerance.
    Converged,
    /// Cycle budget spent.
    Exhausted,
    /// A cycle returned an error.
    Failed,
}

impl AdaptState {
    /// True for `Converged`, `Exhausted` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AdaptState::Converged | AdaptState::Exhausted | AdaptState::Failed
        )
    }
}

impl fmt::Display for AdaptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdaptState::Init => "init",
            AdaptState::Ranking => "ranking",
            AdaptState::Optimizing => "optimizing",
            AdaptState::Converged => "converged",
            AdaptState::Exhausted => "exhausted",
            AdaptState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Outcome of the termination test of one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminationState {
    /// Append `pool_index`, whose gradient is `gradient`.
    Continue {
        /// Winning pool position.
        pool_index: usize,
        /// Its signed gradient.
        gradient: f64,
    },
    /// Largest gradient below tolerance.
    Converged,
    /// Cycle budget spent.
    Exhausted,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    /// Success: the gradient criterion was met.
    Converged,
    /// Soft failure: the cycle budget ran out first.
    Exhausted,
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Converged => write!(f, "converged"),
            TerminationStatus::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Termination test: the tolerance is checked before the cycle budget.
pub fn decide(ranking: &Ranking, tol: f64, completed_cycles: usize, max_cycles: usize) -> TerminationState {
    match ranking.best {
        Some(pool_index) if ranking.max_gradient >= tol => {
            if completed_cycles >= max_cycles {
                TerminationState::Exhausted
            } else {
                TerminationState::Continue {
                    pool_index,
                    gradient: ranking.gradients[pool_index],
                }
            }
        }
        _ => TerminationState::Converged,
    }
}

// =============================================================================
// Records
// =============================================================================

/// Diagnostics of one completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    /// 1-based cycle number.
    pub cycle: usize,
    /// Ansatz length after the append.
    pub ansatz_size: usize,
    /// Pool position of the appended generator.
    pub pool_index: usize,
    /// Its gradient at selection time.
    pub gradient: f64,
    /// Energy after re-optimization.
    pub energy: f64,
    /// How the optimizer stopped.
    pub optimizer_status: OptimizerStatus,
    /// True if the warm start was kept because the re-evaluated optimum was
    /// above the previous cycle's energy, or not finite.
    pub reverted: bool,
    /// Objective evaluations spent by the optimizer.
    pub num_evaluations: usize,
}

/// Circuit cost of an ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsatzResources {
    /// Variational parameters.
    pub n_parameters: usize,
    /// Gates after synthesis into the native gate set.
    pub n_gates: usize,
    /// CNOT count after synthesis.
    pub cnot_count: usize,
    /// Circuit depth after synthesis.
    pub depth: usize,
}

/// Result of an ADAPT-VQE run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptResult {
    /// Problem name.
    pub problem: String,
    /// How the run ended.
    pub status: TerminationStatus,
    /// Final energy of the working (possibly penalized) Hamiltonian.
    pub energy: f64,
    /// Final energy of the physical Hamiltonian.
    pub physical_energy: f64,
    /// Working-Hamiltonian energy of the reference state.
    pub reference_energy: f64,
    /// The grown ansatz, with its final parameters.
    pub ansatz: Ansatz,
    /// Final parameters.
    pub parameters: Vec<f64>,
    /// Energy after every completed cycle.
    pub energy_history: Vec<f64>,
    /// Per-cycle diagnostics.
    pub growth_log: Vec<GrowthRecord>,
    /// Largest gradient of the last ranking.
    pub final_max_gradient: f64,
    /// Pool strategy name.
    pub pool_name: String,
    /// Pool size.
    pub pool_size: usize,
    /// ⟨N⟩, ⟨Sz⟩, ⟨S²⟩ of the final state for the penalized operators.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symmetry_expectations: BTreeMap<SymmetryOperator, f64>,
    /// State preparations performed by the backend.
    pub backend_evaluations: u64,
    /// Objective evaluations across all optimizer runs.
    pub optimizer_evaluations: usize,
}

impl AdaptResult {
    /// True if the gradient criterion was met.
    pub fn converged(&self) -> bool {
        self.status == TerminationStatus::Converged
    }

    /// Number of completed cycles.
    pub fn n_cycles(&self) -> usize {
        self.energy_history.len()
    }

    /// Gate-level cost of the final ansatz.
    pub fn resources(&self) -> SolverResult<AnsatzResources> {
        let circuit = self.ansatz.build_circuit()?;
        let synthesized = circuit.decompose()?;
        Ok(AnsatzResources {
            n_parameters: self.ansatz.len(),
            n_gates: synthesized.len(),
            cnot_count: synthesized.cnot_count(),
            depth: synthesized.depth(),
        })
    }
}

// =============================================================================
// Solver
// =============================================================================

/// A resolved ADAPT-VQE configuration with its collaborators.
pub struct AdaptSolver {
    options: AdaptOptions,
    problem: String,
    n_qubits: u32,
    reference: Vec<bool>,
    hamiltonian: PenalizedHamiltonian,
    pool_generator: Box<dyn PoolGenerator>,
    backend: Box<dyn ExpectationBackend>,
}

impl AdaptSolver {
    /// Validate `options` and resolve the Hamiltonian, register, reference,
    /// penalties, pool strategy and backend.  Every configuration error is
    /// reported here.
    pub fn new(options: AdaptOptions) -> SolverResult<Self> {
        options.validate()?;
        let problem = options.hamiltonian.load()?;

        let n_qubits = options.n_qubits.unwrap_or(problem.n_qubits);
        if n_qubits == 0 {
            return Err(SolverError::ZeroQubits);
        }
        let width = problem.hamiltonian.min_qubits();
        if width > n_qubits {
            return Err(SolverError::InvalidOption(format!(
                "Hamiltonian acts on {width} qubits but n_qubits is {n_qubits}"
            )));
        }
        let hermiticity = problem.hamiltonian.hermiticity_error();
        if hermiticity > HERMITICITY_TOLERANCE {
            return Err(SolverError::NonHermitianHamiltonian(hermiticity));
        }

        let reference = resolve_reference(&options, &problem, n_qubits)?;
        let hamiltonian = PenalizedHamiltonian::compose(
            problem.hamiltonian.clone(),
            &options.penalty,
            n_qubits,
            options.qubit_mapping,
            options.spin_ordering,
        )?;
        let pool_generator = options.pool.generator(&options, &problem)?;
        let backend = options.backend.build()?;

        debug!(
            problem = %problem.name,
            n_qubits,
            n_terms = hamiltonian.total.n_terms(),
            penalized = hamiltonian.is_penalized(),
            "resolved adapt configuration"
        );

        Ok(Self {
            problem: problem.name,
            options,
            n_qubits,
            reference,
            hamiltonian,
            pool_generator,
            backend,
        })
    }

    /// Replace the pool strategy.
    pub fn with_pool_generator(mut self, generator: impl PoolGenerator + 'static) -> Self {
        self.pool_generator = Box::new(generator);
        self
    }

    /// Replace the expectation backend.
    pub fn with_backend(mut self, backend: impl ExpectationBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// The options this solver was built from.
    pub fn options(&self) -> &AdaptOptions {
        &self.options
    }

    /// Register width.
    pub fn n_qubits(&self) -> u32 {
        self.n_qubits
    }

    /// Reference bitstring, qubit 0 first.
    pub fn reference(&self) -> &[bool] {
        &self.reference
    }

    /// Physical and working Hamiltonians.
    pub fn hamiltonian(&self) -> &PenalizedHamiltonian {
        &self.hamiltonian
    }

    /// Build the pool without running anything.
    pub fn build_pool(&self) -> SolverResult<OperatorPool> {
        OperatorPool::build(self.pool_generator.as_ref(), &self.hamiltonian.total, self.n_qubits)
    }

    /// `Init`: build the pool and ranker, prepare the reference ansatz and
    /// evaluate its energy.
    pub fn start(mut self) -> SolverResult<AdaptController> {
        let pool = self.build_pool()?;
        let ansatz = Ansatz::new(self.reference.clone());
        let reference_energy = energy(&self.hamiltonian.total, &ansatz, &[], &mut *self.backend)?;

        info!(
            problem = %self.problem,
            n_qubits = self.n_qubits,
            pool = pool.name(),
            pool_size = pool.len(),
            reference_energy,
            "adapt initialized"
        );
        let ranker = GradientRanker::new(self.options.gradient, &self.hamiltonian.total, pool);

        Ok(AdaptController {
            vqe: VqeSolver::new(self.options.optimizer.clone()),
            tol: self.options.tol,
            max_cycles: self.options.max_cycles,
            verbose: self.options.verbose,
            problem: self.problem,
            hamiltonian: self.hamiltonian,
            backend: self.backend,
            ranker,
            ansatz,
            state: AdaptState::Ranking,
            reference_energy,
            energy_history: Vec::new(),
            growth_log: Vec::new(),
            final_max_gradient: 0.0,
            optimizer_evaluations: 0,
        })
    }

    /// Run to a terminal state.
    pub fn run(self) -> SolverResult<AdaptResult> {
        self.start()?.run()
    }
}

/// Reference precedence: explicit bitstring, Hartree–Fock from
/// `n_electrons`, the problem's default, all zeros.
fn resolve_reference(options: &AdaptOptions, problem: &Problem, n_qubits: u32) -> SolverResult<Vec<bool>> {
    let check = |bits: Vec<bool>| {
        if bits.len() != n_qubits as usize {
            return Err(SolverError::ReferenceLength {
                expected: n_qubits,
                got: bits.len(),
            });
        }
        Ok(bits)
    };

    if let Some(text) = &options.reference {
        return check(parse_reference(text)?);
    }
    if let Some(n_electrons) = options.n_electrons {
        let occupation = hf_occupation(n_electrons, options.spin, n_qubits, options.spin_ordering)?;
        return check(mapped_reference(&occupation, options.qubit_mapping));
    }
    if let Some(bits) = &problem.reference {
        return check(bits.clone());
    }
    Ok(vec![false; n_qubits as usize])
}

// =============================================================================
// Controller
// =============================================================================

/// The running state machine.
pub struct AdaptController {
    vqe: VqeSolver,
    tol: f64,
    max_cycles: usize,
    verbose: bool,
    problem: String,
    hamiltonian: PenalizedHamiltonian,
    backend: Box<dyn ExpectationBackend>,
    ranker: GradientRanker,
    ansatz: Ansatz,
    state: AdaptState,
    reference_energy: f64,
    energy_history: Vec<f64>,
    growth_log: Vec<GrowthRecord>,
    final_max_gradient: f64,
    optimizer_evaluations: usize,
}

impl AdaptController {
    /// Current state.
    pub fn state(&self) -> AdaptState {
        self.state
    }

    /// The ansatz grown so far.
    pub fn ansatz(&self) -> &Ansatz {
        &self.ansatz
    }

    /// The pool.
    pub fn pool(&self) -> &OperatorPool {
        self.ranker.pool()
    }

    /// Energy after every completed cycle.
    pub fn energy_history(&self) -> &[f64] {
        &self.energy_history
    }

    /// Per-cycle diagnostics.
    pub fn growth_log(&self) -> &[GrowthRecord] {
        &self.growth_log
    }

    /// Working-Hamiltonian energy of the reference state.
    pub fn reference_energy(&self) -> f64 {
        self.reference_energy
    }

    /// Energy of the current parameters.
    pub fn current_energy(&self) -> f64 {
        self.energy_history.last().copied().unwrap_or(self.reference_energy)
    }

    /// One `Ranking` step, followed by `Optimizing` unless the run ends.
    /// Returns the new state; `Converged` and `Exhausted` are sticky.
    ///
    /// An error leaves the ansatz and energy history as they were before
    /// the cycle and moves the controller to `Failed`, after which every
    /// call returns [`SolverError::ControllerFailed`].
    pub fn run_cycle(&mut self) -> SolverResult<AdaptState> {
        match self.state {
            AdaptState::Failed => return Err(SolverError::ControllerFailed),
            state if state.is_terminal() => return Ok(state),
            _ => {}
        }
        if let Err(err) = self.step() {
            warn!(cycle = self.ansatz.len() + 1, error = %err, "adapt cycle failed");
            self.state = AdaptState::Failed;
            return Err(err);
        }
        Ok(self.state)
    }

    fn step(&mut self) -> SolverResult<()> {
        self.state = AdaptState::Ranking;
        let ranking = self.ranker.rank(&self.ansatz, &mut *self.backend)?;
        self.final_max_gradient = ranking.max_gradient;

        let completed = self.ansatz.len();
        match decide(&ranking, self.tol, completed, self.max_cycles) {
            TerminationState::Converged => {
                info!(
                    cycles = completed,
                    max_gradient = ranking.max_gradient,
                    energy = self.current_energy(),
                    "adapt converged"
                );
                self.state = AdaptState::Converged;
            }
            TerminationState::Exhausted => {
                warn!(
                    cycles = completed,
                    max_gradient = ranking.max_gradient,
                    tol = self.tol,
                    energy = self.current_energy(),
                    "cycle budget exhausted before the gradient criterion was met"
                );
                self.state = AdaptState::Exhausted;
            }
            TerminationState::Continue {
                pool_index,
                gradient,
            } => {
                self.grow(pool_index, gradient)?;
                self.state = AdaptState::Ranking;
            }
        }
        Ok(())
    }

    /// Optimize a candidate ansatz with the winner appended; the controller
    /// only takes it over once the optimizer has returned.
    fn grow(&mut self, pool_index: usize, gradient: f64) -> SolverResult<()> {
        self.state = AdaptState::Optimizing;
        let generator = self
            .ranker
            .pool()
            .get(pool_index)
            .cloned()
            .ok_or_else(|| SolverError::InvalidGenerator {
                index: pool_index,
                reason: "index outside the pool".into(),
            })?;
        let mut candidate = self.ansatz.clone();
        candidate.append(generator, Some(pool_index));

        let warm_start = candidate.parameters();
        let result = self.vqe.solve(
            &self.hamiltonian.total,
            &candidate,
            warm_start.clone(),
            &mut *self.backend,
        )?;
        let cycle = candidate.len();

        if result.status.is_failure() {
            warn!(cycle, status = %result.status, "optimizer reported a failure");
        }
        // The warm start prepares the committed state (the new θ is 0), so
        // the committed energy is its energy.  NaN compares false and reverts.
        let committed = self.current_energy();
        let reverted = !(result.energy <= committed);
        let (params, cycle_energy) = if reverted {
            warn!(
                cycle,
                optimized = result.energy,
                warm_start = committed,
                "re-evaluated optimum is worse than the warm start; reverting"
            );
            (warm_start, committed)
        } else {
            (result.params, result.energy)
        };
        candidate.set_parameters(&params)?;

        self.ansatz = candidate;
        self.energy_history.push(cycle_energy);
        self.optimizer_evaluations += result.num_evaluations;

        let record = GrowthRecord {
            cycle,
            ansatz_size: self.ansatz.len(),
            pool_index,
            gradient,
            energy: cycle_energy,
            optimizer_status: result.status,
            reverted,
            num_evaluations: result.num_evaluations,
        };
        log_cycle(self.verbose, &record);
        self.growth_log.push(record);
        Ok(())
    }

    /// Step until a terminal state and assemble the result.
    pub fn run(mut self) -> SolverResult<AdaptResult> {
        while !self.state.is_terminal() {
            self.run_cycle()?;
        }
        self.finish()
    }

    fn finish(mut self) -> SolverResult<AdaptResult> {
        let status = match self.state {
            AdaptState::Converged => TerminationStatus::Converged,
            AdaptState::Failed => return Err(SolverError::ControllerFailed),
            _ => TerminationStatus::Exhausted,
        };
        let final_energy = self.current_energy();

        let mut symmetry_expectations = BTreeMap::new();
        let physical_energy = if self.hamiltonian.is_penalized() {
            let circuit = self.ansatz.build_circuit()?;
            let mut observables: Vec<&QubitOperator> = vec![&self.hamiltonian.physical];
            observables.extend(self.hamiltonian.observables.iter().map(|(_, o)| o));
            let values = self.backend.expectations(&circuit, &observables)?;
            for ((op, _), value) in self.hamiltonian.observables.iter().zip(&values[1..]) {
                symmetry_expectations.insert(*op, *value);
            }
            values[0]
        } else {
            final_energy
        };

        info!(
            status = %status,
            cycles = self.energy_history.len(),
            energy = final_energy,
            physical_energy,
            "adapt finished"
        );

        Ok(AdaptResult {
            problem: self.problem,
            status,
            energy: final_energy,
            physical_energy,
            reference_energy: self.reference_energy,
            parameters: self.ansatz.parameters(),
            ansatz: self.ansatz,
            energy_history: self.energy_history,
            growth_log: self.growth_log,
            final_max_gradient: self.final_max_gradient,
            pool_name: self.ranker.pool().name().to_string(),
            pool_size: self.ranker.pool().len(),
            symmetry_expectations,
            backend_evaluations: self.backend.evaluations(),
            optimizer_evaluations: self.optimizer_evaluations,
        })
    }
}

fn log_cycle(verbose: bool, r: &GrowthRecord) {
    if verbose {
        info!(
            cycle = r.cycle,
            ansatz_size = r.ansatz_size,
            pool_index = r.pool_index,
            gradient = r.gradient,
            energy = r.energy,
            "adapt cycle"
        );
    } else {
        debug!(
            cycle = r.cycle,
            ansatz_size = r.ansatz_size,
            pool_index = r.pool_index,
            gradient = r.gradient,
            energy = r.energy,
            "adapt cycle"
        );
    }
}
