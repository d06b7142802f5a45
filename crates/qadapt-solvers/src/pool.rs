//! Operator pools: the candidate generators ADAPT-VQE can append.
//!
//! A pool is produced once by a [`PoolGenerator`] strategy, validated, and
//! never mutated afterwards.  Every generator is anti-Hermitian, so
//! `exp(θ A)` is unitary for real `θ`.

use num_complex::Complex64;
use qadapt_ops::fermion::{FermionOperator, Ladder};
use qadapt_ops::mapping::{QubitMapping, Spin, SpinOrdering, fermion_to_qubit, hf_occupation};
use qadapt_ops::operator::DEFAULT_TOLERANCE;
use qadapt_ops::{PauliOp, QubitOperator};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Tolerance on the real part of generator coefficients.
pub const GENERATOR_TOLERANCE: f64 = 1e-9;

/// Strategy producing a pool from `(Hamiltonian, qubit count)`.
///
/// Implementations must be pure: the same inputs give the same ordered pool.
/// Any `Fn(&QubitOperator, u32) -> Vec<QubitOperator>` closure is a
/// generator.
pub trait PoolGenerator {
    /// Name reported in logs and results.
    fn name(&self) -> &str;

    /// Produce the ordered list of generators.
    fn generate(&self, hamiltonian: &QubitOperator, n_qubits: u32)
    -> SolverResult<Vec<QubitOperator>>;
}

impl<F> PoolGenerator for F
where
    F: Fn(&QubitOperator, u32) -> Vec<QubitOperator>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn generate(
        &self,
        hamiltonian: &QubitOperator,
        n_qubits: u32,
    ) -> SolverResult<Vec<QubitOperator>> {
        Ok(self(hamiltonian, n_qubits))
    }
}

// ---------------------------------------------------------------------------
// Hamiltonian-inspired pool
// ---------------------------------------------------------------------------

/// One single-string generator per distinct X/Y support of the Hamiltonian.
#[derive(Debug, Clone, Copy, Default)]
pub struct HamiltonianInspired;

impl PoolGenerator for HamiltonianInspired {
    fn name(&self) -> &str {
        "hamiltonian_inspired"
    }

    fn generate(&self, hamiltonian: &QubitOperator, _n_qubits: u32) -> SolverResult<Vec<QubitOperator>> {
        Ok(hamiltonian_inspired_pool(hamiltonian))
    }
}

/// Build the Hamiltonian-inspired pool.
///
/// For every term in order: skip cancelled terms, keep its X/Y factors,
/// require an even number of Y factors, skip supports already emitted, flip
/// the first factor (X↔Y) and emit `i · P`.  Terms made only of I/Z
/// contribute nothing.
pub fn hamiltonian_inspired_pool(hamiltonian: &QubitOperator) -> Vec<QubitOperator> {
    let mut seen: FxHashSet<Vec<u32>> = FxHashSet::default();
    let mut pool = Vec::new();

    for term in hamiltonian.terms() {
        if term.coeff.norm() <= DEFAULT_TOLERANCE {
            continue;
        }
        let flips = term.pauli.filtered(|p| p.is_flip());
        let Some(&(first, op)) = flips.ops().first() else {
            continue;
        };
        if flips.count(PauliOp::Y) % 2 != 0 {
            continue;
        }
        if !seen.insert(flips.flip_mask()) {
            continue;
        }
        let flipped_op = match op {
            PauliOp::X => PauliOp::Y,
            _ => PauliOp::X,
        };
        let generator = flips.with_op(first, flipped_op);
        pool.push(QubitOperator::from_term(generator, Complex64::i()));
    }

    debug!(
        n_terms = hamiltonian.n_terms(),
        pool_size = pool.len(),
        "built hamiltonian-inspired pool"
    );
    pool
}

// ---------------------------------------------------------------------------
// UCCSD pool
// ---------------------------------------------------------------------------

/// Spin-conserving singles and doubles `T − T†` on top of the Hartree–Fock
/// occupation.
#[derive(Debug, Clone, Copy)]
pub struct Uccsd {
    /// Number of electrons in the reference.
    pub n_electrons: u32,
    /// 2S = N_α − N_β.
    pub spin: i32,
    /// Fermion-to-qubit encoding.
    pub mapping: QubitMapping,
    /// Spin-orbital layout.
    pub ordering: SpinOrdering,
}

impl Uccsd {
    fn excitation(&self, creators: &[u32], annihilators: &[u32], n_modes: u32) -> SolverResult<QubitOperator> {
        let ops: Vec<Ladder> = creators
            .iter()
            .map(|&m| Ladder::create(m))
            .chain(annihilators.iter().rev().map(|&m| Ladder::annihilate(m)))
            .collect();
        let t = FermionOperator::monomial(ops, Complex64::new(1.0, 0.0));
        let generator = &t + &t.adjoint().scaled(Complex64::new(-1.0, 0.0));
        Ok(fermion_to_qubit(&generator, self.mapping, n_modes)?)
    }
}

impl PoolGenerator for Uccsd {
    fn name(&self) -> &str {
        "uccsd"
    }

    fn generate(&self, _hamiltonian: &QubitOperator, n_qubits: u32) -> SolverResult<Vec<QubitOperator>> {
        let occupation = hf_occupation(self.n_electrons, self.spin, n_qubits, self.ordering)?;
        let n_orbitals = n_qubits / 2;
        let spin_of = |mode: u32| self.ordering.spin_of(mode, n_orbitals);
        let alpha_count =
            |modes: &[u32]| modes.iter().filter(|&&m| spin_of(m) == Spin::Alpha).count();

        let occupied: Vec<u32> = (0..n_qubits).filter(|&m| occupation[m as usize]).collect();
        let virtual_: Vec<u32> = (0..n_qubits).filter(|&m| !occupation[m as usize]).collect();

        let mut pool = Vec::new();
        let mut push = |op: QubitOperator| {
            let op = op.simplify(DEFAULT_TOLERANCE);
            if !op.is_empty() {
                pool.push(op);
            }
        };

        for &i in &occupied {
            for &a in &virtual_ {
                if spin_of(i) == spin_of(a) {
                    push(self.excitation(&[a], &[i], n_qubits)?);
                }
            }
        }

        for (x, &i) in occupied.iter().enumerate() {
            for &j in &occupied[x + 1..] {
                for (y, &a) in virtual_.iter().enumerate() {
                    for &b in &virtual_[y + 1..] {
                        if alpha_count(&[i, j]) == alpha_count(&[a, b]) {
                            push(self.excitation(&[a, b], &[i, j], n_qubits)?);
                        }
                    }
                }
            }
        }

        debug!(
            n_occupied = occupied.len(),
            n_virtual = virtual_.len(),
            pool_size = pool.len(),
            "built uccsd pool"
        );
        Ok(pool)
    }
}

// ---------------------------------------------------------------------------
// Explicit pool
// ---------------------------------------------------------------------------

/// A caller-supplied list of generators.
#[derive(Debug, Clone, Default)]
pub struct Explicit {
    /// The generators, in pool order.
    pub operators: Vec<QubitOperator>,
}

impl Explicit {
    /// Wrap a list of generators.
    pub fn new(operators: Vec<QubitOperator>) -> Self {
        Self { operators }
    }
}

impl PoolGenerator for Explicit {
    fn name(&self) -> &str {
        "explicit"
    }

    fn generate(&self, _hamiltonian: &QubitOperator, _n_qubits: u32) -> SolverResult<Vec<QubitOperator>> {
        if self.operators.is_empty() {
            return Err(SolverError::EmptyPool);
        }
        Ok(self.operators.clone())
    }
}

// ---------------------------------------------------------------------------
// OperatorPool
// ---------------------------------------------------------------------------

/// Immutable, validated, ordered list of generators.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorPool {
    name: String,
    operators: Vec<QubitOperator>,
}

impl OperatorPool {
    /// Run `generator` and validate its output.
    pub fn build(
        generator: &dyn PoolGenerator,
        hamiltonian: &QubitOperator,
        n_qubits: u32,
    ) -> SolverResult<Self> {
        let operators = generator.generate(hamiltonian, n_qubits)?;
        Self::from_operators(generator.name(), operators, n_qubits)
    }

    /// Validate a list of generators: each must be non-zero, anti-Hermitian
    /// and act only on qubits below `n_qubits`.
    pub fn from_operators(
        name: impl Into<String>,
        operators: Vec<QubitOperator>,
        n_qubits: u32,
    ) -> SolverResult<Self> {
        for (index, op) in operators.iter().enumerate() {
            let invalid = |reason: String| SolverError::InvalidGenerator { index, reason };
            if op.is_empty() {
                return Err(invalid("generator is zero".into()));
            }
            let err = op.anti_hermiticity_error();
            if err > GENERATOR_TOLERANCE {
                return Err(invalid(format!("not anti-Hermitian (max |Re c| = {err:.3e})")));
            }
            let width = op.min_qubits();
            if width > n_qubits {
                return Err(invalid(format!(
                    "acts on {width} qubits but the register has {n_qubits}"
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            operators,
        })
    }

    /// Strategy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of generators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True if the pool has no generators.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Generator at `index`.
    pub fn get(&self, index: usize) -> Option<&QubitOperator> {
        self.operators.get(index)
    }

    /// Generators in pool order.
    pub fn iter(&self) -> std::slice::Iter<'_, QubitOperator> {
        self.operators.iter()
    }

    /// Generators as a slice.
    pub fn operators(&self) -> &[QubitOperator] {
        &self.operators
    }
}

impl<'a> IntoIterator for &'a OperatorPool {
    type Item = &'a QubitOperator;
    type IntoIter = std::slice::Iter<'a, QubitOperator>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
