//! Quadratic symmetry penalties.
//!
//! `H_pen = Σ_k w_k (O_k − t_k)²` for `O_k ∈ {N, Sz, S²}`.  The penalty is
//! composed once, before the pool and the ranker are built, and the
//! physical Hamiltonian is kept next to it for reporting.

use std::collections::BTreeMap;

use qadapt_ops::operator::DEFAULT_TOLERANCE;
use qadapt_ops::{QubitMapping, QubitOperator, SpinOrdering, SymmetryOperator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Weight and target eigenvalue of one penalty, serialized as
/// `[weight, target]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct PenaltyTerm {
    /// Penalty weight w (> 0).
    pub weight: f64,
    /// Target eigenvalue t.
    pub target: f64,
}

impl From<(f64, f64)> for PenaltyTerm {
    fn from((weight, target): (f64, f64)) -> Self {
        Self { weight, target }
    }
}

impl From<PenaltyTerm> for (f64, f64) {
    fn from(t: PenaltyTerm) -> Self {
        (t.weight, t.target)
    }
}

/// Up to one penalty per symmetry operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyTerms {
    terms: BTreeMap<SymmetryOperator, PenaltyTerm>,
}

impl PenaltyTerms {
    /// No penalties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the penalty on `op`.
    #[must_use]
    pub fn with(mut self, op: SymmetryOperator, weight: f64, target: f64) -> Self {
        self.terms.insert(op, PenaltyTerm { weight, target });
        self
    }

    /// True if no penalty is configured.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of configured penalties.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Penalty on `op`, if any.
    pub fn get(&self, op: SymmetryOperator) -> Option<&PenaltyTerm> {
        self.terms.get(&op)
    }

    /// Penalties in canonical operator order.
    pub fn iter(&self) -> impl Iterator<Item = (SymmetryOperator, PenaltyTerm)> + '_ {
        self.terms.iter().map(|(&op, &term)| (op, term))
    }

    /// Check every weight and target against a register of
    /// `n_spinorbitals` modes on `n_qubits` qubits.
    pub fn validate(&self, n_spinorbitals: u32, n_qubits: u32) -> SolverResult<()> {
        for (op, term) in self.iter() {
            let invalid = |reason: String| SolverError::InvalidPenalty {
                operator: op.name().to_string(),
                reason,
            };
            if !term.weight.is_finite() || term.weight <= 0.0 {
                return Err(invalid(format!(
                    "weight must be finite and positive, got {}",
                    term.weight
                )));
            }
            if !term.target.is_finite() {
                return Err(invalid(format!("target must be finite, got {}", term.target)));
            }
            if n_spinorbitals % 2 != 0 || n_spinorbitals > n_qubits {
                return Err(invalid(format!(
                    "{n_spinorbitals} spin-orbitals do not fit an even register of {n_qubits} qubits"
                )));
            }
            match op {
                SymmetryOperator::N => {
                    if term.target < 0.0 || term.target > f64::from(n_spinorbitals) {
                        return Err(invalid(format!(
                            "particle number {} outside [0, {n_spinorbitals}]",
                            term.target
                        )));
                    }
                }
                SymmetryOperator::Sz => {
                    let twice = 2.0 * term.target;
                    if (twice - twice.round()).abs() > 1e-9 {
                        return Err(invalid(format!(
                            "Sz target {} is not a multiple of 1/2",
                            term.target
                        )));
                    }
                }
                SymmetryOperator::S2 => {
                    if term.target < 0.0 {
                        return Err(invalid(format!("S² target {} is negative", term.target)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Build the combined penalty operator and the bare symmetry operators
    /// it was composed from.
    pub fn build(
        &self,
        n_spinorbitals: u32,
        mapping: QubitMapping,
        ordering: SpinOrdering,
    ) -> SolverResult<(QubitOperator, Vec<(SymmetryOperator, QubitOperator)>)> {
        let mut penalty = QubitOperator::zero();
        let mut observables = Vec::with_capacity(self.len());
        for (op, term) in self.iter() {
            let o = op.build(n_spinorbitals, mapping, ordering)?;
            let shifted = &o - &QubitOperator::identity(term.target);
            let square = shifted.product(&shifted);
            penalty += &(&square * term.weight);
            observables.push((op, o));
        }
        Ok((penalty.simplify(DEFAULT_TOLERANCE), observables))
    }
}

/// Physical Hamiltonian, penalty, and their sum.
#[derive(Debug, Clone)]
pub struct PenalizedHamiltonian {
    /// Unpenalized Hamiltonian, used for reported physical energies.
    pub physical: QubitOperator,
    /// `Σ w (O − t)²`; zero without penalties.
    pub penalty: QubitOperator,
    /// `physical + penalty`: drives ranking and optimization.
    pub total: QubitOperator,
    /// The bare symmetry operators that carry a penalty.
    pub observables: Vec<(SymmetryOperator, QubitOperator)>,
}

impl PenalizedHamiltonian {
    /// Compose `physical` with `penalties` on a register of `n_qubits`
    /// spin-orbitals.
    pub fn compose(
        physical: QubitOperator,
        penalties: &PenaltyTerms,
        n_qubits: u32,
        mapping: QubitMapping,
        ordering: SpinOrdering,
    ) -> SolverResult<Self> {
        if penalties.is_empty() {
            return Ok(Self::unpenalized(physical));
        }
        penalties.validate(n_qubits, n_qubits)?;
        let (penalty, observables) = penalties.build(n_qubits, mapping, ordering)?;
        let total = (&physical + &penalty).simplify(DEFAULT_TOLERANCE);
        debug!(
            n_penalties = penalties.len(),
            penalty_terms = penalty.n_terms(),
            total_terms = total.n_terms(),
            "composed penalty hamiltonian"
        );
        Ok(Self {
            physical,
            penalty,
            total,
            observables,
        })
    }

    /// No penalty: `total == physical`.
    pub fn unpenalized(physical: QubitOperator) -> Self {
        Self {
            total: physical.clone(),
            physical,
            penalty: QubitOperator::zero(),
            observables: Vec::new(),
        }
    }

    /// True if a penalty was added.
    pub fn is_penalized(&self) -> bool {
        !self.observables.is_empty()
    }
}
