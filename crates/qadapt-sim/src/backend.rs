//! Expectation-value backends.
//!
//! An [`ExpectationBackend`] maps `(circuit, observable)` to ⟨ψ|O|ψ⟩ where
//! |ψ⟩ is the state the circuit prepares from |0...0⟩.  Backends take
//! `&mut self`: the shot backend owns a seeded RNG, so the order of calls
//! fully determines its results.

use std::fmt;

use qadapt_ops::{PauliOp, QubitOperator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::circuit::{Circuit, Gate};
use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Default seed of the shot backend.
pub const DEFAULT_SEED: u64 = 42;

/// Expectation-value oracle used by the solvers.
pub trait ExpectationBackend {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// ⟨ψ|O|ψ⟩ for the state prepared by `circuit`.
    fn expectation(&mut self, circuit: &Circuit, observable: &QubitOperator) -> SimResult<f64>;

    /// Expectations of several observables on the same state.
    ///
    /// Backends that can reuse the prepared state should override this.
    fn expectations(
        &mut self,
        circuit: &Circuit,
        observables: &[&QubitOperator],
    ) -> SimResult<Vec<f64>> {
        observables
            .iter()
            .map(|o| self.expectation(circuit, o))
            .collect()
    }

    /// Number of state preparations performed so far.
    fn evaluations(&self) -> u64;
}

impl<B: ExpectationBackend + ?Sized> ExpectationBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn expectation(&mut self, circuit: &Circuit, observable: &QubitOperator) -> SimResult<f64> {
        (**self).expectation(circuit, observable)
    }

    fn expectations(
        &mut self,
        circuit: &Circuit,
        observables: &[&QubitOperator],
    ) -> SimResult<Vec<f64>> {
        (**self).expectations(circuit, observables)
    }

    fn evaluations(&self) -> u64 {
        (**self).evaluations()
    }
}

// ---------------------------------------------------------------------------
// Exact statevector backend
// ---------------------------------------------------------------------------

/// Exact expectation values from a full statevector.
#[derive(Debug, Default, Clone)]
pub struct StatevectorBackend {
    evaluations: u64,
}

impl StatevectorBackend {
    /// Create a new statevector backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate `circuit` and return the state.
    pub fn state(&mut self, circuit: &Circuit) -> SimResult<Statevector> {
        self.evaluations += 1;
        Statevector::from_circuit(circuit)
    }
}

impl ExpectationBackend for StatevectorBackend {
    fn name(&self) -> &str {
        "statevector"
    }

    fn expectation(&mut self, circuit: &Circuit, observable: &QubitOperator) -> SimResult<f64> {
        let sv = self.state(circuit)?;
        sv.expectation(observable)
    }

    fn expectations(
        &mut self,
        circuit: &Circuit,
        observables: &[&QubitOperator],
    ) -> SimResult<Vec<f64>> {
        let sv = self.state(circuit)?;
        observables.iter().map(|o| sv.expectation(o)).collect()
    }

    fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

// ---------------------------------------------------------------------------
// Shot-sampling backend
// ---------------------------------------------------------------------------

/// Finite-shot estimator: every non-identity term is measured separately in
/// its own eigenbasis with `shots` samples.  Identity terms are exact.
#[derive(Debug, Clone)]
pub struct ShotBackend {
    shots: u32,
    seed: u64,
    rng: StdRng,
    evaluations: u64,
}

impl ShotBackend {
    /// Create a shot backend with a fixed seed.
    pub fn new(shots: u32, seed: u64) -> SimResult<Self> {
        if shots == 0 {
            return Err(SimError::InvalidShots(shots));
        }
        Ok(Self {
            shots,
            seed,
            rng: StdRng::seed_from_u64(seed),
            evaluations: 0,
        })
    }

    /// Shots per measured term.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// The seed the RNG was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn estimate(&mut self, state: &Statevector, observable: &QubitOperator) -> SimResult<f64> {
        let width = observable.min_qubits();
        if width > state.num_qubits() {
            return Err(SimError::ObservableTooWide {
                observable: width,
                circuit: state.num_qubits(),
            });
        }

        let mut total = 0.0;
        for term in observable.terms() {
            if term.pauli.is_identity() {
                total += term.coeff.re;
                continue;
            }
            // Rotate into the Z basis of this term: X → H, Y → Sdg·H.
            let mut rotated = state.clone();
            for &(q, op) in term.pauli.ops() {
                match op {
                    PauliOp::X => rotated.apply(&Gate::H(q)),
                    PauliOp::Y => {
                        rotated.apply(&Gate::Sdg(q));
                        rotated.apply(&Gate::H(q));
                    }
                    PauliOp::Z | PauliOp::I => {}
                }
            }
            let mask: usize = term.pauli.ops().iter().map(|&(q, _)| 1usize << q).sum();
            let outcomes = rotated.sample(self.shots, &mut self.rng);
            let parity_sum: i64 = outcomes
                .iter()
                .map(|&o| if (o & mask).count_ones() % 2 == 0 { 1 } else { -1 })
                .sum();
            let mean = parity_sum as f64 / f64::from(self.shots);
            trace!(pauli = %term.pauli, mean, "sampled term");
            total += term.coeff.re * mean;
        }
        Ok(total)
    }
}

impl ExpectationBackend for ShotBackend {
    fn name(&self) -> &str {
        "shots"
    }

    #[instrument(skip_all, fields(shots = self.shots, n_terms = observable.n_terms()))]
    fn expectation(&mut self, circuit: &Circuit, observable: &QubitOperator) -> SimResult<f64> {
        self.evaluations += 1;
        let sv = Statevector::from_circuit(circuit)?;
        self.estimate(&sv, observable)
    }

    fn expectations(
        &mut self,
        circuit: &Circuit,
        observables: &[&QubitOperator],
    ) -> SimResult<Vec<f64>> {
        self.evaluations += 1;
        let sv = Statevector::from_circuit(circuit)?;
        observables.iter().map(|o| self.estimate(&sv, o)).collect()
    }

    fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Serializable backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendKind {
    /// Exact statevector expectations.
    #[default]
    Statevector,
    /// Finite-shot sampling.
    Shots {
        /// Shots per measured term.
        shots: u32,
        /// RNG seed.
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl BackendKind {
    /// Instantiate the backend.
    pub fn build(&self) -> SimResult<Box<dyn ExpectationBackend>> {
        debug!(backend = %self, "building expectation backend");
        Ok(match *self {
            BackendKind::Statevector => Box::new(StatevectorBackend::new()),
            BackendKind::Shots { shots, seed } => Box::new(ShotBackend::new(shots, seed)?),
        })
    }

    /// True for backends whose values are exact.
    pub fn is_exact(&self) -> bool {
        matches!(self, BackendKind::Statevector)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Statevector => write!(f, "statevector"),
            BackendKind::Shots { shots, seed } => write!(f, "shots({shots}, seed={seed})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statevector_counts_evaluations() {
        let mut backend = StatevectorBackend::new();
        let c = Circuit::basis_state("ref", &[true, false]);
        let z0 = QubitOperator::real_term("Z0".parse().unwrap(), 1.0);
        let z1 = QubitOperator::real_term("Z1".parse().unwrap(), 1.0);
        assert!((backend.expectation(&c, &z0).unwrap() + 1.0).abs() < 1e-12);
        let both = backend.expectations(&c, &[&z0, &z1]).unwrap();
        assert_eq!(both.len(), 2);
        assert!((both[1] - 1.0).abs() < 1e-12);
        assert_eq!(backend.evaluations(), 2);
    }

    #[test]
    fn test_zero_shots_rejected() {
        assert!(matches!(ShotBackend::new(0, 1), Err(SimError::InvalidShots(0))));
    }

    #[test]
    fn test_backend_kind_serde() {
        let kind: BackendKind = serde_json::from_str(r#"{"kind": "shots", "shots": 100}"#).unwrap();
        assert_eq!(
            kind,
            BackendKind::Shots {
                shots: 100,
                seed: DEFAULT_SEED
            }
        );
        assert!(!kind.is_exact());
        assert_eq!(kind.build().unwrap().name(), "shots");
    }
}
