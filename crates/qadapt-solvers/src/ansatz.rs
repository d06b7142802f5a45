//! The growing ansatz: a reference state followed by generator rotations.
//!
//! Each element `(A_k, θ_k)` with `A_k = Σ_j i a_j P_j` contributes the
//! product `Π_j exp(i θ_k a_j P_j)`, realised as Pauli rotations with angle
//! `−2 θ_k a_j`.  For single-string generators this is exactly `exp(θ_k A_k)`.

use qadapt_ops::QubitOperator;
use qadapt_sim::circuit::Circuit;
use qadapt_sim::error::SimResult;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// One generator and its parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsatzElement {
    /// Anti-Hermitian generator.
    pub generator: QubitOperator,
    /// Rotation parameter θ.
    pub parameter: f64,
    /// Pool position the generator came from, if any.
    pub pool_index: Option<usize>,
}

/// Append the rotations of `exp(θ A)` to `circuit`.
pub fn append_generator(circuit: &mut Circuit, generator: &QubitOperator, theta: f64) -> SimResult<()> {
    for term in generator.terms() {
        circuit.pauli_rotation(&term.pauli, -2.0 * theta * term.coeff.im)?;
    }
    Ok(())
}

/// Reference bitstring plus an append-only list of elements.
///
/// `version` increases on every mutation so callers can tell snapshots
/// apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ansatz {
    reference: Vec<bool>,
    elements: Vec<AnsatzElement>,
    version: u64,
}

impl Ansatz {
    /// Empty ansatz on top of the basis state `reference` (`reference[q]`
    /// is qubit `q`).
    pub fn new(reference: Vec<bool>) -> Self {
        Self {
            reference,
            elements: Vec::new(),
            version: 0,
        }
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.reference.len() as u32
    }

    /// The reference bitstring.
    pub fn reference(&self) -> &[bool] {
        &self.reference
    }

    /// Number of generators.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True before the first generator is appended.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Elements in application order.
    pub fn elements(&self) -> &[AnsatzElement] {
        &self.elements
    }

    /// Current parameter vector.
    pub fn parameters(&self) -> Vec<f64> {
        self.elements.iter().map(|e| e.parameter).collect()
    }

    /// Append `generator` with parameter 0.
    pub fn append(&mut self, generator: QubitOperator, pool_index: Option<usize>) {
        self.elements.push(AnsatzElement {
            generator,
            parameter: 0.0,
            pool_index,
        });
        self.version += 1;
    }

    /// Replace every parameter.
    pub fn set_parameters(&mut self, params: &[f64]) -> SolverResult<()> {
        self.check_len(params)?;
        for (e, &p) in self.elements.iter_mut().zip(params) {
            e.parameter = p;
        }
        self.version += 1;
        Ok(())
    }

    fn check_len(&self, params: &[f64]) -> SolverResult<()> {
        if params.len() != self.elements.len() {
            return Err(SolverError::ParameterCount {
                expected: self.elements.len(),
                got: params.len(),
            });
        }
        Ok(())
    }

    /// Circuit for the stored parameters.
    pub fn build_circuit(&self) -> SolverResult<Circuit> {
        self.circuit_with(&self.parameters())
    }

    /// Circuit for `params` without touching the stored parameters.
    pub fn circuit_with(&self, params: &[f64]) -> SolverResult<Circuit> {
        self.check_len(params)?;
        let mut circuit = Circuit::basis_state("adapt_ansatz", &self.reference);
        for (e, &theta) in self.elements.iter().zip(params) {
            append_generator(&mut circuit, &e.generator, theta)?;
        }
        Ok(circuit)
    }

    /// Circuit for the stored parameters with one extra trial generator.
    pub fn circuit_with_extra(&self, extra: &QubitOperator, theta: f64) -> SolverResult<Circuit> {
        let mut circuit = self.build_circuit()?;
        append_generator(&mut circuit, extra, theta)?;
        Ok(circuit)
    }
}
