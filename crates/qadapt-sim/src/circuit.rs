//! Gate-level circuit representation.
//!
//! A [`Circuit`] is a flat, ordered gate list on a fixed register.  Besides
//! the usual one- and two-qubit gates it carries a native
//! [`Gate::PauliRotation`] so ansatz circuits can be simulated without
//! expanding every exponential; [`Circuit::decompose`] lowers those rotations
//! to CX ladders when gate-level resource counts are needed.

use std::fmt;

use qadapt_ops::PauliString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::synthesis::append_exp_pauli;

/// A single gate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Pauli-X.
    X(u32),
    /// Pauli-Y.
    Y(u32),
    /// Pauli-Z.
    Z(u32),
    /// Hadamard.
    H(u32),
    /// Phase gate diag(1, i).
    S(u32),
    /// Inverse phase gate diag(1, −i).
    Sdg(u32),
    /// exp(−i θ/2 X).
    Rx(f64, u32),
    /// exp(−i θ/2 Y).
    Ry(f64, u32),
    /// exp(−i θ/2 Z).
    Rz(f64, u32),
    /// Controlled-X.
    Cx {
        /// Control qubit.
        control: u32,
        /// Target qubit.
        target: u32,
    },
    /// exp(−i θ/2 P) for a Pauli string P.
    PauliRotation {
        /// The rotation axis.
        pauli: PauliString,
        /// Rotation angle.
        theta: f64,
    },
}

impl Gate {
    /// Short gate name, as used in resource counts.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::H(_) => "h",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Cx { .. } => "cx",
            Gate::PauliRotation { .. } => "pauli_rotation",
        }
    }

    /// Qubits the gate acts on.
    pub fn qubits(&self) -> Vec<u32> {
        match self {
            Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::H(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::Rx(_, q)
            | Gate::Ry(_, q)
            | Gate::Rz(_, q) => vec![*q],
            Gate::Cx { control, target } => vec![*control, *target],
            Gate::PauliRotation { pauli, .. } => pauli.ops().iter().map(|(q, _)| *q).collect(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rx(t, q) | Gate::Ry(t, q) | Gate::Rz(t, q) => {
                write!(f, "{}({t:.6}) q{q}", self.name())
            }
            Gate::Cx { control, target } => write!(f, "cx q{control}, q{target}"),
            Gate::PauliRotation { pauli, theta } => write!(f, "exp(-i {theta:.6}/2 [{pauli}])"),
            other => write!(f, "{} q{}", other.name(), other.qubits()[0]),
        }
    }
}

/// A quantum circuit on a fixed register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Register width.
    n_qubits: u32,
    /// Gates in application order.
    gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit on `n_qubits` qubits.
    pub fn new(name: impl Into<String>, n_qubits: u32) -> Self {
        Self {
            name: name.into(),
            n_qubits,
            gates: Vec::new(),
        }
    }

    /// Prepare the computational basis state `bits` (`bits[q]` is qubit `q`)
    /// with X gates.
    pub fn basis_state(name: impl Into<String>, bits: &[bool]) -> Self {
        let mut circuit = Self::new(name, bits.len() as u32);
        for (q, &bit) in bits.iter().enumerate() {
            if bit {
                circuit.gates.push(Gate::X(q as u32));
            }
        }
        circuit
    }

    fn check(&self, qubit: u32) -> SimResult<()> {
        if qubit >= self.n_qubits {
            return Err(SimError::QubitOutOfRange {
                qubit,
                n_qubits: self.n_qubits,
            });
        }
        Ok(())
    }

    fn check_angle(theta: f64) -> SimResult<()> {
        if !theta.is_finite() {
            return Err(SimError::NonFiniteAngle(theta));
        }
        Ok(())
    }

    /// Append an arbitrary gate after validating its operands.
    pub fn push(&mut self, gate: Gate) -> SimResult<&mut Self> {
        for q in gate.qubits() {
            self.check(q)?;
        }
        match &gate {
            Gate::Cx { control, target } if control == target => {
                return Err(SimError::SameQubit(*control));
            }
            Gate::Rx(t, _) | Gate::Ry(t, _) | Gate::Rz(t, _) => Self::check_angle(*t)?,
            Gate::PauliRotation { theta, .. } => Self::check_angle(*theta)?,
            _ => {}
        }
        self.gates.push(gate);
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::X(qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Y(qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Z(qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::H(qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::S(qubit))
    }

    /// Apply S† gate.
    pub fn sdg(&mut self, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Sdg(qubit))
    }

    /// Apply Rx(θ).
    pub fn rx(&mut self, theta: f64, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Rx(theta, qubit))
    }

    /// Apply Ry(θ).
    pub fn ry(&mut self, theta: f64, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Ry(theta, qubit))
    }

    /// Apply Rz(θ).
    pub fn rz(&mut self, theta: f64, qubit: u32) -> SimResult<&mut Self> {
        self.push(Gate::Rz(theta, qubit))
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: u32, target: u32) -> SimResult<&mut Self> {
        self.push(Gate::Cx { control, target })
    }

    /// Apply exp(−i θ/2 P).  Identity strings are a global phase and are
    /// dropped.
    pub fn pauli_rotation(&mut self, pauli: &PauliString, theta: f64) -> SimResult<&mut Self> {
        if pauli.is_identity() {
            Self::check_angle(theta)?;
            return Ok(self);
        }
        self.push(Gate::PauliRotation {
            pauli: pauli.clone(),
            theta,
        })
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Name of the circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.n_qubits
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True if the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Gate counts by name.
    pub fn gate_counts(&self) -> FxHashMap<&'static str, usize> {
        let mut counts = FxHashMap::default();
        for g in &self.gates {
            *counts.entry(g.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of CX gates after lowering Pauli rotations: each rotation of
    /// weight k costs 2·(k−1).
    pub fn cnot_count(&self) -> usize {
        self.gates
            .iter()
            .map(|g| match g {
                Gate::Cx { .. } => 1,
                Gate::PauliRotation { pauli, .. } => 2 * pauli.weight().saturating_sub(1),
                _ => 0,
            })
            .sum()
    }

    /// Circuit depth (longest chain of gates sharing a qubit).
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.n_qubits as usize];
        for g in &self.gates {
            let qubits = g.qubits();
            let next = qubits
                .iter()
                .map(|&q| layer[q as usize])
                .max()
                .unwrap_or(0)
                + 1;
            for q in qubits {
                layer[q as usize] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// Equivalent circuit with every Pauli rotation expanded into basis
    /// changes, CX ladders and an Rz.
    pub fn decompose(&self) -> SimResult<Circuit> {
        let mut out = Circuit::new(self.name.clone(), self.n_qubits);
        for g in &self.gates {
            match g {
                Gate::PauliRotation { pauli, theta } => append_exp_pauli(&mut out, pauli, *theta)?,
                other => {
                    out.push(other.clone())?;
                }
            }
        }
        Ok(out)
    }

    /// Append every gate of `other` (same width required).
    pub fn append(&mut self, other: &Circuit) -> SimResult<&mut Self> {
        for g in &other.gates {
            self.push(g.clone())?;
        }
        Ok(self)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "circuit {} ({} qubits, {} gates)", self.name, self.n_qubits, self.len())?;
        for g in &self.gates {
            writeln!(f, "  {g}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chains() {
        let mut c = Circuit::new("t", 2);
        c.h(0).unwrap().cx(0, 1).unwrap().rz(0.5, 1).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.cnot_count(), 1);
        assert_eq!(c.depth(), 3);
    }

    #[test]
    fn test_out_of_range() {
        let mut c = Circuit::new("t", 2);
        assert!(matches!(
            c.x(2),
            Err(SimError::QubitOutOfRange { qubit: 2, n_qubits: 2 })
        ));
        assert!(matches!(c.cx(1, 1), Err(SimError::SameQubit(1))));
        assert!(matches!(c.rz(f64::NAN, 0), Err(SimError::NonFiniteAngle(_))));
    }

    #[test]
    fn test_basis_state() {
        let c = Circuit::basis_state("ref", &[true, false, true]);
        assert_eq!(c.num_qubits(), 3);
        assert_eq!(c.gates(), &[Gate::X(0), Gate::X(2)]);
    }

    #[test]
    fn test_pauli_rotation_costs() {
        let mut c = Circuit::new("t", 4);
        let p: PauliString = "X0 Y1 Z3".parse().unwrap();
        c.pauli_rotation(&p, 0.3).unwrap();
        c.pauli_rotation(&PauliString::identity(), 0.3).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.cnot_count(), 4);

        let lowered = c.decompose().unwrap();
        assert_eq!(lowered.cnot_count(), 4);
        assert_eq!(lowered.gate_counts().get("rz"), Some(&1));
        assert!(!lowered.gate_counts().contains_key("pauli_rotation"));
    }
}
