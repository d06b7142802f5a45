//! Pauli-string exponentiation.
//!
//! Implements the standard gate synthesis for
//!
//!   exp(-i θ/2 · P)
//!
//! where P is a tensor product of Pauli operators, using the circuit identity:
//!
//!   exp(-i θ/2 · Z⊗Z⊗...⊗Z) = CNOT_ladder · Rz(θ) · CNOT_ladder†
//!
//! with basis rotations applied before/after to handle X and Y factors:
//!   X → H · Z · H
//!   Y → Sdg · H · Z · H · S
//!   Z → identity
//!
//! Gate count per string: 2·(k-1) CX + up to 4·k basis gates + 1 Rz,
//! where k = number of non-identity qubits.

use qadapt_ops::{PauliOp, PauliString};

use crate::circuit::Circuit;
use crate::error::{SimError, SimResult};

/// Append the gate-level circuit for `exp(-i θ/2 · P)` to `circuit`.
///
/// If the Pauli string is the identity operator the function is a no-op
/// (global phase, unobservable).
pub fn append_exp_pauli(circuit: &mut Circuit, pauli: &PauliString, theta: f64) -> SimResult<()> {
    let ops = pauli.ops();
    let Some(&(target, _)) = ops.last() else {
        return Ok(());
    };

    let n_qubits = circuit.num_qubits();
    for &(q, _) in ops {
        if q >= n_qubits {
            return Err(SimError::QubitOutOfRange { qubit: q, n_qubits });
        }
    }

    // --- Step 1: basis rotations (diagonalise each Pauli into Z) ---
    basis_change(circuit, ops, false)?;

    // --- Step 2: CNOT ladder collapsing parity onto the last qubit ---
    let qubits: Vec<u32> = ops.iter().map(|(q, _)| *q).collect();
    cnot_ladder(circuit, &qubits)?;

    // --- Step 3: Rz(θ) on the last qubit ---
    circuit.rz(theta, target)?;

    // --- Step 4: undo CNOT ladder ---
    cnot_ladder_reverse(circuit, &qubits)?;

    // --- Step 5: undo basis rotations ---
    basis_change(circuit, ops, true)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply basis-change gates for each Pauli operator.
///
/// For the forward pass (`undo = false`):
///   X → H
///   Y → Sdg · H
///   Z → (nothing)
///
/// For the reverse pass (`undo = true`):
///   X → H  (H is self-inverse)
///   Y → H · S
///   Z → (nothing)
fn basis_change(circuit: &mut Circuit, ops: &[(u32, PauliOp)], undo: bool) -> SimResult<()> {
    for &(q, op) in ops {
        match (op, undo) {
            (PauliOp::X, _) => {
                circuit.h(q)?;
            }
            (PauliOp::Y, false) => {
                circuit.sdg(q)?;
                circuit.h(q)?;
            }
            (PauliOp::Y, true) => {
                circuit.h(q)?;
                circuit.s(q)?;
            }
            (PauliOp::Z | PauliOp::I, _) => {}
        }
    }
    Ok(())
}

/// Forward CNOT ladder: CX(q[0],q[1]), CX(q[1],q[2]), …, CX(q[k-2], q[k-1]).
fn cnot_ladder(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2) {
        circuit.cx(window[0], window[1])?;
    }
    Ok(())
}

/// The same ladder run backwards.
fn cnot_ladder_reverse(circuit: &mut Circuit, qubits: &[u32]) -> SimResult<()> {
    for window in qubits.windows(2).rev() {
        circuit.cx(window[0], window[1])?;
    }
    Ok(())
}
