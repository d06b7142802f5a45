//! Error types for the sim crate.

use qadapt_ops::OpsError;
use thiserror::Error;

/// Errors produced while building circuits or evaluating expectations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A gate or Pauli string references a qubit outside the circuit.
    #[error("Qubit {qubit} out of range for a {n_qubits}-qubit circuit")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Width of the circuit.
        n_qubits: u32,
    },

    /// Two-qubit gate with identical control and target.
    #[error("Control and target must differ, both are qubit {0}")]
    SameQubit(u32),

    /// The register is too wide for the statevector simulator.
    #[error("Statevector simulation is limited to {max} qubits, got {got}")]
    TooManyQubits {
        /// Requested width.
        got: u32,
        /// Supported maximum.
        max: u32,
    },

    /// A circuit was applied to a state of a different width.
    #[error("Circuit has {circuit} qubits but the state has {state}")]
    WidthMismatch {
        /// Circuit width.
        circuit: u32,
        /// State width.
        state: u32,
    },

    /// A basis-state preparation did not match the circuit width.
    #[error("Reference state has {got} bits but the circuit has {expected} qubits")]
    ReferenceLength {
        /// Circuit width.
        expected: u32,
        /// Length of the supplied bitstring.
        got: usize,
    },

    /// The observable acts on qubits the circuit does not have.
    #[error("Observable acts on {observable} qubits but the circuit has {circuit}")]
    ObservableTooWide {
        /// Qubits required by the observable.
        observable: u32,
        /// Width of the circuit.
        circuit: u32,
    },

    /// A rotation angle was NaN or infinite.
    #[error("Non-finite rotation angle {0}")]
    NonFiniteAngle(f64),

    /// Shot count must be at least 1.
    #[error("shots must be at least 1, got {0}")]
    InvalidShots(u32),

    /// Operator algebra error.
    #[error("Operator error: {0}")]
    Ops(#[from] OpsError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
