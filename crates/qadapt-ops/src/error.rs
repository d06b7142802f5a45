//! Error types for the operator crate.

use thiserror::Error;

/// Errors produced while building or transforming operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    /// A Pauli-string literal could not be parsed.
    #[error("Invalid Pauli string '{input}': {reason}")]
    InvalidPauliString {
        /// The offending text.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// Two factors of one Pauli string act on the same qubit.
    #[error("Pauli string acts twice on qubit {0}")]
    DuplicateQubit(u32),

    /// A fermionic mode does not fit in the requested register.
    #[error("Fermionic mode {mode} out of range for {n_modes} modes")]
    ModeOutOfRange {
        /// The offending mode index.
        mode: u32,
        /// Number of modes in the register.
        n_modes: u32,
    },

    /// Spin operators need an even number of spin-orbitals.
    #[error("Spin operators need an even number of spin-orbitals, got {0}")]
    OddSpinOrbitals(u32),

    /// Unknown qubit mapping name.
    #[error("Unknown qubit mapping '{0}' (expected 'jw' or 'parity')")]
    UnknownMapping(String),

    /// Unknown spin-orbital ordering name.
    #[error("Unknown spin ordering '{0}' (expected 'interleaved' or 'up_then_down')")]
    UnknownOrdering(String),

    /// Electron count is incompatible with the register or the spin.
    #[error("Cannot place {n_electrons} electrons with spin {spin} in {n_spinorbitals} spin-orbitals")]
    InvalidOccupation {
        /// Number of electrons.
        n_electrons: u32,
        /// Spin (2S = N_alpha - N_beta).
        spin: i32,
        /// Number of spin-orbitals.
        n_spinorbitals: u32,
    },

    /// Dense diagonalization requested for a register that is too wide.
    #[error("Exact diagonalization is limited to {max} qubits, got {got}")]
    TooManyQubits {
        /// Requested width.
        got: u32,
        /// Supported maximum.
        max: u32,
    },

    /// The operator was expected to be Hermitian.
    #[error("Operator is not Hermitian (max deviation {0:.3e})")]
    NotHermitian(f64),

    /// Jacobi sweeps did not reach the off-diagonal tolerance.
    #[error("Eigensolver did not converge after {0} sweeps")]
    EigenNotConverged(usize),
}

/// Result type for operator operations.
pub type OpsResult<T> = Result<T, OpsError>;
