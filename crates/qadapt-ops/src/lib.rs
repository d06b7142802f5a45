//! `qadapt-ops` — operator algebra for variational quantum chemistry.
//!
//! Provides the building blocks every other qadapt crate consumes:
//!
//! - **Pauli strings** and their products (`pauli`)
//! - **Qubit operators**: Hamiltonians and anti-Hermitian generators
//!   as complex-weighted Pauli sums (`operator`)
//! - **Fermionic operators** and the Jordan–Wigner / parity mappings
//!   (`fermion`, `mapping`)
//! - **Symmetry operators** N, Sz and S² (`symmetry`)
//! - **Exact diagonalization** of small registers (`linalg`)
//!
//! # Quick start
//!
//! ```rust
//! use qadapt_ops::operator::QubitOperator;
//! use qadapt_ops::linalg::exact_ground_energy;
//!
//! // Heisenberg dimer: XX + YY + ZZ
//! let h = QubitOperator::from_real_terms([
//!     ("X0 X1".parse().unwrap(), 1.0),
//!     ("Y0 Y1".parse().unwrap(), 1.0),
//!     ("Z0 Z1".parse().unwrap(), 1.0),
//! ]);
//! let e0 = exact_ground_energy(&h, 2).unwrap();
//! assert!((e0 + 3.0).abs() < 1e-10);
//! ```

pub mod error;
pub mod fermion;
pub mod linalg;
pub mod mapping;
pub mod operator;
pub mod pauli;
pub mod symmetry;

pub use error::{OpsError, OpsResult};
pub use fermion::{FermionOperator, Ladder};
pub use mapping::{QubitMapping, Spin, SpinOrdering};
pub use operator::{QubitOperator, QubitTerm};
pub use pauli::{PauliOp, PauliString};
pub use symmetry::SymmetryOperator;
