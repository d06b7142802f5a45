//! `qadapt-sim` — circuits and expectation values for variational solvers.
//!
//! - **Circuit IR** with a native Pauli-rotation gate (`circuit`)
//! - **Pauli-exponential synthesis** into CX ladders (`synthesis`)
//! - **Statevector engine** (`statevector`)
//! - **Expectation backends**: exact statevector and seeded shot sampling
//!   (`backend`)
//!
//! # Quick start
//!
//! ```rust
//! use qadapt_ops::QubitOperator;
//! use qadapt_sim::backend::{ExpectationBackend, StatevectorBackend};
//! use qadapt_sim::circuit::Circuit;
//!
//! let mut circuit = Circuit::new("bell", 2);
//! circuit.h(0).unwrap().cx(0, 1).unwrap();
//!
//! let zz = QubitOperator::real_term("Z0 Z1".parse().unwrap(), 1.0);
//! let mut backend = StatevectorBackend::new();
//! let e = backend.expectation(&circuit, &zz).unwrap();
//! assert!((e - 1.0).abs() < 1e-12);
//! ```

pub mod backend;
pub mod circuit;
pub mod error;
pub mod statevector;
pub mod synthesis;

pub use backend::{BackendKind, ExpectationBackend, ShotBackend, StatevectorBackend};
pub use circuit::{Circuit, Gate};
pub use error::{SimError, SimResult};
pub use statevector::Statevector;
