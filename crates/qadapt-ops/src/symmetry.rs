//! Particle-number and spin operators on a mapped register.
//!
//!   N  = Σ_p a†_p a_p
//!   Sz = ½ Σ_i (n_iα − n_iβ)
//!   S² = S₋S₊ + Sz² + Sz,   S₊ = Σ_i a†_iα a_iβ,   S₋ = S₊†
//!
//! All three are returned as Hermitian qubit operators for the requested
//! mapping and spin-orbital ordering.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};
use crate::fermion::FermionOperator;
use crate::mapping::{QubitMapping, Spin, SpinOrdering, fermion_to_qubit};
use crate::operator::{DEFAULT_TOLERANCE, QubitOperator};

/// The symmetry observables that can be measured or penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymmetryOperator {
    /// Total particle number N.
    N,
    /// Spin projection Sz.
    Sz,
    /// Total spin S².
    S2,
}

impl SymmetryOperator {
    /// All symmetry operators, in canonical order.
    pub const ALL: [SymmetryOperator; 3] =
        [SymmetryOperator::N, SymmetryOperator::Sz, SymmetryOperator::S2];

    /// Configuration name (`n`, `sz`, `s2`).
    pub fn name(&self) -> &'static str {
        match self {
            SymmetryOperator::N => "n",
            SymmetryOperator::Sz => "sz",
            SymmetryOperator::S2 => "s2",
        }
    }

    /// Build the qubit operator for a register of `n_spinorbitals` modes.
    pub fn build(
        &self,
        n_spinorbitals: u32,
        mapping: QubitMapping,
        ordering: SpinOrdering,
    ) -> OpsResult<QubitOperator> {
        match self {
            SymmetryOperator::N => number_operator(n_spinorbitals, mapping),
            SymmetryOperator::Sz => spin_z_operator(n_spinorbitals, mapping, ordering),
            SymmetryOperator::S2 => spin_squared_operator(n_spinorbitals, mapping, ordering),
        }
    }
}

impl fmt::Display for SymmetryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SymmetryOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "number" => Ok(SymmetryOperator::N),
            "sz" => Ok(SymmetryOperator::Sz),
            "s2" | "s^2" => Ok(SymmetryOperator::S2),
            other => Err(format!("unknown symmetry operator '{other}'")),
        }
    }
}

fn check_even(n_spinorbitals: u32) -> OpsResult<u32> {
    if n_spinorbitals % 2 != 0 {
        return Err(OpsError::OddSpinOrbitals(n_spinorbitals));
    }
    Ok(n_spinorbitals / 2)
}

/// Total particle number N.
pub fn number_operator(n_spinorbitals: u32, mapping: QubitMapping) -> OpsResult<QubitOperator> {
    let mut n = FermionOperator::zero();
    for p in 0..n_spinorbitals {
        n = &n + &FermionOperator::number(p);
    }
    fermion_to_qubit(&n, mapping, n_spinorbitals)
}

/// Spin projection Sz.
pub fn spin_z_operator(
    n_spinorbitals: u32,
    mapping: QubitMapping,
    ordering: SpinOrdering,
) -> OpsResult<QubitOperator> {
    let n_orbitals = check_even(n_spinorbitals)?;
    let mut sz = FermionOperator::zero();
    for i in 0..n_orbitals {
        let a = ordering.spin_orbital(i, Spin::Alpha, n_orbitals);
        let b = ordering.spin_orbital(i, Spin::Beta, n_orbitals);
        sz = &sz + &FermionOperator::number(a).scaled(Complex64::new(0.5, 0.0));
        sz = &sz + &FermionOperator::number(b).scaled(Complex64::new(-0.5, 0.0));
    }
    fermion_to_qubit(&sz, mapping, n_spinorbitals)
}

/// Total spin S².
pub fn spin_squared_operator(
    n_spinorbitals: u32,
    mapping: QubitMapping,
    ordering: SpinOrdering,
) -> OpsResult<QubitOperator> {
    let n_orbitals = check_even(n_spinorbitals)?;
    let mut s_plus = FermionOperator::zero();
    for i in 0..n_orbitals {
        let a = ordering.spin_orbital(i, Spin::Alpha, n_orbitals);
        let b = ordering.spin_orbital(i, Spin::Beta, n_orbitals);
        s_plus = &s_plus + &FermionOperator::hopping(a, b);
    }
    let s_plus = fermion_to_qubit(&s_plus, mapping, n_spinorbitals)?;
    let s_minus = s_plus.adjoint();
    let sz = spin_z_operator(n_spinorbitals, mapping, ordering)?;

    let mut s2 = s_minus.product(&s_plus);
    s2 += &sz.product(&sz);
    s2 += &sz;
    Ok(s2.simplify(DEFAULT_TOLERANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::basis_state_expectation;
    use crate::mapping::{hf_occupation, mapped_reference};

    fn expect(op: &QubitOperator, occ: &[bool], mapping: QubitMapping) -> f64 {
        basis_state_expectation(op, &mapped_reference(occ, mapping))
    }

    #[test]
    fn test_number_counts_electrons() {
        for mapping in [QubitMapping::JordanWigner, QubitMapping::Parity] {
            let n = number_operator(6, mapping).unwrap();
            let occ = hf_occupation(4, 0, 6, SpinOrdering::Interleaved).unwrap();
            assert!((expect(&n, &occ, mapping) - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sz_and_s2_on_singlet_and_triplet() {
        for ordering in [SpinOrdering::Interleaved, SpinOrdering::UpThenDown] {
            let sz = spin_z_operator(4, QubitMapping::JordanWigner, ordering).unwrap();
            let s2 = spin_squared_operator(4, QubitMapping::JordanWigner, ordering).unwrap();

            let singlet = hf_occupation(2, 0, 4, ordering).unwrap();
            assert!(expect(&sz, &singlet, QubitMapping::JordanWigner).abs() < 1e-12);
            assert!(expect(&s2, &singlet, QubitMapping::JordanWigner).abs() < 1e-12);

            // Two parallel alpha spins: S = 1, S² = S(S+1) = 2.
            let triplet = hf_occupation(2, 2, 4, ordering).unwrap();
            assert!((expect(&sz, &triplet, QubitMapping::JordanWigner) - 1.0).abs() < 1e-12);
            assert!((expect(&s2, &triplet, QubitMapping::JordanWigner) - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_operators_are_hermitian() {
        for op in SymmetryOperator::ALL {
            let q = op
                .build(4, QubitMapping::Parity, SpinOrdering::Interleaved)
                .unwrap();
            assert!(q.is_hermitian(1e-12), "{op} is not Hermitian");
        }
    }

    #[test]
    fn test_odd_register_rejected() {
        assert!(spin_z_operator(3, QubitMapping::JordanWigner, SpinOrdering::Interleaved).is_err());
    }
}
