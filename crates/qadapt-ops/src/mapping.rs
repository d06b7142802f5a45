//! Fermion-to-qubit mappings and spin-orbital bookkeeping.
//!
//! Two encodings are supported, both with bit value 1 meaning "occupied":
//!
//! - **Jordan–Wigner**: qubit j stores n_j.
//!   a†_j = ½ (X_j − iY_j) · Z_0 ⋯ Z_{j−1}
//! - **Parity**: qubit j stores n_0 ⊕ ⋯ ⊕ n_j.
//!   a†_j = ½ (Z_{j−1} X_j − iY_j) · X_{j+1} ⋯ X_{n−1}
//!
//! Spin-orbitals are assigned to modes by a [`SpinOrdering`].

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{OpsError, OpsResult};
use crate::fermion::FermionOperator;
use crate::operator::{DEFAULT_TOLERANCE, QubitOperator};
use crate::pauli::{PauliOp, PauliString};

/// Fermion-to-qubit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QubitMapping {
    /// Jordan–Wigner (occupation-number) encoding.
    #[default]
    #[serde(rename = "jw", alias = "jordan_wigner")]
    JordanWigner,
    /// Parity encoding.
    #[serde(rename = "parity")]
    Parity,
}

impl QubitMapping {
    /// Short name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            QubitMapping::JordanWigner => "jw",
            QubitMapping::Parity => "parity",
        }
    }
}

impl fmt::Display for QubitMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for QubitMapping {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jw" | "jordan_wigner" | "jordan-wigner" => Ok(QubitMapping::JordanWigner),
            "parity" => Ok(QubitMapping::Parity),
            _ => Err(OpsError::UnknownMapping(s.to_string())),
        }
    }
}

/// Spin projection of a spin-orbital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    /// Spin up.
    Alpha,
    /// Spin down.
    Beta,
}

/// Assignment of spin-orbitals to fermionic modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinOrdering {
    /// α₀ β₀ α₁ β₁ …
    #[default]
    Interleaved,
    /// α₀ α₁ … β₀ β₁ …
    UpThenDown,
}

impl SpinOrdering {
    /// Mode index of spatial orbital `orbital` with spin `spin`.
    pub fn spin_orbital(&self, orbital: u32, spin: Spin, n_orbitals: u32) -> u32 {
        match (self, spin) {
            (SpinOrdering::Interleaved, Spin::Alpha) => 2 * orbital,
            (SpinOrdering::Interleaved, Spin::Beta) => 2 * orbital + 1,
            (SpinOrdering::UpThenDown, Spin::Alpha) => orbital,
            (SpinOrdering::UpThenDown, Spin::Beta) => n_orbitals + orbital,
        }
    }

    /// Spin of mode `mode` (inverse of [`SpinOrdering::spin_orbital`]).
    pub fn spin_of(&self, mode: u32, n_orbitals: u32) -> Spin {
        let alpha = match self {
            SpinOrdering::Interleaved => mode % 2 == 0,
            SpinOrdering::UpThenDown => mode < n_orbitals,
        };
        if alpha { Spin::Alpha } else { Spin::Beta }
    }

    /// Short name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            SpinOrdering::Interleaved => "interleaved",
            SpinOrdering::UpThenDown => "up_then_down",
        }
    }
}

impl fmt::Display for SpinOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SpinOrdering {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interleaved" => Ok(SpinOrdering::Interleaved),
            "up_then_down" | "up-then-down" | "blocked" => Ok(SpinOrdering::UpThenDown),
            _ => Err(OpsError::UnknownOrdering(s.to_string())),
        }
    }
}

/// Qubit image of a single ladder operator in a register of `n_modes` modes.
pub fn ladder_operator(
    mapping: QubitMapping,
    mode: u32,
    dagger: bool,
    n_modes: u32,
) -> OpsResult<QubitOperator> {
    if mode >= n_modes {
        return Err(OpsError::ModeOutOfRange { mode, n_modes });
    }
    // a† carries −i on the Y part, a carries +i.
    let y_coeff = if dagger {
        Complex64::new(0.0, -0.5)
    } else {
        Complex64::new(0.0, 0.5)
    };
    let half = Complex64::new(0.5, 0.0);

    let (x_part, y_part) = match mapping {
        QubitMapping::JordanWigner => {
            let z_chain = (0..mode).map(|k| (k, PauliOp::Z));
            let x = PauliString::from_ops(z_chain.clone().chain([(mode, PauliOp::X)]));
            let y = PauliString::from_ops(z_chain.chain([(mode, PauliOp::Y)]));
            (x, y)
        }
        QubitMapping::Parity => {
            let x_chain = (mode + 1..n_modes).map(|k| (k, PauliOp::X));
            let x_head: Vec<(u32, PauliOp)> = if mode > 0 {
                vec![(mode - 1, PauliOp::Z), (mode, PauliOp::X)]
            } else {
                vec![(mode, PauliOp::X)]
            };
            let x = PauliString::from_ops(x_head.into_iter().chain(x_chain.clone()));
            let y = PauliString::from_ops([(mode, PauliOp::Y)].into_iter().chain(x_chain));
            (x, y)
        }
    };

    Ok(QubitOperator::from_terms([(x_part, half), (y_part, y_coeff)]))
}

/// Map a fermionic operator onto qubits.
///
/// Each monomial becomes the product of its mapped ladder operators; the
/// result is simplified with the default tolerance.
pub fn fermion_to_qubit(
    op: &FermionOperator,
    mapping: QubitMapping,
    n_modes: u32,
) -> OpsResult<QubitOperator> {
    let mut out = QubitOperator::zero();
    for (ladders, coeff) in op.terms() {
        let mut product = QubitOperator::from_term(PauliString::identity(), *coeff);
        for l in ladders {
            let image = ladder_operator(mapping, l.mode, l.dagger, n_modes)?;
            product = product.product(&image);
        }
        out += &product;
    }
    let out = out.simplify(DEFAULT_TOLERANCE);
    trace!(
        n_fermion_terms = op.terms().len(),
        n_qubit_terms = out.n_terms(),
        mapping = %mapping,
        "mapped fermion operator"
    );
    Ok(out)
}

/// Hartree–Fock occupation of `n_spinorbitals` spin-orbitals.
///
/// `spin` is 2S = N_α − N_β.  The lowest N_α alpha and N_β beta orbitals are
/// filled.  The returned vector is indexed by mode.
pub fn hf_occupation(
    n_electrons: u32,
    spin: i32,
    n_spinorbitals: u32,
    ordering: SpinOrdering,
) -> OpsResult<Vec<bool>> {
    if n_spinorbitals % 2 != 0 {
        return Err(OpsError::OddSpinOrbitals(n_spinorbitals));
    }
    let invalid = || OpsError::InvalidOccupation {
        n_electrons,
        spin,
        n_spinorbitals,
    };
    let n_orbitals = n_spinorbitals / 2;
    let total = i64::from(n_electrons);
    let spin = i64::from(spin);
    if (total + spin) % 2 != 0 {
        return Err(invalid());
    }
    let n_alpha = (total + spin) / 2;
    let n_beta = (total - spin) / 2;
    if n_alpha < 0 || n_beta < 0 || n_alpha > i64::from(n_orbitals) || n_beta > i64::from(n_orbitals)
    {
        return Err(invalid());
    }

    let mut occ = vec![false; n_spinorbitals as usize];
    for i in 0..n_alpha as u32 {
        occ[ordering.spin_orbital(i, Spin::Alpha, n_orbitals) as usize] = true;
    }
    for i in 0..n_beta as u32 {
        occ[ordering.spin_orbital(i, Spin::Beta, n_orbitals) as usize] = true;
    }
    Ok(occ)
}

/// Qubit basis state encoding a fermionic occupation vector.
pub fn mapped_reference(occupation: &[bool], mapping: QubitMapping) -> Vec<bool> {
    match mapping {
        QubitMapping::JordanWigner => occupation.to_vec(),
        QubitMapping::Parity => occupation
            .iter()
            .scan(false, |parity, &n| {
                *parity ^= n;
                Some(*parity)
            })
            .collect(),
    }
}
