//! Built-in model problems.
//!
//! Small qubit Hamiltonians used by the CLI, the tests and the benchmarks.
//! Molecular coefficients are pre-computed (Jordan–Wigner, interleaved spin
//! ordering); no electronic-structure code is involved.

use qadapt_ops::linalg::exact_ground_energy;
use qadapt_ops::{PauliOp, PauliString, QubitOperator};

use crate::error::{SolverError, SolverResult};

/// Names and descriptions of the built-in models.
pub const MODELS: &[(&str, &str)] = &[
    ("h2_sto3g", "H2 / STO-3G at 0.7414 Å, 4 qubits, Jordan-Wigner"),
    ("h2_2q", "Two-qubit H2 model with XX + YY coupling"),
    ("heisenberg_4", "Heisenberg ring, 4 sites, J = 1"),
    ("heisenberg_6", "Heisenberg ring, 6 sites, J = 1"),
    ("tfim_4", "Transverse-field Ising chain, 4 sites, J = h = 1"),
    ("tilted_4", "Uncoupled spins in a tilted field, 4 sites"),
];

/// A qubit Hamiltonian with the metadata ADAPT-VQE needs to start.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Model name.
    pub name: String,
    /// The Hamiltonian.
    pub hamiltonian: QubitOperator,
    /// Register width.
    pub n_qubits: u32,
    /// Electron count for fermionic models.
    pub n_electrons: Option<u32>,
    /// Default reference state (`reference[q]` is qubit `q`).
    pub reference: Option<Vec<bool>>,
}

impl Problem {
    /// Wrap a bare Hamiltonian; the register is as wide as its support.
    pub fn from_hamiltonian(name: impl Into<String>, hamiltonian: QubitOperator) -> Self {
        let n_qubits = hamiltonian.min_qubits();
        Self {
            name: name.into(),
            hamiltonian,
            n_qubits,
            n_electrons: None,
            reference: None,
        }
    }

    /// Ground-state energy by exact diagonalization.
    pub fn exact_energy(&self) -> SolverResult<f64> {
        Ok(exact_ground_energy(&self.hamiltonian, self.n_qubits)?)
    }
}

fn term(text: &str, coeff: f64) -> (PauliString, f64) {
    let ops = text.split_whitespace().filter_map(|tok| {
        let mut chars = tok.chars();
        let op = chars.next().and_then(PauliOp::from_char)?;
        let qubit = chars.as_str().parse().ok()?;
        Some((qubit, op))
    });
    (PauliString::from_ops(ops), coeff)
}

/// H2 in the minimal basis at equilibrium, 4 spin-orbitals.
///
/// Exact ground energy −1.137121 Ha, Hartree–Fock energy −1.116581 Ha.
pub fn h2_sto3g() -> Problem {
    let hamiltonian = QubitOperator::from_real_terms([
        term("", -0.098_863_969_335_457_6),
        term("Z0", 0.171_197_749_034_329_6),
        term("Z1", 0.171_197_749_034_329_6),
        term("Z2", -0.222_785_930_242_876_5),
        term("Z3", -0.222_785_930_242_876_5),
        term("Z0 Z1", 0.168_622_191_589_209_4),
        term("Z0 Z2", 0.120_544_822_032_900_2),
        term("Z1 Z3", 0.120_544_822_032_900_2),
        term("Z0 Z3", 0.165_815_532_690_909_1),
        term("Z1 Z2", 0.165_815_532_690_909_1),
        term("Z2 Z3", 0.174_348_441_839_638_6),
        term("X0 X1 Y2 Y3", -0.045_270_710_658_009_0),
        term("X0 Y1 Y2 X3", 0.045_270_710_658_009_0),
        term("Y0 X1 X2 Y3", 0.045_270_710_658_009_0),
        term("Y0 Y1 X2 X3", -0.045_270_710_658_009_0),
    ]);
    Problem {
        name: "h2_sto3g".into(),
        hamiltonian,
        n_qubits: 4,
        n_electrons: Some(2),
        reference: Some(vec![true, true, false, false]),
    }
}

/// Two-qubit H2 model: `g0 I + g1 (Z0 − Z1) + g3 Z0Z1 + g4 (X0X1 + Y0Y1)`.
///
/// Ground energy ≈ −1.169 in the odd-parity block.
pub fn h2_model_2q() -> Problem {
    let hamiltonian = QubitOperator::from_real_terms([
        term("", -0.32),
        term("Z0", 0.39),
        term("Z1", -0.39),
        term("Z0 Z1", -0.01),
        term("X0 X1", 0.18),
        term("Y0 Y1", 0.18),
    ]);
    Problem {
        name: "h2_2q".into(),
        hamiltonian,
        n_qubits: 2,
        n_electrons: None,
        reference: Some(vec![true, false]),
    }
}

/// Periodic Heisenberg ring `J Σ (XX + YY + ZZ)` with a Néel reference.
pub fn heisenberg_ring(n_sites: u32, coupling: f64) -> SolverResult<Problem> {
    if n_sites < 2 {
        return Err(SolverError::InvalidOption(format!(
            "Heisenberg ring needs at least 2 sites, got {n_sites}"
        )));
    }
    let n_bonds = if n_sites == 2 { 1 } else { n_sites };
    let mut hamiltonian = QubitOperator::zero();
    for i in 0..n_bonds {
        let j = (i + 1) % n_sites;
        for op in [PauliOp::X, PauliOp::Y, PauliOp::Z] {
            let pauli = PauliString::from_ops([(i, op), (j, op)]);
            hamiltonian += &QubitOperator::real_term(pauli, coupling);
        }
    }
    Ok(Problem {
        name: format!("heisenberg_{n_sites}"),
        hamiltonian,
        n_qubits: n_sites,
        n_electrons: None,
        reference: Some((0..n_sites).map(|q| q % 2 == 1).collect()),
    })
}

/// Open transverse-field Ising chain `−J Σ Z_i Z_{i+1} − h Σ X_i`.
pub fn tfim_chain(n_sites: u32, coupling: f64, field: f64) -> SolverResult<Problem> {
    if n_sites == 0 {
        return Err(SolverError::ZeroQubits);
    }
    let mut hamiltonian = QubitOperator::zero();
    for i in 0..n_sites.saturating_sub(1) {
        hamiltonian += &QubitOperator::real_term(PauliString::zz([i, i + 1]), -coupling);
    }
    for i in 0..n_sites {
        hamiltonian += &QubitOperator::real_term(PauliString::single(i, PauliOp::X), -field);
    }
    Ok(Problem {
        name: format!("tfim_{n_sites}"),
        hamiltonian,
        n_qubits: n_sites,
        n_electrons: None,
        reference: None,
    })
}

/// Uncoupled spins in a tilted field `Σ (h_z Z_i + h_x,i X_i)`.
///
/// The ground state is a product state, one rotation per site away from
/// `|0…0⟩`.
pub fn tilted_field(field_z: f64, fields_x: &[f64]) -> SolverResult<Problem> {
    if fields_x.is_empty() {
        return Err(SolverError::ZeroQubits);
    }
    let mut hamiltonian = QubitOperator::zero();
    for (i, &field_x) in fields_x.iter().enumerate() {
        let q = i as u32;
        hamiltonian += &QubitOperator::real_term(PauliString::single(q, PauliOp::Z), field_z);
        hamiltonian += &QubitOperator::real_term(PauliString::single(q, PauliOp::X), field_x);
    }
    Ok(Problem {
        name: format!("tilted_{}", fields_x.len()),
        hamiltonian,
        n_qubits: fields_x.len() as u32,
        n_electrons: None,
        reference: None,
    })
}

/// Look up a built-in model by name.
pub fn model(name: &str) -> SolverResult<Problem> {
    match name {
        "h2_sto3g" => Ok(h2_sto3g()),
        "h2_2q" => Ok(h2_model_2q()),
        "heisenberg_4" => heisenberg_ring(4, 1.0),
        "heisenberg_6" => heisenberg_ring(6, 1.0),
        "tfim_4" => tfim_chain(4, 1.0, 1.0),
        "tilted_4" => tilted_field(-0.5, &[-1.0, -0.8, -0.6, -0.4]),
        other => Err(SolverError::UnknownModel(other.to_string())),
    }
}
