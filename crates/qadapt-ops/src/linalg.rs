//! Dense matrices and exact diagonalization for small registers.
//!
//! Basis states are indexed little-endian: qubit `q` is bit `q` of the index,
//! and bit value 1 is |1⟩.  The same convention is used by the statevector
//! simulator.
//!
//! Eigenvalues come from cyclic Jacobi sweeps.  A Hermitian matrix with any
//! imaginary entry is handled through its real symmetric embedding
//!
//!   [[Re H, −Im H],
//!    [Im H,  Re H]]
//!
//! whose spectrum is that of H with every eigenvalue doubled.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::operator::QubitOperator;
use crate::pauli::{PauliOp, PauliString};

/// Widest register accepted by [`to_dense`] and the eigensolvers.
pub const MAX_EXACT_QUBITS: u32 = 10;

const MAX_SWEEPS: usize = 100;
const HERMITIAN_TOL: f64 = 1e-9;

/// Apply a Pauli string to the basis state `index`: `P|index⟩ = phase |out⟩`.
pub fn apply_to_basis_state(pauli: &PauliString, index: usize) -> (Complex64, usize) {
    let mut phase = Complex64::new(1.0, 0.0);
    let mut out = index;
    for &(q, op) in pauli.ops() {
        let bit = (index >> q) & 1;
        match op {
            PauliOp::I => {}
            PauliOp::X => out ^= 1 << q,
            PauliOp::Y => {
                out ^= 1 << q;
                // Y|0⟩ = i|1⟩, Y|1⟩ = −i|0⟩
                phase *= if bit == 0 {
                    Complex64::new(0.0, 1.0)
                } else {
                    Complex64::new(0.0, -1.0)
                };
            }
            PauliOp::Z => {
                if bit == 1 {
                    phase = -phase;
                }
            }
        }
    }
    (phase, out)
}

/// Expectation of `op` in the computational basis state `bits`
/// (`bits[q]` is qubit `q`).  Only diagonal (Z-type) terms contribute.
pub fn basis_state_expectation(op: &QubitOperator, bits: &[bool]) -> f64 {
    op.terms()
        .iter()
        .filter(|t| t.pauli.ops().iter().all(|&(_, p)| p == PauliOp::Z))
        .map(|t| {
            let odd = t
                .pauli
                .ops()
                .iter()
                .filter(|&&(q, _)| bits.get(q as usize).copied().unwrap_or(false))
                .count()
                % 2
                == 1;
            if odd { -t.coeff.re } else { t.coeff.re }
        })
        .sum()
}

fn check_width(n_qubits: u32) -> OpsResult<usize> {
    if n_qubits > MAX_EXACT_QUBITS {
        return Err(OpsError::TooManyQubits {
            got: n_qubits,
            max: MAX_EXACT_QUBITS,
        });
    }
    Ok(1usize << n_qubits)
}

/// Dense matrix of `op` on `n_qubits` qubits.
pub fn to_dense(op: &QubitOperator, n_qubits: u32) -> OpsResult<Array2<Complex64>> {
    let dim = check_width(n_qubits.max(op.min_qubits()))?;
    let mut m = Array2::<Complex64>::zeros((dim, dim));
    for term in op.terms() {
        for col in 0..dim {
            let (phase, row) = apply_to_basis_state(&term.pauli, col);
            m[[row, col]] += term.coeff * phase;
        }
    }
    Ok(m)
}

/// All eigenvalues of a Hermitian operator, ascending.
pub fn eigenvalues(op: &QubitOperator, n_qubits: u32) -> OpsResult<Vec<f64>> {
    let herm_err = op.hermiticity_error();
    if herm_err > HERMITIAN_TOL {
        return Err(OpsError::NotHermitian(herm_err));
    }
    let m = to_dense(op, n_qubits)?;
    let dim = m.nrows();
    let complex = m.iter().any(|z| z.im.abs() > 0.0);

    let mut values = if complex {
        let mut real = Array2::<f64>::zeros((2 * dim, 2 * dim));
        for ((r, c), z) in m.indexed_iter() {
            real[[r, c]] = z.re;
            real[[r + dim, c + dim]] = z.re;
            real[[r, c + dim]] = -z.im;
            real[[r + dim, c]] = z.im;
        }
        let mut all = jacobi_eigenvalues(real)?;
        all.sort_by(f64::total_cmp);
        all.into_iter().step_by(2).collect::<Vec<_>>()
    } else {
        jacobi_eigenvalues(m.mapv(|z| z.re))?
    };
    values.sort_by(f64::total_cmp);
    debug!(n_qubits, dim, complex, "exact diagonalization finished");
    Ok(values)
}

/// Lowest eigenvalue of a Hermitian operator.
pub fn exact_ground_energy(op: &QubitOperator, n_qubits: u32) -> OpsResult<f64> {
    let values = eigenvalues(op, n_qubits)?;
    Ok(values.first().copied().unwrap_or(0.0))
}

/// Cyclic Jacobi eigenvalue iteration for a real symmetric matrix.
fn jacobi_eigenvalues(mut a: Array2<f64>) -> OpsResult<Vec<f64>> {
    let n = a.nrows();
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for sweep in 0..MAX_SWEEPS {
        let mut off = 0.0_f64;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off.sqrt() <= 1e-14 * scale {
            debug!(sweep, "jacobi converged");
            return Ok((0..n).map(|i| a[[i, i]]).collect());
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for r in 0..n {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = a[[r, p]];
                    let arq = a[[r, q]];
                    let new_rp = c * arp - s * arq;
                    let new_rq = c * arq + s * arp;
                    a[[r, p]] = new_rp;
                    a[[p, r]] = new_rp;
                    a[[r, q]] = new_rq;
                    a[[q, r]] = new_rq;
                }
                a[[p, p]] -= t * apq;
                a[[q, q]] += t * apq;
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;
            }
        }
    }
    Err(OpsError::EigenNotConverged(MAX_SWEEPS))
}
