//! Qubit operators: complex-weighted sums of Pauli strings.
//!
//!   O = Σ_k  c_k · P_k,   c_k ∈ ℂ
//!
//! Hamiltonians are Hermitian qubit operators (real coefficients); ansatz
//! generators are anti-Hermitian ones (imaginary coefficients).
//!
//! Terms keep their insertion order: the first time a Pauli string is added
//! fixes its position, and later additions of the same string accumulate into
//! that slot.  Everything downstream that iterates terms (pool construction in
//! particular) is therefore deterministic.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::pauli::PauliString;

/// Coefficients with magnitude at or below this are treated as zero by
/// [`QubitOperator::simplify`] and the algebra helpers.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// A single weighted Pauli string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitTerm {
    /// The Pauli string.
    pub pauli: PauliString,
    /// Complex coefficient, serialized as `[re, im]`.
    pub coeff: Complex64,
}

impl QubitTerm {
    /// Create a new term.
    pub fn new(pauli: PauliString, coeff: Complex64) -> Self {
        Self { pauli, coeff }
    }

    /// Real-coefficient term.
    pub fn real(pauli: PauliString, coeff: f64) -> Self {
        Self::new(pauli, Complex64::new(coeff, 0.0))
    }
}

/// A complex-weighted sum of Pauli strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<QubitTerm>", into = "Vec<QubitTerm>")]
pub struct QubitOperator {
    terms: Vec<QubitTerm>,
    index: FxHashMap<PauliString, usize>,
}

impl QubitOperator {
    /// The zero operator.
    pub fn zero() -> Self {
        Self::default()
    }

    /// `c · I`.
    pub fn identity(coeff: f64) -> Self {
        Self::from_term(PauliString::identity(), Complex64::new(coeff, 0.0))
    }

    /// A single term.
    pub fn from_term(pauli: PauliString, coeff: Complex64) -> Self {
        let mut op = Self::zero();
        op.add_term(pauli, coeff);
        op
    }

    /// A single term with a real coefficient.
    pub fn real_term(pauli: PauliString, coeff: f64) -> Self {
        Self::from_term(pauli, Complex64::new(coeff, 0.0))
    }

    /// Build from `(PauliString, coefficient)` pairs, accumulating repeats.
    pub fn from_terms(terms: impl IntoIterator<Item = (PauliString, Complex64)>) -> Self {
        let mut op = Self::zero();
        for (pauli, coeff) in terms {
            op.add_term(pauli, coeff);
        }
        op
    }

    /// Build from `(PauliString, real coefficient)` pairs.
    pub fn from_real_terms(terms: impl IntoIterator<Item = (PauliString, f64)>) -> Self {
        Self::from_terms(
            terms
                .into_iter()
                .map(|(p, c)| (p, Complex64::new(c, 0.0))),
        )
    }

    /// Add `coeff · pauli`, accumulating into an existing slot if present.
    pub fn add_term(&mut self, pauli: PauliString, coeff: Complex64) {
        if let Some(&idx) = self.index.get(&pauli) {
            self.terms[idx].coeff += coeff;
        } else {
            self.index.insert(pauli.clone(), self.terms.len());
            self.terms.push(QubitTerm::new(pauli, coeff));
        }
    }

    /// All terms, in insertion order.
    pub fn terms(&self) -> &[QubitTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms at all.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of `pauli` (zero if absent).
    pub fn coefficient(&self, pauli: &PauliString) -> Complex64 {
        self.index
            .get(pauli)
            .map_or(Complex64::new(0.0, 0.0), |&idx| self.terms[idx].coeff)
    }

    /// Coefficient of the identity string.
    pub fn constant(&self) -> Complex64 {
        self.coefficient(&PauliString::identity())
    }

    /// The minimum number of qubits required to represent this operator.
    ///
    /// Returns 0 if the operator is empty or purely identity.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1)
    }

    /// Σ |c_k|, an upper bound on the spectral norm.
    pub fn one_norm(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.norm()).sum()
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Complex64) -> Self {
        Self::from_terms(self.terms.iter().map(|t| (t.pauli.clone(), t.coeff * factor)))
    }

    /// Hermitian conjugate: Pauli strings are Hermitian, so only the
    /// coefficients are conjugated.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self::from_terms(self.terms.iter().map(|t| (t.pauli.clone(), t.coeff.conj())))
    }

    /// Drop terms with |c| ≤ `tol`.
    #[must_use]
    pub fn simplify(&self, tol: f64) -> Self {
        Self::from_terms(
            self.terms
                .iter()
                .filter(|t| t.coeff.norm() > tol)
                .map(|t| (t.pauli.clone(), t.coeff)),
        )
    }

    /// Operator product `self · other`, simplified with the default tolerance.
    #[must_use]
    pub fn product(&self, other: &QubitOperator) -> Self {
        let mut out = Self::zero();
        for a in &self.terms {
            for b in &other.terms {
                let (phase, pauli) = a.pauli.product(&b.pauli);
                out.add_term(pauli, a.coeff * b.coeff * phase);
            }
        }
        out.simplify(DEFAULT_TOLERANCE)
    }

    /// Commutator `[self, other] = self·other − other·self`.
    ///
    /// Commuting string pairs cancel exactly and are skipped; anticommuting
    /// pairs contribute `2 · a · b · (P_a P_b)`.
    #[must_use]
    pub fn commutator(&self, other: &QubitOperator) -> Self {
        let mut out = Self::zero();
        for a in &self.terms {
            for b in &other.terms {
                if a.pauli.commutes_with(&b.pauli) {
                    continue;
                }
                let (phase, pauli) = a.pauli.product(&b.pauli);
                out.add_term(pauli, 2.0 * a.coeff * b.coeff * phase);
            }
        }
        out.simplify(DEFAULT_TOLERANCE)
    }

    /// Integer power (`pow(0)` is the identity).
    #[must_use]
    pub fn pow(&self, exponent: u32) -> Self {
        let mut out = Self::identity(1.0);
        for _ in 0..exponent {
            out = out.product(self);
        }
        out
    }

    /// Largest |Im c_k|; zero for Hermitian operators.
    pub fn hermiticity_error(&self) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coeff.im.abs())
            .fold(0.0, f64::max)
    }

    /// Largest |Re c_k|; zero for anti-Hermitian operators.
    pub fn anti_hermiticity_error(&self) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coeff.re.abs())
            .fold(0.0, f64::max)
    }

    /// True if every coefficient is real within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.hermiticity_error() <= tol
    }

    /// True if every coefficient is imaginary within `tol`.
    pub fn is_anti_hermitian(&self, tol: f64) -> bool {
        self.anti_hermiticity_error() <= tol
    }

    /// True if all coefficients are within `tol` of those of `other`.
    pub fn approx_eq(&self, other: &QubitOperator, tol: f64) -> bool {
        let diff = self - other;
        diff.terms.iter().all(|t| t.coeff.norm() <= tol)
    }
}

impl PartialEq for QubitOperator {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl From<Vec<QubitTerm>> for QubitOperator {
    fn from(terms: Vec<QubitTerm>) -> Self {
        Self::from_terms(terms.into_iter().map(|t| (t.pauli, t.coeff)))
    }
}

impl From<QubitOperator> for Vec<QubitTerm> {
    fn from(op: QubitOperator) -> Self {
        op.terms
    }
}

impl FromIterator<QubitTerm> for QubitOperator {
    fn from_iter<T: IntoIterator<Item = QubitTerm>>(iter: T) -> Self {
        Self::from_terms(iter.into_iter().map(|t| (t.pauli, t.coeff)))
    }
}

impl AddAssign<&QubitOperator> for QubitOperator {
    fn add_assign(&mut self, rhs: &QubitOperator) {
        for t in &rhs.terms {
            self.add_term(t.pauli.clone(), t.coeff);
        }
    }
}

impl Add for &QubitOperator {
    type Output = QubitOperator;

    fn add(self, rhs: &QubitOperator) -> QubitOperator {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub for &QubitOperator {
    type Output = QubitOperator;

    fn sub(self, rhs: &QubitOperator) -> QubitOperator {
        let mut out = self.clone();
        for t in &rhs.terms {
            out.add_term(t.pauli.clone(), -t.coeff);
        }
        out
    }
}

impl Neg for &QubitOperator {
    type Output = QubitOperator;

    fn neg(self) -> QubitOperator {
        self.scaled(Complex64::new(-1.0, 0.0))
    }
}

impl Mul for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: &QubitOperator) -> QubitOperator {
        self.product(rhs)
    }
}

impl Mul<f64> for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: f64) -> QubitOperator {
        self.scaled(Complex64::new(rhs, 0.0))
    }
}

impl Mul<Complex64> for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: Complex64) -> QubitOperator {
        self.scaled(rhs)
    }
}

impl fmt::Display for QubitOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if t.coeff.im == 0.0 {
                write!(f, "{:.6} [{}]", t.coeff.re, t.pauli)?;
            } else if t.coeff.re == 0.0 {
                write!(f, "{:.6}i [{}]", t.coeff.im, t.pauli)?;
            } else {
                write!(f, "({:.6}{:+.6}i) [{}]", t.coeff.re, t.coeff.im, t.pauli)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(s: &str) -> PauliString {
        s.parse().unwrap()
    }

    #[test]
    fn test_accumulates_in_insertion_order() {
        let mut op = QubitOperator::zero();
        op.add_term(ps("Z0"), Complex64::new(1.0, 0.0));
        op.add_term(ps("X1"), Complex64::new(0.5, 0.0));
        op.add_term(ps("Z0"), Complex64::new(0.25, 0.0));

        assert_eq!(op.n_terms(), 2);
        assert_eq!(op.terms()[0].pauli, ps("Z0"));
        assert!((op.coefficient(&ps("Z0")).re - 1.25).abs() < 1e-15);
    }

    #[test]
    fn test_product_of_paulis() {
        let x = QubitOperator::real_term(ps("X0"), 1.0);
        let y = QubitOperator::real_term(ps("Y0"), 1.0);
        let xy = &x * &y;
        assert_eq!(xy.n_terms(), 1);
        assert_eq!(xy.coefficient(&ps("Z0")), Complex64::new(0.0, 1.0));
    }

    #[test]
    fn test_commutator_xy() {
        // [X, Y] = 2iZ
        let x = QubitOperator::real_term(ps("X0"), 1.0);
        let y = QubitOperator::real_term(ps("Y0"), 1.0);
        let c = x.commutator(&y);
        assert_eq!(c.coefficient(&ps("Z0")), Complex64::new(0.0, 2.0));
    }

    #[test]
    fn test_commutator_matches_products() {
        let a = QubitOperator::from_real_terms([(ps("X0 Z1"), 0.3), (ps("Y1"), -0.7)]);
        let b = QubitOperator::from_real_terms([(ps("Z0"), 1.1), (ps("X0 X1"), 0.2)]);
        let expected = &(&a * &b) - &(&b * &a);
        assert!(a.commutator(&b).approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_simplify_drops_cancelled_terms() {
        let a = QubitOperator::from_real_terms([(ps("Z0"), 1.0), (ps("Z1"), 2.0)]);
        let b = QubitOperator::real_term(ps("Z0"), 1.0);
        let diff = (&a - &b).simplify(DEFAULT_TOLERANCE);
        assert_eq!(diff.n_terms(), 1);
        assert_eq!(diff.terms()[0].pauli, ps("Z1"));
    }

    #[test]
    fn test_hermiticity_checks() {
        let h = QubitOperator::from_real_terms([(ps("X0 X1"), 0.5)]);
        assert!(h.is_hermitian(1e-12));
        let g = h.scaled(Complex64::new(0.0, 1.0));
        assert!(g.is_anti_hermitian(1e-12));
        assert!(!g.is_hermitian(1e-12));
    }

    #[test]
    fn test_pow_of_pauli_is_identity() {
        let z = QubitOperator::real_term(ps("Z2"), 1.0);
        let z2 = z.pow(2);
        assert_eq!(z2.n_terms(), 1);
        assert!((z2.constant().re - 1.0).abs() < 1e-15);
    }
}
