//! Fermionic operators: sums of products of creation/annihilation operators.
//!
//! Only what the mappings and the symmetry operators need is provided:
//! ladder monomials, sums, products and the adjoint.  No normal ordering is
//! performed; equal monomials are merged verbatim.

use std::fmt;
use std::ops::{Add, Mul};

use num_complex::Complex64;
use rustc_hash::FxHashMap;

/// A single creation (`dagger = true`) or annihilation operator on a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ladder {
    /// Spin-orbital (mode) index.
    pub mode: u32,
    /// `true` for a†, `false` for a.
    pub dagger: bool,
}

impl Ladder {
    /// Creation operator a†_mode.
    pub fn create(mode: u32) -> Self {
        Self { mode, dagger: true }
    }

    /// Annihilation operator a_mode.
    pub fn annihilate(mode: u32) -> Self {
        Self {
            mode,
            dagger: false,
        }
    }

    /// The adjoint ladder operator.
    pub fn adjoint(self) -> Self {
        Self {
            mode: self.mode,
            dagger: !self.dagger,
        }
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dagger {
            write!(f, "{}^", self.mode)
        } else {
            write!(f, "{}", self.mode)
        }
    }
}

/// Complex-weighted sum of ladder-operator products, read left to right.
#[derive(Debug, Clone, Default)]
pub struct FermionOperator {
    terms: Vec<(Vec<Ladder>, Complex64)>,
    index: FxHashMap<Vec<Ladder>, usize>,
}

impl FermionOperator {
    /// The zero operator.
    pub fn zero() -> Self {
        Self::default()
    }

    /// `c · I`.
    pub fn identity(coeff: f64) -> Self {
        Self::monomial(Vec::new(), Complex64::new(coeff, 0.0))
    }

    /// A single product of ladder operators.
    pub fn monomial(ops: Vec<Ladder>, coeff: Complex64) -> Self {
        let mut out = Self::zero();
        out.add_term(ops, coeff);
        out
    }

    /// a†_mode or a_mode.
    pub fn ladder(mode: u32, dagger: bool) -> Self {
        Self::monomial(vec![Ladder { mode, dagger }], Complex64::new(1.0, 0.0))
    }

    /// Number operator n_p = a†_p a_p.
    pub fn number(mode: u32) -> Self {
        Self::monomial(
            vec![Ladder::create(mode), Ladder::annihilate(mode)],
            Complex64::new(1.0, 0.0),
        )
    }

    /// Hopping term a†_p a_q.
    pub fn hopping(p: u32, q: u32) -> Self {
        Self::monomial(
            vec![Ladder::create(p), Ladder::annihilate(q)],
            Complex64::new(1.0, 0.0),
        )
    }

    /// Add `coeff · ops`, accumulating into an identical monomial if present.
    pub fn add_term(&mut self, ops: Vec<Ladder>, coeff: Complex64) {
        if let Some(&idx) = self.index.get(&ops) {
            self.terms[idx].1 += coeff;
        } else {
            self.index.insert(ops.clone(), self.terms.len());
            self.terms.push((ops, coeff));
        }
    }

    /// All monomials in insertion order.
    pub fn terms(&self) -> &[(Vec<Ladder>, Complex64)] {
        &self.terms
    }

    /// Highest mode index referenced, if any.
    pub fn max_mode(&self) -> Option<u32> {
        self.terms
            .iter()
            .flat_map(|(ops, _)| ops.iter().map(|l| l.mode))
            .max()
    }

    /// True if every coefficient is zero within `tol`.
    pub fn is_zero(&self, tol: f64) -> bool {
        self.terms.iter().all(|(_, c)| c.norm() <= tol)
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Complex64) -> Self {
        let mut out = Self::zero();
        for (ops, c) in &self.terms {
            out.add_term(ops.clone(), c * factor);
        }
        out
    }

    /// Hermitian conjugate: reverse each product, adjoint each factor,
    /// conjugate the coefficient.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zero();
        for (ops, c) in &self.terms {
            let rev: Vec<Ladder> = ops.iter().rev().map(|l| l.adjoint()).collect();
            out.add_term(rev, c.conj());
        }
        out
    }
}

impl Add for &FermionOperator {
    type Output = FermionOperator;

    fn add(self, rhs: &FermionOperator) -> FermionOperator {
        let mut out = self.clone();
        for (ops, c) in &rhs.terms {
            out.add_term(ops.clone(), *c);
        }
        out
    }
}

impl Mul for &FermionOperator {
    type Output = FermionOperator;

    fn mul(self, rhs: &FermionOperator) -> FermionOperator {
        let mut out = FermionOperator::zero();
        for (a, ca) in &self.terms {
            for (b, cb) in &rhs.terms {
                let mut ops = a.clone();
                ops.extend_from_slice(b);
                out.add_term(ops, ca * cb);
            }
        }
        out
    }
}

impl fmt::Display for FermionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (ops, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "({:.6}{:+.6}i) [", c.re, c.im)?;
            for (j, l) in ops.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{l}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
