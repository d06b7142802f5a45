//! Single-qubit Pauli operators and Pauli strings.
//!
//! A Pauli string is a tensor product of single-qubit Pauli operators on
//! named qubits, e.g. `X0 Y1 Z3`.  Qubits that are not listed carry the
//! identity.
//!
//! # Example
//!
//! ```rust
//! use qadapt_ops::pauli::{PauliOp, PauliString};
//!
//! let a: PauliString = "X0 Z1".parse().unwrap();
//! let b: PauliString = "Y0".parse().unwrap();
//! let (phase, p) = a.product(&b);
//! // X·Y = iZ on qubit 0
//! assert_eq!(p.to_string(), "Z0 Z1");
//! assert!((phase.im - 1.0).abs() < 1e-15);
//! assert_eq!(p.ops()[0], (0, PauliOp::Z));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Get the name of this Pauli operator.
    pub fn name(&self) -> &'static str {
        match self {
            PauliOp::I => "I",
            PauliOp::X => "X",
            PauliOp::Y => "Y",
            PauliOp::Z => "Z",
        }
    }

    /// Parse a single letter (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(PauliOp::I),
            'X' => Some(PauliOp::X),
            'Y' => Some(PauliOp::Y),
            'Z' => Some(PauliOp::Z),
            _ => None,
        }
    }

    /// True for X and Y, the factors that flip a computational basis bit.
    pub fn is_flip(&self) -> bool {
        matches!(self, PauliOp::X | PauliOp::Y)
    }

    /// Single-qubit product `self · other = phase · result`.
    pub fn mul(self, other: PauliOp) -> (Complex64, PauliOp) {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match (self, other) {
            (PauliOp::I, p) | (p, PauliOp::I) => (one, p),
            (a, b) if a == b => (one, PauliOp::I),
            (PauliOp::X, PauliOp::Y) => (i, PauliOp::Z),
            (PauliOp::Y, PauliOp::X) => (-i, PauliOp::Z),
            (PauliOp::Y, PauliOp::Z) => (i, PauliOp::X),
            (PauliOp::Z, PauliOp::Y) => (-i, PauliOp::X),
            (PauliOp::Z, PauliOp::X) => (i, PauliOp::Y),
            (PauliOp::X, PauliOp::Z) => (-i, PauliOp::Y),
            _ => unreachable!("all Pauli pairs are covered above"),
        }
    }
}

impl fmt::Display for PauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with identity factors
/// omitted.  Serialized in its text form (`"X0 Y1 Z3"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// The identity string.
    pub fn identity() -> Self {
        Self { ops: Vec::new() }
    }

    /// Construct a PauliString from an iterator of (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    /// Each qubit must appear at most once; use [`PauliString::try_from_ops`]
    /// for untrusted input.
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        debug_assert!(
            v.windows(2).all(|w| w[0].0 != w[1].0),
            "duplicate qubit in Pauli string"
        );
        Self { ops: v }
    }

    /// Like [`PauliString::from_ops`] but rejects repeated qubits.
    pub fn try_from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> OpsResult<Self> {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        if let Some(w) = v.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(OpsError::DuplicateQubit(w[0].0));
        }
        Ok(Self { ops: v })
    }

    /// Single-qubit string.
    pub fn single(qubit: u32, op: PauliOp) -> Self {
        Self::from_ops([(qubit, op)])
    }

    /// Construct a Z⊗Z⊗...⊗Z string spanning the given qubits.
    pub fn zz(qubits: impl IntoIterator<Item = u32>) -> Self {
        Self::from_ops(qubits.into_iter().map(|q| (q, PauliOp::Z)))
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// True if there are no non-identity operators.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.ops.len()
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// The operator acting on `qubit` (identity if not listed).
    pub fn get(&self, qubit: u32) -> PauliOp {
        self.ops
            .binary_search_by_key(&qubit, |(q, _)| *q)
            .map_or(PauliOp::I, |idx| self.ops[idx].1)
    }

    /// Number of factors equal to `op`.
    pub fn count(&self, op: PauliOp) -> usize {
        self.ops.iter().filter(|(_, p)| *p == op).count()
    }

    /// Qubits carrying an X or Y factor, ascending.
    pub fn flip_mask(&self) -> Vec<u32> {
        self.ops
            .iter()
            .filter(|(_, p)| p.is_flip())
            .map(|(q, _)| *q)
            .collect()
    }

    /// Keep only the factors for which `keep` returns true.
    pub fn filtered(&self, keep: impl Fn(PauliOp) -> bool) -> Self {
        Self {
            ops: self.ops.iter().copied().filter(|(_, p)| keep(*p)).collect(),
        }
    }

    /// Replace (or insert) the factor on `qubit`.
    #[must_use]
    pub fn with_op(&self, qubit: u32, op: PauliOp) -> Self {
        let mut ops: Vec<(u32, PauliOp)> =
            self.ops.iter().copied().filter(|(q, _)| *q != qubit).collect();
        if op != PauliOp::I {
            ops.push((qubit, op));
            ops.sort_by_key(|(q, _)| *q);
        }
        Self { ops }
    }

    /// Product `self · other = phase · result`.
    pub fn product(&self, other: &PauliString) -> (Complex64, PauliString) {
        let (a, b) = (&self.ops, &other.ops);
        let mut ops = Vec::with_capacity(a.len() + b.len());
        let mut phase = Complex64::new(1.0, 0.0);
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            let (qa, pa) = a[i];
            let (qb, pb) = b[j];
            match qa.cmp(&qb) {
                Ordering::Less => {
                    ops.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    ops.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    let (p, op) = pa.mul(pb);
                    phase *= p;
                    if op != PauliOp::I {
                        ops.push((qa, op));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        ops.extend_from_slice(&a[i..]);
        ops.extend_from_slice(&b[j..]);

        (phase, PauliString { ops })
    }

    /// True if the two strings commute (they anticommute on an even number
    /// of shared qubits).
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let mut anti = 0usize;
        for &(q, p) in &self.ops {
            let o = other.get(q);
            if o != PauliOp::I && o != p {
                anti += 1;
            }
        }
        anti % 2 == 0
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "I");
        }
        for (i, (qubit, op)) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{op}{qubit}")?;
        }
        Ok(())
    }
}

impl FromStr for PauliString {
    type Err = OpsError;

    /// Parse `"X0 Y1 Z3"`; `""` and `"I"` denote the identity.
    fn from_str(s: &str) -> OpsResult<Self> {
        let invalid = |reason: &str| OpsError::InvalidPauliString {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("i") {
            return Ok(Self::identity());
        }

        let mut ops = Vec::new();
        for token in trimmed.split_whitespace() {
            let mut chars = token.chars();
            let letter = chars.next().ok_or_else(|| invalid("empty factor"))?;
            let op = PauliOp::from_char(letter)
                .ok_or_else(|| invalid(&format!("unknown Pauli '{letter}'")))?;
            let qubit: u32 = chars
                .as_str()
                .parse()
                .map_err(|_| invalid(&format!("bad qubit index in '{token}'")))?;
            ops.push((qubit, op));
        }
        Self::try_from_ops(ops)
    }
}

impl TryFrom<String> for PauliString {
    type Error = OpsError;

    fn try_from(value: String) -> OpsResult<Self> {
        value.parse()
    }
}

impl From<PauliString> for String {
    fn from(value: PauliString) -> Self {
        value.to_string()
    }
}
