//! Statevector simulation engine.
//!
//! Amplitudes are indexed little-endian (qubit `q` is bit `q`), matching
//! [`qadapt_ops::linalg`].

use num_complex::Complex64;
use qadapt_ops::linalg::apply_to_basis_state;
use qadapt_ops::{PauliString, QubitOperator};
use rand::Rng;
use std::f64::consts::PI;

use crate::circuit::{Circuit, Gate};
use crate::error::{SimError, SimResult};

/// Widest register the statevector engine accepts.
pub const MAX_STATEVECTOR_QUBITS: u32 = 24;

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        if num_qubits > MAX_STATEVECTOR_QUBITS {
            return Err(SimError::TooManyQubits {
                got: num_qubits,
                max: MAX_STATEVECTOR_QUBITS,
            });
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Run `circuit` on |0...0⟩.
    pub fn from_circuit(circuit: &Circuit) -> SimResult<Self> {
        let mut sv = Self::new(circuit.num_qubits())?;
        sv.apply_circuit(circuit)?;
        Ok(sv)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm (1 for a valid state).
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Apply every gate of `circuit` in order.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(SimError::WidthMismatch {
                circuit: circuit.num_qubits(),
                state: self.num_qubits,
            });
        }
        for gate in circuit.gates() {
            self.apply(gate);
        }
        Ok(())
    }

    /// Apply a single gate.  Operands are assumed validated by [`Circuit`].
    pub fn apply(&mut self, gate: &Gate) {
        match gate {
            Gate::X(q) => self.apply_x(*q as usize),
            Gate::Y(q) => self.apply_y(*q as usize),
            Gate::Z(q) => self.apply_z(*q as usize),
            Gate::H(q) => self.apply_h(*q as usize),
            Gate::S(q) => self.apply_phase(*q as usize, PI / 2.0),
            Gate::Sdg(q) => self.apply_phase(*q as usize, -PI / 2.0),
            Gate::Rx(t, q) => self.apply_rx(*q as usize, *t),
            Gate::Ry(t, q) => self.apply_ry(*q as usize, *t),
            Gate::Rz(t, q) => self.apply_rz(*q as usize, *t),
            Gate::Cx { control, target } => self.apply_cx(*control as usize, *target as usize),
            Gate::PauliRotation { pauli, theta } => self.apply_pauli_rotation(pauli, *theta),
        }
    }

    // =========================================================================
    // Pauli strings
    // =========================================================================

    /// P|ψ⟩ as a new vector.
    fn pauli_image(&self, pauli: &PauliString) -> Vec<Complex64> {
        let mut out = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let (phase, j) = apply_to_basis_state(pauli, i);
            out[j] = phase * amp;
        }
        out
    }

    /// Apply a Pauli string in place.
    pub fn apply_pauli_string(&mut self, pauli: &PauliString) {
        self.amplitudes = self.pauli_image(pauli);
    }

    /// exp(−i θ/2 P)|ψ⟩ = cos(θ/2)|ψ⟩ − i sin(θ/2) P|ψ⟩.
    pub fn apply_pauli_rotation(&mut self, pauli: &PauliString, theta: f64) {
        if pauli.is_identity() {
            return;
        }
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        let image = self.pauli_image(pauli);
        for (a, p) in self.amplitudes.iter_mut().zip(image) {
            *a = c * *a + neg_i_s * p;
        }
    }

    /// ⟨ψ|P|ψ⟩ (real for any Pauli string).
    pub fn pauli_expectation(&self, pauli: &PauliString) -> f64 {
        if pauli.is_identity() {
            return self.norm_sqr();
        }
        let mut acc = Complex64::new(0.0, 0.0);
        for (i, amp) in self.amplitudes.iter().enumerate() {
            let (phase, j) = apply_to_basis_state(pauli, i);
            acc += self.amplitudes[j].conj() * phase * amp;
        }
        acc.re
    }

    /// ⟨ψ|O|ψ⟩ for a Hermitian operator.
    ///
    /// Imaginary parts of the coefficients are ignored.
    pub fn expectation(&self, op: &QubitOperator) -> SimResult<f64> {
        let width = op.min_qubits();
        if width > self.num_qubits {
            return Err(SimError::ObservableTooWide {
                observable: width,
                circuit: self.num_qubits,
            });
        }
        Ok(op
            .terms()
            .iter()
            .map(|t| t.coeff.re * self.pauli_expectation(&t.pauli))
            .sum())
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 {
                self.amplitudes[i] *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let neg_i_s = Complex64::new(0.0, -s);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes[i] *= phase_0;
            } else {
                self.amplitudes[i] *= phase_1;
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Measurement probabilities in the computational basis.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Draw `shots` computational-basis outcomes.
    pub fn sample<R: Rng>(&self, shots: u32, rng: &mut R) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut total = 0.0;
        for amp in &self.amplitudes {
            total += amp.norm_sqr();
            cumulative.push(total);
        }
        let last = self.amplitudes.len() - 1;
        (0..shots)
            .map(|_| {
                let r: f64 = rng.r#gen::<f64>() * total;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }

    /// Convert measurement outcome to bitstring (qubit 0 first).
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits as usize)
            .chars()
            .rev()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2).unwrap();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        for amp in &sv.amplitudes[1..] {
            assert!(approx_eq(*amp, Complex64::new(0.0, 0.0)));
        }
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2).unwrap();
        sv.apply_h(0);
        sv.apply_cx(0, 1);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
        assert!((sv.pauli_expectation(&"Z0 Z1".parse().unwrap()) - 1.0).abs() < 1e-12);
        assert!((sv.pauli_expectation(&"X0 X1".parse().unwrap()) - 1.0).abs() < 1e-12);
        assert!((sv.pauli_expectation(&"Y0 Y1".parse().unwrap()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_y_matches_pauli_string() {
        let mut a = Statevector::new(2).unwrap();
        a.apply_h(1);
        let mut b = a.clone();
        a.apply_y(1);
        b.apply_pauli_string(&"Y1".parse().unwrap());
        assert!((a.inner(&b).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rz_matches_pauli_rotation() {
        let mut a = Statevector::new(1).unwrap();
        a.apply_h(0);
        let mut b = a.clone();
        a.apply_rz(0, 0.9);
        b.apply_pauli_rotation(&"Z0".parse().unwrap(), 0.9);
        assert!((a.inner(&b).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_wide() {
        assert!(matches!(
            Statevector::new(MAX_STATEVECTOR_QUBITS + 1),
            Err(SimError::TooManyQubits { .. })
        ));
    }

    #[test]
    fn test_sampling_basis_state() {
        let mut sv = Statevector::new(3).unwrap();
        sv.apply_x(1);
        let mut rng = StdRng::seed_from_u64(7);
        let outcomes = sv.sample(50, &mut rng);
        assert!(outcomes.iter().all(|&o| o == 2));
        assert_eq!(sv.outcome_to_bitstring(2), "010");
    }
}
