//! Tests for Pauli strings and qubit-operator algebra.

use num_complex::Complex64;
use proptest::prelude::*;
use qadapt_ops::operator::{DEFAULT_TOLERANCE, QubitOperator};
use qadapt_ops::pauli::{PauliOp, PauliString};

fn ps(s: &str) -> PauliString {
    s.parse().unwrap()
}

fn op_from_index(i: u8) -> PauliOp {
    match i {
        0 => PauliOp::I,
        1 => PauliOp::X,
        2 => PauliOp::Y,
        _ => PauliOp::Z,
    }
}

fn arb_pauli(n_qubits: usize) -> impl Strategy<Value = PauliString> {
    prop::collection::vec(0u8..4, n_qubits).prop_map(|ops| {
        PauliString::from_ops(
            ops.into_iter()
                .enumerate()
                .map(|(q, i)| (q as u32, op_from_index(i))),
        )
    })
}

fn arb_hermitian(n_qubits: usize) -> impl Strategy<Value = QubitOperator> {
    prop::collection::vec((arb_pauli(n_qubits), -2.0f64..2.0), 1..5)
        .prop_map(|terms| QubitOperator::from_real_terms(terms))
}

// ---------------------------------------------------------------------------
// PauliString
// ---------------------------------------------------------------------------

#[test]
fn pauli_string_text_round_trip_is_canonical() {
    let p = ps("z3 X0  y1");
    assert_eq!(p.to_string(), "X0 Y1 Z3");
    assert_eq!(p.weight(), 3);
    assert_eq!(p.max_qubit(), Some(3));
}

#[test]
fn pauli_string_rejects_duplicate_qubits() {
    assert!("X0 Z0".parse::<PauliString>().is_err());
    assert!(PauliString::try_from_ops([(1, PauliOp::X), (1, PauliOp::Y)]).is_err());
}

#[test]
fn pauli_string_serde_uses_text_form() {
    let p = ps("X0 Y2");
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "\"X0 Y2\"");
    let back: PauliString = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
}

// ---------------------------------------------------------------------------
// QubitOperator
// ---------------------------------------------------------------------------

#[test]
fn operator_serializes_as_term_list() {
    let h = QubitOperator::from_real_terms([(ps("Z0"), 0.5), (ps("X0 X1"), -0.25)]);
    let json = serde_json::to_value(&h).unwrap();
    assert_eq!(json[0]["pauli"], "Z0");
    assert_eq!(json[1]["coeff"][0], -0.25);

    let back: QubitOperator = serde_json::from_value(json).unwrap();
    assert_eq!(back, h);
}

#[test]
fn operator_deserialization_merges_repeats() {
    let json = r#"[
        {"pauli": "Z0", "coeff": [1.0, 0.0]},
        {"pauli": "Z1", "coeff": [2.0, 0.0]},
        {"pauli": "Z0", "coeff": [0.5, 0.0]}
    ]"#;
    let h: QubitOperator = serde_json::from_str(json).unwrap();
    assert_eq!(h.n_terms(), 2);
    assert_eq!(h.coefficient(&ps("Z0")), Complex64::new(1.5, 0.0));
    assert_eq!(h.min_qubits(), 2);
}

#[test]
fn operator_adjoint_conjugates() {
    let g = QubitOperator::from_term(ps("Y0 X1"), Complex64::new(0.0, 1.0));
    let adj = g.adjoint();
    assert!(adj.approx_eq(&-&g, 1e-15));
}

#[test]
fn operator_display() {
    assert_eq!(QubitOperator::zero().to_string(), "0");
    let g = QubitOperator::from_term(ps("Y0"), Complex64::new(0.0, 1.0));
    assert_eq!(g.to_string(), "1.000000i [Y0]");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pauli_product_phase_is_unit(a in arb_pauli(4), b in arb_pauli(4)) {
        let (phase, _) = a.product(&b);
        prop_assert!((phase.norm() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn pauli_products_commute_iff_phases_agree(a in arb_pauli(4), b in arb_pauli(4)) {
        let (ab, p1) = a.product(&b);
        let (ba, p2) = b.product(&a);
        prop_assert_eq!(p1, p2);
        if a.commutes_with(&b) {
            prop_assert!((ab - ba).norm() < 1e-15);
        } else {
            prop_assert!((ab + ba).norm() < 1e-15);
        }
    }

    #[test]
    fn commutator_of_hermitians_is_anti_hermitian(
        a in arb_hermitian(3),
        b in arb_hermitian(3),
    ) {
        let c = a.commutator(&b);
        prop_assert!(c.is_anti_hermitian(1e-12));
        let reversed = b.commutator(&a);
        prop_assert!(c.approx_eq(&-&reversed, 1e-12));
    }

    #[test]
    fn subtraction_cancels(a in arb_hermitian(3)) {
        let zero = (&a - &a).simplify(DEFAULT_TOLERANCE);
        prop_assert!(zero.is_empty());
    }
}
