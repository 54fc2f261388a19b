//! Property tests over randomly generated legal circuits.
//!
//! Circuits come from random formula trees lowered through the DSL, so they
//! mix shared fan-out, constants, negations and variadic gates.

use opencirc_core::builders::perturb;
use opencirc_core::dsl::{lower, BinOp, Expr};
use opencirc_core::{Circuit, CircuitError, RewriteConfig};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

/// Strategy for formula trees over at most four variables.
fn expr() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            operation(inner),
        ]
    })
}

/// Formula trees without any negation.
fn monotone_expr() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(4, 24, 4, operation)
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0..NAMES.len()).prop_map(|i| Expr::Var(NAMES[i].to_string())),
        any::<bool>().prop_map(Expr::Const),
    ]
}

fn operation(inner: BoxedStrategy<Expr>) -> impl Strategy<Value = Expr> {
    (
        prop_oneof![Just(BinOp::And), Just(BinOp::Or), Just(BinOp::Xor)],
        prop::collection::vec(inner, 1..4),
    )
        .prop_map(|(op, operands)| Expr::Op(op, operands))
}

fn formulas() -> impl Strategy<Value = Vec<Expr>> {
    prop::collection::vec(expr(), 1..4)
}

fn reference(expr: &Expr, vars: &[String], value: u64) -> bool {
    match expr {
        Expr::Var(name) => {
            let pos = vars.iter().position(|v| v == name).unwrap_or(0);
            (value >> (vars.len() - 1 - pos)) & 1 == 1
        }
        Expr::Const(b) => *b,
        Expr::Not(inner) => !reference(inner, vars, value),
        Expr::Op(op, operands) => {
            let mut bits = operands.iter().map(|e| reference(e, vars, value));
            match op {
                BinOp::And => bits.all(|b| b),
                BinOp::Or => bits.any(|b| b),
                BinOp::Xor => bits.fold(false, |acc, b| acc ^ b),
            }
        }
    }
}

fn expected(exprs: &[Expr], vars: &[String], value: u64) -> u64 {
    exprs
        .iter()
        .fold(0, |acc, e| (acc << 1) | u64::from(reference(e, vars, value)))
}

fn bind(circuit: &Circuit, value: u64, width: usize) -> Circuit {
    circuit.compose(&Circuit::register(value, width).unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Lowered formulas are legal circuits.
    #[test]
    fn lowering_is_well_formed(exprs in formulas()) {
        let (circuit, vars) = lower(&exprs).unwrap();
        prop_assert!(circuit.is_well_formed());
        prop_assert_eq!(circuit.inputs().len(), vars.len());
        prop_assert_eq!(circuit.outputs().len(), exprs.len());
    }

    /// Rewriting keeps the circuit well-formed and its boundary intact.
    #[test]
    fn simplify_preserves_well_formedness(exprs in formulas()) {
        let (mut circuit, _) = lower(&exprs).unwrap();
        let inputs = circuit.inputs().to_vec();
        let outputs = circuit.outputs().to_vec();
        circuit.simplify();
        prop_assert!(circuit.is_well_formed());
        prop_assert_eq!(circuit.inputs(), &inputs[..]);
        prop_assert_eq!(circuit.outputs(), &outputs[..]);
    }

    /// A second run from a fixpoint changes nothing.
    #[test]
    fn simplify_is_idempotent(exprs in formulas(), bonus in any::<bool>()) {
        let config = RewriteConfig::new().with_bonus_rules(bonus);
        let (mut circuit, _) = lower(&exprs).unwrap();
        circuit.simplify_with(&config);
        let once = circuit.clone();
        let stats = circuit.simplify_with(&config);
        prop_assert_eq!(stats.total(), 0);
        prop_assert_eq!(circuit, once);
    }

    /// Simplified and unsimplified circuits compute the formulas.
    #[test]
    fn simplify_preserves_semantics(exprs in formulas()) {
        let (circuit, vars) = lower(&exprs).unwrap();
        let simplified = circuit.simplified();
        let width = vars.len();
        for value in 0..1u64 << width {
            let want = expected(&exprs, &vars, value);
            let bound = bind(&circuit, value, width);
            prop_assert_eq!(bound.evaluate().unwrap(), want);
            prop_assert_eq!(bound.calculate().unwrap(), want);
            prop_assert_eq!(bind(&simplified, value, width).evaluate().unwrap(), want);
        }
    }

    /// Without negations, and with the rules that discard a gate switched
    /// off, every rewrite removes nodes or edges.
    #[test]
    fn contraction_rules_never_grow(exprs in prop::collection::vec(monotone_expr(), 1..4)) {
        let config = RewriteConfig::new().with_bonus_rules(false).with_erasure(false);
        let (circuit, _) = lower(&exprs).unwrap();
        let mut simplified = circuit.clone();
        simplified.simplify_with(&config);
        prop_assert!(simplified.len() <= circuit.len());
        prop_assert!(simplified.edge_count() <= circuit.edge_count());
    }

    /// Sequential composition is associative up to renumbering.
    #[test]
    fn compose_is_associative(
        exprs in formulas(),
        flips in prop::collection::vec(0..NAMES.len(), 0..3),
        value in 0u64..16,
    ) {
        let (f, vars) = lower(&exprs).unwrap();
        let width = vars.len();
        let g = perturb(width, &flips).unwrap();
        let r = Circuit::register(value, width).unwrap();

        let left = f.compose(&g).unwrap().compose(&r).unwrap();
        let right = f.compose(&g.compose(&r).unwrap()).unwrap();
        prop_assert_eq!(left.len(), right.len());
        prop_assert_eq!(left.edge_count(), right.edge_count());
        prop_assert_eq!(left.evaluate().unwrap(), right.evaluate().unwrap());
    }

    /// A failed composition leaves both operands as they were.
    #[test]
    fn domain_mismatch_is_atomic(exprs in formulas(), extra in 1usize..3) {
        let (f, vars) = lower(&exprs).unwrap();
        let other = Circuit::identity(vars.len() + extra);
        let mut target = f.clone();
        let err = target.icompose(&other).unwrap_err();
        let is_mismatch = matches!(err, CircuitError::DomainMismatch { .. });
        prop_assert!(is_mismatch);
        prop_assert_eq!(target, f);
        prop_assert_eq!(other, Circuit::identity(vars.len() + extra));
    }
}
