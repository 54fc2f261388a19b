//! End-to-end checks on small hand-built circuits.

use opencirc_core::builders::{add_registers, adder, bind_registers, hamming_decoder, hamming_encoder, perturb};
use opencirc_core::dsl::parse_formulas;
use opencirc_core::{Circuit, CircuitError, Gate, NodeId, OpenDigraph, RewriteConfig, Rule};

#[test]
fn one_bit_adder_with_both_operands_set() {
    // a = 1, b = 1, carry_in = 0
    let bound = adder(0).unwrap().compose(&Circuit::register(0b110, 3).unwrap()).unwrap();
    assert_eq!(bound.evaluate_bits().unwrap(), vec![true, false]);
    assert_eq!(bound.calculate().unwrap(), 0b10);
}

#[test]
fn two_bit_ripple_adder() {
    assert_eq!(add_registers(3, 1, 2).unwrap(), 4);
    // padded to four bits, the carry-out stays clear
    assert_eq!(add_registers(3, 1, 4).unwrap(), 4);
    let bound = bind_registers(3, 1, 4).unwrap();
    assert_eq!(bound.outputs().len(), 5);
    assert_eq!(bound.evaluate_bits().unwrap(), vec![false, false, true, false, false]);
}

#[test]
fn identity_collapses_to_direct_wires() {
    let n = 4;
    let mut c = Circuit::identity(n).compose(&Circuit::identity(n)).unwrap();
    assert_eq!(c.len(), 3 * n);

    let stats = c.simplify();
    assert_eq!(stats.count(Rule::CopyElision), n);
    assert_eq!(c.len(), 2 * n);
    assert_eq!(c.edge_count(), n);
    for &i in c.inputs() {
        let node = c.node(i).unwrap();
        let (&child, &m) = node.children().iter().next().unwrap();
        assert_eq!(m, 1);
        assert!(c.is_output(child));
    }
    assert!(c.is_well_formed());
}

#[test]
fn constants_into_and_gate() {
    let mut c = Circuit::empty();
    let one = c.add_constant_node(true, &[], &[]).unwrap();
    let zero = c.add_constant_node(false, &[], &[]).unwrap();
    let and = c.add_and_node(&[(one, 1), (zero, 1)], &[]).unwrap();
    c.add_output_node(and).unwrap();
    assert!(c.is_well_formed());

    assert_eq!(c.evaluate().unwrap(), 0);
    assert_eq!(c.calculate().unwrap(), 0);
}

#[test]
fn hamming_round_trip_with_an_error() {
    let message = 0b0110;
    let encoded = hamming_encoder().unwrap().compose(&Circuit::register(message, 4).unwrap()).unwrap();
    let noisy = perturb(7, &[5]).unwrap().compose(&encoded).unwrap();
    assert_ne!(noisy.evaluate().unwrap(), encoded.evaluate().unwrap());
    let decoded = hamming_decoder().unwrap().compose(&noisy).unwrap();
    assert_eq!(decoded.calculate().unwrap(), message);
}

#[test]
fn formulas_agree_with_and_without_rewriting() {
    let (circuit, vars) = parse_formulas(&["(a | b) & (a | b)", "a ^ a ^ b", "~~(a & 1)"]).unwrap();
    assert_eq!(vars, ["a", "b"]);
    for v in 0..4 {
        let bound = circuit.compose(&Circuit::register(v, 2).unwrap()).unwrap();
        let plain = bound.evaluate().unwrap();
        assert_eq!(bound.calculate().unwrap(), plain);
        let mut core_only = bound.clone();
        core_only.simplify_with(&RewriteConfig::new().with_bonus_rules(false).with_erasure(false));
        assert_eq!(core_only.evaluate().unwrap(), plain);
    }
}

#[test]
fn errors_surface_to_the_caller() {
    let mut g: OpenDigraph<Gate> = OpenDigraph::empty();
    let a = g.add_node(Gate::Copy, &[], &[]).unwrap();
    assert!(matches!(
        g.add_edge(a, NodeId(7), 1),
        Err(CircuitError::InvalidReference { id: NodeId(7) })
    ));
    let b = g.add_node(Gate::Not, &[(a, 1)], &[]).unwrap();
    g.remove_edge_once(a, b).unwrap();
    assert!(matches!(g.remove_edge_once(a, b), Err(CircuitError::MissingEdge { .. })));

    g.add_edge(a, b, 1).unwrap();
    g.add_edge(b, a, 1).unwrap();
    assert!(matches!(Circuit::new(g), Err(CircuitError::CyclicGraph)));

    let three = Circuit::identity(3);
    let two = Circuit::identity(2);
    assert!(matches!(
        three.compose(&two),
        Err(CircuitError::DomainMismatch { outputs: 2, inputs: 3 })
    ));
}
