//! Ripple-carry adders.

use tracing::debug;

use crate::circuit::{Circuit, Gate};
use crate::error::Result;
use crate::graph::{NodeId, OpenDigraph};

/// One-bit full adder with its carry-in and carry-out boundary nodes.
///
/// Inputs are `[a, b, carry_in]`, outputs `[carry_out, sum]`.
fn full_adder() -> Result<(OpenDigraph<Gate>, NodeId, NodeId)> {
    let mut c: OpenDigraph<Gate> = OpenDigraph::empty();
    let a = c.add_copy_node(&[], &[])?;
    let b = c.add_copy_node(&[], &[])?;
    let carry_in = c.add_copy_node(&[], &[])?;
    let a_fan = c.add_copy_node(&[(a, 1)], &[])?;
    let b_fan = c.add_copy_node(&[(b, 1)], &[])?;
    let generate = c.add_and_node(&[(a_fan, 1), (b_fan, 1)], &[])?;
    let half_sum = c.add_xor_node(&[(a_fan, 1), (b_fan, 1)], &[])?;
    let half_fan = c.add_copy_node(&[(half_sum, 1)], &[])?;
    let carry_fan = c.add_copy_node(&[(carry_in, 1)], &[])?;
    let propagate = c.add_and_node(&[(half_fan, 1), (carry_fan, 1)], &[])?;
    let sum = c.add_xor_node(&[(half_fan, 1), (carry_fan, 1)], &[])?;
    let carry = c.add_or_node(&[(generate, 1), (propagate, 1)], &[])?;
    let carry_out = c.add_copy_node(&[(carry, 1)], &[])?;
    let sum_out = c.add_copy_node(&[(sum, 1)], &[])?;

    for id in [a, b, carry_in] {
        c.add_input_boundary(id)?;
    }
    for id in [carry_out, sum_out] {
        c.add_output_boundary(id)?;
    }
    Ok((c, carry_in, carry_out))
}

/// Adder on `2^n` bits, with its carry-in and carry-out nodes.
///
/// Two copies of the half-size adder sit side by side; the low-order copy
/// takes the larger ids and its carry-out drives the high-order copy's
/// carry-in. Boundary lists are left unsorted.
fn ripple(n: u32) -> Result<(OpenDigraph<Gate>, NodeId, NodeId)> {
    if n == 0 {
        return full_adder();
    }
    let (mut high, carry_in, carry_out) = ripple(n - 1)?;
    let low = high.clone();
    let shift = high.iparallel(&low);
    let chained = carry_out.shifted(shift);
    high.add_edge(chained, carry_in, 1)?;
    high.remove_input(carry_in)?;
    high.remove_output(chained)?;
    Ok((high, carry_in.shifted(shift), carry_out))
}

fn sort_boundary(graph: &mut OpenDigraph<Gate>) {
    let mut inputs = graph.inputs().to_vec();
    let mut outputs = graph.outputs().to_vec();
    inputs.sort();
    outputs.sort();
    graph.set_boundary(inputs, outputs);
}

/// Ripple-carry adder on `2^n` bits.
///
/// Inputs are the operand bits interleaved as `b, a` per position, most
/// significant position first, then the carry-in. Outputs are the carry-out
/// followed by the sum bits, most significant first.
pub fn adder(n: u32) -> Result<Circuit> {
    let (mut graph, _, _) = ripple(n)?;
    sort_boundary(&mut graph);
    Circuit::new(graph)
}

/// [`adder`] whose carry-in is the constant 0 instead of an input.
pub fn half_adder(n: u32) -> Result<Circuit> {
    let (mut graph, carry_in, _) = ripple(n)?;
    graph.remove_input(carry_in)?;
    graph.set_label(carry_in, Gate::Const(false))?;
    sort_boundary(&mut graph);
    Circuit::new(graph)
}

/// Smallest power of two at least `width`, with its exponent.
fn register_size(width: usize) -> (usize, u32) {
    let mut size = 1;
    let mut exp = 0;
    while size < width {
        size *= 2;
        exp += 1;
    }
    (size, exp)
}

/// Adder on registers of at least `width` bits with `a` and `b` bound to
/// its inputs and a zero carry-in.
///
/// The width is rounded up to a power of two; operands wider than that
/// overflow as in [`Circuit::binary_string`].
pub fn bind_registers(a: u64, b: u64, width: usize) -> Result<Circuit> {
    let (size, exp) = register_size(width);
    let a_bits = Circuit::binary_string(a, size);
    let b_bits = Circuit::binary_string(b, size);
    let mut bits = Vec::with_capacity(2 * size + 1);
    for (x, y) in b_bits.chars().zip(a_bits.chars()) {
        bits.push(x == '1');
        bits.push(y == '1');
    }
    bits.push(false);

    let circuit = adder(exp)?.compose(&Circuit::register_bits(&bits)?)?;
    debug!(a, b, size, nodes = circuit.len(), "bound adder registers");
    Ok(circuit)
}

/// Add `a` and `b` on registers of at least `width` bits.
pub fn add_registers(a: u64, b: u64, width: usize) -> Result<u64> {
    bind_registers(a, b, width)?.calculate()
}

/// Add `a` and `b` on registers just wide enough for both.
pub fn add(a: u64, b: u64) -> Result<u64> {
    let width = (u64::BITS - (a | b).leading_zeros()) as usize;
    add_registers(a, b, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_adder_shape() {
        let c = adder(0).unwrap();
        assert_eq!(c.len(), 14);
        assert_eq!(c.inputs(), &[NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(c.outputs(), &[NodeId(12), NodeId(13)]);
        assert!(c.is_well_formed());
    }

    #[test]
    fn test_full_adder_one_plus_one() {
        let reg = Circuit::register(0b110, 3).unwrap();
        let bound = adder(0).unwrap().compose(&reg).unwrap();
        assert_eq!(bound.calculate().unwrap(), 0b10);
        assert_eq!(bound.evaluate().unwrap(), 0b10);
    }

    #[test]
    fn test_adder_boundary_sizes() {
        for n in 0..4 {
            let c = adder(n).unwrap();
            let bits = 1usize << n;
            assert_eq!(c.inputs().len(), 2 * bits + 1);
            assert_eq!(c.outputs().len(), bits + 1);
            assert!(c.is_well_formed());
        }
    }

    #[test]
    fn test_two_bit_sums() {
        for a in 0..4 {
            for b in 0..4 {
                assert_eq!(add_registers(a, b, 2).unwrap(), a + b, "{} + {}", a, b);
            }
        }
    }

    #[test]
    fn test_bound_registers_take_constant_inputs() {
        let c = bind_registers(5, 9, 3).unwrap();
        // 4-bit operands plus the carry-in
        assert_eq!(c.inputs().len(), 9);
        assert!(c.inputs().iter().all(|&i| c.gate(i).unwrap().is_constant()));
        assert_eq!(c.outputs().len(), 5);
        assert_eq!(c.evaluate().unwrap(), 14);
    }

    #[test]
    fn test_add_picks_width() {
        assert_eq!(add(3, 1).unwrap(), 4);
        assert_eq!(add(0, 0).unwrap(), 0);
        assert_eq!(add(200, 100).unwrap(), 300);
    }

    #[test]
    fn test_half_adder() {
        let c = half_adder(1).unwrap();
        assert_eq!(c.inputs().len(), 4);
        assert!(c.is_well_formed());
        // b1 a1 b0 a0 = 1 1 0 1: a = 3, b = 2
        let reg = Circuit::register(0b1101, 4).unwrap();
        assert_eq!(c.compose(&reg).unwrap().calculate().unwrap(), 5);
    }

    #[test]
    fn test_simplify_shrinks_adders() {
        for n in 0..3 {
            let mut c = adder(n).unwrap();
            let before = c.len();
            c.simplify();
            assert!(c.len() <= before);
            assert!(c.is_well_formed());
        }
    }
}
