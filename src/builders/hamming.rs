//! Hamming (7,4) code and error injection.

use crate::circuit::{Circuit, Gate};
use crate::error::Result;
use crate::graph::{NodeId, OpenDigraph};

/// Encode 4 data bits `d1..d4` as `p1 p2 d1 p3 d2 d3 d4`, where
/// `p1 = d1^d2^d4`, `p2 = d1^d3^d4` and `p3 = d2^d3^d4`.
pub fn hamming_encoder() -> Result<Circuit> {
    let mut c: OpenDigraph<Gate> = OpenDigraph::empty();
    let d = (0..4)
        .map(|_| c.add_copy_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;
    let p = (0..3)
        .map(|_| c.add_xor_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;
    c.add_edges(&[
        (d[0], p[0], 1),
        (d[0], p[1], 1),
        (d[1], p[0], 1),
        (d[1], p[2], 1),
        (d[2], p[1], 1),
        (d[2], p[2], 1),
        (d[3], p[0], 1),
        (d[3], p[1], 1),
        (d[3], p[2], 1),
    ])?;
    for &bit in &d {
        c.add_input_node(bit)?;
    }
    for id in [p[0], p[1], d[0], p[2], d[1], d[2], d[3]] {
        c.add_output_node(id)?;
    }
    Circuit::new(c)
}

/// Decode a 7-bit codeword, correcting at most one flipped bit.
///
/// Recomputes the three parity checks; the syndrome selects which data
/// bit, if any, is flipped back before it reaches the output.
pub fn hamming_decoder() -> Result<Circuit> {
    let mut c: OpenDigraph<Gate> = OpenDigraph::empty();
    // data bits 0..4, then one fan-out per syndrome bit
    let fan = (0..7)
        .map(|_| c.add_copy_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;
    // parity checks 0..3, then the output correctors
    let xor = (0..7)
        .map(|_| c.add_xor_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;
    let not = (0..3)
        .map(|_| c.add_not_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;
    let and = (0..4)
        .map(|_| c.add_and_node(&[], &[]))
        .collect::<Result<Vec<NodeId>>>()?;

    let mut edges = vec![
        (fan[0], xor[0], 1),
        (fan[0], xor[1], 1),
        (fan[1], xor[0], 1),
        (fan[1], xor[2], 1),
        (fan[2], xor[1], 1),
        (fan[2], xor[2], 1),
        (fan[3], xor[0], 1),
        (fan[3], xor[1], 1),
        (fan[3], xor[2], 1),
        (xor[0], fan[4], 1),
        (xor[1], fan[5], 1),
        (xor[2], fan[6], 1),
        (fan[4], and[0], 1),
        (fan[4], and[1], 1),
        (fan[4], and[3], 1),
        (fan[5], and[0], 1),
        (fan[5], and[2], 1),
        (fan[5], and[3], 1),
        (fan[6], and[1], 1),
        (fan[6], and[2], 1),
        (fan[6], and[3], 1),
        (fan[4], not[2], 1),
        (fan[5], not[1], 1),
        (fan[6], not[0], 1),
    ];
    for i in 0..3 {
        edges.push((not[i], and[i], 1));
    }
    for i in 0..4 {
        edges.push((fan[i], xor[i + 3], 1));
        edges.push((and[i], xor[i + 3], 1));
    }
    c.add_edges(&edges)?;

    for &corrected in &xor[3..] {
        c.add_output_node(corrected)?;
    }
    for id in [xor[0], xor[1], fan[0], xor[2], fan[1], fan[2], fan[3]] {
        c.add_input_node(id)?;
    }
    Circuit::new(c)
}

/// `n` wires, with a negation inserted on each wire listed in `flipped`.
pub fn perturb(n: usize, flipped: &[usize]) -> Result<Circuit> {
    let mut c: OpenDigraph<Gate> = OpenDigraph::empty();
    for i in 0..n {
        let input = c.add_copy_node(&[], &[])?;
        let output = c.add_copy_node(&[], &[])?;
        if flipped.contains(&i) {
            c.add_not_node(&[(input, 1)], &[(output, 1)])?;
        } else {
            c.add_edge(input, output, 1)?;
        }
        c.add_input_boundary(input)?;
        c.add_output_boundary(output)?;
    }
    Circuit::new(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(message: u64) -> Circuit {
        hamming_encoder()
            .unwrap()
            .compose(&Circuit::register(message, 4).unwrap())
            .unwrap()
    }

    #[test]
    fn test_encoder_codeword() {
        assert_eq!(encode(0b1011).evaluate().unwrap(), 0b0110011);
        assert_eq!(encode(0).evaluate().unwrap(), 0);
    }

    #[test]
    fn test_decoder_inverts_encoder() {
        let decoder = hamming_decoder().unwrap();
        for message in 0..16 {
            let round_trip = decoder.compose(&encode(message)).unwrap();
            assert_eq!(round_trip.calculate().unwrap(), message);
        }
    }

    #[test]
    fn test_single_bit_errors_are_corrected() {
        let decoder = hamming_decoder().unwrap();
        for position in 0..7 {
            let noisy = perturb(7, &[position]).unwrap().compose(&encode(0b1001)).unwrap();
            let decoded = decoder.compose(&noisy).unwrap();
            assert_eq!(decoded.calculate().unwrap(), 0b1001, "error at {}", position);
        }
    }

    #[test]
    fn test_perturb_flips_selected_bits() {
        let wires = perturb(4, &[0, 2]).unwrap();
        let flipped = wires.compose(&Circuit::register(0b0000, 4).unwrap()).unwrap();
        assert_eq!(flipped.evaluate().unwrap(), 0b1010);
        assert_eq!(perturb(3, &[]).unwrap().edge_count(), 3);
    }
}
