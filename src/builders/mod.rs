//! Ready-made circuits built from the gate constructors and composition.
//!
//! - [`adder`] / [`half_adder`]: ripple-carry adders on `2^n` bits
//! - [`add_registers`] / [`add`]: integer addition through an adder circuit
//! - [`hamming_encoder`] / [`hamming_decoder`]: the (7,4) Hamming code
//! - [`perturb`]: wires with selected bits flipped, for error injection

mod adder;
mod hamming;

pub use adder::{add, add_registers, adder, bind_registers, half_adder};
pub use hamming::{hamming_decoder, hamming_encoder, perturb};
