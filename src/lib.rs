//! # Opencirc Core
//!
//! Open directed multigraphs and boolean circuits built on them.
//!
//! This library provides:
//! - An arena-backed multigraph with ordered input and output boundaries
//! - Parallel and sequential composition of open graphs
//! - Boolean circuits over copy, `&`, `|`, `^`, `~` and constant gates
//! - A local rewrite engine that simplifies circuits to a fixpoint
//! - Evaluation by constant propagation
//! - Adder and Hamming code builders, a formula language and Graphviz export
//!
//! ## Architecture
//!
//! - [`graph`] - Open multigraph, well-formedness, composition, path queries
//! - [`circuit`] - Gates, legality, rewriting and evaluation
//! - [`builders`] - Ready-made circuits
//! - [`dsl`] - Parser for boolean formulas
//! - [`export`] - `.dot` output
//!
//! ## Usage
//!
//! ```
//! use opencirc_core::{builders, Circuit};
//!
//! // 3 + 1 on a 2-bit adder: inputs b1 a1 b0 a0 carry_in
//! let adder = builders::adder(1).unwrap();
//! let bound = adder.compose(&Circuit::register(0b01110, 5).unwrap()).unwrap();
//! assert_eq!(bound.calculate().unwrap(), 4);
//! ```
//!
//! ## Evaluation
//!
//! A circuit whose inputs are all bound to constants is evaluated by
//! repeatedly fusing a constant into the gate it feeds. Composing with a
//! [`Circuit::register`] is the usual way to bind inputs. Output bits are
//! read in increasing node id order, the first being the most significant.

pub mod builders;
pub mod circuit;
pub mod dsl;
pub mod error;
pub mod export;
pub mod graph;

// Re-export main types for convenience
pub use circuit::{Circuit, Gate, RewriteConfig, RewriteStats, Rule};
pub use error::{CircuitError, Result};
pub use graph::{Multiplicity, Node, NodeId, OpenDigraph};
