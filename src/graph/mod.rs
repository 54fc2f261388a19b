//! Open directed multigraph substrate.
//!
//! This module provides [`OpenDigraph`], a multigraph whose input and output
//! boundary nodes are distinguished so that graphs can be stacked in parallel
//! or chained in sequence. Labels are generic: plain graphs carry strings,
//! circuits carry [`crate::circuit::Gate`].

mod compose;
mod digraph;
mod node;
mod paths;
mod types;
mod validate;

pub use digraph::OpenDigraph;
pub use node::Node;
pub use types::{Multiplicity, NodeId};
