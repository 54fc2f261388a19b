//! Core types for graph representation.

use std::fmt;

/// A unique identifier for a node in an open digraph.
///
/// Ids double as slot indices into the graph's node arena, so the smallest
/// free id is always the one handed out next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The id this node would carry after its graph is shifted by `delta`.
    pub fn shifted(self, delta: usize) -> NodeId {
        NodeId(self.0 + delta)
    }

    /// Raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}

/// Number of parallel wires bundled in one edge. Always positive while the
/// edge exists.
pub type Multiplicity = usize;
