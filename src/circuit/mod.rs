//! Boolean circuits over the open digraph substrate.
//!
//! A [`Circuit`] is an [`OpenDigraph`] labelled with [`Gate`]s that also
//! satisfies the circuit legality rules: it is acyclic, copies and constants
//! take at most one input, variadic gates and constants drive at most one
//! child, and negations have exactly one of each.
//!
//! Circuits are simplified by a local rewrite engine ([`Circuit::simplify`])
//! and evaluated by constant propagation ([`Circuit::evaluate`]) once every
//! input has been bound to a constant, usually by composing with a
//! [`register`](Circuit::register).

mod eval;
mod gate;
mod rewrite;
mod validate;

use std::fmt;
use std::ops::Deref;

use crate::error::{CircuitError, Result};
use crate::graph::{Multiplicity, Node, NodeId, OpenDigraph};

pub use gate::{Gate, UnknownLabel};
pub use rewrite::{Rule, RewriteConfig, RewriteStats};

/// A legal boolean circuit.
///
/// Dereferences to the underlying [`OpenDigraph<Gate>`] for read access.
/// Mutation goes through the checked methods below, which refuse any edit
/// that would leave the circuit illegal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Circuit {
    graph: OpenDigraph<Gate>,
}

impl Circuit {
    /// Wrap a graph, checking well-formedness and circuit legality.
    pub fn new(graph: OpenDigraph<Gate>) -> Result<Self> {
        let circuit = Self { graph };
        circuit.check_well_formed()?;
        Ok(circuit)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// `n` copy-node wires from input to output.
    pub fn identity(n: usize) -> Self {
        Self {
            graph: OpenDigraph::identity(n),
        }
    }

    pub fn graph(&self) -> &OpenDigraph<Gate> {
        &self.graph
    }

    pub fn into_graph(self) -> OpenDigraph<Gate> {
        self.graph
    }

    /// The gate at `id`.
    pub fn gate(&self, id: NodeId) -> Result<Gate> {
        self.graph.label(id).copied()
    }

    /// Apply `op` to a scratch copy of the graph and keep the result only if
    /// it is still a well-formed, legal circuit.
    fn edit<T>(&mut self, op: impl FnOnce(&mut OpenDigraph<Gate>) -> Result<T>) -> Result<T> {
        let mut candidate = Self {
            graph: self.graph.clone(),
        };
        let value = op(&mut candidate.graph)?;
        candidate.check_well_formed()?;
        *self = candidate;
        Ok(value)
    }

    // ============ Checked surgery ============
    //
    // Each method mirrors the graph operation of the same name. If the result
    // would break well-formedness or legality the circuit is left untouched
    // and the error is returned. Build illegal intermediates on a plain
    // `OpenDigraph<Gate>` and wrap it with `Circuit::new` instead.

    pub fn add_gate(
        &mut self,
        gate: Gate,
        parents: &[(NodeId, Multiplicity)],
        children: &[(NodeId, Multiplicity)],
    ) -> Result<NodeId> {
        self.edit(|g| g.add_gate(gate, parents, children))
    }

    pub fn add_copy_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Copy, parents, children)
    }

    pub fn add_and_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::And, parents, children)
    }

    pub fn add_or_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Or, parents, children)
    }

    pub fn add_xor_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Xor, parents, children)
    }

    /// Always rejected unless both lists carry exactly one edge.
    pub fn add_not_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Not, parents, children)
    }

    pub fn add_constant_node(
        &mut self,
        value: bool,
        parents: &[(NodeId, Multiplicity)],
        children: &[(NodeId, Multiplicity)],
    ) -> Result<NodeId> {
        self.add_gate(Gate::Const(value), parents, children)
    }

    pub fn add_edge(&mut self, src: NodeId, tgt: NodeId, m: Multiplicity) -> Result<()> {
        self.edit(|g| g.add_edge(src, tgt, m))
    }

    pub fn add_edges(&mut self, edges: &[(NodeId, NodeId, Multiplicity)]) -> Result<()> {
        self.edit(|g| g.add_edges(edges))
    }

    pub fn remove_edge_once(&mut self, src: NodeId, tgt: NodeId) -> Result<()> {
        self.edit(|g| g.remove_edge_once(src, tgt))
    }

    pub fn remove_edges_once(&mut self, edges: &[(NodeId, NodeId)]) -> Result<()> {
        self.edit(|g| g.remove_edges_once(edges))
    }

    pub fn remove_all_parallel_edges(&mut self, src: NodeId, tgt: NodeId) -> Result<Multiplicity> {
        self.edit(|g| g.remove_all_parallel_edges(src, tgt))
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<Node<Gate>> {
        self.edit(|g| g.remove_node(id))
    }

    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<()> {
        self.edit(|g| g.remove_nodes(ids))
    }

    /// Relabel a node. Fails if the node's degrees do not suit the new gate.
    pub fn set_label(&mut self, id: NodeId, gate: Gate) -> Result<()> {
        self.edit(|g| g.set_label(id, gate))
    }

    pub fn merge_nodes(&mut self, keep: NodeId, other: NodeId) -> Result<()> {
        self.edit(|g| g.merge_nodes(keep, other))
    }

    pub fn add_input_boundary(&mut self, id: NodeId) -> Result<()> {
        self.edit(|g| g.add_input_boundary(id))
    }

    pub fn add_output_boundary(&mut self, id: NodeId) -> Result<()> {
        self.edit(|g| g.add_output_boundary(id))
    }

    pub fn add_input_node(&mut self, child: NodeId) -> Result<NodeId> {
        self.edit(|g| g.add_input_node(child))
    }

    pub fn add_output_node(&mut self, parent: NodeId) -> Result<NodeId> {
        self.edit(|g| g.add_output_node(parent))
    }

    pub fn remove_input(&mut self, id: NodeId) -> Result<()> {
        self.edit(|g| g.remove_input(id))
    }

    pub fn remove_output(&mut self, id: NodeId) -> Result<()> {
        self.edit(|g| g.remove_output(id))
    }

    // ============ Composition ============

    /// Place `other` beside this circuit; see [`OpenDigraph::iparallel`].
    pub fn iparallel(&mut self, other: &Circuit) -> usize {
        self.graph.iparallel(&other.graph)
    }

    /// Disjoint union. Legality is preserved by construction.
    pub fn parallel(&self, other: &Circuit) -> Circuit {
        let mut result = self.clone();
        result.iparallel(other);
        debug_assert!(result.is_well_formed());
        result
    }

    /// Feed `other`'s outputs into this circuit's inputs; see
    /// [`OpenDigraph::icompose`].
    pub fn icompose(&mut self, other: &Circuit) -> Result<()> {
        self.graph.icompose(&other.graph)
    }

    /// Non-mutating [`icompose`](Self::icompose). The result is checked for
    /// legality before it is returned.
    pub fn compose(&self, other: &Circuit) -> Result<Circuit> {
        Circuit::new(self.graph.compose(&other.graph)?)
    }

    // ============ Registers ============

    /// Binary digits of `value` in exactly `width` characters.
    ///
    /// Short values are zero-padded on the left. A value too wide for the
    /// register overflows: the result reads the `width` lowest digits from
    /// the least significant one upward.
    pub fn binary_string(value: u64, width: usize) -> String {
        let digits = format!("{:b}", value);
        if digits.len() <= width {
            format!("{:0>width$}", digits, width = width)
        } else {
            digits.chars().rev().take(width).collect()
        }
    }

    /// A pass-through register holding `bits`, most significant first.
    ///
    /// Each bit is a constant input node feeding its own copy output node,
    /// so composing a circuit with a register binds its inputs in order.
    pub fn register_bits(bits: &[bool]) -> Result<Self> {
        let mut graph: OpenDigraph<Gate> = OpenDigraph::empty();
        for &bit in bits {
            let constant = graph.add_constant_node(bit, &[], &[])?;
            graph.add_output_node(constant)?;
            graph.add_input_boundary(constant)?;
        }
        Self::new(graph)
    }

    /// Register holding [`binary_string(value, width)`](Self::binary_string).
    pub fn register(value: u64, width: usize) -> Result<Self> {
        let bits: Vec<bool> = Self::binary_string(value, width)
            .chars()
            .map(|c| c == '1')
            .collect();
        Self::register_bits(&bits)
    }

    /// Simplify a copy to its fixpoint, then evaluate it.
    pub fn calculate(&self) -> Result<u64> {
        let mut work = self.clone();
        work.simplify();
        work.evaluate_in_place().and_then(eval::bits_to_u64)
    }
}

/// Gate constructors on a bare graph, for building circuits whose
/// intermediate states are not legal yet.
impl OpenDigraph<Gate> {
    /// Add a node with the given gate, wired to existing neighbours.
    pub fn add_gate(
        &mut self,
        gate: Gate,
        parents: &[(NodeId, Multiplicity)],
        children: &[(NodeId, Multiplicity)],
    ) -> Result<NodeId> {
        self.add_node(gate, parents, children)
    }

    pub fn add_copy_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Copy, parents, children)
    }

    pub fn add_and_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::And, parents, children)
    }

    pub fn add_or_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Or, parents, children)
    }

    pub fn add_xor_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Xor, parents, children)
    }

    pub fn add_not_node(&mut self, parents: &[(NodeId, Multiplicity)], children: &[(NodeId, Multiplicity)]) -> Result<NodeId> {
        self.add_gate(Gate::Not, parents, children)
    }

    pub fn add_constant_node(
        &mut self,
        value: bool,
        parents: &[(NodeId, Multiplicity)],
        children: &[(NodeId, Multiplicity)],
    ) -> Result<NodeId> {
        self.add_gate(Gate::Const(value), parents, children)
    }
}

impl TryFrom<OpenDigraph<String>> for Circuit {
    type Error = CircuitError;

    /// Read every label as a gate, then check legality.
    fn try_from(graph: OpenDigraph<String>) -> Result<Self> {
        let mut nodes = Vec::with_capacity(graph.len());
        for node in graph.nodes() {
            let gate: Gate = node.label().parse().map_err(|UnknownLabel(label)| CircuitError::UnknownGate {
                id: node.id(),
                label,
            })?;
            nodes.push(Node::new(
                node.id(),
                gate,
                node.parents().iter().map(|(&p, &m)| (p, m)),
                node.children().iter().map(|(&c, &m)| (c, m)),
            ));
        }
        let graph = OpenDigraph::from_parts(graph.inputs().to_vec(), graph.outputs().to_vec(), nodes)?;
        Circuit::new(graph)
    }
}

impl From<Circuit> for OpenDigraph<Gate> {
    fn from(circuit: Circuit) -> Self {
        circuit.graph
    }
}

impl Deref for Circuit {
    type Target = OpenDigraph<Gate>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.graph, f)
    }
}
