//! Open directed multigraph storage and edge/node surgery.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::node::Node;
use super::types::{Multiplicity, NodeId};
use crate::error::{CircuitError, Result};

/// An open directed multigraph.
///
/// Nodes live in a dense arena indexed by [`NodeId`]; a free set hands out
/// the smallest unused id in logarithmic time. The ordered `inputs` and
/// `outputs` lists are the graph's boundary: each entry names a degree-one
/// wire node, and their order is significant for composition.
///
/// A graph value assumes exclusive access while it is mutated. It holds no
/// interior mutability, so sharing across threads requires external
/// synchronization around every mutating call.
#[derive(Debug, Clone)]
pub struct OpenDigraph<L> {
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    slots: Vec<Option<Node<L>>>,
    free: BTreeSet<usize>,
}

impl<L> Default for OpenDigraph<L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<L> OpenDigraph<L> {
    /// Create a graph with no nodes and no boundary.
    pub fn empty() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            slots: Vec::new(),
            free: BTreeSet::new(),
        }
    }

    /// Build a graph from explicit node records and boundary lists.
    ///
    /// Fails if two records share an id, if a record names a neighbour that
    /// is not supplied, or if the result is not well-formed.
    pub fn from_parts(
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        nodes: impl IntoIterator<Item = Node<L>>,
    ) -> Result<Self> {
        let mut graph = Self::empty();
        for node in nodes {
            let id = node.id();
            if graph.contains(id) {
                return Err(CircuitError::structural(format!("duplicate node id {}", id)));
            }
            graph.place(node);
        }
        for node in graph.nodes() {
            for &n in node.parents().keys().chain(node.children().keys()) {
                if !graph.contains(n) {
                    return Err(CircuitError::InvalidReference { id: n });
                }
            }
        }
        graph.inputs = inputs;
        graph.outputs = outputs;
        graph.check_well_formed()?;
        Ok(graph)
    }

    // ============ Read access ============

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn is_input(&self, id: NodeId) -> bool {
        self.inputs.contains(&id)
    }

    pub fn is_output(&self, id: NodeId) -> bool {
        self.outputs.contains(&id)
    }

    /// True for nodes on either boundary.
    pub fn is_boundary(&self, id: NodeId) -> bool {
        self.is_input(id) || self.is_output(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    /// Look up a node, if present.
    pub fn node(&self, id: NodeId) -> Option<&Node<L>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Look up a node, failing with [`CircuitError::InvalidReference`].
    pub fn get(&self, id: NodeId) -> Result<&Node<L>> {
        self.node(id).ok_or(CircuitError::InvalidReference { id })
    }

    pub fn label(&self, id: NodeId) -> Result<&L> {
        self.get(id).map(Node::label)
    }

    /// All live nodes in increasing id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<L>> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// All live ids in increasing order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().map(Node::id).collect()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of edges, counted with multiplicity.
    pub fn edge_count(&self) -> usize {
        self.nodes().map(Node::outdegree).sum()
    }

    pub fn min_id(&self) -> Option<NodeId> {
        self.nodes().next().map(Node::id)
    }

    pub fn max_id(&self) -> Option<NodeId> {
        self.slots.iter().rev().find_map(Option::as_ref).map(Node::id)
    }

    /// The smallest id not currently in use.
    pub fn new_id(&self) -> NodeId {
        NodeId(self.free.first().copied().unwrap_or(self.slots.len()))
    }

    // ============ Node and edge surgery ============

    /// Add a node wired to existing `parents` and `children`.
    ///
    /// All named neighbours are checked before anything is inserted.
    pub fn add_node(
        &mut self,
        label: L,
        parents: &[(NodeId, Multiplicity)],
        children: &[(NodeId, Multiplicity)],
    ) -> Result<NodeId> {
        for &(n, _) in parents.iter().chain(children) {
            self.get(n)?;
        }
        let id = self.spawn(label);
        for &(p, m) in parents {
            self.link(p, id, m);
        }
        for &(c, m) in children {
            self.link(id, c, m);
        }
        Ok(id)
    }

    /// Add `m` parallel edges from `src` to `tgt`.
    pub fn add_edge(&mut self, src: NodeId, tgt: NodeId, m: Multiplicity) -> Result<()> {
        self.get(src)?;
        self.get(tgt)?;
        self.link(src, tgt, m);
        Ok(())
    }

    /// Add several `(src, tgt, multiplicity)` edges; nothing is added if any
    /// endpoint is missing.
    pub fn add_edges(&mut self, edges: &[(NodeId, NodeId, Multiplicity)]) -> Result<()> {
        for &(s, t, _) in edges {
            self.get(s)?;
            self.get(t)?;
        }
        for &(s, t, m) in edges {
            self.link(s, t, m);
        }
        Ok(())
    }

    /// Remove one unit of multiplicity from the edge `src -> tgt`.
    pub fn remove_edge_once(&mut self, src: NodeId, tgt: NodeId) -> Result<()> {
        self.get(tgt)?;
        if self.get(src)?.child_multiplicity(tgt) == 0 {
            return Err(CircuitError::MissingEdge { src, tgt });
        }
        self.unlink_once(src, tgt);
        Ok(())
    }

    /// Remove one unit from each listed edge; nothing changes if any is missing.
    pub fn remove_edges_once(&mut self, edges: &[(NodeId, NodeId)]) -> Result<()> {
        let mut wanted: BTreeMap<(NodeId, NodeId), usize> = BTreeMap::new();
        for &(s, t) in edges {
            self.get(t)?;
            *wanted.entry((s, t)).or_insert(0) += 1;
        }
        for (&(s, t), &want) in &wanted {
            if self.get(s)?.child_multiplicity(t) < want {
                return Err(CircuitError::MissingEdge { src: s, tgt: t });
            }
        }
        for &(s, t) in edges {
            self.unlink_once(s, t);
        }
        Ok(())
    }

    /// Remove every parallel edge `src -> tgt`, returning how many there were.
    pub fn remove_all_parallel_edges(&mut self, src: NodeId, tgt: NodeId) -> Result<Multiplicity> {
        self.get(src)?;
        self.get(tgt)?;
        Ok(self.unlink_all(src, tgt))
    }

    /// Remove a node and every incident edge. The id also leaves the
    /// boundary lists.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node<L>> {
        self.take(id).ok_or(CircuitError::InvalidReference { id })
    }

    /// Remove several nodes; nothing is removed if any id is missing.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<()> {
        for &id in ids {
            self.get(id)?;
        }
        for &id in ids {
            self.take(id);
        }
        Ok(())
    }

    pub fn set_label(&mut self, id: NodeId, label: L) -> Result<()> {
        self.node_mut(id)
            .ok_or(CircuitError::InvalidReference { id })?
            .set_label(label);
        Ok(())
    }

    /// Fold `other` into `keep`: `keep` inherits all of `other`'s edges,
    /// except those running between the two, and `other` is removed.
    pub fn merge_nodes(&mut self, keep: NodeId, other: NodeId) -> Result<()> {
        self.get(keep)?;
        let absorbed = self.get(other)?;
        let parents: Vec<(NodeId, Multiplicity)> = absorbed.parents().iter().map(|(&p, &m)| (p, m)).collect();
        let children: Vec<(NodeId, Multiplicity)> = absorbed.children().iter().map(|(&c, &m)| (c, m)).collect();
        if keep == other {
            return Ok(());
        }
        self.take(other);
        for (p, m) in parents {
            if p != keep {
                self.link(p, keep, m);
            }
        }
        for (c, m) in children {
            if c != keep {
                self.link(keep, c, m);
            }
        }
        debug_assert!(self.adjacency_is_symmetric());
        Ok(())
    }

    // ============ Boundary ============

    /// Register an existing node as the next input.
    ///
    /// The node must have no parents and exactly one child edge of
    /// multiplicity one.
    pub fn add_input_boundary(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        if !node.parents().is_empty() || node.single_child().is_none() {
            return Err(CircuitError::structural(format!(
                "input {} must have no parents and exactly one child",
                id
            )));
        }
        if self.is_boundary(id) {
            return Err(CircuitError::structural(format!("{} is already on the boundary", id)));
        }
        self.inputs.push(id);
        Ok(())
    }

    /// Register an existing node as the next output.
    ///
    /// The node must have no children and exactly one parent edge of
    /// multiplicity one.
    pub fn add_output_boundary(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        if !node.children().is_empty() || node.single_parent().is_none() {
            return Err(CircuitError::structural(format!(
                "output {} must have no children and exactly one parent",
                id
            )));
        }
        if self.is_boundary(id) {
            return Err(CircuitError::structural(format!("{} is already on the boundary", id)));
        }
        self.outputs.push(id);
        Ok(())
    }

    /// Drop `id` from the input list. The node itself stays in the graph.
    pub fn remove_input(&mut self, id: NodeId) -> Result<()> {
        let pos = self
            .inputs
            .iter()
            .position(|&i| i == id)
            .ok_or(CircuitError::NotBoundary { id, side: "input" })?;
        self.inputs.remove(pos);
        Ok(())
    }

    /// Drop `id` from the output list. The node itself stays in the graph.
    pub fn remove_output(&mut self, id: NodeId) -> Result<()> {
        let pos = self
            .outputs
            .iter()
            .position(|&o| o == id)
            .ok_or(CircuitError::NotBoundary { id, side: "output" })?;
        self.outputs.remove(pos);
        Ok(())
    }

    // ============ Crate-internal primitives ============
    //
    // These skip existence checks; callers have already validated ids.

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<L>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn link(&mut self, src: NodeId, tgt: NodeId, m: Multiplicity) {
        if m == 0 {
            return;
        }
        if let Some(s) = self.node_mut(src) {
            s.add_child(tgt, m);
        }
        if let Some(t) = self.node_mut(tgt) {
            t.add_parent(src, m);
        }
    }

    pub(crate) fn unlink_once(&mut self, src: NodeId, tgt: NodeId) {
        if let Some(s) = self.node_mut(src) {
            s.remove_child_once(tgt);
        }
        if let Some(t) = self.node_mut(tgt) {
            t.remove_parent_once(src);
        }
    }

    pub(crate) fn unlink_all(&mut self, src: NodeId, tgt: NodeId) -> Multiplicity {
        let m = self.node_mut(src).map(|s| s.remove_child(tgt)).unwrap_or(0);
        if let Some(t) = self.node_mut(tgt) {
            t.remove_parent(src);
        }
        m
    }

    /// Remove a node with all incident edges; `None` if it is not live.
    pub(crate) fn take(&mut self, id: NodeId) -> Option<Node<L>> {
        let node = self.node(id)?;
        let parents: Vec<NodeId> = node.parents().keys().copied().collect();
        let children: Vec<NodeId> = node.children().keys().copied().collect();
        for p in parents {
            self.unlink_all(p, id);
        }
        for c in children {
            self.unlink_all(id, c);
        }
        self.inputs.retain(|&i| i != id);
        self.outputs.retain(|&o| o != id);
        let node = self.slots[id.0].take();
        self.free.insert(id.0);
        self.trim();
        node
    }

    /// Insert an isolated node under the smallest free id.
    pub(crate) fn spawn(&mut self, label: L) -> NodeId {
        let id = self.new_id();
        self.place(Node::new(id, label, [], []));
        id
    }

    /// Put a record into the slot named by its id.
    pub(crate) fn place(&mut self, node: Node<L>) {
        let idx = node.id().0;
        if idx >= self.slots.len() {
            self.free.extend(self.slots.len()..idx);
            self.slots.resize_with(idx + 1, || None);
        } else {
            self.free.remove(&idx);
        }
        self.slots[idx] = Some(node);
    }

    pub(crate) fn set_boundary(&mut self, inputs: Vec<NodeId>, outputs: Vec<NodeId>) {
        self.inputs = inputs;
        self.outputs = outputs;
    }

    /// Move every node record out, leaving the arena empty.
    pub(crate) fn drain_nodes(&mut self) -> Vec<Node<L>> {
        self.free.clear();
        std::mem::take(&mut self.slots).into_iter().flatten().collect()
    }

    fn trim(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
            self.free.remove(&self.slots.len());
        }
    }
}

impl<L: Default> OpenDigraph<L> {
    /// Create a fresh input node feeding `child` and append it to the inputs.
    pub fn add_input_node(&mut self, child: NodeId) -> Result<NodeId> {
        let id = self.add_node(L::default(), &[], &[(child, 1)])?;
        self.inputs.push(id);
        Ok(id)
    }

    /// Create a fresh output node fed by `parent` and append it to the outputs.
    pub fn add_output_node(&mut self, parent: NodeId) -> Result<NodeId> {
        let id = self.add_node(L::default(), &[(parent, 1)], &[])?;
        self.outputs.push(id);
        Ok(id)
    }

    /// `n` parallel wires, each a direct input -> output edge.
    pub fn identity(n: usize) -> Self {
        let mut graph = Self::empty();
        for _ in 0..n {
            let i = graph.spawn(L::default());
            let o = graph.spawn(L::default());
            graph.link(i, o, 1);
            graph.inputs.push(i);
            graph.outputs.push(o);
        }
        graph
    }
}

impl<L: PartialEq> PartialEq for OpenDigraph<L> {
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs && self.nodes().eq(other.nodes())
    }
}

impl<L: Eq> Eq for OpenDigraph<L> {}

impl<L: fmt::Display> fmt::Display for OpenDigraph<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "inputs: {:?}", self.inputs.iter().map(|i| i.0).collect::<Vec<_>>())?;
        writeln!(f, "outputs: {:?}", self.outputs.iter().map(|o| o.0).collect::<Vec<_>>())?;
        for node in self.nodes() {
            writeln!(f, "  {}", node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: usize, label: &str, parents: &[(usize, usize)], children: &[(usize, usize)]) -> Node<String> {
        Node::new(
            NodeId(id),
            label.to_string(),
            parents.iter().map(|&(p, m)| (NodeId(p), m)),
            children.iter().map(|&(c, m)| (NodeId(c), m)),
        )
    }

    fn two_nodes() -> OpenDigraph<String> {
        OpenDigraph::from_parts(vec![], vec![], vec![n(0, "a", &[], &[]), n(1, "b", &[], &[])]).unwrap()
    }

    #[test]
    fn test_add_and_remove_edges() {
        let mut g = two_nodes();
        g.add_edge(NodeId(0), NodeId(1), 1).unwrap();
        assert_eq!(g.get(NodeId(0)).unwrap().child_multiplicity(NodeId(1)), 1);
        assert_eq!(g.get(NodeId(1)).unwrap().parent_multiplicity(NodeId(0)), 1);

        let c = g.add_node("c".to_string(), &[(NodeId(1), 1)], &[(NodeId(0), 2)]).unwrap();
        assert_eq!(c, NodeId(2));
        assert_eq!(g.get(NodeId(0)).unwrap().parent_multiplicity(c), 2);

        g.remove_edge_once(NodeId(0), NodeId(1)).unwrap();
        assert!(g.get(NodeId(0)).unwrap().children().is_empty());
        assert!(g.get(NodeId(1)).unwrap().parents().is_empty());

        g.remove_edge_once(c, NodeId(0)).unwrap();
        assert_eq!(g.get(c).unwrap().child_multiplicity(NodeId(0)), 1);

        g.add_edge(c, NodeId(0), 2).unwrap();
        assert_eq!(g.remove_all_parallel_edges(c, NodeId(0)).unwrap(), 3);
        assert!(g.get(NodeId(0)).unwrap().parents().is_empty());
    }

    #[test]
    fn test_remove_missing_edge_fails() {
        let mut g = two_nodes();
        assert!(matches!(
            g.remove_edge_once(NodeId(0), NodeId(1)),
            Err(CircuitError::MissingEdge { .. })
        ));
        assert!(matches!(
            g.add_edge(NodeId(0), NodeId(7), 1),
            Err(CircuitError::InvalidReference { id: NodeId(7) })
        ));
    }

    #[test]
    fn test_add_node_is_atomic() {
        let mut g = two_nodes();
        let result = g.add_node("x".to_string(), &[(NodeId(0), 1)], &[(NodeId(9), 1)]);
        assert!(matches!(result, Err(CircuitError::InvalidReference { id: NodeId(9) })));
        assert_eq!(g.len(), 2);
        assert!(g.get(NodeId(0)).unwrap().children().is_empty());
    }

    #[test]
    fn test_fresh_ids_reuse_smallest_gap() {
        let mut g = two_nodes();
        let c = g.add_node("c".to_string(), &[], &[]).unwrap();
        assert_eq!(c, NodeId(2));
        g.remove_node(NodeId(0)).unwrap();
        assert_eq!(g.new_id(), NodeId(0));
        g.remove_node(c).unwrap();
        assert_eq!(g.new_id(), NodeId(0));
        assert_eq!(g.max_id(), Some(NodeId(1)));
        let d = g.add_node("d".to_string(), &[], &[]).unwrap();
        assert_eq!(d, NodeId(0));
        assert_eq!(g.new_id(), NodeId(2));
    }

    #[test]
    fn test_remove_node_drops_incident_edges_and_boundary() {
        let mut g = two_nodes();
        g.add_edges(&[(NodeId(0), NodeId(1), 2), (NodeId(1), NodeId(0), 3)]).unwrap();
        let i = g.add_input_node(NodeId(0)).unwrap();
        g.remove_node(i).unwrap();
        assert!(g.inputs().is_empty());
        g.remove_nodes(&[NodeId(1)]).unwrap();
        assert_eq!(g.len(), 1);
        assert!(g.get(NodeId(0)).unwrap().parents().is_empty());
        assert!(g.get(NodeId(0)).unwrap().children().is_empty());
    }

    #[test]
    fn test_boundary_shape_is_checked() {
        let mut g = two_nodes();
        g.add_edge(NodeId(0), NodeId(1), 2).unwrap();
        assert!(g.add_input_boundary(NodeId(0)).is_err());
        g.remove_edge_once(NodeId(0), NodeId(1)).unwrap();
        g.add_input_boundary(NodeId(0)).unwrap();
        g.add_output_boundary(NodeId(1)).unwrap();
        assert!(g.is_well_formed());
        assert!(g.add_output_boundary(NodeId(1)).is_err());

        g.remove_input(NodeId(0)).unwrap();
        assert!(matches!(
            g.remove_input(NodeId(0)),
            Err(CircuitError::NotBoundary { .. })
        ));
    }

    #[test]
    fn test_merge_nodes_skips_reflexive_edges() {
        let mut g = OpenDigraph::from_parts(
            vec![],
            vec![],
            vec![
                n(0, "a", &[], &[(1, 1), (2, 1)]),
                n(1, "b", &[(0, 1)], &[(2, 2)]),
                n(2, "c", &[(0, 1), (1, 2)], &[]),
            ],
        )
        .unwrap();
        g.merge_nodes(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.get(NodeId(0)).unwrap().child_multiplicity(NodeId(2)), 3);
        assert!(g.get(NodeId(0)).unwrap().parents().is_empty());
        assert!(g.is_well_formed());
    }

    #[test]
    fn test_merge_nodes_with_plain_labels() {
        #[derive(Debug, PartialEq)]
        struct Tag(u8);

        let mut g = OpenDigraph::empty();
        let src = g.add_node(Tag(0), &[], &[]).unwrap();
        let keep = g.add_node(Tag(1), &[(src, 1)], &[]).unwrap();
        let other = g.add_node(Tag(2), &[(src, 2)], &[]).unwrap();
        let sink = g.add_node(Tag(3), &[(other, 1)], &[]).unwrap();
        g.merge_nodes(keep, other).unwrap();
        assert!(!g.contains(other));
        assert_eq!(g.label(keep).unwrap(), &Tag(1));
        assert_eq!(g.get(src).unwrap().child_multiplicity(keep), 3);
        assert_eq!(g.get(keep).unwrap().child_multiplicity(sink), 1);
        assert!(g.merge_nodes(keep, other).is_err());
        assert!(g.adjacency_is_symmetric());
    }

    #[test]
    fn test_from_parts_rejects_dangling_reference() {
        let result = OpenDigraph::from_parts(vec![], vec![], vec![n(0, "a", &[], &[(4, 1)])]);
        assert!(matches!(result, Err(CircuitError::InvalidReference { id: NodeId(4) })));
    }

    #[test]
    fn test_identity_shape() {
        let g: OpenDigraph<String> = OpenDigraph::identity(3);
        assert_eq!(g.inputs(), &[NodeId(0), NodeId(2), NodeId(4)]);
        assert_eq!(g.outputs(), &[NodeId(1), NodeId(3), NodeId(5)]);
        assert_eq!(g.edge_count(), 3);
        assert!(g.is_well_formed());
    }
}
