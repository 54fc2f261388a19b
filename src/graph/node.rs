//! Graph vertices with multiset adjacency.

use std::collections::BTreeMap;
use std::fmt;

use super::types::{Multiplicity, NodeId};

/// A vertex of an open digraph.
///
/// Parents and children are multisets: each neighbour maps to the number of
/// parallel edges between the two nodes. Ordered maps keep iteration
/// deterministic, which the rewrite engine and the evaluator rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<L> {
    id: NodeId,
    label: L,
    parents: BTreeMap<NodeId, Multiplicity>,
    children: BTreeMap<NodeId, Multiplicity>,
}

impl<L> Node<L> {
    /// Create a node record. Zero multiplicities are dropped.
    pub fn new(
        id: NodeId,
        label: L,
        parents: impl IntoIterator<Item = (NodeId, Multiplicity)>,
        children: impl IntoIterator<Item = (NodeId, Multiplicity)>,
    ) -> Self {
        Self {
            id,
            label,
            parents: parents.into_iter().filter(|&(_, m)| m > 0).collect(),
            children: children.into_iter().filter(|&(_, m)| m > 0).collect(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    pub fn parents(&self) -> &BTreeMap<NodeId, Multiplicity> {
        &self.parents
    }

    pub fn children(&self) -> &BTreeMap<NodeId, Multiplicity> {
        &self.children
    }

    /// Multiplicity of the edge from `parent` to this node, 0 if absent.
    pub fn parent_multiplicity(&self, parent: NodeId) -> Multiplicity {
        self.parents.get(&parent).copied().unwrap_or(0)
    }

    /// Multiplicity of the edge from this node to `child`, 0 if absent.
    pub fn child_multiplicity(&self, child: NodeId) -> Multiplicity {
        self.children.get(&child).copied().unwrap_or(0)
    }

    /// Number of incoming edges, counted with multiplicity.
    pub fn indegree(&self) -> usize {
        self.parents.values().sum()
    }

    /// Number of outgoing edges, counted with multiplicity.
    pub fn outdegree(&self) -> usize {
        self.children.values().sum()
    }

    pub fn degree(&self) -> usize {
        self.indegree() + self.outdegree()
    }

    /// The parent feeding this node, if the in-degree is exactly one.
    pub fn single_parent(&self) -> Option<NodeId> {
        match self.parents.iter().next() {
            Some((&id, &1)) if self.parents.len() == 1 => Some(id),
            _ => None,
        }
    }

    /// The child fed by this node, if the out-degree is exactly one.
    pub fn single_child(&self) -> Option<NodeId> {
        match self.children.iter().next() {
            Some((&id, &1)) if self.children.len() == 1 => Some(id),
            _ => None,
        }
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub(crate) fn set_label(&mut self, label: L) {
        self.label = label;
    }

    pub(crate) fn add_parent(&mut self, parent: NodeId, m: Multiplicity) {
        *self.parents.entry(parent).or_insert(0) += m;
    }

    pub(crate) fn add_child(&mut self, child: NodeId, m: Multiplicity) {
        *self.children.entry(child).or_insert(0) += m;
    }

    /// Drop one unit of the edge from `parent`. Returns false if there was none.
    pub(crate) fn remove_parent_once(&mut self, parent: NodeId) -> bool {
        decrement(&mut self.parents, parent)
    }

    /// Drop one unit of the edge to `child`. Returns false if there was none.
    pub(crate) fn remove_child_once(&mut self, child: NodeId) -> bool {
        decrement(&mut self.children, child)
    }

    pub(crate) fn remove_parent(&mut self, parent: NodeId) -> Multiplicity {
        self.parents.remove(&parent).unwrap_or(0)
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) -> Multiplicity {
        self.children.remove(&child).unwrap_or(0)
    }

    /// Rename every id this node holds with `f`.
    pub(crate) fn remap(&mut self, f: impl Fn(NodeId) -> NodeId) {
        self.id = f(self.id);
        self.parents = self.parents.iter().map(|(&k, &m)| (f(k), m)).collect();
        self.children = self.children.iter().map(|(&k, &m)| (f(k), m)).collect();
    }
}

fn decrement(map: &mut BTreeMap<NodeId, Multiplicity>, key: NodeId) -> bool {
    match map.get_mut(&key) {
        Some(m) if *m > 1 => {
            *m -= 1;
            true
        }
        Some(_) => {
            map.remove(&key);
            true
        }
        None => false,
    }
}

impl<L: fmt::Display> fmt::Display for Node<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] parents={{", self.id, self.label)?;
        for (i, (p, m)) in self.parents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", p, m)?;
        }
        write!(f, "}} children={{")?;
        for (i, (c, m)) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", c, m)?;
        }
        write!(f, "}}")
    }
}
