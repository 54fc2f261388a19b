//! Graph well-formedness and acyclicity.

use std::collections::BTreeSet;

use super::digraph::OpenDigraph;
use super::types::NodeId;
use crate::error::{CircuitError, Result};

impl<L> OpenDigraph<L> {
    /// Check the structural invariants, reporting the first violation.
    ///
    /// Checks:
    /// - Every boundary id names a live node, at most once
    /// - Inputs have no parents and exactly one child edge of multiplicity 1
    /// - Outputs have no children and exactly one parent edge of multiplicity 1
    /// - Parent and child maps agree on every edge and multiplicity
    pub fn check_well_formed(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for &i in self.inputs() {
            let node = self.get(i)?;
            if !seen.insert(i) {
                return Err(CircuitError::structural(format!("{} appears twice on the boundary", i)));
            }
            if !node.parents().is_empty() || node.single_child().is_none() {
                return Err(CircuitError::structural(format!(
                    "input {} must have no parents and exactly one child",
                    i
                )));
            }
        }
        for &o in self.outputs() {
            let node = self.get(o)?;
            if !seen.insert(o) {
                return Err(CircuitError::structural(format!("{} appears twice on the boundary", o)));
            }
            if !node.children().is_empty() || node.single_parent().is_none() {
                return Err(CircuitError::structural(format!(
                    "output {} must have no children and exactly one parent",
                    o
                )));
            }
        }
        self.check_adjacency()
    }

    pub fn is_well_formed(&self) -> bool {
        self.check_well_formed().is_ok()
    }

    /// Whether the parent and child maps mirror each other.
    pub fn adjacency_is_symmetric(&self) -> bool {
        self.check_adjacency().is_ok()
    }

    fn check_adjacency(&self) -> Result<()> {
        for node in self.nodes() {
            for (&p, &m) in node.parents() {
                let parent = self.get(p)?;
                if m == 0 || parent.child_multiplicity(node.id()) != m {
                    return Err(CircuitError::structural(format!(
                        "edge {} -> {} has asymmetric multiplicity",
                        p,
                        node.id()
                    )));
                }
            }
            for (&c, &m) in node.children() {
                let child = self.get(c)?;
                if m == 0 || child.parent_multiplicity(node.id()) != m {
                    return Err(CircuitError::structural(format!(
                        "edge {} -> {} has asymmetric multiplicity",
                        node.id(),
                        c
                    )));
                }
            }
        }
        Ok(())
    }

    /// Depth-first search for a back edge.
    ///
    /// Iterative, so deep graphs do not exhaust the call stack. Returns false
    /// as soon as an edge reaches a node that is still on the active path.
    pub fn is_acyclic(&self) -> bool {
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut on_stack: BTreeSet<NodeId> = BTreeSet::new();

        for root in self.node_ids() {
            if visited.contains(&root) {
                continue;
            }
            // Each frame holds a node and the children still to explore.
            let mut stack: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
            visited.insert(root);
            on_stack.insert(root);
            stack.push((root, self.child_ids(root)));

            while let Some((id, pending)) = stack.last_mut() {
                match pending.pop() {
                    Some(child) => {
                        if on_stack.contains(&child) {
                            return false;
                        }
                        if visited.insert(child) {
                            on_stack.insert(child);
                            let grandchildren = self.child_ids(child);
                            stack.push((child, grandchildren));
                        }
                    }
                    None => {
                        let done = *id;
                        stack.pop();
                        on_stack.remove(&done);
                    }
                }
            }
        }
        true
    }

    /// Fail with [`CircuitError::CyclicGraph`] unless the graph is a DAG.
    pub fn check_acyclic(&self) -> Result<()> {
        if self.is_acyclic() {
            Ok(())
        } else {
            Err(CircuitError::CyclicGraph)
        }
    }

    fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.children().keys().rev().copied().collect())
            .unwrap_or_default()
    }
}
