//! Components, layering and path queries.

use std::collections::{BTreeMap, VecDeque};

use super::digraph::OpenDigraph;
use super::types::NodeId;
use crate::error::{CircuitError, Result};

impl<L> OpenDigraph<L> {
    /// Label every node with the index of its weakly connected component.
    ///
    /// Components are numbered in order of their smallest node id. Returns
    /// the number of components and the id-to-component map.
    pub fn connected_components(&self) -> (usize, BTreeMap<NodeId, usize>) {
        let mut component = BTreeMap::new();
        let mut count = 0;
        for root in self.node_ids() {
            if component.contains_key(&root) {
                continue;
            }
            component.insert(root, count);
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                for next in self.neighbours(id) {
                    if !component.contains_key(&next) {
                        component.insert(next, count);
                        stack.push(next);
                    }
                }
            }
            count += 1;
        }
        (count, component)
    }

    /// Partition nodes into layers: the first holds nodes without parents,
    /// each later one the nodes whose parents all sit in earlier layers.
    ///
    /// Fails with [`CircuitError::CyclicGraph`] when some nodes can never be
    /// placed.
    pub fn topological_layers(&self) -> Result<Vec<Vec<NodeId>>> {
        let mut waiting: BTreeMap<NodeId, usize> = self
            .nodes()
            .map(|n| (n.id(), n.parents().len()))
            .collect();
        let mut layer: Vec<NodeId> = waiting
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut layers = Vec::new();
        let mut placed = 0;

        while !layer.is_empty() {
            let mut next = Vec::new();
            for &id in &layer {
                for &c in self.get(id)?.children().keys() {
                    if let Some(deg) = waiting.get_mut(&c) {
                        *deg -= 1;
                        if *deg == 0 {
                            next.push(c);
                        }
                    }
                }
            }
            placed += layer.len();
            next.sort();
            layers.push(std::mem::replace(&mut layer, next));
        }

        if placed < self.len() {
            return Err(CircuitError::CyclicGraph);
        }
        Ok(layers)
    }

    /// Number of topological layers.
    pub fn depth(&self) -> Result<usize> {
        Ok(self.topological_layers()?.len())
    }

    /// Zero-based index of the layer holding `id`.
    pub fn node_depth(&self, id: NodeId) -> Result<usize> {
        self.get(id)?;
        self.topological_layers()?
            .iter()
            .position(|layer| layer.contains(&id))
            .ok_or(CircuitError::InvalidReference { id })
    }

    /// Edge count of the shortest undirected path from `u` to `v`, or
    /// `None` if they are not connected.
    pub fn shortest_path(&self, u: NodeId, v: NodeId) -> Result<Option<usize>> {
        self.get(v)?;
        Ok(self.distances(u, |g, id| g.neighbours(id))?.get(&v).copied())
    }

    /// Ancestors shared by `u` and `v` (each node counts as its own
    /// ancestor), with the directed distance up from each of them.
    pub fn common_ancestors(&self, u: NodeId, v: NodeId) -> Result<BTreeMap<NodeId, (usize, usize)>> {
        let up = |g: &Self, id: NodeId| -> Vec<NodeId> {
            g.node(id)
                .map(|n| n.parents().keys().copied().collect())
                .unwrap_or_default()
        };
        let from_u = self.distances(u, up)?;
        let from_v = self.distances(v, up)?;
        Ok(from_u
            .into_iter()
            .filter_map(|(id, du)| from_v.get(&id).map(|&dv| (id, (du, dv))))
            .collect())
    }

    /// Longest directed path from `u` to `v` as its edge count and node
    /// sequence, or `None` if `v` is unreachable. The graph must be acyclic.
    pub fn longest_path(&self, u: NodeId, v: NodeId) -> Result<Option<(usize, Vec<NodeId>)>> {
        self.get(u)?;
        self.get(v)?;
        let mut dist: BTreeMap<NodeId, usize> = BTreeMap::new();
        let mut prev: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        dist.insert(u, 0);

        for id in self.topological_layers()?.into_iter().flatten() {
            if id == u {
                continue;
            }
            let best = self
                .get(id)?
                .parents()
                .keys()
                .filter_map(|p| dist.get(p).map(|&d| (d + 1, *p)))
                .max();
            if let Some((d, p)) = best {
                dist.insert(id, d);
                prev.insert(id, p);
            }
        }

        let Some(&length) = dist.get(&v) else {
            return Ok(None);
        };
        let mut path = vec![v];
        let mut cursor = v;
        while let Some(&p) = prev.get(&cursor) {
            path.push(p);
            cursor = p;
        }
        path.reverse();
        Ok(Some((length, path)))
    }

    /// Dense multiplicity matrix over the live nodes in increasing id order.
    pub fn adjacency_matrix(&self) -> Vec<Vec<usize>> {
        let ids = self.node_ids();
        self.nodes()
            .map(|n| ids.iter().map(|&c| n.child_multiplicity(c)).collect())
            .collect()
    }

    fn neighbours(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.parents().keys().chain(n.children().keys()).copied().collect())
            .unwrap_or_default()
    }

    fn distances(
        &self,
        src: NodeId,
        step: impl Fn(&Self, NodeId) -> Vec<NodeId>,
    ) -> Result<BTreeMap<NodeId, usize>> {
        self.get(src)?;
        let mut dist = BTreeMap::from([(src, 0)]);
        let mut queue = VecDeque::from([src]);
        while let Some(id) = queue.pop_front() {
            let d = dist[&id];
            for next in step(self, id) {
                if !dist.contains_key(&next) {
                    dist.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }
        Ok(dist)
    }
}

impl<L: Clone> OpenDigraph<L> {
    /// One sub-graph per connected component, ordered as in
    /// [`connected_components`](Self::connected_components). Boundary
    /// lists keep their relative order.
    pub fn component_list(&self) -> Vec<OpenDigraph<L>> {
        let (count, component) = self.connected_components();
        let mut parts: Vec<OpenDigraph<L>> = (0..count).map(|_| OpenDigraph::empty()).collect();
        let mut inputs = vec![Vec::new(); count];
        let mut outputs = vec![Vec::new(); count];

        for node in self.nodes() {
            parts[component[&node.id()]].place(node.clone());
        }
        for &i in self.inputs() {
            inputs[component[&i]].push(i);
        }
        for &o in self.outputs() {
            outputs[component[&o]].push(o);
        }
        for (part, (i, o)) in parts.iter_mut().zip(inputs.into_iter().zip(outputs)) {
            part.set_boundary(i, o);
        }
        parts
    }
}
