//! Parallel and sequential composition.

use tracing::debug;

use super::digraph::OpenDigraph;
use super::types::{Multiplicity, NodeId};
use crate::error::{CircuitError, Result};

impl<L> OpenDigraph<L> {
    /// Rename every node and boundary id by adding `delta`.
    pub fn shift_ids(&mut self, delta: usize) {
        if delta == 0 {
            return;
        }
        let inputs = self.inputs().iter().map(|i| i.shifted(delta)).collect();
        let outputs = self.outputs().iter().map(|o| o.shifted(delta)).collect();
        for mut node in self.drain_nodes() {
            node.remap(|id| id.shifted(delta));
            self.place(node);
        }
        self.set_boundary(inputs, outputs);
    }
}

impl<L: Clone> OpenDigraph<L> {
    /// Place a copy of `other` beside this graph.
    ///
    /// The copy's ids are shifted past this graph's largest id and its
    /// boundary lists are appended after ours. No edges are added. Returns
    /// the shift applied to `other`'s ids.
    pub fn iparallel(&mut self, other: &OpenDigraph<L>) -> usize {
        let shift = self.max_id().map_or(0, |m| m.index() + 1);
        let mut copy = other.clone();
        copy.shift_ids(shift);

        let mut inputs = self.inputs().to_vec();
        inputs.extend_from_slice(copy.inputs());
        let mut outputs = self.outputs().to_vec();
        outputs.extend_from_slice(copy.outputs());
        for node in copy.drain_nodes() {
            self.place(node);
        }
        self.set_boundary(inputs, outputs);
        debug!(shift, nodes = self.len(), "parallel composition");
        debug_assert!(self.is_well_formed());
        shift
    }

    /// Non-mutating [`iparallel`](Self::iparallel).
    pub fn parallel(&self, other: &OpenDigraph<L>) -> OpenDigraph<L> {
        let mut result = self.clone();
        result.iparallel(other);
        result
    }

    /// Feed `other`'s outputs into this graph's inputs, in order.
    ///
    /// Each of our input nodes disappears; its consumers are rewired onto the
    /// matching output node of `other`, which stays on as an interior wire.
    /// The result reads `other`'s inputs and produces our outputs.
    ///
    /// The new graph is assembled in a scratch copy and swapped in at the
    /// end, so a [`CircuitError::DomainMismatch`] leaves `self` untouched.
    pub fn icompose(&mut self, other: &OpenDigraph<L>) -> Result<()> {
        if other.outputs().len() != self.inputs().len() {
            return Err(CircuitError::DomainMismatch {
                outputs: other.outputs().len(),
                inputs: self.inputs().len(),
            });
        }

        let mut scratch = self.clone();
        let shift = scratch.iparallel(other);

        for (&inp, &out) in self.inputs().iter().zip(other.outputs()) {
            let out = out.shifted(shift);
            let consumers: Vec<(NodeId, Multiplicity)> = scratch
                .get(inp)?
                .children()
                .iter()
                .map(|(&c, &m)| (c, m))
                .collect();
            for (c, m) in consumers {
                scratch.unlink_all(inp, c);
                scratch.link(out, c, m);
            }
            scratch.take(inp);
        }

        let inputs = other.inputs().iter().map(|i| i.shifted(shift)).collect();
        scratch.set_boundary(inputs, self.outputs().to_vec());
        debug_assert!(scratch.is_well_formed());
        debug!(fused = other.outputs().len(), nodes = scratch.len(), "sequential composition");

        *self = scratch;
        Ok(())
    }

    /// Non-mutating [`icompose`](Self::icompose).
    pub fn compose(&self, other: &OpenDigraph<L>) -> Result<OpenDigraph<L>> {
        let mut result = self.clone();
        result.icompose(other)?;
        Ok(result)
    }
}
