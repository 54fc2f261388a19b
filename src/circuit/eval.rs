//! Evaluation by constant propagation.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, trace};

use super::{Circuit, Gate};
use crate::error::{CircuitError, Result};
use crate::graph::NodeId;

impl Circuit {
    /// Evaluate a copy of the circuit and read the outputs as an unsigned
    /// integer, lowest output id first as the most significant bit.
    ///
    /// Every input must already be bound to a constant, usually by composing
    /// with a [`register`](Circuit::register).
    pub fn evaluate(&self) -> Result<u64> {
        bits_to_u64(self.evaluate_bits()?)
    }

    /// Evaluate a copy of the circuit, returning one bit per output in
    /// increasing output id order.
    pub fn evaluate_bits(&self) -> Result<Vec<bool>> {
        self.clone().evaluate_in_place()
    }

    /// Propagate constants through the circuit, consuming it.
    ///
    /// The worklist starts with the input constants, every other constant
    /// without parents, and every parentless `&`, `|` or `^`, which is
    /// first replaced by its neutral value. Each popped constant is fused
    /// into its single consumer, possibly producing new constants, until
    /// every output holds a value. Leftover constants are deleted.
    ///
    /// Afterwards the circuit holds the resolved outputs and whatever
    /// dead wiring was not reached; it is generally no longer well-formed.
    pub fn evaluate_in_place(&mut self) -> Result<Vec<bool>> {
        let mut queue = VecDeque::new();
        for &i in self.inputs() {
            if !self.gate_at(i).is_some_and(Gate::is_constant) {
                return Err(CircuitError::evaluation(format!(
                    "input {} is not bound to a constant",
                    i
                )));
            }
            queue.push_back(i);
        }
        let seeds: Vec<(NodeId, Gate)> = self
            .nodes()
            .filter(|n| n.parents().is_empty() && !self.is_input(n.id()))
            .map(|n| (n.id(), *n.label()))
            .collect();
        for (id, gate) in seeds {
            if let Some(value) = gate.neutral() {
                self.graph.set_label(id, Gate::Const(value))?;
                queue.push_back(id);
            } else if gate.is_constant() {
                queue.push_back(id);
            }
        }

        let mut pending: BTreeSet<NodeId> = self.outputs().iter().copied().collect();
        let mut steps = 0usize;
        while !pending.is_empty() {
            let Some(id) = queue.pop_front() else {
                break;
            };
            if !self.contains(id) {
                continue;
            }
            self.consume(id, &mut pending, &mut queue)?;
            steps += 1;
        }
        for id in queue {
            self.graph.take(id);
        }
        debug!(steps, unresolved = pending.len(), "constant propagation finished");

        let mut outputs = self.outputs().to_vec();
        outputs.sort();
        outputs
            .into_iter()
            .map(|o| {
                self.gate_at(o)
                    .and_then(Gate::constant)
                    .ok_or_else(|| CircuitError::evaluation(format!("output {} was not resolved", o)))
            })
            .collect()
    }

    /// Fuse the constant at `id` into its consumer.
    fn consume(
        &mut self,
        id: NodeId,
        pending: &mut BTreeSet<NodeId>,
        queue: &mut VecDeque<NodeId>,
    ) -> Result<()> {
        let value = self
            .gate_at(id)
            .and_then(Gate::constant)
            .ok_or_else(|| CircuitError::evaluation(format!("{} is not a constant", id)))?;
        let Some(&(child, _)) = self.children_of(id).first() else {
            self.graph.take(id);
            return Ok(());
        };
        let gate = self.gate_at(child).ok_or(CircuitError::InvalidReference { id: child })?;
        trace!(node = %id, value, consumer = %child, %gate, "consume");

        if pending.remove(&child) {
            self.graph.take(id);
            self.graph.set_label(child, Gate::Const(value))?;
            return Ok(());
        }

        match gate {
            Gate::Copy => {
                let fanout = self.children_of(child);
                self.graph.take(child);
                self.graph.take(id);
                for (target, m) in fanout {
                    for _ in 0..m {
                        let copy = self.graph.spawn(Gate::Const(value));
                        self.graph.link(copy, target, 1);
                        queue.push_back(copy);
                    }
                }
            }
            Gate::Not => {
                self.graph.take(id);
                self.graph.set_label(child, Gate::Const(!value))?;
                queue.push_back(child);
            }
            Gate::And | Gate::Or => {
                // false absorbs an AND, true absorbs an OR
                let absorbing = gate == Gate::Or;
                self.graph.take(id);
                if value == absorbing {
                    self.graph.set_label(child, Gate::Const(absorbing))?;
                    self.cut_inputs(child);
                    queue.push_back(child);
                } else if self.parents_of(child).is_empty() {
                    self.graph.set_label(child, Gate::Const(!absorbing))?;
                    queue.push_back(child);
                }
            }
            Gate::Xor => {
                self.graph.take(id);
                if value {
                    // child becomes a negation of a fresh xor over the rest
                    let rest = self.graph.spawn(Gate::Xor);
                    for (p, m) in self.parents_of(child) {
                        self.graph.unlink_all(p, child);
                        self.graph.link(p, rest, m);
                    }
                    self.graph.link(rest, child, 1);
                    self.graph.set_label(child, Gate::Not)?;
                    if self.parents_of(rest).is_empty() {
                        self.graph.set_label(rest, Gate::Const(false))?;
                        queue.push_back(rest);
                    }
                } else if self.parents_of(child).is_empty() {
                    self.graph.set_label(child, Gate::Const(false))?;
                    queue.push_back(child);
                }
            }
            Gate::Const(_) => {
                return Err(CircuitError::evaluation(format!(
                    "constant {} feeds constant {}",
                    id, child
                )));
            }
        }
        Ok(())
    }

    /// Detach every input of `id`, leaving each former parent a dead copy.
    fn cut_inputs(&mut self, id: NodeId) {
        for (p, _) in self.parents_of(id) {
            self.graph.unlink_all(p, id);
            let sink = self.graph.spawn(Gate::Copy);
            self.graph.link(p, sink, 1);
        }
    }
}

/// Read bits most significant first.
pub(super) fn bits_to_u64(bits: Vec<bool>) -> Result<u64> {
    if bits.len() > 64 {
        return Err(CircuitError::ResultOverflow { width: bits.len() });
    }
    Ok(bits.into_iter().fold(0, |acc, bit| (acc << 1) | u64::from(bit)))
}
