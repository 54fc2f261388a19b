//! Circuit legality.

use crate::error::{CircuitError, Result};

use super::{Circuit, Gate};

impl Circuit {
    /// Check the circuit legality rules on top of graph well-formedness.
    ///
    /// Checks:
    /// - The graph is acyclic
    /// - Copies and constants have in-degree at most 1
    /// - `&`, `|`, `^` and constants have out-degree at most 1
    /// - Negations have in-degree and out-degree exactly 1
    pub fn check_legal(&self) -> Result<()> {
        self.check_acyclic()?;
        for node in self.nodes() {
            let gate = *node.label();
            let (indeg, outdeg) = (node.indegree(), node.outdegree());
            let bad = match gate {
                Gate::Copy => indeg > 1,
                Gate::Const(_) => indeg > 1 || outdeg > 1,
                Gate::And | Gate::Or | Gate::Xor => outdeg > 1,
                Gate::Not => indeg != 1 || outdeg != 1,
            };
            if bad {
                return Err(CircuitError::structural(format!(
                    "gate '{}' at {} cannot have in-degree {} and out-degree {}",
                    gate,
                    node.id(),
                    indeg,
                    outdeg
                )));
            }
        }
        Ok(())
    }

    pub fn is_legal(&self) -> bool {
        self.check_legal().is_ok()
    }

    /// Structural well-formedness of the graph plus legality.
    pub fn check_well_formed(&self) -> Result<()> {
        self.graph().check_well_formed()?;
        self.check_legal()
    }

    pub fn is_well_formed(&self) -> bool {
        self.check_well_formed().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, OpenDigraph};

    fn single_gate(gate: Gate, fan_in: usize, fan_out: usize) -> OpenDigraph<Gate> {
        let mut g = OpenDigraph::empty();
        let id = g.add_node(gate, &[], &[]).unwrap();
        for _ in 0..fan_in {
            g.add_input_node(id).unwrap();
        }
        for _ in 0..fan_out {
            g.add_output_node(id).unwrap();
        }
        g
    }

    #[test]
    fn test_degree_table() {
        assert!(Circuit::new(single_gate(Gate::And, 3, 1)).is_ok());
        assert!(Circuit::new(single_gate(Gate::And, 2, 2)).is_err());
        assert!(Circuit::new(single_gate(Gate::Copy, 1, 4)).is_ok());
        assert!(Circuit::new(single_gate(Gate::Copy, 2, 1)).is_err());
        assert!(Circuit::new(single_gate(Gate::Not, 1, 1)).is_ok());
        assert!(Circuit::new(single_gate(Gate::Not, 0, 1)).is_err());
        assert!(Circuit::new(single_gate(Gate::Const(true), 0, 1)).is_ok());
        assert!(Circuit::new(single_gate(Gate::Const(true), 0, 2)).is_err());
    }

    #[test]
    fn test_cycle_is_illegal() {
        let mut g = OpenDigraph::empty();
        let a = g.add_node(Gate::Copy, &[], &[]).unwrap();
        let b = g.add_node(Gate::Xor, &[(a, 1)], &[(a, 1)]).unwrap();
        g.add_output_node(a).unwrap();
        assert_eq!(b, NodeId(1));
        assert!(matches!(Circuit::new(g), Err(CircuitError::CyclicGraph)));
    }

    #[test]
    fn test_illegal_surgery_is_rolled_back() {
        let mut c = Circuit::new(single_gate(Gate::Not, 1, 1)).unwrap();
        let before = c.clone();
        assert!(matches!(
            c.add_copy_node(&[(NodeId(0), 1)], &[]),
            Err(CircuitError::StructuralViolation { .. })
        ));
        assert_eq!(c, before);
        assert!(c.remove_node(NodeId(0)).is_err());
        assert!(c.is_well_formed());
    }
}
