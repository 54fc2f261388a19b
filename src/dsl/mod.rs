//! A small formula language for building circuits.
//!
//! Each formula describes one output bit in terms of named inputs.
//!
//! # Grammar
//!
//! ```text
//! formula    = expr EOF
//! expr       = unary { op unary }
//! unary      = '~' unary | atom
//! atom       = '(' expr ')' | '0' | '1' | identifier
//! op         = '&' | '|' | '^'
//! identifier = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! A group joined by one connective becomes a single variadic gate, so
//! `a & b & c` is one three-input AND. Connectives cannot be mixed in a
//! group without parentheses: `a & b | c` is rejected.
//!
//! # Lowering
//!
//! Every distinct variable, across all formulas, becomes one input feeding a
//! copy node shared by all its occurrences. Inputs are ordered by first
//! appearance and outputs follow the order of the formulas.
//!
//! ```
//! use opencirc_core::circuit::Circuit;
//! use opencirc_core::dsl::parse_formulas;
//!
//! let (circuit, vars) = parse_formulas(&["a & b", "a ^ b"]).unwrap();
//! assert_eq!(vars, ["a", "b"]);
//! let bound = circuit.compose(&Circuit::register(0b11, 2).unwrap()).unwrap();
//! assert_eq!(bound.evaluate().unwrap(), 0b10);
//! ```

mod ast;
mod lexer;
mod parser;

use std::collections::BTreeMap;

use tracing::debug;

pub use ast::{BinOp, Expr};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::circuit::{Circuit, Gate};
use crate::error::Result;
use crate::graph::{NodeId, OpenDigraph};

/// Parse a single formula into a syntax tree.
pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(Lexer::new(input))?.parse()
}

/// Build a circuit from one formula.
pub fn parse_formula(input: &str) -> Result<(Circuit, Vec<String>)> {
    parse_formulas(&[input])
}

/// Build one circuit computing every formula, returning it with the
/// variable names in input order.
pub fn parse_formulas(inputs: &[&str]) -> Result<(Circuit, Vec<String>)> {
    let exprs = inputs.iter().map(|s| parse(s)).collect::<Result<Vec<_>>>()?;
    let (circuit, vars) = lower(&exprs)?;
    debug!(
        formulas = exprs.len(),
        variables = vars.len(),
        nodes = circuit.len(),
        "lowered formulas"
    );
    Ok((circuit, vars))
}

/// Lower parsed formulas into a circuit.
pub fn lower(exprs: &[Expr]) -> Result<(Circuit, Vec<String>)> {
    let mut vars = Vec::new();
    for e in exprs {
        e.collect_variables(&mut vars);
    }

    let mut graph: OpenDigraph<Gate> = OpenDigraph::empty();
    let mut fans = BTreeMap::new();
    for name in &vars {
        let fan = graph.add_copy_node(&[], &[])?;
        graph.add_input_node(fan)?;
        fans.insert(name.as_str(), fan);
    }
    for e in exprs {
        let root = lower_expr(&mut graph, &fans, e)?;
        graph.add_output_node(root)?;
    }
    Ok((Circuit::new(graph)?, vars))
}

/// Node whose single value is `expr`; the caller wires its consumer.
fn lower_expr(circuit: &mut OpenDigraph<Gate>, fans: &BTreeMap<&str, NodeId>, expr: &Expr) -> Result<NodeId> {
    match expr {
        Expr::Var(name) => Ok(fans[name.as_str()]),
        Expr::Const(value) => circuit.add_constant_node(*value, &[], &[]),
        Expr::Not(inner) => {
            let operand = lower_expr(circuit, fans, inner)?;
            circuit.add_not_node(&[(operand, 1)], &[])
        }
        Expr::Op(op, operands) => {
            let gate = circuit.add_gate(op.gate(), &[], &[])?;
            for e in operands {
                let operand = lower_expr(circuit, fans, e)?;
                circuit.add_edge(operand, gate, 1)?;
            }
            Ok(gate)
        }
    }
}
