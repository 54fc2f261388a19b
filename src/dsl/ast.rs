//! Syntax tree for boolean formulas.

use std::fmt;

use crate::circuit::Gate;

/// Binary connectives. A group of operands joined by one connective is a
/// single variadic gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Xor,
}

impl BinOp {
    pub fn gate(self) -> Gate {
        match self {
            BinOp::And => Gate::And,
            BinOp::Or => Gate::Or,
            BinOp::Xor => Gate::Xor,
        }
    }

    pub fn symbol(self) -> &'static str {
        self.gate().symbol()
    }
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Named input
    Var(String),
    /// Literal `0` or `1`
    Const(bool),
    /// `~e`
    Not(Box<Expr>),
    /// `e1 op e2 op ...`, flattened
    Op(BinOp, Vec<Expr>),
}

impl Expr {
    /// Append the variables of this formula to `seen`, skipping ones
    /// already present, in left-to-right order.
    pub fn collect_variables(&self, seen: &mut Vec<String>) {
        match self {
            Expr::Var(name) => {
                if !seen.contains(name) {
                    seen.push(name.clone());
                }
            }
            Expr::Const(_) => {}
            Expr::Not(inner) => inner.collect_variables(seen),
            Expr::Op(_, operands) => {
                for e in operands {
                    e.collect_variables(seen);
                }
            }
        }
    }

    pub fn variables(&self) -> Vec<String> {
        let mut seen = Vec::new();
        self.collect_variables(&mut seen);
        seen
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(value) => write!(f, "{}", u8::from(*value)),
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Op(..) => write!(f, "~({})", inner),
                _ => write!(f, "~{}", inner),
            },
            Expr::Op(op, operands) => {
                for (i, e) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    match e {
                        Expr::Op(..) => write!(f, "({})", e)?,
                        _ => write!(f, "{}", e)?,
                    }
                }
                Ok(())
            }
        }
    }
}
