//! The closed gate alphabet.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The behaviour of a circuit node.
///
/// Textual labels follow the usual formula notation: `""` for a copy
/// (fan-out) node, `&`, `|`, `^` for the variadic gates, `~` for negation
/// and `0`/`1` for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gate {
    /// Fan-out: one input replicated to every child
    #[default]
    Copy,
    And,
    Or,
    Xor,
    Not,
    Const(bool),
}

impl Gate {
    /// The textual label of this gate.
    pub fn symbol(self) -> &'static str {
        match self {
            Gate::Copy => "",
            Gate::And => "&",
            Gate::Or => "|",
            Gate::Xor => "^",
            Gate::Not => "~",
            Gate::Const(false) => "0",
            Gate::Const(true) => "1",
        }
    }

    pub fn is_copy(self) -> bool {
        self == Gate::Copy
    }

    pub fn is_and(self) -> bool {
        self == Gate::And
    }

    pub fn is_or(self) -> bool {
        self == Gate::Or
    }

    pub fn is_xor(self) -> bool {
        self == Gate::Xor
    }

    pub fn is_not(self) -> bool {
        self == Gate::Not
    }

    pub fn is_constant(self) -> bool {
        matches!(self, Gate::Const(_))
    }

    /// The value of a constant gate.
    pub fn constant(self) -> Option<bool> {
        match self {
            Gate::Const(v) => Some(v),
            _ => None,
        }
    }

    /// True for the variadic gates `&`, `|` and `^`.
    pub fn is_variadic(self) -> bool {
        matches!(self, Gate::And | Gate::Or | Gate::Xor)
    }

    /// Value of a variadic gate with no inputs: the identity of its operator.
    pub fn neutral(self) -> Option<bool> {
        match self {
            Gate::And => Some(true),
            Gate::Or | Gate::Xor => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A label outside the gate alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gate label '{0}'")]
pub struct UnknownLabel(pub String);

impl FromStr for Gate {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Gate::Copy),
            "&" => Ok(Gate::And),
            "|" => Ok(Gate::Or),
            "^" => Ok(Gate::Xor),
            "~" => Ok(Gate::Not),
            "0" => Ok(Gate::Const(false)),
            "1" => Ok(Gate::Const(true)),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}
