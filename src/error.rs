//! Error types for the opencirc graph and circuit engine.
//!
//! This module provides a unified error type [`CircuitError`] that covers
//! all error conditions that can occur during graph surgery, circuit
//! validation, evaluation, formula parsing and export.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type alias using [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Unified error type for all opencirc operations.
#[derive(Error, Debug)]
pub enum CircuitError {
    // ============ Graph Errors ============
    /// An edge or boundary operation named a node that is not in the graph
    #[error("Node {id} is not in the graph")]
    InvalidReference { id: NodeId },

    /// Removing one unit of an edge that does not exist
    #[error("No edge from {src} to {tgt}")]
    MissingEdge { src: NodeId, tgt: NodeId },

    /// Boundary removal of an id that is not on that boundary
    #[error("Node {id} is not an {side} boundary")]
    NotBoundary { id: NodeId, side: &'static str },

    /// A well-formedness or legality invariant is broken
    #[error("Structural violation: {message}")]
    StructuralViolation { message: String },

    /// Acyclicity was required but the graph has a cycle
    #[error("Graph contains a cycle")]
    CyclicGraph,

    /// Sequential composition with mismatched boundary sizes
    #[error("Domains don't match: {outputs} outputs cannot feed {inputs} inputs")]
    DomainMismatch { outputs: usize, inputs: usize },

    // ============ Circuit Errors ============
    /// A label outside the circuit alphabet
    #[error("Unknown gate label '{label}' on node {id}")]
    UnknownGate { id: NodeId, label: String },

    /// The evaluator met a node that should have been a resolved constant
    #[error("Evaluation precondition failed: {message}")]
    EvaluationPrecondition { message: String },

    /// The circuit has too many outputs to be read as a machine integer
    #[error("Result has {width} bits and does not fit in 64")]
    ResultOverflow { width: usize },

    // ============ Formula DSL Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at column {column}: {message}")]
    LexerError { column: usize, message: String },

    /// Error during parsing
    #[error("Parse error at column {column}: {message}")]
    ParseError { column: usize, message: String },

    // ============ I/O Errors ============
    /// Error writing an exported graph
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CircuitError {
    /// Create a structural violation error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralViolation {
            message: message.into(),
        }
    }

    /// Create an evaluation precondition error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::EvaluationPrecondition {
            message: message.into(),
        }
    }

    /// Create a lexer error
    pub fn lexer(column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(column: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            column,
            message: message.into(),
        }
    }
}
