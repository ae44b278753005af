use super::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Error during parsing (e.g., syntax error)
    #[error("Parse error at line {line}, column {column}:\n{message}\nSnippet: \"{snippet}\"")]
    ParseError {
        /// A human-readable message explaining the error
        message: String,
        /// The line number (1-based)
        line: usize,
        /// The column number (1-based)
        column: usize,
        /// The snippet of input where the error occurred
        snippet: String,
    },
    /// A node id that is out of range or already deleted
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),
    /// Logical error (e.g., cycle detected, invalid operation)
    #[error("Tree logic error: {0}")]
    LogicError(String),
}
