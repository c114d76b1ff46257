//! Errors raised while translating a shading graph.
//!
//! Every variant is recoverable: the material driver and the background
//! translator catch them and substitute a fallback.

use crate::graph::NodeKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// A node kind the renderer has no counterpart for in this position.
    #[error("node type {kind} is not supported; only {expected} are supported here")]
    UnsupportedNode { kind: NodeKind, expected: &'static str },

    /// A supported node used in a way the renderer cannot express.
    #[error("{0}")]
    UnsupportedFeature(String),

    #[error("node '{node}' has no '{socket}' input")]
    MissingInput { node: String, socket: String },

    #[error("input '{socket}' holds a literal that is not a {expected}")]
    InvalidLiteral { socket: String, expected: &'static str },

    #[error("malformed node tree: {0}")]
    MalformedGraph(String),
}

impl ExportError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        ExportError::UnsupportedFeature(message.into())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
