//! Render graph error types.

use thiserror::Error;

/// Errors that can occur while building, validating, exporting or
/// registering a render graph description.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A field reference is not of the form `Pass` or `Pass.field`.
    #[error("invalid field reference '{0}'")]
    InvalidFieldRef(String),

    /// A pass with this instance name already exists in the graph.
    #[error("pass '{0}' already exists in the graph")]
    DuplicatePass(String),

    /// No pass with this instance name exists in the graph.
    #[error("unknown pass '{0}'")]
    UnknownPass(String),

    /// An edge connects a field endpoint to a pass endpoint.
    #[error("edge '{src}' -> '{dst}' mixes a field with a pass")]
    MixedEdge { src: String, dst: String },

    /// The same edge was added twice.
    #[error("edge '{src}' -> '{dst}' already exists")]
    DuplicateEdge { src: String, dst: String },

    /// The edge to remove is not part of the graph.
    #[error("edge '{src}' -> '{dst}' not found")]
    EdgeNotFound { src: String, dst: String },

    /// Only fields can be graph outputs, not whole passes.
    #[error("'{0}' names a pass, graph outputs must name a field")]
    PassFieldAsOutput(String),

    /// The field is already marked as a graph output.
    #[error("'{0}' is already marked as an output")]
    DuplicateOutput(String),

    /// The field is not marked as a graph output.
    #[error("'{0}' is not marked as an output")]
    OutputNotMarked(String),

    /// An input field has more than one incoming data edge.
    #[error("input '{0}' has more than one incoming edge")]
    InputAlreadyConnected(String),

    /// The graph contains a cyclic dependency.
    #[error("render graph contains cyclic dependency")]
    CyclicDependency,

    /// The host already holds a graph with this name.
    #[error("a graph named '{0}' is already registered")]
    DuplicateGraph(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, GraphError>`.
pub type Result<T> = std::result::Result<T, GraphError>;
