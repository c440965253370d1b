//! Error types for the tree crate.

use crate::node::NodeKind;

/// Errors that can occur while building, converting, or encoding a tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The node kind cannot be represented by the requested operation.
    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(NodeKind),

    /// A YAML (or JSON) document could not be parsed or emitted.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON output failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
