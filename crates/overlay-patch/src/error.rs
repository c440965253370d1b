//! Error types for the patch crate.

use overlay_path::SelectorError;
use overlay_tree::{NodeId, NodeKind};

/// Errors that can occur while applying an overlay.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A target failed to compile or evaluate.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Strict mode only: a target selected nothing.
    #[error("selector {target:?} did not match any targets")]
    ZeroMatch { target: String },

    /// The node to remove sits under a parent that has no removable children.
    #[error("cannot remove node {node}: unsupported parent node kind {kind}")]
    UnsupportedParent { node: NodeId, kind: NodeKind },

    /// The node to remove has no parent, e.g. it is the tree root.
    #[error("parent not found for node {0}")]
    ParentNotFound(NodeId),

    /// Everything strict application found, in action order.
    #[error("error applying overlay (strict): {}", .0.join(", "))]
    Strict(Vec<String>),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
