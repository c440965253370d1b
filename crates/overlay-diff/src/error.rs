//! Error types for the diff crate.

use overlay_tree::TreeError;

/// Errors that can occur while comparing trees.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A subtree could not be converted into an update payload, e.g.
    /// because an alias sits somewhere inside an added value.
    #[error("cannot convert {path}: {source}")]
    Convert {
        path: String,
        #[source]
        source: TreeError,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
