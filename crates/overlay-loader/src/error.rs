use std::path::PathBuf;

use overlay_schema::SchemaError;
use overlay_tree::TreeError;

/// Errors from loading or writing files. Every variant tied to a file names
/// its path.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to open overlay file at path {path:?}: {source}")]
    OpenOverlay {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse overlay from path {path:?}: {source}")]
    ParseOverlay { path: PathBuf, source: SchemaError },

    #[error("failed to open schema from path {path:?}: {source}")]
    OpenSpecification {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse document from path {path:?}: {source}")]
    ParseSpecification { path: PathBuf, source: TreeError },

    /// The overlay has no `extends` and no document path was given.
    #[error("overlay does not specify an extends URL")]
    MissingExtends,

    #[error("failed to parse URL {url:?}: {source}")]
    InvalidExtends {
        url: String,
        source: url::ParseError,
    },

    #[error("only file:// extends URLs are supported, not {0:?}")]
    UnsupportedScheme(String),

    /// A `file://` URL that does not map to a local path, e.g. one with a
    /// remote host.
    #[error("extends URL {0:?} does not name a local file")]
    NotLocal(String),

    /// Encoding the output document failed.
    #[error("failed to encode document: {0}")]
    Encode(#[from] TreeError),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown format {0:?}, expected \"yaml\" or \"json\"")]
    UnknownFormat(String),
}

/// Result alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
