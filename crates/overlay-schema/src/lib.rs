//! # overlay-schema
//!
//! The overlay document format: a version, metadata, an optional `extends`
//! URL, the `x-speakeasy-jsonpath` compatibility flag, and an ordered list of
//! actions. Each action targets nodes with a selector expression and either
//! removes them or merges an update document into them.
//!
//! Unknown keys on any object are kept as extensions and written back
//! unchanged.
//!
//! # Key Types
//!
//! - [`Overlay`] - The document
//! - [`Info`] - Title and version metadata
//! - [`Action`] - One targeted edit
//! - [`ValidationErrors`] - Every problem [`Overlay::validate`] found

pub mod error;
pub mod overlay;
mod validate;

pub use error::{SchemaError, SchemaResult, ValidationErrors};
pub use overlay::{Action, Extensions, Info, Overlay, JSONPATH_FLAG_KEY, OVERLAY_VERSION};
