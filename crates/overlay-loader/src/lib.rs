//! # overlay-loader
//!
//! File-system access for the overlay tools: loading overlays and the
//! documents they apply to, following an overlay's `extends` URL, and writing
//! documents back out as YAML or JSON.
//!
//! # Key Types
//!
//! - [`Format`] - YAML or JSON output
//! - [`LoaderError`] - Failures, each naming the file involved

pub mod error;
pub mod format;
pub mod load;

pub use error::{LoaderError, LoaderResult};
pub use format::{write_document, Format};
pub use load::{
    extends_path, load_either_specification, load_extends_specification, load_overlay,
    load_specification,
};
