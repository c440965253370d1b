//! # overlay-diff
//!
//! Compares two document trees and produces the overlay actions that turn the
//! first into the second.
//!
//! The walk is deterministic: mapping entries are visited in the right-hand
//! tree's key order, then removals in the left-hand tree's key order, and
//! equal-length sequences position by position. Unequal sequences are
//! replaced as a whole; no element alignment is attempted.
//!
//! # Key Types
//!
//! - [`TreeDiff`] - Actions plus notices for skipped positions
//! - [`CompareOptions`] - Title and `extends` of a generated overlay
//! - [`DiffError`] - Conversion failures

pub mod compare;
pub mod error;
pub mod tree_diff;

pub use compare::{compare, CompareOptions, GENERATED_VERSION};
pub use error::{DiffError, DiffResult};
pub use tree_diff::{diff_trees, TreeDiff};
