//! # overlay-patch
//!
//! Applies an overlay to a document tree. Each action's target is resolved
//! to nodes, then the nodes are either removed from their parents or have
//! the action's update deep-merged into them.
//!
//! Two entry points:
//!
//! - [`apply_to`] stops at the first error;
//! - [`apply_to_strict`] performs every action and reports every problem,
//!   including targets that match nothing and updates that change nothing.
//!
//! Sequences are replaced by an update, never appended to, so re-applying an
//! overlay is idempotent.
//!
//! # Key Types
//!
//! - [`StrictOutcome`] - Warnings and the combined error of a strict run
//! - [`Resolved`] - Nodes a target selected, with dialect warnings
//! - [`PatchError`] - Selector, zero-match and structural failures

pub mod apply;
pub mod error;
pub mod merge;
pub mod remove;
pub mod target;

pub use apply::{apply_to, apply_to_strict, StrictOutcome};
pub use error::{PatchError, PatchResult};
pub use merge::merge;
pub use remove::{remove_all, remove_node};
pub use target::{resolve, Resolved};
