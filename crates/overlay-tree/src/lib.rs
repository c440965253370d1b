//! Document tree for overlays.
//!
//! Documents are held in an arena ([`Tree`]) of typed nodes addressed by
//! [`NodeId`]. Node identity is the id, so two equal values at different
//! positions stay distinct. The tree carries no parent pointers; structural
//! removal goes through a [`ParentIndex`] built by a single walk.
//!
//! # Key Types
//!
//! - [`Tree`] -- Arena of nodes with value conversion and YAML/JSON codec
//! - [`Node`] / [`NodeKind`] -- Scalar, Sequence, Mapping, Document, Alias
//! - [`Scalar`] -- Null, Bool, Number, String
//! - [`ParentIndex`] -- Child-to-parent lookup over a tree snapshot

pub mod error;
pub mod node;
pub mod parents;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use node::{Entry, Node, NodeId, NodeKind, Scalar};
pub use parents::ParentIndex;
pub use tree::Tree;
