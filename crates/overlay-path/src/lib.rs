//! # overlay-path
//!
//! Naming positions in a document tree and selecting nodes by expression.
//!
//! A [`Path`] is what the diff engine emits: a list of key and index steps
//! rendered in bracket notation (`$["paths"]["/pets"][0]`). A [`JsonPath`] is
//! what the patch engine evaluates: a compiled selector that returns matching
//! [`NodeId`](overlay_tree::NodeId)s in document order.
//!
//! Two grammars are supported, chosen by [`Dialect`]:
//!
//! - **Legacy**: lenient member names (`$.x-foo`), `[?(...)]` filters that
//!   test a mapping as a whole, and `=~ /regex/` matches.
//! - **RFC 9535**: the standard grammar, with per-child filter semantics and
//!   the `length`, `count`, `match`, `search` and `value` functions.
//!
//! # Key Types
//!
//! - [`Path`] / [`Step`] - Immutable position in a tree
//! - [`JsonPath`] - Compiled selector
//! - [`Dialect`] - Selector grammar
//! - [`SelectorError`] - Compile and evaluation failures

mod ast;
pub mod dialect;
pub mod error;
mod eval;
pub mod json_path;
mod parser;
pub mod path;

pub use dialect::Dialect;
pub use error::{EvalError, ParseError, SelectorError, SelectorResult};
pub use json_path::JsonPath;
pub use path::{Path, Step};
