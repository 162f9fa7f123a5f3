//! Render tree model for the mdpreview pipeline.
//!
//! This crate provides the intermediate tree that markdown documents are
//! parsed into and that tree transforms mutate in place:
//!
//! - [`Node`] / [`Element`]: the tree itself, with insertion-ordered
//!   attributes and optional source spans.
//! - [`build_tree`]: pulldown-cmark event stream → tree.
//! - [`parse_fragment`]: HTML fragment → nodes (quick-xml based, with
//!   HTML-entity normalization).
//! - [`to_html`] / [`inner_html`]: tree → HTML string.
//!
//! Pipeline logic (stages, gating, configuration) lives in the `mdpreview`
//! crate; this crate is purely the data model and its text boundaries.

mod builder;
mod error;
mod fragment;
mod node;
mod serialize;

pub use builder::build_tree;
pub use error::TreeError;
pub use fragment::parse_fragment;
pub use node::{Element, Node, RESERVED_PREFIX, walk_child_lists_mut, walk_elements_mut};
pub use serialize::{escape_html, inner_html, inner_html_with_raw, to_html};
