//! Document tree for the tagsoup HTML parser.
//!
//! This crate provides an arena-based tree whose nodes keep byte ranges into
//! the original document text instead of copying it. Text is only
//! materialized when a node is created or edited through the mutation API.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. A node
//! that was never touched after parsing serializes by slicing the source; a
//! node that was edited (or has an edited descendant) is marked dirty and
//! serializes from its structure.

mod attribute;
mod classify;
mod content;
mod error;
mod node;
mod print;
mod serialize;
mod tree;

pub use attribute::{Attribute, Attributes, Quote};
pub use classify::{
    ElementFlags, can_overlap_element, element_flags, is_cdata_element, is_closed_element,
    is_empty_element, is_whitespace,
};
pub use content::{Content, Span};
pub use error::DomError;
pub use node::{EndMarker, Node, NodeKind};
pub use print::print_tree;
pub use tree::{AncestorIterator, DomTree, PrecedingSiblingIterator, DEFAULT_MAX_DEPTH};

/// A type-safe index into the document tree.
///
/// `NodeId` provides O(1) access to any node in the arena. Ids stay valid for
/// the lifetime of the tree; detached nodes keep their slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
