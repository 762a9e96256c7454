//! The node arena and its mutation API.

use std::collections::HashSet;
use std::sync::Arc;

use crate::attribute::{Attribute, Attributes};
use crate::content::{Content, Span};
use crate::error::DomError;
use crate::node::{EndMarker, Node, NodeKind};
use crate::NodeId;

/// Nesting limit applied when no other limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Arena-based document tree with O(1) node access and traversal.
///
/// All nodes live in one vector and refer to each other by [`NodeId`]. The
/// Document node is always at index 0 ([`NodeId::ROOT`]). The tree shares
/// ownership of the source text so that parsed nodes can point into it.
///
/// Two families of mutators exist. The `*_parsed` methods build structure
/// during parsing and leave nodes clean. Everything else is an edit: it marks
/// the touched node and its ancestors dirty so that serialization stops
/// slicing the source for them.
#[derive(Debug, Clone)]
pub struct DomTree {
    source: Arc<str>,
    nodes: Vec<Node>,
    max_depth: usize,
}

impl DomTree {
    /// Create a tree over empty source with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source("")
    }

    /// Create a tree whose Document node spans all of `source`.
    #[must_use]
    pub fn with_source(source: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let mut document = Node::new(NodeKind::Document);
        document.outer = Some(Span::new(0, source.len()));
        document.inner = document.outer;
        document.line = 1;
        document.column = 1;
        Self {
            source,
            nodes: vec![document],
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// The text the tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// A shared handle to the source text.
    #[must_use]
    pub fn shared_source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Nesting limit for walks and serialization.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the nesting limit.
    pub const fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    ///
    /// Changes made through this reference do not mark anything dirty.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::InvalidNode(id))
    }

    /// Get the number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (it always holds at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every id in the arena.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // ===================================================================
    // Node factories
    // ===================================================================

    /// Create a detached element. It counts as implicitly closed.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Element);
        node.set_name(Content::from(name));
        node.end = Some(EndMarker::Implicit);
        self.alloc(node)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text);
        node.text = Some(Content::from(text));
        self.alloc(node)
    }

    /// Create a detached comment node holding `<!--body-->`.
    pub fn create_comment(&mut self, body: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Comment);
        node.text = Some(Content::Materialized(format!("<!--{body}-->")));
        self.alloc(node)
    }

    // ===================================================================
    // Queries
    // ===================================================================

    /// The kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// Lowercase name of a node; `#text`, `#comment` and `#document` for the
    /// nameless kinds.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).map_or("", |n| n.name(&self.source))
    }

    /// Name of a node as written in the source.
    #[must_use]
    pub fn raw_name(&self, id: NodeId) -> &str {
        self.get(id).map_or("", |n| n.raw_name(&self.source))
    }

    /// Whether a node has been closed.
    #[must_use]
    pub fn is_closed(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_closed)
    }

    /// Whether a node or one of its descendants was edited.
    #[must_use]
    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_dirty)
    }

    /// Number of ancestors between a node and the top of its tree.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Text of a text or comment node. Comments include their delimiters.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::Comment => Some(self.node_text(node)),
            NodeKind::Document | NodeKind::Element => None,
        }
    }

    pub(crate) fn node_text<'a>(&'a self, node: &'a Node) -> &'a str {
        match (&node.text, node.outer) {
            (Some(text), _) => text.resolve(&self.source),
            (None, Some(span)) => span.slice(&self.source),
            (None, None) => "",
        }
    }

    /// Concatenated text of every text node under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] for an unknown `id`, or
    /// [`DomError::TooComplex`] when the subtree nests too deeply.
    pub fn inner_text(&self, id: NodeId) -> Result<String, DomError> {
        if self.kind(id) == Some(NodeKind::Text) {
            return Ok(self.text(id).unwrap_or_default().to_owned());
        }
        let mut out = String::new();
        for descendant in self.descendants(id)? {
            if self.kind(descendant) == Some(NodeKind::Text) {
                out.push_str(self.text(descendant).unwrap_or_default());
            }
        }
        Ok(out)
    }

    /// Attributes of a node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.get(id).map(Node::attributes)
    }

    /// Look up an attribute by name, ignoring ASCII case.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&Attribute> {
        self.attributes(id)?.named(name)
    }

    /// Look up an attribute value by name, ignoring ASCII case.
    #[must_use]
    pub fn attribute_value(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attribute(id, name)?.value(&self.source)
    }

    // ===================================================================
    // Navigation
    // ===================================================================

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// All descendants of a node in document order, the node itself excluded.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] for an unknown `id` and
    /// [`DomError::TooComplex`] when the subtree nests deeper than
    /// [`max_depth`](Self::max_depth).
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, DomError> {
        let node = self.node(id)?;
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> =
            node.children.iter().rev().map(|&c| (c, 1)).collect();
        while let Some((current, level)) = stack.pop() {
            if level > self.max_depth {
                return Err(DomError::TooComplex {
                    max_depth: self.max_depth,
                });
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().map(|&c| (c, level + 1)));
        }
        Ok(out)
    }

    /// Descendant elements whose name matches, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Fails like [`descendants`](Self::descendants).
    pub fn descendants_named(&self, id: NodeId, name: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&d| self.kind(d) == Some(NodeKind::Element))
            .filter(|&d| self.name(d).eq_ignore_ascii_case(name))
            .collect())
    }

    // ===================================================================
    // Parse-time construction (no dirty marking)
    // ===================================================================

    /// Append a freshly parsed node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if either id is not in the tree. The
    /// tree is left untouched in that case.
    pub fn append_parsed(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let _ = self.node(parent)?;
        let _ = self.node(child)?;
        self.unlink(child);
        self.link_at(parent, child, None);
        Ok(())
    }

    /// Move a parsed node under a new parent without marking either dirty.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if either id is not in the tree.
    pub fn move_parsed(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), DomError> {
        self.append_parsed(new_parent, child)
    }

    /// Add a parsed attribute to a node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if `id` is not in the tree.
    pub fn push_parsed_attribute(
        &mut self,
        id: NodeId,
        attribute: Attribute,
    ) -> Result<(), DomError> {
        let _ = self.node_mut(id)?.attributes.push(attribute, id);
        Ok(())
    }

    // ===================================================================
    // Edits
    // ===================================================================

    /// Mark a node and all of its ancestors as edited.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get_mut(node_id.0) else {
                break;
            };
            node.dirty = true;
            node.clear_caches();
            current = node.parent;
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] for an unknown id and
    /// [`DomError::HierarchyCycle`] if `child` is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_at(parent, child, None)
    }

    /// Inserts `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails like [`append_child`](Self::append_child).
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_at(parent, child, Some(0))
    }

    /// Inserts `child` immediately before `reference`, which must be a child
    /// of `parent`.
    ///
    /// # Errors
    ///
    /// Fails like [`append_child`](Self::append_child), and with
    /// [`DomError::NotAChild`] if `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.check_child(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let index = self.child_index(parent, reference)?;
        self.link_at(parent, child, Some(index));
        self.mark_dirty(parent);
        Ok(())
    }

    /// Inserts `child` immediately after `reference`, which must be a child
    /// of `parent`.
    ///
    /// # Errors
    ///
    /// Fails like [`insert_before`](Self::insert_before).
    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.check_child(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let index = self.child_index(parent, reference)?;
        self.link_at(parent, child, Some(index + 1));
        self.mark_dirty(parent);
        Ok(())
    }

    /// Replaces `old` (a child of `parent`) with `child`.
    ///
    /// # Errors
    ///
    /// Fails like [`insert_before`](Self::insert_before), with `old` as the
    /// reference.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        old: NodeId,
    ) -> Result<(), DomError> {
        if child == old {
            return self.check_child(parent, old);
        }
        self.insert_before(parent, child, old)?;
        self.remove_child(parent, old)
    }

    /// Removes `child` from `parent`. The child keeps its subtree and can be
    /// inserted elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAChild`] if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_child(parent, child)?;
        self.unlink(child);
        self.mark_dirty(parent);
        Ok(())
    }

    /// Moves every child of `from` to the end of `to`'s children.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] for an unknown id and
    /// [`DomError::HierarchyCycle`] if `to` lies under `from`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), DomError> {
        let moved = self.node(from)?.children.clone();
        for child in moved {
            self.check_insert(to, child)?;
            self.unlink(child);
            self.link_at(to, child, None);
        }
        self.mark_dirty(from);
        self.mark_dirty(to);
        Ok(())
    }

    /// Replace the text of a text or comment node. On an element, the
    /// children are replaced by a single text node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if `id` is not in the tree.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match self.node(id)?.kind {
            NodeKind::Text | NodeKind::Comment => {
                self.node_mut(id)?.text = Some(Content::from(text));
                self.mark_dirty(id);
            }
            NodeKind::Element | NodeKind::Document => {
                for child in self.node(id)?.children.clone() {
                    self.unlink(child);
                }
                let text_node = self.create_text(text);
                self.link_at(id, text_node, None);
                self.mark_dirty(id);
            }
        }
        Ok(())
    }

    /// Append an attribute to an element.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if `id` is not in the tree.
    pub fn append_attribute(&mut self, id: NodeId, attribute: Attribute) -> Result<usize, DomError> {
        let position = self.node_mut(id)?.attributes.push(attribute, id);
        self.mark_dirty(id);
        Ok(position)
    }

    /// Set an attribute value, adding the attribute if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if `id` is not in the tree.
    pub fn set_attribute_value(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let node = self.node_mut(id)?;
        if let Some(existing) = node.attributes.named_mut(name) {
            existing.set_value(value);
        } else {
            let _ = node.attributes.push(Attribute::new(name, value), id);
        }
        self.mark_dirty(id);
        Ok(())
    }

    /// Remove every attribute with this name. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] if `id` is not in the tree.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<usize, DomError> {
        let removed = self.node_mut(id)?.attributes.remove_named(name);
        if removed > 0 {
            self.mark_dirty(id);
        }
        Ok(removed)
    }

    /// Ids of a node and everything under it.
    ///
    /// # Errors
    ///
    /// Fails like [`descendants`](Self::descendants).
    pub fn subtree(&self, id: NodeId) -> Result<HashSet<NodeId>, DomError> {
        let mut ids: HashSet<NodeId> = self.descendants(id)?.into_iter().collect();
        let _ = ids.insert(id);
        Ok(ids)
    }

    // ===================================================================
    // Link maintenance
    // ===================================================================

    fn insert_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.link_at(parent, child, index);
        self.mark_dirty(parent);
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let _ = self.node(parent)?;
        let _ = self.node(child)?;
        if child == NodeId::ROOT || child == parent || self.is_descendant_of(parent, child) {
            return Err(DomError::HierarchyCycle);
        }
        Ok(())
    }

    fn check_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let _ = self.node(parent)?;
        if self.node(child)?.parent == Some(parent) {
            Ok(())
        } else {
            Err(DomError::NotAChild { parent, child })
        }
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    /// Unlink from the current parent, marking that parent dirty.
    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            self.unlink(child);
            self.mark_dirty(old_parent);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        let prev = self.prev_sibling(child);
        let next = self.next_sibling(child);
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|&c| c != child);
        }
        if let Some(node) = prev.and_then(|prev| self.nodes.get_mut(prev.0)) {
            node.next_sibling = next;
        }
        if let Some(node) = next.and_then(|next| self.nodes.get_mut(next.0)) {
            node.prev_sibling = prev;
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Link a detached node into `parent` at `index` (or at the end).
    /// Nothing changes unless both ids are valid.
    fn link_at(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if child.0 >= self.nodes.len() {
            return;
        }
        let Some(parent_node) = self.nodes.get_mut(parent.0) else {
            return;
        };
        let index = index.map_or(parent_node.children.len(), |i| {
            i.min(parent_node.children.len())
        });
        parent_node.children.insert(index, child);
        let prev = index
            .checked_sub(1)
            .and_then(|i| parent_node.children.get(i))
            .copied();
        let next = parent_node.children.get(index + 1).copied();

        if let Some(node) = prev.and_then(|prev| self.nodes.get_mut(prev.0)) {
            node.next_sibling = Some(child);
        }
        if let Some(node) = next.and_then(|next| self.nodes.get_mut(next.0)) {
            node.prev_sibling = Some(child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_document_root() {
        let tree = DomTree::with_source("abc");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.kind(NodeId::ROOT), Some(NodeKind::Document));
        assert_eq!(tree.name(NodeId::ROOT), "#document");
        assert_eq!(tree.get(NodeId::ROOT).and_then(|n| n.outer), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_parsed_append_stays_clean() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_parsed(NodeId::ROOT, div).unwrap();
        assert_eq!(tree.children(NodeId::ROOT), &[div]);
        assert!(!tree.is_dirty(NodeId::ROOT));
    }

    #[test]
    fn test_edit_marks_ancestors_dirty() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("span");
        tree.append_parsed(NodeId::ROOT, outer).unwrap();
        tree.append_parsed(outer, inner).unwrap();

        tree.set_attribute_value(inner, "class", "x").unwrap();

        assert!(tree.is_dirty(inner));
        assert!(tree.is_dirty(outer));
        assert!(tree.is_dirty(NodeId::ROOT));
    }

    #[test]
    fn test_descendants_respects_depth_limit() {
        let mut tree = DomTree::new();
        let mut parent = NodeId::ROOT;
        for _ in 0..5 {
            let child = tree.create_element("div");
            tree.append_parsed(parent, child).unwrap();
            parent = child;
        }
        assert_eq!(tree.descendants(NodeId::ROOT).unwrap().len(), 5);

        tree.set_max_depth(3);
        assert_eq!(
            tree.descendants(NodeId::ROOT),
            Err(DomError::TooComplex { max_depth: 3 })
        );
    }

    #[test]
    fn test_text_of_parsed_node_slices_source() {
        let mut tree = DomTree::with_source("hello world");
        let mut node = Node::new(NodeKind::Text);
        node.outer = Some(Span::new(6, 5));
        let id = tree.alloc(node);
        assert_eq!(tree.text(id), Some("world"));

        tree.set_text(id, "there").unwrap();
        assert_eq!(tree.text(id), Some("there"));
    }

    #[test]
    fn test_comment_factory_wraps_body() {
        let mut tree = DomTree::new();
        let id = tree.create_comment(" note ");
        assert_eq!(tree.text(id), Some("<!-- note -->"));
        assert_eq!(tree.name(id), "#comment");
    }
}
