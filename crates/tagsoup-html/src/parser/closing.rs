//! Closing rules and nested-tag repair.
//!
//! An end tag is matched against the most recent open element with the same
//! name. What happens when there is none depends on the element's
//! classification. Closing an element cascades to its open children unless
//! elements are only closed at end of input.

use tagsoup_dom::{
    EndMarker, NodeId, NodeKind, Span, can_overlap_element, is_closed_element, is_empty_element,
};
use tracing::trace;

use super::Parser;
use crate::error::{HtmlError, ParseErrorCode};

/// Ancestors whose presence stops an implicit close of `name`.
fn resetters(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "li" => Some(&["ul"]),
        "tr" => Some(&["table"]),
        "th" | "td" => Some(&["tr", "table"]),
        _ => None,
    }
}

impl Parser<'_> {
    /// Most recent still-open element named `name`.
    fn last_open(&self, name: &str) -> Option<NodeId> {
        let mut candidate = self.doc.last_nodes.get(name).copied();
        while let Some(id) = candidate {
            if !self.doc.tree.is_closed(id) {
                return Some(id);
            }
            candidate = self.doc.tree.get(id).and_then(|n| n.prev_with_same_name);
        }
        None
    }

    /// Whether one of `names` was opened after `node` and is still open.
    fn has_resetter_after(&self, node: NodeId, names: &[&str]) -> bool {
        let Some(position) = self.doc.tree.get(node).map(|n| n.stream_position) else {
            return false;
        };
        names.iter().any(|name| {
            self.last_open(name)
                .and_then(|id| self.doc.tree.get(id))
                .is_some_and(|resetter| resetter.stream_position >= position)
        })
    }

    /// Point the name index back at the element that was open before `id`.
    fn restore_last_node(&mut self, name: &str, id: NodeId) {
        match self.doc.tree.get(id).and_then(|n| n.prev_with_same_name) {
            Some(previous) => {
                let _ = self.doc.last_nodes.insert(name.to_owned(), previous);
            }
            None => {
                let _ = self.doc.last_nodes.remove(name);
            }
        }
    }

    /// Move `last_parent` up past closed elements.
    pub(super) fn update_last_parent(&mut self) {
        let mut candidate = self.last_parent;
        while candidate != NodeId::ROOT && self.doc.tree.is_closed(candidate) {
            candidate = self.doc.tree.parent(candidate).unwrap_or(NodeId::ROOT);
        }
        self.last_parent = candidate;
    }

    /// Close the current node: a start tag that closes itself, or an end tag.
    pub(super) fn close_current_node(&mut self) -> Result<(), HtmlError> {
        let id = self.current;
        if self.doc.tree.is_closed(id) {
            return Ok(());
        }
        let name = self.doc.tree.name(id).to_owned();
        let start_tag = self.doc.tree.get(id).is_some_and(|n| n.start_tag);
        let mut error = false;

        match self.last_open(&name) {
            None if is_closed_element(&name) => {
                // `</p>` with no open `p`.
                self.close_node(id, EndMarker::Itself, 0, 0)?;
                self.fold_stray_end_tag(id, &name)?;
            }
            None if can_overlap_element(&name) => {
                let literal = self.outer_source(id).to_ascii_lowercase();
                let text = self.doc.tree.create_text(&literal);
                let origin = self
                    .doc
                    .tree
                    .get(id)
                    .map(|n| (n.outer, n.line, n.column, n.stream_position));
                if let Some((outer, line, column, stream_position)) = origin
                    && let Some(node) = self.doc.tree.get_mut(text)
                {
                    node.outer = outer;
                    node.line = line;
                    node.column = column;
                    node.stream_position = stream_position;
                }
                self.doc.tree.append_parsed(self.last_parent, text)?;
            }
            None if is_empty_element(&name) => {
                self.doc.record_error(
                    ParseErrorCode::EndTagNotRequired,
                    id,
                    format!("End tag </{name}> is not required"),
                );
            }
            None => {
                self.doc.record_error(
                    ParseErrorCode::TagNotOpened,
                    id,
                    format!("Start tag <{name}> was not found"),
                );
                error = true;
            }
            Some(open) => {
                if self.doc.options.fix_nested_tags
                    && let Some(names) = resetters(&name)
                    && self.has_resetter_after(open, names)
                {
                    self.doc.record_error(
                        ParseErrorCode::EndTagInvalidHere,
                        id,
                        format!("End tag </{name}> invalid here"),
                    );
                    error = true;
                }
                if !error {
                    self.restore_last_node(&name, open);
                    let end = if open == id {
                        EndMarker::Itself
                    } else {
                        EndMarker::Node(id)
                    };
                    let at = self.outer_start(id);
                    self.close_node(open, end, at, 0)?;
                }
            }
        }

        if !error && (!is_closed_element(&name) || start_tag) {
            self.update_last_parent();
        }
        Ok(())
    }

    /// Close `id` with `end`. `at` is where an implicit close happens, or the
    /// start of the end tag; it bounds the content of children closed along
    /// the way.
    pub(super) fn close_node(
        &mut self,
        id: NodeId,
        end: EndMarker,
        at: usize,
        level: usize,
    ) -> Result<(), HtmlError> {
        let max_depth = self.doc.options.max_depth;
        if level > max_depth {
            return Err(HtmlError::DocumentTooComplex { max_depth });
        }

        if !self.doc.options.auto_close_on_end {
            let children = self.doc.tree.children(id).to_vec();
            for child in children {
                if self.doc.tree.kind(child) == Some(NodeKind::Element)
                    && !self.doc.tree.is_closed(child)
                {
                    self.close_node(child, EndMarker::Implicit, at, level + 1)?;
                }
            }
        }

        let closing = match end {
            EndMarker::Itself => None,
            EndMarker::Node(end_id) => self.doc.tree.get(end_id).and_then(|n| n.outer),
            EndMarker::Implicit => Some(Span::new(at, 0)),
        };
        let Some(node) = self.doc.tree.get_mut(id) else {
            return Ok(());
        };
        node.end = Some(end);
        let start = node.outer.map(|outer| outer.start);
        if let (Some(outer), Some(closing)) = (node.outer, closing) {
            node.inner = Some(Span::between(outer.end(), closing.start));
            node.outer = Some(Span::between(outer.start, closing.end()));
        }

        if let Some(start) = start
            && self.doc.opened_nodes.get(&start) == Some(&id)
        {
            let _ = self.doc.opened_nodes.remove(&start);
        }
        let name = self.doc.tree.name(id).to_owned();
        if self.doc.last_nodes.get(&name) == Some(&id) {
            self.restore_last_node(&name, id);
        }
        Ok(())
    }

    /// A stray end tag for a self-closing element such as `p` wraps the
    /// siblings that follow the nearest childless element of that name.
    ///
    /// When no such element exists the siblings are left alone and the end
    /// tag itself is kept in the tree.
    fn fold_stray_end_tag(&mut self, end_tag: NodeId, name: &str) -> Result<(), HtmlError> {
        let parent = self.last_parent;
        if is_empty_element(name) {
            self.doc.tree.append_parsed(parent, end_tag)?;
            return Ok(());
        }

        let mut collected = Vec::new();
        let mut target = None;
        let mut cursor = self.doc.tree.last_child(parent);
        while let Some(sibling) = cursor {
            if self.doc.tree.kind(sibling) == Some(NodeKind::Element)
                && self.doc.tree.name(sibling) == name
                && self.doc.tree.children(sibling).is_empty()
            {
                target = Some(sibling);
                break;
            }
            collected.push(sibling);
            cursor = self.doc.tree.prev_sibling(sibling);
        }

        let Some(target) = target else {
            self.doc.tree.append_parsed(parent, end_tag)?;
            return Ok(());
        };
        trace!(name, moved = collected.len(), "folding siblings under earlier element");
        for sibling in collected.into_iter().rev() {
            self.doc.tree.move_parsed(sibling, target)?;
        }
        let closing = self.doc.tree.get(end_tag).and_then(|n| n.outer);
        if let Some(closing) = closing
            && let Some(node) = self.doc.tree.get_mut(target)
            && let Some(outer) = node.outer
        {
            node.end = Some(EndMarker::Node(end_tag));
            node.inner = Some(Span::between(outer.end(), closing.start));
            node.outer = Some(Span::between(outer.start, closing.end()));
        }
        Ok(())
    }

    /// Close the open `li`/`tr`/`td`/`th` that a new sibling start tag
    /// implies, unless a list or table boundary was opened after it.
    pub(super) fn fix_nested_tags(&mut self) -> Result<(), HtmlError> {
        let id = self.current;
        if !self.doc.tree.get(id).is_some_and(|n| n.start_tag) {
            return Ok(());
        }
        let name = self.doc.tree.name(id).to_owned();
        let Some(names) = resetters(&name) else {
            return Ok(());
        };
        let Some(open) = self.last_open(&name) else {
            return Ok(());
        };
        if self.has_resetter_after(open, names) {
            return Ok(());
        }
        trace!(name, "implicitly closing unterminated sibling");
        let at = self.outer_start(id);
        self.close_node(open, EndMarker::Implicit, at, 0)?;
        self.update_last_parent();
        Ok(())
    }

    /// Report elements still open at the end of parsing, then close them if
    /// configured to.
    pub(super) fn check_unclosed(&mut self) -> Result<(), HtmlError> {
        let open: Vec<NodeId> = self.doc.opened_nodes.values().copied().collect();
        if self.doc.options.check_syntax {
            for &id in &open {
                let name = self.doc.tree.name(id).to_owned();
                self.doc.record_error(
                    ParseErrorCode::TagNotClosed,
                    id,
                    format!("End tag </{name}> was not found"),
                );
            }
        }
        if self.doc.options.auto_close_on_end {
            let end = self.doc.remainder_offset.unwrap_or(self.source.len());
            for &id in &open {
                if !self.doc.tree.is_closed(id) {
                    self.close_node(id, EndMarker::Implicit, end, 0)?;
                }
            }
        }
        Ok(())
    }

    fn outer_start(&self, id: NodeId) -> usize {
        self.doc
            .tree
            .get(id)
            .and_then(|n| n.outer)
            .map_or(self.pos, |span| span.start)
    }

    fn outer_source(&self, id: NodeId) -> &str {
        self.doc
            .tree
            .get(id)
            .and_then(|n| n.outer)
            .map_or("", |span| span.slice(&self.source))
    }
}
