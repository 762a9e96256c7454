//! Node and attribute construction.
//!
//! These helpers record boundaries as the state machine discovers them and
//! hand completed nodes to the tree.

use tagsoup_dom::{
    Attribute, Content, Node, NodeId, NodeKind, Quote, Span, is_cdata_element, is_closed_element,
    is_empty_element,
};
use tracing::{debug, warn};

use super::{Flow, ParseState, Parser, PendingAttribute};
use crate::encoding::{declared_charset, resolve_encoding};
use crate::error::{HtmlError, ParseErrorCode};

impl Parser<'_> {
    /// Begin a node at byte offset `at`. It becomes the current node.
    ///
    /// An empty text node that never made it into the tree is recycled
    /// instead of growing the arena.
    pub(super) fn start_node(&mut self, kind: NodeKind, at: usize, line: usize, column: usize) {
        let mut node = Node::new(kind);
        node.outer = Some(Span::new(at, 0));
        node.line = line;
        node.column = column;
        node.stream_position = at;
        // Elements become start tags once their name begins.
        node.start_tag = false;

        self.pending_name = None;
        self.attribute = None;

        let recyclable = self.current != NodeId::ROOT
            && self.doc.tree.kind(self.current) == Some(NodeKind::Text)
            && self.doc.tree.parent(self.current).is_none();
        if recyclable && let Some(slot) = self.doc.tree.get_mut(self.current) {
            *slot = node;
        } else {
            self.current = self.doc.tree.alloc(node);
        }
    }

    /// Switch to the text state with a fresh text node after a tag.
    pub(super) fn begin_text(&mut self) {
        self.switch_to(ParseState::Text);
        self.start_node(NodeKind::Text, self.index, self.line, self.column);
    }

    pub(super) fn start_node_name(&mut self, start_tag: bool, at: usize) {
        if let Some(node) = self.doc.tree.get_mut(self.current) {
            node.start_tag = start_tag;
        }
        self.pending_name = Some(at);
    }

    pub(super) fn end_node_name(&mut self, at: usize) -> Result<(), HtmlError> {
        let Some(start) = self.pending_name.take() else {
            return Ok(());
        };
        if let Some(node) = self.doc.tree.get_mut(self.current) {
            node.set_name(Content::SourceSlice(Span::between(start, at)));
        }
        if self.doc.options.fix_nested_tags {
            self.fix_nested_tags()?;
        }
        Ok(())
    }

    pub(super) fn start_attribute(&mut self, at: usize) -> Result<(), HtmlError> {
        self.commit_attribute()?;
        self.attribute = Some(PendingAttribute {
            name_start: at,
            name_end: None,
            value_start: None,
            value_end: None,
            quote: Quote::Double,
            line: self.char_line,
            column: self.char_column,
        });
        Ok(())
    }

    pub(super) fn end_attribute_name(&mut self, at: usize) {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.name_end = Some(at);
        }
    }

    pub(super) fn start_attribute_value(&mut self, at: usize, quote: Option<char>) {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.value_start = Some(at);
            if quote == Some('\'') {
                attribute.quote = Quote::Single;
            }
        }
    }

    pub(super) fn end_attribute_value(&mut self, at: usize) -> Result<(), HtmlError> {
        if let Some(attribute) = self.attribute.as_mut() {
            attribute.value_end = Some(at);
        }
        self.commit_attribute()
    }

    /// Hand the pending attribute to the current node.
    fn commit_attribute(&mut self) -> Result<(), HtmlError> {
        let Some(pending) = self.attribute.take() else {
            return Ok(());
        };
        let name_end = pending.name_end.unwrap_or(pending.name_start);
        let name = Span::between(pending.name_start, name_end);
        let value = pending
            .value_start
            .map(|start| Span::between(start, pending.value_end.unwrap_or(start)));
        let attribute = Attribute::from_source(name, value, pending.quote, &self.source).at(
            pending.line,
            pending.column,
            pending.name_start,
        );
        self.doc.tree.push_parsed_attribute(self.current, attribute)?;
        Ok(())
    }

    /// Close any name or attribute still open at `at`.
    pub(super) fn finalize_pending(&mut self, at: usize) -> Result<(), HtmlError> {
        if self.pending_name.is_some() {
            self.end_node_name(at)?;
        }
        if let Some(attribute) = self.attribute.as_mut() {
            if attribute.name_end.is_none() {
                attribute.name_end = Some(at);
            }
            if attribute.value_start.is_some() && attribute.value_end.is_none() {
                attribute.value_end = Some(at);
            }
        }
        self.commit_attribute()
    }

    pub(super) fn mark_self_closing(&mut self) {
        let slash = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.source.as_bytes().get(i))
            == Some(&b'/');
        if slash && let Some(node) = self.doc.tree.get_mut(self.current) {
            node.self_closing = true;
        }
    }

    /// Text content of a raw-text element, from the end of its start tag up
    /// to `until`. Empty bodies add nothing.
    pub(super) fn push_raw_text(&mut self, until: usize) -> Result<(), HtmlError> {
        let element = self.current;
        let Some(start) = self.doc.tree.get(element).and_then(|n| n.outer).map(Span::end) else {
            return Ok(());
        };
        if until <= start {
            return Ok(());
        }
        let mut text = Node::new(NodeKind::Text);
        text.outer = Some(Span::between(start, until));
        text.inner = text.outer;
        (text.line, text.column) = self.raw_text_position;
        text.stream_position = start;
        let id = self.doc.tree.alloc(text);
        self.doc.tree.append_parsed(element, id)?;
        Ok(())
    }

    /// The current node is complete at byte offset `at`.
    ///
    /// Text and comments are attached when non-empty. A start tag is attached
    /// to the last open parent and, if it is void or closes at its start tag,
    /// closed right away (`close` forces that too). End tags go through the
    /// closing rules.
    pub(super) fn end_node(&mut self, at: usize, close: bool) -> Result<Flow, HtmlError> {
        self.commit_attribute()?;
        let id = self.current;
        let attached = self.doc.tree.parent(id).is_some();
        let Some(node) = self.doc.tree.get_mut(id) else {
            return Ok(Flow::Continue);
        };
        let start = node.outer.map_or(at, |span| span.start);
        if !attached {
            node.outer = Some(Span::between(start, at));
        }
        let kind = node.kind();
        let start_tag = node.start_tag;

        match kind {
            NodeKind::Text | NodeKind::Comment => {
                if at > start && !attached {
                    node.inner = node.outer;
                    self.doc.tree.append_parsed(self.last_parent, id)?;
                }
                return Ok(Flow::Continue);
            }
            NodeKind::Document => return Ok(Flow::Continue),
            NodeKind::Element => {}
        }

        let mut close = close;
        if start_tag && id != self.last_parent {
            let max_depth = self.doc.options.max_depth;
            if self.doc.tree.depth(self.last_parent) + 1 > max_depth {
                warn!(max_depth, offset = start, "document nesting exceeds the configured limit");
                return Err(HtmlError::DocumentTooComplex { max_depth });
            }
            self.doc.tree.append_parsed(self.last_parent, id)?;
            let _ = self.doc.opened_nodes.insert(start, id);
            self.doc.index_id(id);

            let flow = self.read_declared_encoding(id);
            if flow != Flow::Continue {
                return Ok(flow);
            }

            let name = self.doc.tree.name(id).to_owned();
            let previous = self.doc.last_nodes.insert(name.clone(), id);
            if let Some(node) = self.doc.tree.get_mut(id) {
                node.prev_with_same_name = previous;
            }
            self.last_parent = id;

            if is_cdata_element(&name) {
                self.raw_text_position = (self.line, self.column);
                self.switch_to(ParseState::RawTextBody);
                return Ok(Flow::Continue);
            }
            if is_closed_element(&name) || is_empty_element(&name) {
                close = true;
            }
        }

        if close || !start_tag {
            let stopper_hit = self.doc.remainder_offset.is_none()
                && self
                    .doc
                    .options
                    .stopper_node_name
                    .as_deref()
                    .is_some_and(|stopper| self.doc.tree.name(id).eq_ignore_ascii_case(stopper));
            self.close_current_node()?;
            if stopper_hit {
                self.doc.remainder_offset = Some(at);
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    /// Pick up a charset declared by a `<meta>` element.
    fn read_declared_encoding(&mut self, id: NodeId) -> Flow {
        if !self.doc.options.read_encoding && !self.detect_only {
            return Flow::Continue;
        }
        let Some(charset) = declared_charset(&self.doc.tree, id) else {
            return Flow::Continue;
        };
        let declared = resolve_encoding(&charset);
        if declared.is_none() {
            debug!(charset, "ignoring unrecognized declared charset");
        }
        self.doc.declared_encoding = declared;
        if self.detect_only {
            return Flow::EncodingFound(declared);
        }
        if let (Some(stream), Some(declared)) = (self.doc.stream_encoding, declared)
            && stream != declared
        {
            self.doc.record_error(
                ParseErrorCode::CharsetMismatch,
                id,
                format!(
                    "Encoding mismatch between StreamEncoding: {} and DeclaredEncoding: {}",
                    stream.name(),
                    declared.name()
                ),
            );
        }
        Flow::Continue
    }
}
