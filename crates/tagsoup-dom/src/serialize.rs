//! Markup output.
//!
//! A clean, closed node returns its exact source range. Anything else is
//! rebuilt from the tree and cached on the node until the next edit.

use std::borrow::Cow;

use crate::NodeId;
use crate::attribute::{Attribute, Quote};
use crate::classify::is_empty_element;
use crate::error::DomError;
use crate::node::{EndMarker, NodeKind};
use crate::tree::DomTree;

impl DomTree {
    /// Markup of a node including its own tags.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidNode`] for an unknown `id`, or
    /// [`DomError::TooComplex`] when the subtree nests too deeply.
    pub fn outer_html(&self, id: NodeId) -> Result<Cow<'_, str>, DomError> {
        self.outer_at(id, 0)
    }

    /// Markup of a node's content, without its own tags.
    ///
    /// # Errors
    ///
    /// Fails like [`outer_html`](Self::outer_html).
    pub fn inner_html(&self, id: NodeId) -> Result<Cow<'_, str>, DomError> {
        self.inner_at(id, 0)
    }

    /// Rebuild markup for a node from the tree alone, ignoring every source
    /// range except those of text and comment nodes.
    ///
    /// # Errors
    ///
    /// Fails like [`outer_html`](Self::outer_html).
    pub fn regenerate_html(&self, id: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        self.write_node(id, &mut out, 0, true)?;
        Ok(out)
    }

    fn outer_at(&self, id: NodeId, level: usize) -> Result<Cow<'_, str>, DomError> {
        self.check_level(level)?;
        let node = self.node(id)?;
        if matches!(node.kind, NodeKind::Text | NodeKind::Comment) {
            return Ok(Cow::Borrowed(self.node_text(node)));
        }
        if !node.dirty
            && node.is_closed()
            && let Some(span) = node.outer
        {
            return Ok(Cow::Borrowed(span.slice(self.source())));
        }
        if let Some(cached) = node.outer_cache.get() {
            return Ok(Cow::Borrowed(cached));
        }
        let mut out = String::new();
        self.write_node(id, &mut out, level, false)?;
        Ok(Cow::Borrowed(node.outer_cache.get_or_init(|| out)))
    }

    fn inner_at(&self, id: NodeId, level: usize) -> Result<Cow<'_, str>, DomError> {
        self.check_level(level)?;
        let node = self.node(id)?;
        if matches!(node.kind, NodeKind::Text | NodeKind::Comment) {
            return Ok(Cow::Borrowed(self.node_text(node)));
        }
        if !node.dirty
            && node.is_closed()
            && let Some(span) = node.inner
        {
            return Ok(Cow::Borrowed(span.slice(self.source())));
        }
        if let Some(cached) = node.inner_cache.get() {
            return Ok(Cow::Borrowed(cached));
        }
        let mut out = String::new();
        for &child in &node.children {
            self.write_node(child, &mut out, level + 1, false)?;
        }
        Ok(Cow::Borrowed(node.inner_cache.get_or_init(|| out)))
    }

    fn check_level(&self, level: usize) -> Result<(), DomError> {
        if level > self.max_depth() {
            return Err(DomError::TooComplex {
                max_depth: self.max_depth(),
            });
        }
        Ok(())
    }

    fn write_node(
        &self,
        id: NodeId,
        out: &mut String,
        level: usize,
        regenerate: bool,
    ) -> Result<(), DomError> {
        self.check_level(level)?;
        let node = self.node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::Comment => out.push_str(self.node_text(node)),
            NodeKind::Document => {
                for &child in &node.children {
                    self.write_child(child, out, level + 1, regenerate)?;
                }
            }
            NodeKind::Element => self.write_element(id, out, level, regenerate)?,
        }
        Ok(())
    }

    fn write_child(
        &self,
        id: NodeId,
        out: &mut String,
        level: usize,
        regenerate: bool,
    ) -> Result<(), DomError> {
        if regenerate {
            self.write_node(id, out, level, true)
        } else {
            out.push_str(&self.outer_at(id, level)?);
            Ok(())
        }
    }

    fn write_element(
        &self,
        id: NodeId,
        out: &mut String,
        level: usize,
        regenerate: bool,
    ) -> Result<(), DomError> {
        let node = self.node(id)?;
        let source = self.source();
        out.push('<');
        out.push_str(node.raw_name(source));
        for attribute in node.attributes() {
            write_attribute(attribute, source, out);
        }

        let void = node.children.is_empty()
            && (is_empty_element(node.name(source))
                || node.self_closing
                || node.end == Some(EndMarker::Itself));
        if void {
            out.push_str(if node.self_closing { "/>" } else { ">" });
            return Ok(());
        }

        out.push('>');
        for &child in &node.children {
            self.write_child(child, out, level + 1, regenerate)?;
        }

        match node.end {
            None => {}
            Some(EndMarker::Node(end_id)) => {
                let end = self.node(end_id)?;
                out.push_str("</");
                out.push_str(end.raw_name(source));
                for attribute in end.attributes() {
                    write_attribute(attribute, source, out);
                }
                out.push('>');
            }
            // A nameless start tag such as the `<` in `a < b` never gets `</>`.
            Some(EndMarker::Itself | EndMarker::Implicit) if node.raw_name(source).is_empty() => {}
            Some(EndMarker::Itself | EndMarker::Implicit) => {
                out.push_str("</");
                out.push_str(node.raw_name(source));
                out.push('>');
            }
        }
        Ok(())
    }
}

fn write_attribute(attribute: &Attribute, source: &str, out: &mut String) {
    out.push(' ');
    out.push_str(attribute.name(source));
    let Some(value) = attribute.value(source) else {
        return;
    };
    let quote = attribute.quote();
    let escape = match quote {
        Quote::Double => "&quot;",
        Quote::Single => "&#39;",
    };
    out.push('=');
    out.push(quote.as_char());
    if value.contains(quote.as_char()) {
        out.push_str(&value.replace(quote.as_char(), escape));
    } else {
        out.push_str(value);
    }
    out.push(quote.as_char());
}

#[cfg(test)]
mod tests {
    use crate::{Attribute, DomTree, NodeId, Quote};

    #[test]
    fn test_created_element_serializes_with_end_tag() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let text = tree.create_text("hi");
        tree.append_child(NodeId::ROOT, div).unwrap();
        tree.append_child(div, text).unwrap();
        tree.set_attribute_value(div, "id", "main").unwrap();

        assert_eq!(tree.outer_html(div).unwrap(), r#"<div id="main">hi</div>"#);
        assert_eq!(tree.inner_html(div).unwrap(), "hi");
        assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), r#"<div id="main">hi</div>"#);
    }

    #[test]
    fn test_nameless_element_has_no_end_tag() {
        let mut tree = DomTree::new();
        let nameless = tree.create_element("");
        let text = tree.create_text(" b");
        tree.append_child(NodeId::ROOT, nameless).unwrap();
        tree.append_child(nameless, text).unwrap();

        assert_eq!(tree.outer_html(nameless).unwrap(), "<> b");
        assert!(!tree.regenerate_html(NodeId::ROOT).unwrap().contains("</>"));
    }

    #[test]
    fn test_void_element_has_no_end_tag() {
        let mut tree = DomTree::new();
        let img = tree.create_element("img");
        let _ = tree.append_attribute(img, Attribute::without_value("ismap")).unwrap();
        assert_eq!(tree.outer_html(img).unwrap(), "<img ismap>");
    }

    #[test]
    fn test_single_quote_style_is_kept() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let mut attribute = Attribute::new("title", "it's");
        attribute.set_quote(Quote::Single);
        let _ = tree.append_attribute(a, attribute).unwrap();
        assert_eq!(tree.outer_html(a).unwrap(), "<a title='it&#39;s'></a>");
    }

    #[test]
    fn test_cache_is_dropped_after_edit() {
        let mut tree = DomTree::new();
        let p = tree.create_element("span");
        tree.append_child(NodeId::ROOT, p).unwrap();
        assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "<span></span>");

        let text = tree.create_text("x");
        tree.append_child(p, text).unwrap();
        assert_eq!(tree.outer_html(NodeId::ROOT).unwrap(), "<span>x</span>");
    }
}
