//! The parsed document and its edit API.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use encoding_rs::Encoding;
use tagsoup_dom::{Attribute, DomTree, NodeId};
use tracing::debug;

use crate::encoding::resolve_encoding;
use crate::error::{HtmlError, ParseError, ParseErrorCode};
use crate::options::ParseOptions;
use crate::parser::{Outcome, Parser};

/// A parsed HTML document.
///
/// Owns the source text, the node tree and the indices the parser keeps:
/// the most recent open element per name, open elements by offset, and
/// elements by id. Edits made through the document keep the id index in
/// sync with the tree.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub(crate) tree: DomTree,
    pub(crate) options: ParseOptions,
    pub(crate) last_nodes: HashMap<String, NodeId>,
    pub(crate) opened_nodes: BTreeMap<usize, NodeId>,
    pub(crate) ids: HashMap<String, NodeId>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) declared_encoding: Option<&'static Encoding>,
    pub(crate) stream_encoding: Option<&'static Encoding>,
    pub(crate) checksum: Option<u32>,
    pub(crate) remainder_offset: Option<usize>,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDocument {
    /// Create an empty document with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create an empty document with the given options.
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        let mut tree = DomTree::new();
        tree.set_max_depth(options.max_depth);
        Self {
            tree,
            options,
            last_nodes: HashMap::new(),
            opened_nodes: BTreeMap::new(),
            ids: HashMap::new(),
            errors: Vec::new(),
            declared_encoding: None,
            stream_encoding: None,
            checksum: None,
            remainder_offset: None,
        }
    }

    /// Options used by the next load.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Change the options used by the next load.
    pub const fn options_mut(&mut self) -> &mut ParseOptions {
        &mut self.options
    }

    // ===================================================================
    // Loading
    // ===================================================================

    /// Parse `html`, replacing any previous content.
    ///
    /// Malformed markup never fails; problems are available from
    /// [`errors`](Self::errors).
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::DocumentTooComplex`] when nesting goes deeper
    /// than [`ParseOptions::max_depth`]. The document must be discarded
    /// after that.
    pub fn load_html(&mut self, html: &str) -> Result<(), HtmlError> {
        self.load_with_encoding(html, None)
    }

    /// Parse `html` that was decoded from bytes in `stream_encoding`. A
    /// `<meta>` charset that disagrees is recorded as
    /// [`ParseErrorCode::CharsetMismatch`].
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::DocumentTooComplex`] when nesting goes past
    /// [`ParseOptions::max_depth`].
    pub fn load_with_encoding(
        &mut self,
        html: &str,
        stream_encoding: Option<&'static Encoding>,
    ) -> Result<(), HtmlError> {
        self.reset(html);
        self.stream_encoding = stream_encoding;
        let _ = Parser::new(self, false).run()?;
        Ok(())
    }

    /// Scan `html` only as far as the first `<meta>` charset declaration.
    ///
    /// Returns the declared encoding, or `None` when nothing usable is
    /// declared. The tree is left incomplete.
    ///
    /// # Errors
    ///
    /// Fails like [`load_html`](Self::load_html).
    pub fn detect_encoding(&mut self, html: &str) -> Result<Option<&'static Encoding>, HtmlError> {
        self.reset(html);
        match Parser::new(self, true).run()? {
            Outcome::EncodingFound(encoding) => Ok(encoding),
            Outcome::Completed => Ok(None),
        }
    }

    /// Decode and parse raw bytes.
    ///
    /// The encoding comes from a byte order mark, else from a `<meta>`
    /// declaration, else from [`ParseOptions::default_encoding`].
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::UnknownEncoding`] if the default encoding is not
    /// a known label, otherwise fails like [`load_html`](Self::load_html).
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), HtmlError> {
        let (encoding, skip) = if let Some((encoding, bom)) = Encoding::for_bom(bytes) {
            (encoding, bom)
        } else {
            // Markup is ASCII-compatible in every encoding a declaration can
            // name, so a single-byte decoding is enough to find it.
            let (sniffed, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            let mut scout = Self::with_options(self.options.clone());
            match scout.detect_encoding(&sniffed)? {
                Some(declared) => (declared, 0),
                None => (self.default_encoding()?, 0),
            }
        };
        debug!(encoding = encoding.name(), "decoding input bytes");
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes.get(skip..).unwrap_or_default());
        if had_errors {
            debug!(encoding = encoding.name(), "input contained malformed sequences");
        }
        self.load_with_encoding(&text, Some(encoding))
    }

    fn default_encoding(&self) -> Result<&'static Encoding, HtmlError> {
        resolve_encoding(&self.options.default_encoding)
            .ok_or_else(|| HtmlError::UnknownEncoding(self.options.default_encoding.clone()))
    }

    /// Drop everything from a previous load and start over on `html`.
    pub(crate) fn reset(&mut self, html: &str) {
        self.tree = DomTree::with_source(html);
        self.tree.set_max_depth(self.options.max_depth);
        self.last_nodes.clear();
        self.opened_nodes.clear();
        self.ids.clear();
        self.errors.clear();
        self.declared_encoding = None;
        self.stream_encoding = None;
        self.checksum = None;
        self.remainder_offset = None;
    }

    // ===================================================================
    // Results
    // ===================================================================

    /// The node tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutable access to the node tree.
    ///
    /// Structural edits made here bypass the id index; prefer the edit
    /// methods on the document.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The Document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The text that was parsed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.tree.source()
    }

    /// Syntax problems in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// CRC-32 of the consumed input, when
    /// [`compute_checksum`](ParseOptions::compute_checksum) is on.
    #[must_use]
    pub const fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    /// Encoding named by a `<meta>` declaration.
    #[must_use]
    pub const fn declared_encoding(&self) -> Option<&'static Encoding> {
        self.declared_encoding
    }

    /// Encoding the input bytes were decoded with.
    #[must_use]
    pub const fn stream_encoding(&self) -> Option<&'static Encoding> {
        self.stream_encoding
    }

    /// Byte offset where parsing stopped after the stopper element.
    #[must_use]
    pub const fn remainder_offset(&self) -> Option<usize> {
        self.remainder_offset
    }

    /// Unparsed text after the stopper element.
    #[must_use]
    pub fn remainder(&self) -> Option<&str> {
        self.remainder_offset.and_then(|at| self.tree.source().get(at..))
    }

    /// The element whose id matches, ignoring ASCII case.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(&id.to_ascii_lowercase()).copied()
    }

    /// Markup of a node including its own tags.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] for an unknown `id` and
    /// [`HtmlError::DocumentTooComplex`] when the subtree nests too deeply.
    pub fn outer_html(&self, id: NodeId) -> Result<Cow<'_, str>, HtmlError> {
        Ok(self.tree.outer_html(id)?)
    }

    /// Markup of a node's content.
    ///
    /// # Errors
    ///
    /// Fails like [`outer_html`](Self::outer_html).
    pub fn inner_html(&self, id: NodeId) -> Result<Cow<'_, str>, HtmlError> {
        Ok(self.tree.inner_html(id)?)
    }

    /// Text content of a node.
    ///
    /// # Errors
    ///
    /// Fails like [`outer_html`](Self::outer_html).
    pub fn inner_text(&self, id: NodeId) -> Result<String, HtmlError> {
        Ok(self.tree.inner_text(id)?)
    }

    // ===================================================================
    // Edits
    // ===================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.tree.create_element(name)
    }

    /// Create a detached text node.
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    /// Create a detached comment `<!--body-->`.
    pub fn create_comment(&mut self, body: &str) -> NodeId {
        self.tree.create_comment(body)
    }

    /// Create a detached attribute.
    #[must_use]
    pub fn create_attribute(name: &str, value: &str) -> Attribute {
        Attribute::new(name, value)
    }

    /// Append `child` to `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] when the tree rejects the insertion.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HtmlError> {
        self.tree.append_child(parent, child)?;
        self.index_subtree(child)
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] when the tree rejects the insertion.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HtmlError> {
        self.tree.prepend_child(parent, child)?;
        self.index_subtree(child)
    }

    /// Insert `child` before `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] when the tree rejects the insertion.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), HtmlError> {
        self.tree.insert_before(parent, child, reference)?;
        self.index_subtree(child)
    }

    /// Insert `child` after `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] when the tree rejects the insertion.
    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), HtmlError> {
        self.tree.insert_after(parent, child, reference)?;
        self.index_subtree(child)
    }

    /// Replace `old` with `child`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] when the tree rejects the replacement.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        old: NodeId,
    ) -> Result<(), HtmlError> {
        self.tree.replace_child(parent, child, old)?;
        if child != old {
            self.forget_subtree(old)?;
        }
        self.index_subtree(child)
    }

    /// Detach `child` from `parent` and drop every index entry that refers
    /// to it or its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HtmlError> {
        self.tree.remove_child(parent, child)?;
        self.forget_subtree(child)
    }

    /// Set an attribute, adding it if missing.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] if `id` is not in the tree.
    pub fn set_attribute_value(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), HtmlError> {
        let is_id = name.eq_ignore_ascii_case("id");
        if is_id {
            self.unindex_id(id);
        }
        self.tree.set_attribute_value(id, name, value)?;
        if is_id && self.is_attached(id) {
            self.index_id(id);
        }
        Ok(())
    }

    /// Append an attribute, keeping any earlier one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] if `id` is not in the tree.
    pub fn append_attribute(&mut self, id: NodeId, attribute: Attribute) -> Result<usize, HtmlError> {
        let is_id = attribute.lower_name() == "id";
        if is_id {
            self.unindex_id(id);
        }
        let position = self.tree.append_attribute(id, attribute)?;
        if is_id && self.is_attached(id) {
            self.index_id(id);
        }
        Ok(position)
    }

    /// Remove every attribute with this name.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] if `id` is not in the tree.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<usize, HtmlError> {
        if name.eq_ignore_ascii_case("id") {
            self.unindex_id(id);
        }
        Ok(self.tree.remove_attribute(id, name)?)
    }

    /// Set the id attribute of an element.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::Dom`] if `id` is not in the tree.
    pub fn set_id(&mut self, id: NodeId, value: &str) -> Result<(), HtmlError> {
        self.set_attribute_value(id, "id", value)
    }

    // ===================================================================
    // Index maintenance
    // ===================================================================

    pub(crate) fn index_id(&mut self, id: NodeId) {
        if !self.options.use_id_attribute {
            return;
        }
        if let Some(value) = self.tree.attribute_value(id, "id") {
            let key = value.to_ascii_lowercase();
            let _ = self.ids.insert(key, id);
        }
    }

    fn unindex_id(&mut self, id: NodeId) {
        if let Some(value) = self.tree.attribute_value(id, "id") {
            let key = value.to_ascii_lowercase();
            if self.ids.get(&key) == Some(&id) {
                let _ = self.ids.remove(&key);
            }
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        self.tree.is_descendant_of(id, NodeId::ROOT)
    }

    /// Index the ids of a subtree that was just attached to the document.
    fn index_subtree(&mut self, id: NodeId) -> Result<(), HtmlError> {
        if !self.options.use_id_attribute || !self.is_attached(id) {
            return Ok(());
        }
        self.index_id(id);
        for descendant in self.tree.descendants(id)? {
            self.index_id(descendant);
        }
        Ok(())
    }

    fn forget_subtree(&mut self, id: NodeId) -> Result<(), HtmlError> {
        let removed = self.tree.subtree(id)?;
        self.ids.retain(|_, node| !removed.contains(node));
        self.opened_nodes.retain(|_, node| !removed.contains(node));
        self.last_nodes.retain(|_, node| !removed.contains(node));
        for node_id in self.tree.node_ids() {
            if let Some(node) = self.tree.get_mut(node_id)
                && node.prev_with_same_name.is_some_and(|p| removed.contains(&p))
            {
                node.prev_with_same_name = None;
            }
        }
        Ok(())
    }

    /// Append a syntax problem found at node `id`.
    pub(crate) fn record_error(&mut self, code: ParseErrorCode, id: NodeId, reason: String) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        let source_text = self.options.extract_error_source_text.then(|| {
            let markup = node.outer.map_or("", |span| span.slice(self.tree.source()));
            truncate(markup, self.options.extract_error_source_text_max_length).to_owned()
        });
        let error = ParseError {
            code,
            line: node.line,
            column: node.column,
            stream_position: node.stream_position,
            source_text,
            reason,
        };
        debug!(%error, "recorded parse error");
        self.errors.push(error);
    }
}

/// Cut `text` to at most `max` bytes on a character boundary.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.get(..end).unwrap_or_default()
}
