//! Tree nodes.

use std::sync::OnceLock;

use crate::NodeId;
use crate::attribute::Attributes;
use crate::content::{Content, Span};

/// The four kinds of node the parser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, strum_macros::Display)]
pub enum NodeKind {
    /// The root of every tree.
    Document,
    /// A tag and its content.
    Element,
    /// `<!...>` markup, including doctype declarations.
    Comment,
    /// Character data.
    Text,
}

impl NodeKind {
    /// Name reported by nodes that do not carry one.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Document => "#document",
            Self::Element => "",
            Self::Comment => "#comment",
            Self::Text => "#text",
        }
    }
}

/// How an element was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndMarker {
    /// The start tag closed the element (`<br>`, `<img/>`, a text node).
    Itself,
    /// An explicit end tag, kept as its own unattached node.
    Node(NodeId),
    /// Closed by an ancestor's end tag, by a repair, or at creation time.
    Implicit,
}

/// A node in the arena.
///
/// Structural links are private to the tree so that they always agree with
/// each other. Span and position fields are public; the parser fills them in
/// as it goes.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    name: Option<Content>,
    lower_name: OnceLock<String>,
    pub(crate) attributes: Attributes,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) text: Option<Content>,
    pub(crate) dirty: bool,
    pub(crate) outer_cache: OnceLock<String>,
    pub(crate) inner_cache: OnceLock<String>,

    /// The most recent earlier element with the same lowercase name that was
    /// open when this one started.
    pub prev_with_same_name: Option<NodeId>,
    /// Source range of the whole node. For an unclosed element, this is the
    /// start tag only.
    pub outer: Option<Span>,
    /// Source range of the content between the tags.
    pub inner: Option<Span>,
    /// `None` while the element is still open.
    pub end: Option<EndMarker>,
    /// `false` for end-tag nodes (`</div>`).
    pub start_tag: bool,
    /// Written as `<tag/>`.
    pub self_closing: bool,
    /// 1-based line where the node starts.
    pub line: usize,
    /// 1-based column where the node starts.
    pub column: usize,
    /// Byte offset where the node starts.
    pub stream_position: usize,
}

impl Node {
    /// Create an unattached node of the given kind.
    ///
    /// Elements start open; every other kind is closed from the outset.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            lower_name: OnceLock::new(),
            attributes: Attributes::default(),
            children: Vec::new(),
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            text: None,
            dirty: false,
            outer_cache: OnceLock::new(),
            inner_cache: OnceLock::new(),
            prev_with_same_name: None,
            outer: None,
            inner: None,
            end: (kind != NodeKind::Element).then_some(EndMarker::Itself),
            start_tag: kind == NodeKind::Element,
            self_closing: false,
            line: 0,
            column: 0,
            stream_position: 0,
        }
    }

    /// What kind of node this is.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Whether the node has an end marker.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Whether this node or one of its descendants was edited.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Attributes in document order.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Set or replace the node name.
    pub fn set_name(&mut self, name: Content) {
        self.name = Some(name);
        self.lower_name = OnceLock::new();
    }

    /// The name as written in the source.
    #[must_use]
    pub fn raw_name<'a>(&'a self, source: &'a str) -> &'a str {
        self.name
            .as_ref()
            .map_or_else(|| self.kind.default_name(), |n| n.resolve(source))
    }

    /// The lowercase name, computed on first use.
    #[must_use]
    pub fn name<'a>(&'a self, source: &'a str) -> &'a str {
        match &self.name {
            None => self.kind.default_name(),
            Some(name) => self
                .lower_name
                .get_or_init(|| name.resolve(source).to_ascii_lowercase()),
        }
    }

    pub(crate) fn clear_caches(&mut self) {
        self.outer_cache = OnceLock::new();
        self.inner_cache = OnceLock::new();
    }
}
