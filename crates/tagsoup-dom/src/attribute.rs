//! Element attributes.

use std::collections::HashMap;

use crate::NodeId;
use crate::content::{Content, Span};

/// Quote character used around an attribute value when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum Quote {
    /// `"value"`
    #[default]
    Double,
    /// `'value'`
    Single,
}

impl Quote {
    /// The quote character itself.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

/// A single `name="value"` pair on an element.
///
/// The original-case name is kept for serialization. Lookup always goes
/// through the lowercase name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: Content,
    lower_name: String,
    value: Option<Content>,
    quote: Quote,
    owner: Option<NodeId>,
    /// 1-based line of the attribute name.
    pub line: usize,
    /// 1-based column of the attribute name.
    pub column: usize,
    /// Byte offset of the attribute name.
    pub stream_position: usize,
}

impl Attribute {
    /// Create a detached attribute with an explicit value.
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: Content::from(name),
            lower_name: name.to_ascii_lowercase(),
            value: Some(Content::Materialized(value.into())),
            quote: Quote::Double,
            owner: None,
            line: 0,
            column: 0,
            stream_position: 0,
        }
    }

    /// Create a detached attribute that has no value (`<input disabled>`).
    #[must_use]
    pub fn without_value(name: &str) -> Self {
        Self {
            value: None,
            ..Self::new(name, String::new())
        }
    }

    /// Create an attribute whose name and value are ranges of `source`.
    #[must_use]
    pub fn from_source(name: Span, value: Option<Span>, quote: Quote, source: &str) -> Self {
        Self {
            name: Content::SourceSlice(name),
            lower_name: name.slice(source).to_ascii_lowercase(),
            value: value.map(Content::SourceSlice),
            quote,
            owner: None,
            line: 0,
            column: 0,
            stream_position: name.start,
        }
    }

    /// Attach a source position.
    #[must_use]
    pub const fn at(mut self, line: usize, column: usize, stream_position: usize) -> Self {
        self.line = line;
        self.column = column;
        self.stream_position = stream_position;
        self
    }

    /// The name as written.
    #[must_use]
    pub fn name<'a>(&'a self, source: &'a str) -> &'a str {
        self.name.resolve(source)
    }

    /// The lowercase name used for lookup.
    #[must_use]
    pub fn lower_name(&self) -> &str {
        &self.lower_name
    }

    /// The value, or `None` for a bare attribute.
    #[must_use]
    pub fn value<'a>(&'a self, source: &'a str) -> Option<&'a str> {
        self.value.as_ref().map(|v| v.resolve(source))
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(Content::Materialized(value.into()));
    }

    /// Quote style used when serializing.
    #[must_use]
    pub const fn quote(&self) -> Quote {
        self.quote
    }

    /// Change the quote style.
    pub const fn set_quote(&mut self, quote: Quote) {
        self.quote = quote;
    }

    /// The element that carries this attribute.
    #[must_use]
    pub const fn owner(&self) -> Option<NodeId> {
        self.owner
    }
}

/// Ordered attribute list with a name index.
///
/// Duplicate names are kept in the list. The index points at the last
/// entry carrying a given lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl Attributes {
    /// Number of attributes, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Attribute at a list position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    /// Find by name, ignoring ASCII case.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&Attribute> {
        self.position(name).and_then(|i| self.items.get(i))
    }

    /// Mutable lookup by name, ignoring ASCII case.
    pub fn named_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.position(name).and_then(|i| self.items.get_mut(i))
    }

    /// Whether an attribute with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append an attribute owned by `owner` and return its position.
    pub fn push(&mut self, mut attribute: Attribute, owner: NodeId) -> usize {
        attribute.owner = Some(owner);
        let position = self.items.len();
        let _ = self.index.insert(attribute.lower_name.clone(), position);
        self.items.push(attribute);
        position
    }

    /// Remove the attribute at a list position.
    pub fn remove_at(&mut self, index: usize) -> Option<Attribute> {
        if index >= self.items.len() {
            return None;
        }
        let mut removed = self.items.remove(index);
        removed.owner = None;
        self.reindex();
        Some(removed)
    }

    /// Remove every attribute with this name. Returns how many were removed.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|a| !a.lower_name.eq_ignore_ascii_case(name));
        let removed = before - self.items.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    fn position(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.index.get(name) {
            return Some(*i);
        }
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.index.get(&name.to_ascii_lowercase()).copied();
        }
        None
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, attribute) in self.items.iter().enumerate() {
            let _ = self.index.insert(attribute.lower_name.clone(), i);
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut attrs = Attributes::default();
        let _ = attrs.push(Attribute::new("Class", "big"), NodeId(1));
        assert_eq!(attrs.named("class").and_then(|a| a.value("")), Some("big"));
        assert_eq!(attrs.named("CLASS").map(Attribute::lower_name), Some("class"));
        assert_eq!(attrs.named("class").and_then(Attribute::owner), Some(NodeId(1)));
    }

    #[test]
    fn test_duplicate_names_index_last_entry() {
        let mut attrs = Attributes::default();
        let _ = attrs.push(Attribute::new("a", "1"), NodeId(1));
        let _ = attrs.push(Attribute::new("A", "2"), NodeId(1));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.named("a").and_then(|a| a.value("")), Some("2"));
    }

    #[test]
    fn test_remove_at_reindexes() {
        let mut attrs = Attributes::default();
        let _ = attrs.push(Attribute::new("a", "1"), NodeId(1));
        let _ = attrs.push(Attribute::new("b", "2"), NodeId(1));
        let _ = attrs.push(Attribute::new("a", "3"), NodeId(1));

        let removed = attrs.remove_at(2);
        assert_eq!(removed.as_ref().and_then(Attribute::owner), None);
        assert_eq!(attrs.named("a").and_then(|a| a.value("")), Some("1"));
        assert_eq!(attrs.named("b").and_then(|a| a.value("")), Some("2"));
    }

    #[test]
    fn test_remove_named_removes_all_duplicates() {
        let mut attrs = Attributes::default();
        let _ = attrs.push(Attribute::new("x", "1"), NodeId(1));
        let _ = attrs.push(Attribute::new("y", "2"), NodeId(1));
        let _ = attrs.push(Attribute::new("X", "3"), NodeId(1));

        assert_eq!(attrs.remove_named("x"), 2);
        assert_eq!(attrs.len(), 1);
        assert!(!attrs.contains("x"));
        assert!(attrs.contains("y"));
    }

    #[test]
    fn test_source_backed_attribute() {
        let source = r#"<a HREF="/x">"#;
        let attr = Attribute::from_source(Span::new(3, 4), Some(Span::new(9, 2)), Quote::Double, source);
        assert_eq!(attr.name(source), "HREF");
        assert_eq!(attr.lower_name(), "href");
        assert_eq!(attr.value(source), Some("/x"));
        assert_eq!(attr.stream_position, 3);
    }
}
