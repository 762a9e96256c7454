//! Source-backed text.
//!
//! Parsed nodes point into the document source with a [`Span`]; edited nodes
//! carry their own [`String`]. [`Content`] covers both cases.

/// A byte range into the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Span {
    /// Byte offset of the first byte.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a span from a start offset and a length.
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Create a span covering `start..end`. An inverted range yields an empty span.
    #[must_use]
    pub const fn between(start: usize, end: usize) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// Offset one past the last byte.
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Resolve the span against `source`.
    ///
    /// A span that falls outside the source or splits a UTF-8 sequence
    /// resolves to the empty string.
    #[must_use]
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end()).unwrap_or("")
    }
}

/// Text owned either by the document source or by the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A range of the document source.
    SourceSlice(Span),
    /// Text produced by an edit.
    Materialized(String),
}

impl Content {
    /// Resolve to a string slice.
    #[must_use]
    pub fn resolve<'a>(&'a self, source: &'a str) -> &'a str {
        match self {
            Self::SourceSlice(span) => span.slice(source),
            Self::Materialized(text) => text,
        }
    }

    /// Whether the text still lives in the document source.
    #[must_use]
    pub const fn is_source_backed(&self) -> bool {
        matches!(self, Self::SourceSlice(_))
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Materialized(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Materialized(value.to_owned())
    }
}

impl From<Span> for Content {
    fn from(value: Span) -> Self {
        Self::SourceSlice(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_resolves_against_source() {
        let source = "<div>hello</div>";
        let content = Content::SourceSlice(Span::new(5, 5));
        assert_eq!(content.resolve(source), "hello");
        assert!(content.is_source_backed());
    }

    #[test]
    fn test_out_of_range_slice_is_empty() {
        assert_eq!(Span::new(10, 4).slice("short"), "");
        assert_eq!(Span::between(8, 3), Span::new(8, 0));
    }

    #[test]
    fn test_materialized_ignores_source() {
        let content = Content::from("edited");
        assert_eq!(content.resolve("anything"), "edited");
        assert!(!content.is_source_backed());
    }
}
