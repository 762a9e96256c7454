//! Element classification.
//!
//! A fixed table maps lowercase tag names to the flags that steer parsing and
//! serialization. Names that are not in the table have no flags.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Parsing behaviour flags for a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementFlags(u8);

impl ElementFlags {
    /// No special handling.
    pub const NONE: Self = Self(0);
    /// Content is raw text up to the matching end tag.
    pub const CDATA: Self = Self(1);
    /// Void element: never has content and never needs an end tag.
    pub const EMPTY: Self = Self(1 << 1);
    /// Closed at its start tag; a stray end tag folds preceding siblings.
    pub const CLOSED: Self = Self(1 << 2);
    /// A stray end tag is kept as plain text.
    pub const CAN_OVERLAP: Self = Self(1 << 3);

    /// Combine two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

const ELEMENT_TABLE: &[(&str, ElementFlags)] = &[
    ("script", ElementFlags::CDATA),
    ("style", ElementFlags::CDATA),
    ("noxhtml", ElementFlags::CDATA),
    ("base", ElementFlags::EMPTY),
    ("link", ElementFlags::EMPTY),
    ("meta", ElementFlags::EMPTY),
    ("isindex", ElementFlags::EMPTY),
    ("hr", ElementFlags::EMPTY),
    ("col", ElementFlags::EMPTY),
    ("img", ElementFlags::EMPTY),
    ("param", ElementFlags::EMPTY),
    ("embed", ElementFlags::EMPTY),
    ("frame", ElementFlags::EMPTY),
    ("wbr", ElementFlags::EMPTY),
    ("bgsound", ElementFlags::EMPTY),
    ("spacer", ElementFlags::EMPTY),
    ("keygen", ElementFlags::EMPTY),
    ("area", ElementFlags::EMPTY),
    ("input", ElementFlags::EMPTY),
    ("basefont", ElementFlags::EMPTY),
    ("source", ElementFlags::EMPTY),
    ("br", ElementFlags::EMPTY.union(ElementFlags::CLOSED)),
    ("p", ElementFlags::CLOSED),
    ("form", ElementFlags::CAN_OVERLAP),
];

static ELEMENT_FLAGS: LazyLock<HashMap<&'static str, ElementFlags>> =
    LazyLock::new(|| ELEMENT_TABLE.iter().copied().collect());

/// Look up the flags of a tag name. Lookup ignores ASCII case.
#[must_use]
pub fn element_flags(name: &str) -> ElementFlags {
    if let Some(flags) = ELEMENT_FLAGS.get(name) {
        return *flags;
    }
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        return ELEMENT_FLAGS
            .get(name.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or_default();
    }
    ElementFlags::NONE
}

/// Whether the element's content is raw text (`script`, `style`, ...).
#[must_use]
pub fn is_cdata_element(name: &str) -> bool {
    element_flags(name).contains(ElementFlags::CDATA)
}

/// Whether the element is void.
#[must_use]
pub fn is_empty_element(name: &str) -> bool {
    element_flags(name).contains(ElementFlags::EMPTY)
}

/// Whether the element closes at its own start tag.
#[must_use]
pub fn is_closed_element(name: &str) -> bool {
    element_flags(name).contains(ElementFlags::CLOSED)
}

/// Whether a stray end tag for the element becomes literal text.
#[must_use]
pub fn can_overlap_element(name: &str) -> bool {
    element_flags(name).contains(ElementFlags::CAN_OVERLAP)
}

/// Whitespace as far as tag syntax is concerned.
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements_are_empty() {
        for name in ["img", "meta", "input", "hr", "source", "br"] {
            assert!(is_empty_element(name), "{name} should be void");
        }
        assert!(!is_empty_element("div"));
    }

    #[test]
    fn test_br_is_both_empty_and_closed() {
        let flags = element_flags("br");
        assert!(flags.contains(ElementFlags::EMPTY));
        assert!(flags.contains(ElementFlags::CLOSED));
        assert!(!flags.contains(ElementFlags::CDATA));
    }

    #[test]
    fn test_p_is_closed_only() {
        assert!(is_closed_element("p"));
        assert!(!is_empty_element("p"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert!(is_cdata_element("SCRIPT"));
        assert!(can_overlap_element("Form"));
    }

    #[test]
    fn test_unknown_names_have_no_flags() {
        assert_eq!(element_flags("custom-widget"), ElementFlags::NONE);
        assert!(!ElementFlags::NONE.contains(ElementFlags::NONE));
    }
}
