//! Parser configuration.

use serde::{Deserialize, Serialize};

use tagsoup_dom::DEFAULT_MAX_DEPTH;

/// Options that control parsing, repair and error reporting.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration:
///
/// ```
/// let options: tagsoup_html::ParseOptions =
///     serde_json::from_str(r#"{ "fix_nested_tags": true }"#).unwrap();
/// assert!(options.fix_nested_tags);
/// assert!(options.check_syntax);
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Report elements still open at the end of input.
    pub check_syntax: bool,
    /// Close an open `li`, `tr`, `th` or `td` when a sibling of the same
    /// name starts, unless a table or list boundary lies in between.
    pub fix_nested_tags: bool,
    /// Close every remaining element at end of input instead of cascading
    /// closes from ancestors.
    pub auto_close_on_end: bool,
    /// Maintain the id attribute index.
    pub use_id_attribute: bool,
    /// Compute a CRC-32 of the consumed input.
    pub compute_checksum: bool,
    /// Attach the offending markup to syntax errors.
    pub extract_error_source_text: bool,
    /// Longest snippet attached to an error, in bytes.
    pub extract_error_source_text_max_length: usize,
    /// Stop parsing after this element's end tag.
    pub stopper_node_name: Option<String>,
    /// Deepest nesting accepted while building, walking or serializing.
    pub max_depth: usize,
    /// Honor `<meta http-equiv="content-type">` declarations.
    pub read_encoding: bool,
    /// Label of the encoding used by [`load_bytes`](crate::HtmlDocument::load_bytes)
    /// when nothing else is declared.
    pub default_encoding: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            check_syntax: true,
            fix_nested_tags: false,
            auto_close_on_end: false,
            use_id_attribute: true,
            compute_checksum: false,
            extract_error_source_text: false,
            extract_error_source_text_max_length: 100,
            stopper_node_name: None,
            max_depth: DEFAULT_MAX_DEPTH,
            read_encoding: true,
            default_encoding: "utf-8".to_owned(),
        }
    }
}

impl ParseOptions {
    /// Set [`fix_nested_tags`](Self::fix_nested_tags).
    #[must_use]
    pub const fn with_fix_nested_tags(mut self, enabled: bool) -> Self {
        self.fix_nested_tags = enabled;
        self
    }

    /// Set [`auto_close_on_end`](Self::auto_close_on_end).
    #[must_use]
    pub const fn with_auto_close_on_end(mut self, enabled: bool) -> Self {
        self.auto_close_on_end = enabled;
        self
    }

    /// Set [`check_syntax`](Self::check_syntax).
    #[must_use]
    pub const fn with_check_syntax(mut self, enabled: bool) -> Self {
        self.check_syntax = enabled;
        self
    }

    /// Set [`compute_checksum`](Self::compute_checksum).
    #[must_use]
    pub const fn with_checksum(mut self, enabled: bool) -> Self {
        self.compute_checksum = enabled;
        self
    }

    /// Set [`extract_error_source_text`](Self::extract_error_source_text).
    #[must_use]
    pub const fn with_error_source_text(mut self, enabled: bool) -> Self {
        self.extract_error_source_text = enabled;
        self
    }

    /// Set [`stopper_node_name`](Self::stopper_node_name).
    #[must_use]
    pub fn with_stopper(mut self, name: impl Into<String>) -> Self {
        self.stopper_node_name = Some(name.into());
        self
    }

    /// Set [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set [`use_id_attribute`](Self::use_id_attribute).
    #[must_use]
    pub const fn with_id_index(mut self, enabled: bool) -> Self {
        self.use_id_attribute = enabled;
        self
    }
}
