//! Parse diagnostics and hard failures.
//!
//! Malformed markup never fails a parse. It produces [`ParseError`] records
//! next to the tree. [`HtmlError`] is reserved for conditions that stop the
//! operation outright.

use std::fmt;

use serde::Serialize;
use tagsoup_dom::DomError;

/// Category of a recorded syntax problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum ParseErrorCode {
    /// An element was still open at end of input.
    TagNotClosed,
    /// An end tag had no matching start tag.
    TagNotOpened,
    /// The declared charset differs from the stream encoding.
    CharsetMismatch,
    /// An end tag was given for a void element.
    EndTagNotRequired,
    /// An end tag would cross a list or table boundary.
    EndTagInvalidHere,
}

/// A syntax problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// What went wrong.
    pub code: ParseErrorCode,
    /// 1-based line of the offending node.
    pub line: usize,
    /// 1-based column of the offending node.
    pub column: usize,
    /// Byte offset of the offending node.
    pub stream_position: usize,
    /// Markup of the offending node, when extraction is enabled.
    pub source_text: Option<String>,
    /// Human-readable explanation.
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.line, self.column, self.reason, self.code
        )
    }
}

/// Failures that abort a parse or an operation on the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    /// Nesting went past [`ParseOptions::max_depth`](crate::ParseOptions::max_depth).
    #[error("document is too complex: nesting exceeds {max_depth} levels")]
    DocumentTooComplex {
        /// The configured limit.
        max_depth: usize,
    },
    /// A tree operation was rejected.
    #[error(transparent)]
    Dom(DomError),
    /// An encoding label was not recognized.
    #[error("unknown encoding `{0}`")]
    UnknownEncoding(String),
}

impl From<DomError> for HtmlError {
    fn from(value: DomError) -> Self {
        match value {
            DomError::TooComplex { max_depth } => Self::DocumentTooComplex { max_depth },
            other => Self::Dom(other),
        }
    }
}
