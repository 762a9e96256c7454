//! Lenient HTML parsing for the tagsoup document tree.
//!
//! [`HtmlDocument`] turns arbitrary, possibly broken markup into a
//! [`DomTree`](tagsoup_dom::DomTree) without ever rejecting input. Problems
//! are recorded as [`ParseError`]s alongside the tree.
//!
//! # Usage
//!
//! ```
//! use tagsoup_html::HtmlDocument;
//!
//! let mut doc = HtmlDocument::new();
//! doc.load_html("<ul><li>one<li>two</ul>").unwrap();
//! assert_eq!(doc.tree().children(doc.tree().root()).len(), 1);
//! ```

mod document;
mod encoding;
mod error;
mod options;
mod parser;

pub use document::HtmlDocument;
pub use encoding::{NameValuePairs, resolve_encoding};
pub use error::{HtmlError, ParseError, ParseErrorCode};
pub use options::ParseOptions;
pub use parser::ParseState;

pub use tagsoup_dom::{self as dom, NodeId};
