//! The character-level parser.
//!
//! The parser walks the source one character at a time through the states
//! of [`ParseState`]. It never builds tokens: nodes are allocated as soon as
//! their first character is seen and are filled in (name, attributes, spans)
//! as the machine advances. Closing and repair logic lives in `closing`.

mod closing;
mod nodes;
mod states;

use std::sync::Arc;

use encoding_rs::Encoding;
use strum_macros::Display;
use tagsoup_dom::{NodeId, NodeKind, Quote};
use tracing::{debug, trace};

use crate::document::HtmlDocument;
use crate::error::HtmlError;

/// Tokenizer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParseState {
    /// Character data between tags.
    Text,
    /// Just after `<`: deciding between a start tag and an end tag.
    TagOpenDecision,
    /// Reading a tag name.
    TagName,
    /// Inside a tag, between attributes.
    BetweenAttributes,
    /// After `/` inside a tag.
    SelfClosingDecision,
    /// Reading an attribute name.
    AttributeName,
    /// After an attribute name, before any `=`.
    AttributeBeforeEquals,
    /// After `=`, before the value.
    AttributeAfterEquals,
    /// Reading a value without quotes.
    AttributeValueUnquoted,
    /// Reading a value inside quotes.
    AttributeValueQuoted,
    /// Inside `<!...>`.
    CommentBody,
    /// Inside `<%...%>`.
    EmbeddedCodeBody,
    /// Inside a raw-text element such as `script`.
    RawTextBody,
}

/// What the main loop does after a node completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Keep going.
    Continue,
    /// The stopper element closed; leave the rest unparsed.
    Stop,
    /// A charset declaration was found while only detecting the encoding.
    EncodingFound(Option<&'static Encoding>),
}

/// Result of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Completed,
    EncodingFound(Option<&'static Encoding>),
}

/// An attribute whose boundaries are still being discovered.
#[derive(Debug, Clone, Copy)]
struct PendingAttribute {
    name_start: usize,
    name_end: Option<usize>,
    value_start: Option<usize>,
    value_end: Option<usize>,
    quote: Quote,
    line: usize,
    column: usize,
}

/// Parser state for one run over a document.
pub(crate) struct Parser<'doc> {
    doc: &'doc mut HtmlDocument,
    source: Arc<str>,
    state: ParseState,
    /// State to return to when an embedded code block ends.
    return_state: ParseState,

    /// Byte offset of the next character to consume.
    index: usize,
    /// Byte offset of the character being processed.
    pos: usize,
    /// The character being processed.
    c: char,
    /// Position of the next character.
    line: usize,
    column: usize,
    /// Position of the character being processed.
    char_line: usize,
    char_column: usize,

    current: NodeId,
    last_parent: NodeId,
    pending_name: Option<usize>,
    attribute: Option<PendingAttribute>,
    quote: char,
    full_comment: bool,
    raw_text_position: (usize, usize),
    detect_only: bool,

    hasher: Option<crc32fast::Hasher>,
    hashed_to: usize,
}

impl<'doc> Parser<'doc> {
    pub(crate) fn new(doc: &'doc mut HtmlDocument, detect_only: bool) -> Self {
        let source = doc.tree.shared_source();
        let hasher = doc.options.compute_checksum.then(crc32fast::Hasher::new);
        Self {
            doc,
            source,
            state: ParseState::Text,
            return_state: ParseState::Text,
            index: 0,
            pos: 0,
            c: '\0',
            line: 1,
            column: 1,
            char_line: 1,
            char_column: 1,
            current: NodeId::ROOT,
            last_parent: NodeId::ROOT,
            pending_name: None,
            attribute: None,
            quote: '"',
            full_comment: false,
            raw_text_position: (1, 1),
            detect_only,
            hasher,
            hashed_to: 0,
        }
    }

    /// Run the state machine to the end of input, the stopper element, or
    /// the first charset declaration in detect-only mode.
    pub(crate) fn run(mut self) -> Result<Outcome, HtmlError> {
        debug!(
            bytes = self.source.len(),
            detect_only = self.detect_only,
            "parsing document"
        );
        self.start_node(NodeKind::Text, 0, 1, 1);

        let mut stopped = false;
        while self.advance().is_some() {
            match self.step()? {
                Flow::Continue => {}
                Flow::Stop => {
                    debug!(offset = self.index, "stopper element closed");
                    stopped = true;
                    break;
                }
                Flow::EncodingFound(encoding) => {
                    return Ok(Outcome::EncodingFound(encoding));
                }
            }
        }

        if !stopped && let Flow::EncodingFound(encoding) = self.finish_input()? {
            return Ok(Outcome::EncodingFound(encoding));
        }

        self.doc.last_nodes.clear();
        self.check_unclosed()?;
        self.doc.opened_nodes.clear();
        if let Some(hasher) = self.hasher.take() {
            self.doc.checksum = Some(hasher.finalize());
        }

        debug!(
            nodes = self.doc.tree.len(),
            errors = self.doc.errors.len(),
            "parsed document"
        );
        Ok(Outcome::Completed)
    }

    fn step(&mut self) -> Result<Flow, HtmlError> {
        match self.state {
            ParseState::Text => self.handle_text_state(),
            ParseState::TagOpenDecision => self.handle_tag_open_decision_state(),
            ParseState::TagName => self.handle_tag_name_state(),
            ParseState::BetweenAttributes => self.handle_between_attributes_state(),
            ParseState::SelfClosingDecision => self.handle_self_closing_decision_state(),
            ParseState::AttributeName => self.handle_attribute_name_state(),
            ParseState::AttributeBeforeEquals => self.handle_attribute_before_equals_state(),
            ParseState::AttributeAfterEquals => self.handle_attribute_after_equals_state(),
            ParseState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            ParseState::AttributeValueQuoted => self.handle_attribute_value_quoted_state(),
            ParseState::CommentBody => self.handle_comment_body_state(),
            ParseState::EmbeddedCodeBody => Ok(self.handle_embedded_code_body_state()),
            ParseState::RawTextBody => self.handle_raw_text_body_state(),
        }
    }

    /// Complete whatever is in progress when the input runs out.
    fn finish_input(&mut self) -> Result<Flow, HtmlError> {
        let end = self.source.len();
        if self.state == ParseState::RawTextBody {
            self.push_raw_text(end)?;
        }
        self.finalize_pending(end)?;
        self.end_node(end, false)
    }

    // ===================================================================
    // Input cursor
    // ===================================================================

    /// Consume the next character, making it the current one.
    fn advance(&mut self) -> Option<char> {
        let c = self.source.get(self.index..)?.chars().next()?;
        self.pos = self.index;
        self.c = c;
        self.char_line = self.line;
        self.char_column = self.column;
        self.index += c.len_utf8();
        self.hash_through(self.index);
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Step back over the current character so the next iteration sees it
    /// again.
    const fn rollback(&mut self) {
        self.index = self.pos;
        self.line = self.char_line;
        self.column = self.char_column;
    }

    /// Byte `offset` bytes past the current character.
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.index + offset).copied()
    }

    /// Feed input up to `end` into the checksum. Each byte is hashed once,
    /// however often the cursor rolls back over it.
    fn hash_through(&mut self, end: usize) {
        if let Some(hasher) = self.hasher.as_mut()
            && end > self.hashed_to
            && let Some(bytes) = self.source.as_bytes().get(self.hashed_to..end)
        {
            hasher.update(bytes);
            self.hashed_to = end;
        }
    }

    // ===================================================================
    // State helpers
    // ===================================================================

    fn switch_to(&mut self, state: ParseState) {
        trace!(from = %self.state, to = %state, offset = self.pos, "state transition");
        self.state = state;
    }

    /// Reprocess the current character in `state`.
    fn reconsume_in(&mut self, state: ParseState) {
        self.rollback();
        self.switch_to(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn parser_over(doc: &mut HtmlDocument) -> Parser<'_> {
        Parser::new(doc, false)
    }

    #[test]
    fn test_rollback_restores_position_across_newline() {
        let mut doc = HtmlDocument::new();
        doc.reset("a\nb");
        let mut parser = parser_over(&mut doc);

        assert_eq!(parser.advance(), Some('a'));
        assert_eq!(parser.advance(), Some('\n'));
        assert_eq!((parser.line, parser.column), (2, 1));

        parser.rollback();
        assert_eq!((parser.line, parser.column), (1, 2));
        assert_eq!(parser.index, 1);
        assert_eq!(parser.advance(), Some('\n'));
        assert_eq!(parser.advance(), Some('b'));
        assert_eq!((parser.char_line, parser.char_column), (2, 1));
    }

    #[test]
    fn test_multibyte_characters_advance_by_bytes() {
        let mut doc = HtmlDocument::new();
        doc.reset("é<");
        let mut parser = parser_over(&mut doc);

        assert_eq!(parser.advance(), Some('é'));
        assert_eq!(parser.index, 2);
        assert_eq!(parser.advance(), Some('<'));
        assert_eq!(parser.pos, 2);
        assert_eq!(parser.char_column, 2);
    }

    #[test]
    fn test_checksum_ignores_rollback() {
        let mut doc = HtmlDocument::with_options(ParseOptions::default().with_checksum(true));
        doc.reset("abc");
        let mut parser = parser_over(&mut doc);

        let _ = parser.advance();
        let _ = parser.advance();
        parser.rollback();
        let _ = parser.advance();
        let _ = parser.advance();

        let crc = parser.hasher.take().map(crc32fast::Hasher::finalize);
        assert_eq!(crc, Some(crc32fast::hash(b"abc")));
    }
}
