//! One handler per parse state.

use tagsoup_dom::{NodeKind, is_whitespace};

use super::{Flow, ParseState, Parser};
use crate::error::HtmlError;

/// Return the flow to the main loop unless it says to keep going.
macro_rules! proceed {
    ($flow:expr) => {
        match $flow {
            Flow::Continue => {}
            other => return Ok(other),
        }
    };
}

impl Parser<'_> {
    /// A `<` outside quoted values, comments and raw text starts a new node,
    /// or an embedded code block when followed by `%`.
    ///
    /// Returns `None` when the current character is not a `<`.
    fn new_check(&mut self) -> Result<Option<Flow>, HtmlError> {
        if self.c != '<' {
            return Ok(None);
        }

        if self.peek_byte(0) == Some(b'%') {
            match self.state {
                ParseState::AttributeAfterEquals => self.start_attribute_value(self.pos, None),
                ParseState::BetweenAttributes => self.start_attribute(self.pos)?,
                ParseState::TagOpenDecision => {
                    self.start_node_name(true, self.pos);
                    self.switch_to(ParseState::TagName);
                }
                _ => {}
            }
            self.return_state = self.state;
            self.switch_to(ParseState::EmbeddedCodeBody);
            return Ok(Some(Flow::Continue));
        }

        // Whatever was in progress ends here and counts as closed.
        self.finalize_pending(self.pos)?;
        let flow = self.end_node(self.pos, true)?;
        if flow != Flow::Continue {
            return Ok(Some(flow));
        }

        self.switch_to(ParseState::TagOpenDecision);
        if self.peek_byte(0) == Some(b'!') {
            self.start_node(NodeKind::Comment, self.pos, self.char_line, self.char_column);
            self.full_comment = self.peek_byte(1) == Some(b'-') && self.peek_byte(2) == Some(b'-');
            self.switch_to(ParseState::CommentBody);
            return Ok(Some(Flow::Continue));
        }
        self.start_node(NodeKind::Element, self.pos, self.char_line, self.char_column);
        Ok(Some(Flow::Continue))
    }

    pub(super) fn handle_text_state(&mut self) -> Result<Flow, HtmlError> {
        Ok(self.new_check()?.unwrap_or(Flow::Continue))
    }

    pub(super) fn handle_tag_open_decision_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if self.c == '/' {
            self.start_node_name(false, self.index);
            self.switch_to(ParseState::TagName);
        } else {
            self.start_node_name(true, self.pos);
            self.reconsume_in(ParseState::TagName);
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_tag_name_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            self.end_node_name(self.pos)?;
            self.switch_to(ParseState::BetweenAttributes);
        } else if self.c == '/' {
            self.end_node_name(self.pos)?;
            self.switch_to(ParseState::SelfClosingDecision);
        } else if self.c == '>' {
            self.end_node_name(self.pos)?;
            proceed!(self.end_node(self.index, false)?);
            if self.state == ParseState::TagName {
                self.begin_text();
            }
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_between_attributes_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            return Ok(Flow::Continue);
        }
        match self.c {
            '/' | '?' => self.switch_to(ParseState::SelfClosingDecision),
            '>' => {
                proceed!(self.end_node(self.index, false)?);
                if self.state == ParseState::BetweenAttributes {
                    self.begin_text();
                }
            }
            _ => {
                self.start_attribute(self.pos)?;
                self.switch_to(ParseState::AttributeName);
            }
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_self_closing_decision_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if self.c == '>' {
            self.mark_self_closing();
            proceed!(self.end_node(self.index, true)?);
            if self.state == ParseState::SelfClosingDecision {
                self.begin_text();
            }
        } else if is_whitespace(self.c) {
            self.switch_to(ParseState::BetweenAttributes);
        } else {
            self.reconsume_in(ParseState::BetweenAttributes);
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_attribute_name_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            self.end_attribute_name(self.pos);
            self.switch_to(ParseState::AttributeBeforeEquals);
            return Ok(Flow::Continue);
        }
        match self.c {
            '=' => {
                self.end_attribute_name(self.pos);
                self.switch_to(ParseState::AttributeAfterEquals);
            }
            '/' => {
                self.end_attribute_name(self.pos);
                self.switch_to(ParseState::SelfClosingDecision);
            }
            '>' => {
                self.end_attribute_name(self.pos);
                proceed!(self.end_node(self.index, false)?);
                if self.state == ParseState::AttributeName {
                    self.begin_text();
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_attribute_before_equals_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            return Ok(Flow::Continue);
        }
        match self.c {
            '>' => {
                proceed!(self.end_node(self.index, false)?);
                if self.state == ParseState::AttributeBeforeEquals {
                    self.begin_text();
                }
            }
            '=' => self.switch_to(ParseState::AttributeAfterEquals),
            // A new attribute begins; the previous one has no value.
            _ => self.reconsume_in(ParseState::BetweenAttributes),
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_attribute_after_equals_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            return Ok(Flow::Continue);
        }
        match self.c {
            '\'' | '"' => {
                self.quote = self.c;
                self.start_attribute_value(self.index, Some(self.c));
                self.switch_to(ParseState::AttributeValueQuoted);
            }
            '>' => {
                self.start_attribute_value(self.pos, None);
                self.end_attribute_value(self.pos)?;
                proceed!(self.end_node(self.index, false)?);
                if self.state == ParseState::AttributeAfterEquals {
                    self.begin_text();
                }
            }
            _ => {
                self.start_attribute_value(self.pos, None);
                self.switch_to(ParseState::AttributeValueUnquoted);
            }
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_attribute_value_unquoted_state(&mut self) -> Result<Flow, HtmlError> {
        if let Some(flow) = self.new_check()? {
            return Ok(flow);
        }
        if is_whitespace(self.c) {
            self.end_attribute_value(self.pos)?;
            self.switch_to(ParseState::BetweenAttributes);
        } else if self.c == '>' {
            self.end_attribute_value(self.pos)?;
            proceed!(self.end_node(self.index, false)?);
            if self.state == ParseState::AttributeValueUnquoted {
                self.begin_text();
            }
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_attribute_value_quoted_state(&mut self) -> Result<Flow, HtmlError> {
        if self.c == self.quote {
            self.end_attribute_value(self.pos)?;
            self.switch_to(ParseState::BetweenAttributes);
        } else if self.c == '<' && self.peek_byte(0) == Some(b'%') {
            self.return_state = self.state;
            self.switch_to(ParseState::EmbeddedCodeBody);
        }
        Ok(Flow::Continue)
    }

    pub(super) fn handle_comment_body_state(&mut self) -> Result<Flow, HtmlError> {
        if self.c != '>' {
            return Ok(Flow::Continue);
        }
        if self.full_comment {
            let before = self.source.as_bytes().get(..self.pos).unwrap_or_default();
            if !before.ends_with(b"--") && !before.ends_with(b"--!") {
                return Ok(Flow::Continue);
            }
        }
        proceed!(self.end_node(self.index, false)?);
        self.begin_text();
        Ok(Flow::Continue)
    }

    pub(super) fn handle_embedded_code_body_state(&mut self) -> Flow {
        if self.c != '%' || self.peek_byte(0) != Some(b'>') {
            return Flow::Continue;
        }
        match self.return_state {
            ParseState::AttributeAfterEquals => {
                self.switch_to(ParseState::AttributeValueUnquoted);
            }
            ParseState::BetweenAttributes => {
                self.end_attribute_name(self.index + 1);
                self.switch_to(ParseState::BetweenAttributes);
            }
            other => self.switch_to(other),
        }
        // Consume the closing '>'.
        let _ = self.advance();
        Flow::Continue
    }

    /// Only the matching end tag leaves raw text; everything else is content.
    pub(super) fn handle_raw_text_body_state(&mut self) -> Result<Flow, HtmlError> {
        if self.c != '<' || self.peek_byte(0) != Some(b'/') {
            return Ok(Flow::Continue);
        }
        let name = self.doc.tree.name(self.current).to_owned();
        let name_start = self.pos + 2;
        let name_end = name_start + name.len();
        let bytes = self.source.as_bytes();
        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
        let terminated = bytes
            .get(name_end)
            .is_some_and(|&b| b == b'>' || is_whitespace(char::from(b)));
        if !matches_name || !terminated {
            return Ok(Flow::Continue);
        }

        self.push_raw_text(self.pos)?;
        self.start_node(NodeKind::Element, self.pos, self.char_line, self.char_column);
        self.start_node_name(false, name_start);
        self.switch_to(ParseState::TagName);
        // Consume the '/'.
        let _ = self.advance();
        Ok(Flow::Continue)
    }
}
