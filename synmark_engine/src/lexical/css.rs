//! CSS tokenizer state
//!
//! CSS tokens carry their style as their type tag.

use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{PartialToken, TokenState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CssState {
    #[default]
    Normal,
    CComment,
    /// `<!-- ... -->`
    SgmlComment,
    /// Strings only continue onto the next line after a trailing backslash
    InString(char),
}

fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

impl CssState {
    fn normal(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        let ch = stream.advance()?;
        let style = match ch {
            '@' => {
                stream.consume_while(is_word);
                "css-at"
            }
            '/' if stream.equals('*') => {
                *self = CssState::CComment;
                return Ok(None);
            }
            '<' if stream.equals('!') => {
                *self = CssState::SgmlComment;
                return Ok(None);
            }
            '=' => "css-compare",
            '~' | '|' if stream.equals('=') => {
                stream.advance()?;
                "css-compare"
            }
            '"' | '\'' => {
                *self = CssState::InString(ch);
                return Ok(None);
            }
            '#' => {
                stream.consume_while(is_word);
                "css-hash"
            }
            '!' => {
                stream.consume_while(|c| c == ' ' || c == '\t');
                stream.consume_while(is_word);
                "css-important"
            }
            _ if ch.is_ascii_digit() => {
                stream.consume_while(|c| is_word(c) || c == '.' || c == '%');
                "css-unit"
            }
            ',' | '.' | '+' | '>' | '*' | '/' => "css-select-op",
            ';' | '{' | '}' | ':' | '[' | ']' => "css-punctuation",
            _ => {
                stream.consume_while(|c| is_word(c) || c == '\\' || c == '-');
                "css-identifier"
            }
        };
        Ok(Some(PartialToken::plain(style)))
    }

    fn c_comment(&mut self, stream: &mut CharacterStream) -> StreamResult<PartialToken> {
        let mut maybe_end = false;
        while !stream.at_line_end() {
            let ch = stream.advance()?;
            if maybe_end && ch == '/' {
                *self = CssState::Normal;
                break;
            }
            maybe_end = ch == '*';
        }
        Ok(PartialToken::plain("css-comment"))
    }

    fn sgml_comment(&mut self, stream: &mut CharacterStream) -> StreamResult<PartialToken> {
        let mut dashes = 0;
        while !stream.at_line_end() {
            let ch = stream.advance()?;
            if dashes >= 2 && ch == '>' {
                *self = CssState::Normal;
                break;
            }
            dashes = if ch == '-' { dashes + 1 } else { 0 };
        }
        Ok(PartialToken::plain("css-comment"))
    }

    fn string(&mut self, stream: &mut CharacterStream, quote: char) -> StreamResult<PartialToken> {
        let mut escaped = false;
        while !stream.at_line_end() {
            let ch = stream.advance()?;
            if ch == quote && !escaped {
                break;
            }
            escaped = !escaped && ch == '\\';
        }
        if !escaped {
            *self = CssState::Normal;
        }
        Ok(PartialToken::plain("css-string"))
    }
}

impl TokenState for CssState {
    fn read(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        match *self {
            CssState::Normal => self.normal(stream),
            CssState::CComment => self.c_comment(stream).map(Some),
            CssState::SgmlComment => self.sgml_comment(stream).map(Some),
            CssState::InString(quote) => self.string(stream, quote).map(Some),
        }
    }
}
