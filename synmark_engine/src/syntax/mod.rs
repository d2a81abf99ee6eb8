//! Resumable parsers
//!
//! Every parser here reads tokens from its own tokenizer, restyles them and
//! attaches an [`Indentation`](crate::tokens::Indentation) rule to each
//! newline token. Parsers never own the character stream: the caller passes
//! it to each [`LanguageParser::next`] call, so a parser value cloned at a
//! line boundary is a complete checkpoint.

pub mod continuation;
pub mod css;
pub mod js;
pub mod php;
pub mod scope;
pub mod sql;
pub mod xml;

pub use continuation::{ContinuationStack, Cursor, Dispatch, Grammar, Step};
pub use css::CssParser;
pub use js::JsParser;
pub use php::PhpParser;
pub use scope::{LexFrame, LexicalStack, LineState, ScopeChain, ScopeKind};
pub use sql::SqlParser;
pub use xml::XmlParser;

use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::Token;
use std::fmt;

/// A grammar that turns a character stream into styled tokens
pub trait LanguageParser: fmt::Debug + Send + Sync {
    /// Next token, or `Ok(None)` at the end of the stream
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>>;

    /// Forget the position within the current line. Called when parsing
    /// resumes from a checkpoint at the start of a line.
    fn reset_line(&mut self);

    fn boxed_clone(&self) -> Box<dyn LanguageParser>;
}

impl Clone for Box<dyn LanguageParser> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Parse all of `text`, keeping every token
    pub(crate) fn parse_all(parser: &mut dyn LanguageParser, text: &str) -> Vec<Token> {
        let mut stream = CharacterStream::from_text(text);
        let mut tokens = Vec::new();
        while let Some(token) = parser.next(&mut stream).unwrap() {
            tokens.push(token);
        }
        tokens
    }

    /// Indentation the newline before line `line` (0-based) asks for, given
    /// that line's text
    pub(crate) fn line_indent(tokens: &[Token], text: &str, line: usize) -> usize {
        let newline = tokens
            .iter()
            .filter(|t| t.is_newline())
            .nth(line - 1)
            .expect("newline before line");
        let next = text.lines().nth(line).unwrap_or("").trim_start();
        newline
            .indentation
            .as_ref()
            .expect("indentation on newline")
            .compute(next, 0)
    }

    /// Style of the first meaningful token whose content is `content`
    pub(crate) fn style_of<'a>(tokens: &'a [Token], content: &str) -> &'a str {
        tokens
            .iter()
            .find(|t| t.content == content)
            .map(|t| t.style.as_str())
            .expect("token present")
    }

    /// Styles of every token with `content`, in order
    pub(crate) fn styles_of<'a>(tokens: &'a [Token], content: &str) -> Vec<&'a str> {
        tokens
            .iter()
            .filter(|t| t.content == content)
            .map(|t| t.style.as_str())
            .collect()
    }
}
