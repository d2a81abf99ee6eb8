//! Per-language tokenizer states
//!
//! Each submodule defines a [`TokenState`](crate::tokens::TokenState) enum or
//! struct for one grammar. The helpers here cover scanning rules that several
//! C-like grammars share: escaped strings, block comments and numbers.

pub mod css;
pub mod js;
pub mod php;
pub mod php_words;
pub mod sql;
pub mod xml;

pub use css::CssState;
pub use js::{JsInside, JsState};
pub use php::{PhpInside, PhpState};
pub use sql::SqlState;
pub use xml::XmlState;

use crate::stream::{CharacterStream, StreamError};

/// `[A-Za-z0-9_$]`
pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Consume up to and including an unescaped `end`, stopping at end of line.
/// Returns true when `end` was found.
pub(crate) fn read_until_unescaped(
    stream: &mut CharacterStream,
    end: char,
) -> Result<bool, StreamError> {
    let mut escaped = false;
    while !stream.at_line_end() {
        let ch = stream.advance()?;
        if ch == end && !escaped {
            return Ok(true);
        }
        escaped = !escaped && ch == '\\';
    }
    Ok(false)
}

/// Consume the rest of a `/* */` comment on this line.
/// `start` is the character consumed just before. Returns true when the
/// comment closed.
pub(crate) fn read_block_comment(
    stream: &mut CharacterStream,
    start: char,
) -> Result<bool, StreamError> {
    let mut maybe_end = start == '*';
    while !stream.at_line_end() {
        let ch = stream.advance()?;
        if ch == '/' && maybe_end {
            return Ok(true);
        }
        maybe_end = ch == '*';
    }
    Ok(false)
}

/// Rest of a decimal number whose first digit is consumed
pub(crate) fn read_decimal(stream: &mut CharacterStream) -> Result<(), StreamError> {
    stream.consume_while(|ch| ch.is_ascii_digit());
    if stream.equals('.') {
        stream.advance()?;
        stream.consume_while(|ch| ch.is_ascii_digit());
    }
    if stream.equals('e') || stream.equals('E') {
        stream.advance()?;
        if stream.equals('-') || stream.equals('+') {
            stream.advance()?;
        }
        stream.consume_while(|ch| ch.is_ascii_digit());
    }
    Ok(())
}

/// True after a leading `0` when the number is hexadecimal; consumes the `x`
pub(crate) fn read_hex_prefix(stream: &mut CharacterStream) -> Result<bool, StreamError> {
    if stream.equals('x') || stream.equals('X') {
        stream.advance()?;
        stream.consume_while(|ch| ch.is_ascii_hexdigit());
        return Ok(true);
    }
    Ok(false)
}
