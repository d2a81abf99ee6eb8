//! JavaScript tokenizer state

use super::{is_word_char, read_block_comment, read_decimal, read_hex_prefix, read_until_unescaped};
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{PartialToken, TokenState};

/// Multi-line constructs the tokenizer can be inside of at a line boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsInside {
    #[default]
    Code,
    String(char),
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsState {
    pub inside: JsInside,
    /// Whether a `/` here starts a regular expression rather than a division
    pub regexp_allowed: bool,
}

impl Default for JsState {
    fn default() -> Self {
        Self {
            inside: JsInside::Code,
            regexp_allowed: true,
        }
    }
}

/// Type tag and style for reserved words
fn keyword(word: &str) -> Option<(&'static str, &'static str)> {
    let entry = match word {
        "if" | "while" | "with" => ("keyword a", "js-keyword"),
        "else" | "do" | "try" | "finally" => ("keyword b", "js-keyword"),
        "return" | "break" | "continue" | "new" | "delete" | "throw" => ("keyword c", "js-keyword"),
        "in" | "typeof" | "instanceof" => ("operator", "js-keyword"),
        "var" => ("var", "js-keyword"),
        "function" => ("function", "js-keyword"),
        "catch" => ("catch", "js-keyword"),
        "for" => ("for", "js-keyword"),
        "switch" => ("switch", "js-keyword"),
        "case" => ("case", "js-keyword"),
        "default" => ("default", "js-keyword"),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => ("atom", "js-atom"),
        _ => return None,
    };
    Some(entry)
}

fn punctuation(ch: char) -> Option<&'static str> {
    Some(match ch {
        '[' => "[",
        ']' => "]",
        '{' => "{",
        '}' => "}",
        '(' => "(",
        ')' => ")",
        ',' => ",",
        ';' => ";",
        ':' => ":",
        '.' => ".",
        _ => return None,
    })
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '+' | '-' | '*' | '&' | '%' | '=' | '<' | '>' | '!' | '?' | '|')
}

impl JsState {
    fn read_token(&mut self, stream: &mut CharacterStream) -> StreamResult<PartialToken> {
        if let JsInside::String(quote) = self.inside {
            return self.read_string(stream, quote);
        }

        let ch = stream.advance()?;
        if self.inside == JsInside::BlockComment {
            return self.read_comment(stream, ch);
        }

        if ch == '"' || ch == '\'' {
            return self.read_string(stream, ch);
        }
        if let Some(kind) = punctuation(ch) {
            return Ok(PartialToken::new(kind, "js-punctuation"));
        }
        if ch == '0' && read_hex_prefix(stream)? {
            return Ok(PartialToken::new("number", "js-atom"));
        }
        if ch.is_ascii_digit() {
            read_decimal(stream)?;
            return Ok(PartialToken::new("number", "js-atom"));
        }
        if ch == '/' {
            if stream.equals('*') {
                stream.advance()?;
                return self.read_comment(stream, '\0');
            }
            if stream.equals('/') {
                stream.consume_while(|c| c != '\n');
                return Ok(PartialToken::new("comment", "js-comment"));
            }
            if self.regexp_allowed {
                read_until_unescaped(stream, '/')?;
                stream.consume_while(|c| matches!(c, 'g' | 'i' | 'm'));
                return Ok(PartialToken::new("regexp", "js-string"));
            }
            stream.consume_while(is_operator_char);
            return Ok(PartialToken::new("operator", "js-operator"));
        }
        if is_operator_char(ch) {
            stream.consume_while(is_operator_char);
            return Ok(PartialToken::new("operator", "js-operator"));
        }

        stream.consume_while(is_word_char);
        let word = stream.commit();
        let (kind, style) = keyword(&word).unwrap_or(("variable", "js-variable"));
        Ok(PartialToken::new(kind, style).with_content(word))
    }

    fn read_string(&mut self, stream: &mut CharacterStream, quote: char) -> StreamResult<PartialToken> {
        if read_until_unescaped(stream, quote)? {
            self.inside = JsInside::Code;
            Ok(PartialToken::new("string", "js-string"))
        } else {
            self.inside = JsInside::String(quote);
            Ok(PartialToken::new("string_not_terminated", "js-string"))
        }
    }

    fn read_comment(&mut self, stream: &mut CharacterStream, start: char) -> StreamResult<PartialToken> {
        self.inside = if read_block_comment(stream, start)? {
            JsInside::Code
        } else {
            JsInside::BlockComment
        };
        Ok(PartialToken::new("comment", "js-comment"))
    }
}

impl TokenState for JsState {
    fn read(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        let token = self.read_token(stream)?;
        self.regexp_allowed = matches!(
            token.kind,
            "operator" | "keyword c" | "[" | "{" | "}" | "(" | "," | ";" | ":"
        );
        Ok(Some(token))
    }
}
