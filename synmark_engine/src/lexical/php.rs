//! PHP tokenizer state

use super::{is_word_char, php_words, read_block_comment, read_decimal, read_hex_prefix};
use crate::stream::{is_inline_whitespace, CharacterStream, StreamResult};
use crate::tokens::{PartialToken, TokenState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhpInside {
    #[default]
    Code,
    /// Strings may span lines
    String(char),
    BlockComment,
    /// Just read `<<<`; the closing identifier comes next
    HeredocStart,
    Heredoc { identifier: String, nowdoc: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhpState {
    pub inside: PhpInside,
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '+' | '*' | '&' | '%' | '/' | '=' | '<' | '>' | '!' | '?' | '.' | '|' | '-')
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
        _ => return None,
    })
}

fn string_style(quote: char) -> &'static str {
    if quote == '\'' {
        "php-string-single-quoted"
    } else {
        "php-string-double-quoted"
    }
}

fn operator(stream: &mut CharacterStream) -> PartialToken {
    stream.consume_while(is_operator_char);
    PartialToken::new("operator", "php-operator")
}

impl PhpState {
    fn read_token(&mut self, stream: &mut CharacterStream) -> StreamResult<PartialToken> {
        match self.inside.clone() {
            PhpInside::Code => {}
            PhpInside::String(quote) => return self.read_string(stream, quote),
            PhpInside::BlockComment => {
                let start = stream.advance()?;
                return self.read_comment(stream, start);
            }
            PhpInside::HeredocStart => return self.read_heredoc_start(stream),
            PhpInside::Heredoc { identifier, nowdoc } => {
                return self.read_heredoc_line(stream, &identifier, nowdoc)
            }
        }

        let ch = stream.advance()?;
        match ch {
            '\'' | '"' => self.read_string(stream, ch),
            '#' => read_line_comment(stream),
            '$' => {
                stream.consume_while(is_word_char);
                let word = stream.commit();
                let style = if word == "$this" { "php-keyword" } else { "php-variable" };
                Ok(PartialToken::new("variable", style).with_content(word))
            }
            ':' if stream.equals(':') => {
                stream.advance()?;
                Ok(PartialToken::new("t_double_colon", "php-operator"))
            }
            '[' | ']' | '{' | '}' | '(' | ')' | ',' | ';' | ':' => {
                Ok(PartialToken::new(punctuation(ch).unwrap_or(":"), "php-punctuation"))
            }
            '0' if read_hex_prefix(stream)? => Ok(PartialToken::new("number", "php-atom")),
            _ if ch.is_ascii_digit() => {
                read_decimal(stream)?;
                Ok(PartialToken::new("number", "php-atom"))
            }
            '/' if stream.equals('*') => {
                stream.advance()?;
                self.read_comment(stream, ch)
            }
            '/' if stream.equals('/') => read_line_comment(stream),
            '<' if stream.look_ahead("<<", true, false, false) => {
                self.inside = PhpInside::HeredocStart;
                Ok(PartialToken::new("<<<", "php-punctuation"))
            }
            _ if is_operator_char(ch) => Ok(operator(stream)),
            _ => {
                stream.consume_while(is_word_char);
                let word = stream.commit();
                let (kind, style) = php_words::lookup(&word).unwrap_or(("t_string", "php-t_string"));
                Ok(PartialToken::new(kind, style).with_content(word))
            }
        }
    }

    fn read_string(&mut self, stream: &mut CharacterStream, quote: char) -> StreamResult<PartialToken> {
        let mut escaped = false;
        let mut closed = false;
        while !stream.at_line_end() {
            let ch = stream.advance()?;
            if ch == quote && !escaped {
                closed = true;
                break;
            }
            escaped = ch == '\\' && !escaped;
        }
        let kind = if closed {
            self.inside = PhpInside::Code;
            "string"
        } else {
            self.inside = PhpInside::String(quote);
            "string_not_terminated"
        };
        Ok(PartialToken::new(kind, string_style(quote)))
    }

    fn read_comment(&mut self, stream: &mut CharacterStream, start: char) -> StreamResult<PartialToken> {
        self.inside = if read_block_comment(stream, start)? {
            PhpInside::Code
        } else {
            PhpInside::BlockComment
        };
        Ok(PartialToken::new("comment", "php-comment"))
    }

    /// `'ID'` starts a nowdoc, `ID` or `"ID"` a heredoc
    fn read_heredoc_start(&mut self, stream: &mut CharacterStream) -> StreamResult<PartialToken> {
        let quote = stream.peek().filter(|ch| *ch == '\'' || *ch == '"');
        if let Some(quote) = quote {
            stream.advance()?;
            stream.consume_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if stream.equals(quote) {
                stream.advance()?;
            }
        } else if stream.matches_predicate(|ch| ch.is_ascii_alphabetic() || ch == '_') {
            stream.consume_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        } else {
            self.inside = PhpInside::Code;
            stream.advance()?;
            return Ok(PartialToken::new("error", "syntax-error"));
        }

        let opening = stream.commit();
        let identifier = opening.trim_matches(|ch| ch == '\'' || ch == '"').to_string();
        let nowdoc = quote == Some('\'');
        self.inside = PhpInside::Heredoc { identifier, nowdoc };
        Ok(PartialToken::new("string_not_terminated", string_style(if nowdoc { '\'' } else { '"' }))
            .with_content(opening))
    }

    /// One body line. The closing identifier only counts at the start of a
    /// line, followed by an optional `;`, inline whitespace and the line end.
    fn read_heredoc_line(
        &mut self,
        stream: &mut CharacterStream,
        identifier: &str,
        nowdoc: bool,
    ) -> StreamResult<PartialToken> {
        let style = string_style(if nowdoc { '\'' } else { '"' });
        let mut seen = String::new();
        if stream.look_ahead(identifier, true, false, false) {
            let closer = stream.commit();
            if stream.equals(';') {
                stream.advance()?;
            }
            stream.consume_while(is_inline_whitespace);
            let closes = stream.at_line_end();
            let tail = stream.commit();
            if closes {
                // `;` and trailing blanks are tokenized as code again
                stream.pushback(&tail);
                self.inside = PhpInside::Code;
                return Ok(PartialToken::new("string", style).with_content(closer));
            }
            seen.push_str(&closer);
            seen.push_str(&tail);
        }
        stream.consume_while(|ch| ch != '\n');
        Ok(PartialToken::new("string_not_terminated", style).with_content(seen))
    }
}

/// `#` and `//` comments stop at the end of the line or before `?>`
fn read_line_comment(stream: &mut CharacterStream) -> StreamResult<PartialToken> {
    while !stream.at_line_end() && !stream.look_ahead("?>", false, false, false) {
        stream.advance()?;
    }
    Ok(PartialToken::new("comment", "php-comment"))
}

impl TokenState for PhpState {
    fn read(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<PartialToken>> {
        self.read_token(stream).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tests::lex;
    use crate::tokens::Tokenizer;

    fn kinds(text: &str) -> Vec<(&'static str, String)> {
        lex(PhpState::default(), text)
            .into_iter()
            .map(|t| (t.kind, t.style))
            .collect()
    }

    #[test]
    fn test_variables_and_this() {
        let tokens = lex(PhpState::default(), "$this->x = $name;");
        assert_eq!(tokens[0].kind, "variable");
        assert_eq!(tokens[0].style, "php-keyword");
        assert_eq!(tokens[0].content, "$this");
        assert_eq!(tokens[1].kind, "operator");
        assert_eq!(tokens[2].kind, "t_string");
        assert_eq!(tokens[4].style, "php-variable");
        assert_eq!(tokens[4].content, "$name");
    }

    #[test]
    fn test_double_colon_and_words() {
        let found = kinds("Foo::bar(PDO, STDIN)");
        assert_eq!(found[0], ("t_string", "php-t_string".to_string()));
        assert_eq!(found[1], ("t_double_colon", "php-operator".to_string()));
        assert_eq!(found[3], ("(", "php-punctuation".to_string()));
        assert_eq!(found[4], ("t_string", "php-predefined-class".to_string()));
        assert_eq!(found[6], ("atom", "php-predefined-constant".to_string()));
    }

    #[test]
    fn test_line_comment_stops_before_close_tag() {
        let tokens = lex(PhpState::default(), "# note ?>");
        assert_eq!(tokens[0].style, "php-comment");
        assert_eq!(tokens[0].content, "# note ");
        assert_eq!(tokens[1].content, "?>");
    }

    #[test]
    fn test_strings_span_lines() {
        let mut stream = CharacterStream::from_text("\"one\ntwo\" 'x'");
        let mut tokenizer = Tokenizer::new(PhpState::default());

        let first = tokenizer.next(&mut stream).unwrap().unwrap();
        assert_eq!(first.kind, "string_not_terminated");
        assert_eq!(first.style, "php-string-double-quoted");
        assert_eq!(tokenizer.state().inside, PhpInside::String('"'));

        tokenizer.next(&mut stream).unwrap();
        let second = tokenizer.next(&mut stream).unwrap().unwrap();
        assert_eq!(second.kind, "string");
        assert_eq!(second.content, "two\"");

        let third = tokenizer.next(&mut stream).unwrap().unwrap();
        assert_eq!(third.style, "php-string-single-quoted");
        assert_eq!(tokenizer.state().inside, PhpInside::Code);
    }

    #[test]
    fn test_heredoc() {
        let tokens = lex(PhpState::default(), "$a = <<<EOT\nbody $x\nEOT;\n");
        let found: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is_whitespace())
            .map(|t| (t.kind, t.content.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("variable", "$a"),
                ("operator", "="),
                ("<<<", "<<<"),
                ("string_not_terminated", "EOT"),
                ("string_not_terminated", "body $x"),
                ("string", "EOT"),
                (";", ";"),
            ]
        );
    }

    #[test]
    fn test_nowdoc_identifier_is_unquoted() {
        let mut stream = CharacterStream::from_text("<<<'RAW'\n");
        let mut tokenizer = Tokenizer::new(PhpState::default());
        tokenizer.next(&mut stream).unwrap();
        let opening = tokenizer.next(&mut stream).unwrap().unwrap();
        assert_eq!(opening.content, "'RAW'");
        assert_eq!(opening.style, "php-string-single-quoted");
        assert_eq!(
            tokenizer.state().inside,
            PhpInside::Heredoc {
                identifier: "RAW".to_string(),
                nowdoc: true
            }
        );
    }

    #[test]
    fn test_heredoc_closer_must_end_the_line() {
        let tokens = lex(PhpState::default(), "<<<EOT\nEOTX\nEOT\n");
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind.starts_with("string"))
            .map(|t| t.kind)
            .collect();
        assert_eq!(strings, vec!["string_not_terminated", "string_not_terminated", "string"]);
    }

    fn lex_to_end(text: &str) -> (PhpInside, Vec<crate::tokens::Token>) {
        let mut stream = CharacterStream::from_text(text);
        let mut tokenizer = Tokenizer::new(PhpState::default());
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next(&mut stream).unwrap() {
            tokens.push(token);
        }
        (tokenizer.state().inside.clone(), tokens)
    }

    #[test]
    fn test_heredoc_closer_allows_semicolon_and_blanks() {
        for closer in ["EOT\n", "EOT;\n", "EOT \n", "EOT; \n", "EOT;\t\n", "EOT;", "EOT"] {
            let text = format!("<<<EOT\nx\n{}", closer);
            let (inside, tokens) = lex_to_end(&text);
            assert_eq!(inside, PhpInside::Code, "closer {:?}", closer);

            let spelled: String = tokens.iter().map(|t| t.value.as_str()).collect();
            assert_eq!(spelled, text);
            let end = tokens.iter().find(|t| t.kind == "string").unwrap();
            assert_eq!(end.content, "EOT");
            if closer.starts_with("EOT;") {
                assert!(tokens.iter().any(|t| t.kind == ";"), "closer {:?}", closer);
            }
        }
    }

    #[test]
    fn test_heredoc_closer_with_trailing_text_stays_open() {
        for line in ["EOTX\n", "EOT; x\n", "EOT;;\n", "EOT x"] {
            let text = format!("<<<EOT\n{}", line);
            let (inside, tokens) = lex_to_end(&text);
            assert_matches::assert_matches!(inside, PhpInside::Heredoc { .. }, "line {:?}", line);
            let spelled: String = tokens.iter().map(|t| t.value.as_str()).collect();
            assert_eq!(spelled, text);
        }
    }

    #[test]
    fn test_bad_heredoc_start() {
        let tokens = lex(PhpState::default(), "<<<1");
        assert_eq!(tokens[1].kind, "error");
        assert_eq!(tokens[1].style, "syntax-error");
    }
}
