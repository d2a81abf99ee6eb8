//! SQL parser
//!
//! A statement opens a context that lasts until its `;`; parentheses nest
//! inside it. Continuation lines are indented one unit past the statement,
//! or aligned with the first item after an open parenthesis on its line.

use super::LanguageParser;
use crate::grammar::GrammarOptions;
use crate::lexical::SqlState;
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{Indentation, Token, Tokenizer, WHITESPACE};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlContext {
    /// Indentation of the line the context was opened on
    pub indent: usize,
    /// Column just after the opening token
    pub col: usize,
    /// `;` for statements, `)` for parentheses
    pub closer: char,
    /// Width of the opening token
    pub width: usize,
    pub align: Option<bool>,
    pub prev: Option<Arc<SqlContext>>,
}

impl SqlContext {
    fn indent_for(&self, next_chars: &str, unit: usize) -> usize {
        let closing = next_chars.starts_with(self.closer);
        if self.align == Some(true) {
            self.col.saturating_sub(if closing { self.width } else { 0 })
        } else {
            self.indent + if closing { 0 } else { unit }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlParser {
    tokens: Tokenizer<SqlState>,
    context: Option<Arc<SqlContext>>,
    indent: usize,
    col: usize,
    unit: usize,
}

impl SqlParser {
    pub fn new(options: &GrammarOptions) -> Self {
        Self {
            tokens: Tokenizer::new(SqlState::default()),
            context: None,
            indent: 0,
            col: 0,
            unit: options.indent_unit,
        }
    }

    pub fn context(&self) -> Option<&SqlContext> {
        self.context.as_deref()
    }

    fn indentation(&self) -> Indentation {
        let context = self.context.clone();
        let unit = self.unit;
        Indentation::new(move |next_chars, _| {
            context.as_ref().map_or(0, |c| c.indent_for(next_chars, unit))
        })
    }

    fn push_context(&mut self, closer: char, width: usize, align: Option<bool>) {
        self.context = Some(Arc::new(SqlContext {
            indent: self.indent,
            col: self.col,
            closer,
            width,
            align,
            prev: self.context.take(),
        }));
    }

    fn pop_context(&mut self) {
        if let Some(context) = self.context.take() {
            self.context = context.prev.clone();
        }
    }

    fn settle_align(&mut self, align: bool) {
        if let Some(context) = self.context.as_mut() {
            if context.align.is_none() {
                Arc::make_mut(context).align = Some(align);
            }
        }
    }
}

impl LanguageParser for SqlParser {
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(mut token) = self.tokens.next(stream)? else {
            return Ok(None);
        };
        let width = token.width();

        if token.is_newline() {
            self.settle_align(false);
            token.indentation = Some(self.indentation());
            self.indent = 0;
            self.col = 0;
            return Ok(Some(token));
        }
        if token.kind == WHITESPACE {
            if self.col == 0 {
                self.indent = width;
            }
        } else if token.kind != "sql-comment" {
            if self.context.is_none() {
                self.push_context(';', 0, Some(false));
            }
            self.settle_align(true);
        }
        self.col += width;

        match (token.kind, token.content.as_str()) {
            ("sql-punctuation", "(") => self.push_context(')', width, None),
            ("sql-punctuation", ")") => self.pop_context(),
            ("sql-separator", ";") if self.context.as_ref().map_or(false, |c| c.prev.is_none()) => {
                self.pop_context()
            }
            _ => {}
        }
        Ok(Some(token))
    }

    fn reset_line(&mut self) {}

    fn boxed_clone(&self) -> Box<dyn LanguageParser> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tests::{line_indent, parse_all};

    fn parse(text: &str) -> (SqlParser, Vec<Token>) {
        let mut parser = SqlParser::new(&GrammarOptions::default());
        let tokens = parse_all(&mut parser, text);
        (parser, tokens)
    }

    #[test]
    fn test_statement_continuation() {
        let text = "select a\nfrom t\nwhere x = 1;\nselect 2;";
        let (parser, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 2);
        assert_eq!(line_indent(&tokens, text, 3), 0);
        assert!(parser.context().is_none());
    }

    #[test]
    fn test_open_paren_at_line_end() {
        let text = "insert into t values (\n  1,\n)";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 0);
    }

    #[test]
    fn test_aligned_paren_contents() {
        let text = "select count(a,\nb)";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 13);
        let newline = tokens.iter().find(|t| t.is_newline()).unwrap();
        assert_eq!(newline.indentation.as_ref().unwrap().compute(")", 0), 12);
    }

    #[test]
    fn test_comments_do_not_open_statements() {
        let text = "-- note\nselect 1;";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 0);
    }

    #[test]
    fn test_copy_keeps_context() {
        let mut parser = SqlParser::new(&GrammarOptions::default());
        parse_all(&mut parser, "select (\n");
        let copy = parser.clone();
        assert_eq!(copy.context().map(|c| c.closer), Some(')'));
        assert_eq!(copy.context().and_then(|c| c.align), Some(false));
    }
}
