//! CSS parser
//!
//! CSS does not nest, so two flags are enough: whether we are between braces
//! and whether a declaration has started since the last `;`.

use super::LanguageParser;
use crate::grammar::GrammarOptions;
use crate::lexical::CssState;
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{Indentation, Token, Tokenizer, WHITESPACE};

#[derive(Debug, Clone)]
pub struct CssParser {
    tokens: Tokenizer<CssState>,
    in_braces: bool,
    in_rule: bool,
    base: usize,
    unit: usize,
}

fn indentation(in_braces: bool, in_rule: bool, base: usize, unit: usize) -> Indentation {
    Indentation::new(move |next_chars, _| {
        if !in_braces || next_chars.starts_with('}') {
            base
        } else if in_rule {
            base + 2 * unit
        } else {
            base + unit
        }
    })
}

impl CssParser {
    pub fn new(base_column: usize, options: &GrammarOptions) -> Self {
        Self {
            tokens: Tokenizer::new(CssState::default()),
            in_braces: false,
            in_rule: false,
            base: base_column,
            unit: options.indent_unit,
        }
    }

    pub fn in_braces(&self) -> bool {
        self.in_braces
    }

    pub fn in_rule(&self) -> bool {
        self.in_rule
    }

    fn restyle(&self, token: &mut Token) {
        let style = match token.style.as_str() {
            "css-identifier" if !self.in_braces => "css-selector",
            "css-identifier" if self.in_rule => "css-value",
            "css-hash" if self.in_rule => "css-colorcode",
            "css-hash" => "css-selector",
            _ => return,
        };
        token.style = style.to_string();
    }

    fn track(&mut self, token: &Token) {
        match token.content.as_str() {
            "{" => self.in_braces = true,
            "}" => {
                self.in_braces = false;
                self.in_rule = false;
            }
            ";" if self.in_braces => self.in_rule = false,
            _ if self.in_braces && token.style != "css-comment" && token.kind != WHITESPACE => {
                self.in_rule = true;
            }
            _ => {}
        }
    }
}

impl LanguageParser for CssParser {
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(mut token) = self.tokens.next(stream)? else {
            return Ok(None);
        };
        self.restyle(&mut token);
        if token.is_newline() {
            token.indentation = Some(indentation(self.in_braces, self.in_rule, self.base, self.unit));
        }
        self.track(&token);
        Ok(Some(token))
    }

    fn reset_line(&mut self) {}

    fn boxed_clone(&self) -> Box<dyn LanguageParser> {
        Box::new(self.clone())
    }
}
