//! Token values handed from tokenizers through parsers to the editor

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Type tag of newline and whitespace tokens in every grammar
pub const WHITESPACE: &str = "whitespace";

type IndentFn = dyn Fn(&str, usize) -> usize + Send + Sync;

/// Column rule for the line after a newline token.
///
/// Called with the text that starts the next line (after its leading
/// whitespace) and that line's current indentation. Pure: equal inputs give
/// equal columns.
#[derive(Clone)]
pub struct Indentation(Arc<IndentFn>);

impl Indentation {
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(&str, usize) -> usize + Send + Sync + 'static,
    {
        Self(Arc::new(rule))
    }

    /// Always the same column
    pub fn fixed(column: usize) -> Self {
        Self::new(move |_, _| column)
    }

    pub fn compute(&self, next_chars: &str, current_indent: usize) -> usize {
        (self.0)(next_chars, current_indent)
    }
}

impl fmt::Debug for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Indentation(..)")
    }
}

/// What a tokenizer state produces before the driver fills in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialToken {
    pub kind: &'static str,
    pub style: String,
    /// Text already taken from the stream by the state itself
    pub content: Option<String>,
}

impl PartialToken {
    pub fn new(kind: &'static str, style: impl Into<String>) -> Self {
        Self {
            kind,
            style: style.into(),
            content: None,
        }
    }

    /// Kind and style are the same string
    pub fn plain(kind: &'static str) -> Self {
        Self::new(kind, kind)
    }

    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub style: String,
    /// Meaningful text
    pub content: String,
    /// `content` plus the inline whitespace that followed it
    pub value: String,
    #[serde(skip)]
    pub indentation: Option<Indentation>,
}

impl Token {
    pub fn is_newline(&self) -> bool {
        self.content == "\n"
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == WHITESPACE
    }

    /// Append a class to the style, e.g. `"syntax-error"`
    pub fn add_style(&mut self, class: &str) {
        if self.style.is_empty() {
            self.style.push_str(class);
        } else {
            self.style.push(' ');
            self.style.push_str(class);
        }
    }

    /// Number of characters in `value`, used for column tracking
    pub fn width(&self) -> usize {
        self.value.chars().count()
    }
}

impl PartialEq for Token {
    /// Indentation rules are closures and compare by their presence only
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.style == other.style
            && self.content == other.content
            && self.value == other.value
            && self.indentation.is_some() == other.indentation.is_some()
    }
}
