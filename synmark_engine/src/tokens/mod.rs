//! Token model and the generic tokenizer driver
//!
//! Every grammar in this crate produces [`Token`] values through the same
//! [`Tokenizer`] wrapper. The wrapper owns the parts every language shares:
//!
//! - **Newlines** are always a token of their own, with `content == "\n"`.
//! - **Leading whitespace** at the read position becomes an aggregated
//!   whitespace token with empty content.
//! - **Trailing whitespace** after any other token is folded into that token's
//!   `value`, so `value` is `content` plus the inline whitespace after it.
//!
//! Languages only supply a [`TokenState`]: a small enum whose `read` step
//! inspects the stream and either returns a [`PartialToken`] or changes state
//! and asks to be run again. Because the state enum is the only thing that
//! persists between tokens (besides the stream position), cloning a tokenizer
//! at a line boundary is enough to resume tokenizing that line later.
//!
//! ## Type tags and styles
//!
//! Tokens carry a `kind` (grammar-level type tag such as `"variable"` or
//! `"operator"`) and a `style` (the CSS-like class the editor renders, such as
//! `"js-variable"`). Parsers routinely rewrite `style`, never `kind`.

pub mod token;
pub mod tokenizer;

pub use token::{Indentation, PartialToken, Token, WHITESPACE};
pub use tokenizer::{TokenState, Tokenizer};
