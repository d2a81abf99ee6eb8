//! Incremental, resumable tokenizers and parsers for editor highlighting
//!
//! Text flows through a [`CharacterStream`] into a language [`Tokenizer`],
//! then through a [`LanguageParser`] that restyles tokens and attaches an
//! indentation rule to every newline. Cloning a parser at a newline gives a
//! [`Checkpoint`] from which parsing can resume later.

pub mod config;
#[macro_use]
pub mod logging;
pub mod grammar;
pub mod lexical;
pub mod mixed;
pub mod stream;
pub mod syntax;
pub mod tokens;

// Re-export key types for library consumers
pub use grammar::{Checkpoint, GrammarError, GrammarOptions, GrammarRegistry, GrammarResult, Language};
pub use mixed::{Embedded, MixedKind, MixedParser};
pub use stream::{CharacterStream, StreamError, StreamResult};
pub use syntax::LanguageParser;
pub use tokens::{Indentation, Token, Tokenizer};
