//! Generic tokenizer driver wrapped around a per-language state

use super::token::{PartialToken, Token, WHITESPACE};
use crate::config::compile_time::tokenizer::MAX_STATE_TRANSITIONS;
use crate::log_error;
use crate::logging::codes;
use crate::stream::{is_inline_whitespace, CharacterStream, StreamError};

/// One language's tokenizer state.
///
/// `read` either produces a token or changes `self` and returns `Ok(None)`,
/// in which case the driver runs it again.
pub trait TokenState: Clone + Send + Sync + std::fmt::Debug {
    fn read(&mut self, stream: &mut CharacterStream) -> Result<Option<PartialToken>, StreamError>;
}

#[derive(Debug, Clone)]
pub struct Tokenizer<S: TokenState> {
    state: S,
}

impl<S: TokenState> Tokenizer<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Next token, or `Ok(None)` once the stream is exhausted
    pub fn next(&mut self, stream: &mut CharacterStream) -> Result<Option<Token>, StreamError> {
        if !stream.more() {
            return Ok(None);
        }

        if stream.equals('\n') {
            stream.next()?;
            return Ok(Some(take(PartialToken::plain(WHITESPACE), stream)));
        }

        let partial = if stream.matches_predicate(is_inline_whitespace) {
            PartialToken::plain(WHITESPACE)
        } else {
            self.run_state(stream)?
        };

        Ok(Some(take(partial, stream)))
    }

    fn run_state(&mut self, stream: &mut CharacterStream) -> Result<PartialToken, StreamError> {
        for _ in 0..MAX_STATE_TRANSITIONS {
            if let Some(partial) = self.state.read(stream)? {
                return Ok(partial);
            }
        }
        log_error!(codes::stream::TOKENIZER_STALLED, "tokenizer state loop did not produce a token",
            "state" => format!("{:?}", self.state),
            "transitions" => MAX_STATE_TRANSITIONS
        );
        Err(StreamError::TokenizerStalled {
            transitions: MAX_STATE_TRANSITIONS,
        })
    }
}

/// Finish a token: commit its text, then fold trailing inline whitespace into `value`
fn take(partial: PartialToken, stream: &mut CharacterStream) -> Token {
    let mut content = partial.content.unwrap_or_default();
    content.push_str(&stream.commit());
    if !content.ends_with('\n') {
        stream.consume_while(is_inline_whitespace);
    }
    let mut value = content.clone();
    value.push_str(&stream.commit());

    Token {
        kind: partial.kind,
        style: partial.style,
        content,
        value,
        indentation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Words and single punctuation characters
    #[derive(Debug, Clone)]
    struct Words;

    impl TokenState for Words {
        fn read(&mut self, stream: &mut CharacterStream) -> Result<Option<PartialToken>, StreamError> {
            if stream.matches_predicate(|ch| ch.is_alphanumeric()) {
                stream.consume_while(|ch| ch.is_alphanumeric());
                return Ok(Some(PartialToken::plain("word")));
            }
            stream.next()?;
            Ok(Some(PartialToken::plain("punct")))
        }
    }

    /// Never produces anything
    #[derive(Debug, Clone)]
    struct Spinning;

    impl TokenState for Spinning {
        fn read(&mut self, _stream: &mut CharacterStream) -> Result<Option<PartialToken>, StreamError> {
            Ok(None)
        }
    }

    fn collect(text: &str) -> Vec<Token> {
        let mut stream = CharacterStream::from_text(text);
        let mut tokenizer = Tokenizer::new(Words);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next(&mut stream).unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_trailing_whitespace_goes_into_value() {
        let tokens = collect("foo  bar;");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].content, "foo");
        assert_eq!(tokens[0].value, "foo  ");
        assert_eq!(tokens[2].kind, "punct");
    }

    #[test]
    fn test_newline_is_its_own_token() {
        let tokens = collect("a \n  b");
        let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.content.as_str())).collect();
        assert_eq!(
            kinds,
            vec![("word", "a"), (WHITESPACE, "\n"), (WHITESPACE, ""), ("word", "b")]
        );
        assert_eq!(tokens[0].value, "a ");
        assert_eq!(tokens[1].value, "\n");
        assert_eq!(tokens[2].value, "  ");
    }

    #[test]
    fn test_values_reconstruct_the_input() {
        let text = "  x = y(1,\t2)\n\n z ";
        let rebuilt: String = collect(text).iter().map(|t| t.value.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_end_of_input() {
        let mut stream = CharacterStream::from_text("");
        let mut tokenizer = Tokenizer::new(Words);
        assert_matches!(tokenizer.next(&mut stream), Ok(None));
    }

    #[test]
    fn test_stalled_state_is_reported() {
        let mut stream = CharacterStream::from_text("x");
        let mut tokenizer = Tokenizer::new(Spinning);
        assert_matches!(
            tokenizer.next(&mut stream),
            Err(StreamError::TokenizerStalled { .. })
        );
    }
}
