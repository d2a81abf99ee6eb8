//! Pull-based character stream over a lazy sequence of text chunks
//!
//! Tokenizers read characters one at a time and call [`CharacterStream::commit`]
//! to collect everything consumed since the previous commit. Chunk boundaries
//! are invisible to callers: lookahead and commit both work across them.

use crate::config::compile_time::tokenizer::MAX_LOOKAHEAD_LENGTH;
use crate::log_warning;
use crate::logging::{codes, Code};
use regex::Regex;

/// Stream failures; each indicates a defect in the chunk producer or a grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("text source ended with uncommitted characters: {pending:?}")]
    PendingAtEndOfStream { pending: String },

    #[error("tokenizer read past the end of input")]
    UnexpectedEnd,

    #[error("tokenizer changed state {transitions} times without producing a token")]
    TokenizerStalled { transitions: usize },
}

impl StreamError {
    pub fn error_code(&self) -> Code {
        match self {
            StreamError::PendingAtEndOfStream { .. } | StreamError::UnexpectedEnd => {
                codes::stream::PENDING_AT_END_OF_STREAM
            }
            StreamError::TokenizerStalled { .. } => codes::stream::TOKENIZER_STALLED,
        }
    }
}

pub type StreamResult<T> = Result<T, StreamError>;

/// Whitespace as the tokenizers see it; newlines are never part of it
pub fn is_inline_whitespace(ch: char) -> bool {
    ch != '\n' && (ch.is_whitespace() || ch == '\u{a0}')
}

pub struct CharacterStream {
    source: Box<dyn Iterator<Item = String>>,
    exhausted: bool,
    /// Chunk being read
    current: Vec<char>,
    /// Read position within `current`
    pos: usize,
    /// Finished chunks not yet committed
    accum: String,
}

impl CharacterStream {
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'static,
    {
        Self {
            source: Box::new(source.into_iter()),
            exhausted: false,
            current: Vec::new(),
            pos: 0,
            accum: String::new(),
        }
    }

    /// Stream over a single in-memory string
    pub fn from_text(text: &str) -> Self {
        Self::new(std::iter::once(text.to_string()))
    }

    /// Moves to the next chunk while the current one is used up.
    /// Returns false when the source has no more text.
    fn ensure_chars(&mut self) -> bool {
        while self.pos == self.current.len() {
            self.accum.extend(self.current.drain(..));
            self.pos = 0;
            if !self.fetch_chunk() {
                return false;
            }
        }
        true
    }

    fn fetch_chunk(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.source.next() {
            Some(chunk) => {
                self.current = chunk.chars().collect();
                true
            }
            None => {
                self.exhausted = true;
                false
            }
        }
    }

    pub fn peek(&mut self) -> Option<char> {
        if !self.ensure_chars() {
            return None;
        }
        Some(self.current[self.pos])
    }

    /// Consume one character.
    ///
    /// `Ok(None)` is a clean end of input. Running out of text while consumed
    /// characters are still uncommitted is a [`StreamError::PendingAtEndOfStream`].
    pub fn next(&mut self) -> Result<Option<char>, StreamError> {
        if !self.ensure_chars() {
            if self.accum.is_empty() {
                return Ok(None);
            }
            return Err(StreamError::PendingAtEndOfStream {
                pending: self.accum.clone(),
            });
        }
        let ch = self.current[self.pos];
        self.pos += 1;
        Ok(Some(ch))
    }

    /// Consume a character the caller already knows is there
    pub fn advance(&mut self) -> Result<char, StreamError> {
        self.next()?.ok_or(StreamError::UnexpectedEnd)
    }

    /// Everything consumed since the previous commit
    pub fn commit(&mut self) -> String {
        let mut taken = std::mem::take(&mut self.accum);
        if self.pos > 0 {
            taken.extend(self.current.drain(..self.pos));
            self.pos = 0;
        }
        taken
    }

    /// Reinsert text at the read position
    pub fn pushback(&mut self, text: &str) {
        let at = self.pos;
        self.current.splice(at..at, text.chars());
    }

    /// Test whether the upcoming characters spell `text`.
    ///
    /// On success with `consume` the characters stay consumed; otherwise the
    /// stream is left exactly where it was, including any chunks pulled in.
    pub fn look_ahead(
        &mut self,
        text: &str,
        consume: bool,
        skip_spaces: bool,
        case_insensitive: bool,
    ) -> bool {
        let mut wanted: Vec<char> = text.chars().collect();
        if wanted.len() > MAX_LOOKAHEAD_LENGTH {
            log_warning!(codes::stream::LOOKAHEAD_TOO_LONG, "look-ahead text rejected",
                "length" => wanted.len(),
                "max" => MAX_LOOKAHEAD_LENGTH
            );
            return false;
        }

        let saved_accum = self.accum.len();
        let saved_pos = self.pos;
        if skip_spaces {
            self.consume_while(|ch| ch.is_whitespace() || ch == '\u{a0}');
        }

        let same = |a: char, b: char| {
            if case_insensitive {
                a.to_lowercase().eq(b.to_lowercase())
            } else {
                a == b
            }
        };

        let mut found = false;
        loop {
            let left = self.current.len() - self.pos;
            if wanted.len() <= left {
                let end = self.pos + wanted.len();
                found = self.current[self.pos..end]
                    .iter()
                    .zip(&wanted)
                    .all(|(a, b)| same(*a, *b));
                self.pos = end;
                break;
            }

            let prefix_matches = self.current[self.pos..]
                .iter()
                .zip(&wanted)
                .all(|(a, b)| same(*a, *b));
            if !prefix_matches {
                break;
            }
            self.accum.extend(self.current.drain(..));
            self.pos = 0;
            if !self.fetch_chunk() {
                break;
            }
            wanted.drain(..left);
        }

        if !(found && consume) {
            let scanned: Vec<char> = self.accum[saved_accum..].chars().collect();
            self.accum.truncate(saved_accum);
            self.current.splice(0..0, scanned);
            self.pos = saved_pos;
        }

        found
    }

    pub fn more(&mut self) -> bool {
        self.peek().is_some()
    }

    pub fn matches_predicate<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        self.peek().map_or(false, predicate)
    }

    /// Consume characters while `predicate` holds
    pub fn consume_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.pos += 1;
        }
    }

    /// True when the next character, as a one-character string, matches `pattern`
    pub fn matches(&mut self, pattern: &Regex) -> bool {
        let mut buffer = [0u8; 4];
        self.peek()
            .map_or(false, |ch| pattern.is_match(ch.encode_utf8(&mut buffer)))
    }

    pub fn consume_while_matches(&mut self, pattern: &Regex) {
        while self.matches(pattern) {
            self.pos += 1;
        }
    }

    pub fn equals(&mut self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    pub fn at_line_end(&mut self) -> bool {
        matches!(self.peek(), None | Some('\n'))
    }
}

impl std::fmt::Debug for CharacterStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterStream")
            .field("pending", &self.accum)
            .field("current", &self.current.iter().collect::<String>())
            .field("pos", &self.pos)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn chunks(parts: &[&str]) -> CharacterStream {
        CharacterStream::new(
            parts
                .iter()
                .map(|part| part.to_string())
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_commit_returns_consumed_text_across_chunks() {
        let mut stream = chunks(&["ab", "", "cd"]);
        assert_eq!(stream.next(), Ok(Some('a')));
        assert_eq!(stream.next(), Ok(Some('b')));
        assert_eq!(stream.next(), Ok(Some('c')));
        assert_eq!(stream.commit(), "abc");
        assert_eq!(stream.peek(), Some('d'));
        assert_eq!(stream.commit(), "");
    }

    #[test]
    fn test_clean_end_of_input() {
        let mut stream = CharacterStream::from_text("x");
        assert_eq!(stream.next(), Ok(Some('x')));
        assert_eq!(stream.commit(), "x");
        assert_eq!(stream.next(), Ok(None));
        assert!(!stream.more());
    }

    #[test]
    fn test_end_with_pending_text_is_an_error() {
        let mut stream = chunks(&["ab"]);
        stream.next().unwrap();
        stream.next().unwrap();
        assert_matches!(
            stream.next(),
            Err(StreamError::PendingAtEndOfStream { pending }) if pending == "ab"
        );
    }

    #[test]
    fn test_pushback_reinserts_at_read_position() {
        let mut stream = CharacterStream::from_text("abc");
        stream.next().unwrap();
        stream.pushback("XY");
        assert_eq!(stream.next(), Ok(Some('X')));
        assert_eq!(stream.next(), Ok(Some('Y')));
        assert_eq!(stream.next(), Ok(Some('b')));
        assert_eq!(stream.commit(), "aXYb");
    }

    #[test]
    fn test_look_ahead_across_chunk_boundary() {
        let mut stream = chunks(&["</scr", "ipt>", "rest"]);
        assert!(stream.look_ahead("</script>", false, false, false));
        assert_eq!(stream.peek(), Some('<'));
        assert!(stream.look_ahead("</SCRIPT>", true, false, true));
        assert_eq!(stream.commit(), "</script>");
        assert_eq!(stream.peek(), Some('r'));
    }

    #[test]
    fn test_failed_look_ahead_restores_position() {
        let mut stream = chunks(&["ab", "cx", "yz"]);
        stream.next().unwrap();
        assert!(!stream.look_ahead("bcd", true, false, false));
        assert_eq!(stream.next(), Ok(Some('b')));
        assert_eq!(stream.commit(), "ab");
        assert!(!stream.look_ahead("cxyzw", false, false, false));
        assert_eq!(stream.peek(), Some('c'));
    }

    #[test]
    fn test_look_ahead_skipping_spaces() {
        let mut stream = CharacterStream::from_text("   ;\n");
        assert!(stream.look_ahead(";", false, true, false));
        assert_eq!(stream.peek(), Some(' '));
        assert!(stream.look_ahead(";", true, true, false));
        assert_eq!(stream.commit(), "   ;");
    }

    #[test]
    fn test_predicate_helpers() {
        let mut stream = CharacterStream::from_text("abc123 \n");
        stream.consume_while(|ch| ch.is_ascii_alphabetic());
        assert_eq!(stream.commit(), "abc");

        let digits = Regex::new("[0-9]").unwrap();
        assert!(stream.matches(&digits));
        stream.consume_while_matches(&digits);
        assert_eq!(stream.commit(), "123");

        assert!(stream.matches_predicate(is_inline_whitespace));
        assert!(stream.equals(' '));
        stream.next().unwrap();
        assert!(stream.at_line_end());
    }

    #[test]
    fn test_error_codes() {
        let error = StreamError::TokenizerStalled { transitions: 64 };
        assert_eq!(error.error_code(), codes::stream::TOKENIZER_STALLED);
    }
}
