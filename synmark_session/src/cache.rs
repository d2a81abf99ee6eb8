//! # Per-line Checkpoint Cache
//!
//! Entry `n` holds what a highlight pass learned about line `n`: the parser
//! checkpoint and indentation rule from the newline that ended line `n - 1`,
//! and the styled spans the line was rendered with. Line 0 never has a
//! checkpoint; parsing it starts from a fresh parser.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use synmark_engine::{Checkpoint, Indentation, Token};

/// One rendered token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSpan {
    /// Token text including trailing whitespace
    pub text: String,
    pub style: String,
}

impl From<&Token> for StyledSpan {
    fn from(token: &Token) -> Self {
        Self {
            text: token.value.clone(),
            style: token.style.clone(),
        }
    }
}

/// Parser state at the start of a line
#[derive(Debug, Clone)]
pub struct LineStart {
    pub checkpoint: Checkpoint,
    /// Rule for indenting this line, given its leading text
    pub indentation: Indentation,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    start: Option<LineStart>,
    spans: Option<Vec<StyledSpan>>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckpointCache {
    entries: Vec<Entry>,
}

impl CheckpointCache {
    pub fn with_lines(count: usize) -> Self {
        Self {
            entries: vec![Entry::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn line_start(&self, line: usize) -> Option<&LineStart> {
        self.entries.get(line).and_then(|e| e.start.as_ref())
    }

    pub fn spans(&self, line: usize) -> Option<&[StyledSpan]> {
        self.entries.get(line).and_then(|e| e.spans.as_deref())
    }

    pub fn store_line_start(&mut self, line: usize, start: LineStart) {
        if line == 0 {
            return;
        }
        self.ensure(line);
        self.entries[line].start = Some(start);
    }

    /// Store the spans for `line`; returns whether they differ from the
    /// previously stored ones
    pub fn store_spans(&mut self, line: usize, spans: Vec<StyledSpan>) -> bool {
        self.ensure(line);
        let entry = &mut self.entries[line];
        let changed = entry.spans.as_ref() != Some(&spans);
        entry.spans = Some(spans);
        changed
    }

    /// Nearest line at or before `line` that parsing can start from, walking
    /// back at most `max_back` lines
    pub fn resume_point(&self, line: usize, max_back: Option<usize>) -> Option<usize> {
        let mut candidate = line.min(self.entries.len().saturating_sub(1));
        let mut walked = 0;
        loop {
            if candidate == 0 || self.line_start(candidate).is_some() {
                return Some(candidate);
            }
            if max_back.map_or(false, |limit| walked >= limit) {
                return None;
            }
            candidate -= 1;
            walked += 1;
        }
    }

    pub fn insert_lines(&mut self, at: usize, count: usize) {
        let at = at.min(self.entries.len());
        self.entries
            .splice(at..at, std::iter::repeat_with(Entry::default).take(count));
    }

    pub fn remove_lines(&mut self, range: Range<usize>) {
        let end = range.end.min(self.entries.len());
        let start = range.start.min(end);
        self.entries.drain(start..end);
        if let Some(first) = self.entries.first_mut() {
            first.start = None;
        }
    }

    /// Match the document's line count after an edit
    pub fn resize(&mut self, count: usize) {
        self.entries.resize_with(count, Entry::default);
    }

    /// Forget everything from `line` onward
    pub fn invalidate_from(&mut self, line: usize) {
        for entry in self.entries.iter_mut().skip(line) {
            *entry = Entry::default();
        }
    }

    pub fn clear(&mut self) {
        self.invalidate_from(0);
    }

    fn ensure(&mut self, line: usize) {
        if self.entries.len() <= line {
            self.entries.resize_with(line + 1, Entry::default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synmark_engine::{GrammarOptions, Language};

    fn line_start() -> LineStart {
        let parser = Language::JavaScript
            .make(0, &GrammarOptions::default())
            .unwrap();
        LineStart {
            checkpoint: Checkpoint::capture(parser.as_ref()),
            indentation: Indentation::fixed(0),
        }
    }

    fn span(text: &str) -> StyledSpan {
        StyledSpan {
            text: text.to_string(),
            style: "js-variable".to_string(),
        }
    }

    #[test]
    fn test_line_zero_has_no_checkpoint() {
        let mut cache = CheckpointCache::with_lines(3);
        cache.store_line_start(0, line_start());
        assert!(cache.line_start(0).is_none());
        assert_eq!(cache.resume_point(0, Some(0)), Some(0));
    }

    #[test]
    fn test_resume_point_backtracks() {
        let mut cache = CheckpointCache::with_lines(10);
        cache.store_line_start(3, line_start());
        assert_eq!(cache.resume_point(7, None), Some(3));
        assert_eq!(cache.resume_point(7, Some(4)), Some(3));
        assert_eq!(cache.resume_point(7, Some(3)), None);
        assert_eq!(cache.resume_point(2, Some(5)), Some(0));
    }

    #[test]
    fn test_store_spans_reports_changes() {
        let mut cache = CheckpointCache::with_lines(1);
        assert!(cache.store_spans(0, vec![span("a")]));
        assert!(!cache.store_spans(0, vec![span("a")]));
        assert!(cache.store_spans(0, vec![span("b")]));
    }

    #[test]
    fn test_invalidate_from() {
        let mut cache = CheckpointCache::with_lines(4);
        for line in 1..4 {
            cache.store_line_start(line, line_start());
        }
        cache.invalidate_from(2);
        assert!(cache.line_start(1).is_some());
        assert!(cache.line_start(2).is_none());
        assert!(cache.line_start(3).is_none());
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_insert_and_remove_shift_entries() {
        let mut cache = CheckpointCache::with_lines(3);
        cache.store_line_start(2, line_start());
        cache.insert_lines(1, 2);
        assert_eq!(cache.len(), 5);
        assert!(cache.line_start(4).is_some());
        cache.remove_lines(0..3);
        assert_eq!(cache.len(), 2);
        assert!(cache.line_start(1).is_some());
        cache.remove_lines(0..1);
        assert!(cache.line_start(0).is_none());
    }
}
