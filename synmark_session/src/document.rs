//! # Document Line Store
//!
//! Lines of text with a dirty flag each. Edits mark the touched lines dirty;
//! a highlight pass clears the flag once it has re-parsed the line.

use crate::error::{SessionError, SessionResult};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use synmark_engine::logging::codes;
use synmark_engine::{log_error, CharacterStream};

#[derive(Debug, Clone)]
struct Line {
    text: Arc<str>,
    dirty: bool,
}

impl Line {
    fn new(text: &str) -> Self {
        Self {
            text: Arc::from(text),
            dirty: true,
        }
    }
}

/// An editable document. There is always at least one line.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    lines: Vec<Line>,
}

impl Document {
    pub fn from_text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: text.split('\n').map(Line::new).collect(),
        }
    }

    pub fn load(path: &Path) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            log_error!(codes::session::DOCUMENT_IO_ERROR, "Failed to read document",
                "path" => path.display(),
                "error" => &e
            );
            SessionError::io(path, e)
        })?;
        Ok(Self::from_text(&path.display().to_string(), &text))
    }

    pub fn save(&self, path: &Path) -> SessionResult<()> {
        std::fs::write(path, self.text()).map_err(|e| {
            log_error!(codes::session::DOCUMENT_IO_ERROR, "Failed to write document",
                "path" => path.display(),
                "error" => &e
            );
            SessionError::io(path, e)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_ref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn line(&self, line: usize) -> SessionResult<&str> {
        self.lines
            .get(line)
            .map(|l| l.text.as_ref())
            .ok_or_else(|| SessionError::line_out_of_range(line, self.lines.len()))
    }

    pub fn is_dirty(&self, line: usize) -> bool {
        self.lines.get(line).map_or(false, |l| l.dirty)
    }

    pub fn first_dirty(&self) -> Option<usize> {
        self.lines.iter().position(|l| l.dirty)
    }

    pub fn dirty_count(&self) -> usize {
        self.lines.iter().filter(|l| l.dirty).count()
    }

    pub fn mark_dirty(&mut self, line: usize) -> SessionResult<()> {
        self.check_line(line)?;
        self.lines[line].dirty = true;
        Ok(())
    }

    pub fn mark_all_dirty(&mut self) {
        for line in &mut self.lines {
            line.dirty = true;
        }
    }

    /// Mark `line` and everything after it dirty; lines past the end are ignored
    pub(crate) fn mark_dirty_from(&mut self, line: usize) {
        for l in self.lines.iter_mut().skip(line) {
            l.dirty = true;
        }
    }

    pub(crate) fn mark_clean(&mut self, line: usize) {
        if let Some(l) = self.lines.get_mut(line) {
            l.dirty = false;
        }
    }

    pub fn set_line(&mut self, line: usize, text: &str) -> SessionResult<()> {
        self.check_line(line)?;
        // Text with newlines replaces the line with several
        self.lines.splice(line..line + 1, text.split('\n').map(Line::new));
        Ok(())
    }

    /// Insert lines before `at`; `at == line_count()` appends
    pub fn insert_lines(&mut self, at: usize, texts: &[&str]) -> SessionResult<()> {
        if at > self.lines.len() {
            return Err(SessionError::line_out_of_range(at, self.lines.len()));
        }
        self.lines.splice(at..at, texts.iter().map(|t| Line::new(t)));
        // The line after the insertion now follows different text
        if let Some(next) = self.lines.get_mut(at + texts.len()) {
            next.dirty = true;
        }
        Ok(())
    }

    /// Remove a range of lines. Removing every line leaves one empty line.
    pub fn remove_lines(&mut self, range: Range<usize>) -> SessionResult<()> {
        if range.start > range.end || range.end > self.lines.len() {
            return Err(SessionError::line_out_of_range(range.end, self.lines.len()));
        }
        let start = range.start;
        self.lines.drain(range);
        if self.lines.is_empty() {
            self.lines.push(Line::new(""));
        }
        if let Some(next) = self.lines.get_mut(start) {
            next.dirty = true;
        }
        Ok(())
    }

    /// Character stream over the document from the start of `line` onward.
    /// Every line but the last ends in a newline, each in its own chunk.
    pub fn stream_from(&self, line: usize) -> SessionResult<CharacterStream> {
        self.check_line(line)?;
        let last = self.lines.len() - 1;
        let chunks: Vec<(Arc<str>, bool)> = self.lines[line..]
            .iter()
            .enumerate()
            .map(|(i, l)| (Arc::clone(&l.text), line + i < last))
            .collect();
        Ok(CharacterStream::new(chunks.into_iter().map(|(text, newline)| {
            let mut chunk = text.to_string();
            if newline {
                chunk.push('\n');
            }
            chunk
        })))
    }

    fn check_line(&self, line: usize) -> SessionResult<()> {
        if line >= self.lines.len() {
            return Err(SessionError::line_out_of_range(line, self.lines.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn clean(doc: &mut Document) {
        for line in 0..doc.line_count() {
            doc.mark_clean(line);
        }
    }

    #[test]
    fn test_lines_and_text() {
        let doc = Document::from_text("a.js", "a\nb\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(2).unwrap(), "");
        assert_eq!(doc.text(), "a\nb\n");
        assert_eq!(doc.dirty_count(), 3);
    }

    #[test]
    fn test_line_out_of_range() {
        let doc = Document::from_text("a.js", "a");
        assert_matches!(
            doc.line(3),
            Err(SessionError::LineOutOfRange { line: 3, line_count: 1 })
        );
    }

    #[test]
    fn test_edits_mark_lines_dirty() {
        let mut doc = Document::from_text("a.js", "a\nb\nc");
        clean(&mut doc);
        doc.set_line(1, "x").unwrap();
        assert_eq!(doc.first_dirty(), Some(1));
        clean(&mut doc);

        doc.insert_lines(1, &["y", "z"]).unwrap();
        assert_eq!(doc.text(), "a\ny\nz\nx\nc");
        assert!(doc.is_dirty(1) && doc.is_dirty(2) && doc.is_dirty(3));
        assert!(!doc.is_dirty(0) && !doc.is_dirty(4));
        clean(&mut doc);

        doc.remove_lines(1..3).unwrap();
        assert_eq!(doc.text(), "a\nx\nc");
        assert_eq!(doc.first_dirty(), Some(1));
    }

    #[test]
    fn test_mark_dirty_from() {
        let mut doc = Document::from_text("a.js", "a\nb\nc");
        clean(&mut doc);
        doc.mark_dirty_from(1);
        assert_eq!(doc.first_dirty(), Some(1));
        assert_eq!(doc.dirty_count(), 2);
        clean(&mut doc);
        doc.mark_dirty_from(7);
        assert_eq!(doc.dirty_count(), 0);
    }

    #[test]
    fn test_set_line_with_newlines_splits() {
        let mut doc = Document::from_text("a.js", "a\nb");
        doc.set_line(0, "x\ny").unwrap();
        assert_eq!(doc.text(), "x\ny\nb");

        let mut single = Document::from_text("a.js", "a");
        single.set_line(0, "p\nq").unwrap();
        assert_eq!(single.text(), "p\nq");
    }

    #[test]
    fn test_remove_everything_leaves_one_line() {
        let mut doc = Document::from_text("a.js", "a\nb");
        doc.remove_lines(0..2).unwrap();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_stream_from_line() {
        let doc = Document::from_text("a.js", "a\nb\nc");
        let mut stream = doc.stream_from(1).unwrap();
        let mut text = String::new();
        while stream.peek().is_some() {
            text.extend(stream.next().unwrap());
        }
        assert_eq!(text, "b\nc");
        assert_eq!(stream.commit(), "b\nc");
    }

    #[test]
    fn test_load_and_save() {
        let dir = std::env::temp_dir().join(format!("synmark-doc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page.css");
        std::fs::write(&path, "a {\n}\n").unwrap();

        let mut doc = Document::load(&path).unwrap();
        doc.set_line(1, "  }").unwrap();
        doc.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a {\n  }\n");

        let missing = Document::load(&dir.join("missing.css"));
        assert_matches!(missing, Err(SessionError::Io { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
