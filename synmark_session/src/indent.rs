//! # Indentation
//!
//! Re-indents lines with the rule stored at the start of each line, or by
//! one indent unit when the tab mode is `shift`.

use crate::error::{SessionError, SessionResult};
use crate::highlighter::HighlightSession;
use crate::report::StopReason;
use serde::{Deserialize, Serialize};
use synmark_engine::config::TabMode;
use synmark_engine::logging::codes;
use synmark_engine::stream::is_inline_whitespace;
use synmark_engine::{log_debug, log_success};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentChange {
    pub line: usize,
    pub old: usize,
    pub new: usize,
}

impl IndentChange {
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

impl HighlightSession {
    /// Re-indent `line`. With a direction and tab mode `shift`, the line
    /// moves one unit; otherwise the grammar decides.
    pub fn indent_line(
        &mut self,
        line: usize,
        direction: Option<ShiftDirection>,
    ) -> SessionResult<IndentChange> {
        let text = self.document.line(line)?.to_string();
        let rest = text.trim_start_matches(is_inline_whitespace);
        let current = text.chars().count() - rest.chars().count();
        let unit = self.preferences.indent_unit;

        let new = match (self.preferences.tab_mode, direction) {
            (TabMode::Shift, Some(ShiftDirection::Right)) => current + unit,
            (TabMode::Shift, Some(ShiftDirection::Left)) => current.saturating_sub(unit),
            _ if line == 0 => 0,
            _ => {
                let report = self.highlight_to(line)?;
                if report.stop == StopReason::BacktrackLimit {
                    return Err(SessionError::CheckpointMissing { line });
                }
                let start = self
                    .cache
                    .line_start(line)
                    .ok_or(SessionError::CheckpointMissing { line })?;
                start.indentation.compute(rest, current)
            }
        };

        let change = IndentChange { line, old: current, new };
        if change.changed() {
            let indented = format!("{}{}", " ".repeat(new), rest);
            self.document.set_line(line, &indented)?;
            log_debug!("Re-indented line", "line" => line, "from" => current, "to" => new);
        }
        Ok(change)
    }

    /// Re-indent every line from the top, returning the lines that moved
    pub fn reindent_document(&mut self) -> SessionResult<Vec<IndentChange>> {
        let mut changes = Vec::new();
        for line in 0..self.document.line_count() {
            let change = self.indent_line(line, None)?;
            if change.changed() {
                changes.push(change);
            }
        }
        log_success!(codes::success::DOCUMENT_REINDENTED, "Document re-indented",
            "lines" => self.document.line_count(),
            "changed" => changes.len()
        );
        Ok(changes)
    }

    pub fn is_electric(&self, ch: char) -> bool {
        self.language().electric_chars().contains(ch)
    }

    /// Called after `ch` was typed on `line`; electric characters re-indent it
    pub fn after_typed(&mut self, line: usize, ch: char) -> SessionResult<Option<IndentChange>> {
        if !self.is_electric(ch) {
            return Ok(None);
        }
        self.indent_line(line, None).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use synmark_engine::config::EditorPreferences;
    use synmark_engine::Language;

    fn session(language: Language, text: &str, tab_mode: TabMode) -> HighlightSession {
        let preferences = EditorPreferences {
            indent_unit: 2,
            tab_mode,
            ..EditorPreferences::default()
        };
        HighlightSession::new(language, Document::from_text("test", text), preferences).unwrap()
    }

    #[test]
    fn test_indent_line_uses_grammar() {
        let mut s = session(Language::JavaScript, "if (x) {\ny();\n      }", TabMode::Indent);
        let change = s.indent_line(1, None).unwrap();
        assert_eq!(change, IndentChange { line: 1, old: 0, new: 2 });
        assert_eq!(s.document().line(1).unwrap(), "  y();");
        let close = s.indent_line(2, None).unwrap();
        assert_eq!(close.new, 0);
        assert_eq!(s.document().line(2).unwrap(), "}");
    }

    #[test]
    fn test_first_line_goes_to_column_zero() {
        let mut s = session(Language::Css, "   a {}", TabMode::Indent);
        let change = s.indent_line(0, None).unwrap();
        assert_eq!(change.new, 0);
        assert_eq!(s.document().line(0).unwrap(), "a {}");
    }

    #[test]
    fn test_shift_mode() {
        let mut s = session(Language::JavaScript, "a;\n   b;", TabMode::Shift);
        s.indent_line(1, Some(ShiftDirection::Right)).unwrap();
        assert_eq!(s.document().line(1).unwrap(), "     b;");
        s.indent_line(1, Some(ShiftDirection::Left)).unwrap();
        s.indent_line(1, Some(ShiftDirection::Left)).unwrap();
        s.indent_line(1, Some(ShiftDirection::Left)).unwrap();
        assert_eq!(s.document().line(1).unwrap(), "b;");
        // No direction falls back to the grammar
        s.indent_line(1, None).unwrap();
        assert_eq!(s.document().line(1).unwrap(), "b;");
    }

    #[test]
    fn test_unchanged_line_stays_clean() {
        let mut s = session(Language::JavaScript, "a;\nb;", TabMode::Indent);
        s.highlight_all().unwrap();
        let change = s.indent_line(1, None).unwrap();
        assert!(!change.changed());
        assert_eq!(s.document().dirty_count(), 0);
    }

    #[test]
    fn test_reindent_document() {
        let text = "function f(a) {\nif (a) {\nreturn [1,\n2];\n}\n}";
        let mut s = session(Language::JavaScript, text, TabMode::Indent);
        let changes = s.reindent_document().unwrap();
        assert_eq!(
            s.document().text(),
            "function f(a) {\n  if (a) {\n    return [1,\n            2];\n  }\n}"
        );
        assert_eq!(changes.len(), 4);
    }

    #[test]
    fn test_reindent_mixed_document() {
        let text = "<div>\n<script>\nif (a)\nb();\n</script>\n</div>";
        let mut s = session(Language::Html, text, TabMode::Indent);
        s.reindent_document().unwrap();
        assert_eq!(
            s.document().text(),
            "<div>\n  <script>\n    if (a)\n      b();\n  </script>\n</div>"
        );
    }

    #[test]
    fn test_electric_chars() {
        let mut s = session(Language::JavaScript, "if (x) {\n    }", TabMode::Indent);
        assert!(s.is_electric('}'));
        assert!(!s.is_electric('x'));
        assert_eq!(s.after_typed(1, 'x').unwrap(), None);
        let change = s.after_typed(1, '}').unwrap().unwrap();
        assert_eq!(change.new, 0);
    }
}
