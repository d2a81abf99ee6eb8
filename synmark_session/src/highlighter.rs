//! # Highlight Session
//!
//! Owns a document, its checkpoint cache and the grammar that parses it.
//! A pass resumes from the nearest stored checkpoint at or before the first
//! dirty line and re-parses forward, storing a checkpoint and indentation
//! rule at every newline. It stops on its budget, on reaching a requested
//! line, or once consecutive lines come out unchanged.

use crate::cache::{CheckpointCache, LineStart, StyledSpan};
use crate::document::Document;
use crate::error::{SessionError, SessionResult};
use crate::report::{PassReport, StopReason};
use std::path::Path;
use std::time::{Duration, Instant};
use synmark_engine::config::compile_time::highlight::CLEAN_LINES_BEFORE_STOP;
use synmark_engine::config::EditorPreferences;
use synmark_engine::logging::{codes, with_document_context};
use synmark_engine::{
    log_debug, log_error, log_success, log_warning, CharacterStream, Checkpoint, GrammarOptions,
    GrammarRegistry, Indentation, Language, LanguageParser,
};

/// Limits for one highlight pass
#[derive(Debug, Clone, Default)]
pub struct PassBudget {
    pub time: Option<Duration>,
    pub max_lines: Option<usize>,
    /// Lines a pass may walk back looking for a checkpoint
    pub max_backtrack: Option<usize>,
    /// Parse until this line has an up to date checkpoint, ignoring clean lines
    pub target_line: Option<usize>,
}

impl PassBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn timed(time: Duration) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn lines(max_lines: usize) -> Self {
        Self {
            max_lines: Some(max_lines),
            ..Self::default()
        }
    }

    pub fn to_line(line: usize, max_backtrack: usize) -> Self {
        Self {
            max_backtrack: Some(max_backtrack),
            target_line: Some(line),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct HighlightSession {
    language: Language,
    registry: GrammarRegistry,
    pub(crate) document: Document,
    pub(crate) cache: CheckpointCache,
    pub(crate) preferences: EditorPreferences,
}

impl HighlightSession {
    pub fn new(
        language: Language,
        document: Document,
        preferences: EditorPreferences,
    ) -> SessionResult<Self> {
        let options = GrammarOptions::default().with_indent_unit(preferences.indent_unit);
        let registry = GrammarRegistry::new(options)?;
        // Fail on a bad grammar now rather than on the first pass
        registry.make(language, 0)?;
        let cache = CheckpointCache::with_lines(document.line_count());
        Ok(Self {
            language,
            registry,
            document,
            cache,
            preferences,
        })
    }

    /// Load a file and pick the grammar from its extension
    pub fn open(path: &Path, preferences: EditorPreferences) -> SessionResult<Self> {
        let language = Language::from_path(path)?;
        let document = Document::load(path)?;
        Self::new(language, document, preferences)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cache(&self) -> &CheckpointCache {
        &self.cache
    }

    pub fn preferences(&self) -> &EditorPreferences {
        &self.preferences
    }

    /// Swap grammar options. Everything is re-parsed on the next pass.
    pub fn configure(&mut self, options: GrammarOptions) -> SessionResult<()> {
        self.registry.configure(options)?;
        self.cache.clear();
        self.document.mark_all_dirty();
        Ok(())
    }

    pub fn line_spans(&self, line: usize) -> Option<&[StyledSpan]> {
        self.cache.spans(line)
    }

    pub fn line_start(&self, line: usize) -> Option<&LineStart> {
        self.cache.line_start(line)
    }

    pub fn set_line(&mut self, line: usize, text: &str) -> SessionResult<()> {
        let added = text.matches('\n').count();
        self.document.set_line(line, text)?;
        self.cache.insert_lines(line + 1, added);
        Ok(())
    }

    pub fn insert_lines(&mut self, at: usize, texts: &[&str]) -> SessionResult<()> {
        self.document.insert_lines(at, texts)?;
        self.cache.insert_lines(at, texts.len());
        Ok(())
    }

    pub fn remove_lines(&mut self, range: std::ops::Range<usize>) -> SessionResult<()> {
        self.document.remove_lines(range.clone())?;
        self.cache.remove_lines(range);
        self.cache.resize(self.document.line_count());
        Ok(())
    }

    /// One background pass bounded by the configured pass time
    pub fn highlight_pass(&mut self) -> SessionResult<PassReport> {
        let budget = PassBudget::timed(Duration::from_millis(self.preferences.pass_time_ms));
        self.highlight(&budget)
    }

    /// Make sure `line` has an up to date checkpoint, backtracking no further
    /// than the configured limit
    pub fn highlight_to(&mut self, line: usize) -> SessionResult<PassReport> {
        let budget = PassBudget::to_line(line, self.preferences.max_backtrack_lines);
        self.highlight(&budget)
    }

    /// Passes until no dirty line is left
    pub fn highlight_all(&mut self) -> SessionResult<Vec<PassReport>> {
        let mut reports = Vec::new();
        while self.document.first_dirty().is_some() {
            let report = self.highlight(&PassBudget::unlimited())?;
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn highlight(&mut self, budget: &PassBudget) -> SessionResult<PassReport> {
        let name = self.document.name().to_string();
        with_document_context(&name, || self.run_pass(budget))
    }

    fn run_pass(&mut self, budget: &PassBudget) -> SessionResult<PassReport> {
        let last_line = self.document.line_count() - 1;
        let target = budget.target_line.map(|t| t.min(last_line));

        let Some(begin) = self.first_line_to_parse(target) else {
            let mut report = PassReport::new(self.document.name(), self.language, 0);
            report.finalize(StopReason::NothingDirty, self.document.dirty_count());
            return Ok(report);
        };

        let mut report = PassReport::new(self.document.name(), self.language, begin);
        let Some(from) = self.cache.resume_point(begin, budget.max_backtrack) else {
            log_warning!(codes::session::BACKTRACK_LIMIT_REACHED, "No checkpoint close enough to resume from",
                "line" => begin,
                "max_backtrack" => budget.max_backtrack.unwrap_or(0)
            );
            report.finalize(StopReason::BacktrackLimit, self.document.dirty_count());
            return Ok(report);
        };
        report.start_line = from;
        report.backtracked = begin - from;

        let mut parser = self.resume_parser(from)?;
        let mut stream = self.document.stream_from(from)?;
        let stop = match self.parse_forward(parser.as_mut(), &mut stream, from, target, budget, &mut report) {
            Ok(stop) => stop,
            Err(err) => {
                if let SessionError::OutOfSync { .. } = err {
                    self.discard_from(from);
                }
                return Err(err);
            }
        };

        report.finalize(stop, self.document.dirty_count());
        log_success!(codes::success::HIGHLIGHT_PASS_COMPLETE, "Highlight pass finished",
            "start_line" => report.start_line,
            "lines" => report.lines_parsed,
            "stop" => report.stop.as_str()
        );
        Ok(report)
    }

    /// First line whose parse is out of date, or the target line itself when
    /// it has no checkpoint
    fn first_line_to_parse(&self, target: Option<usize>) -> Option<usize> {
        let dirty = self.document.first_dirty();
        match target {
            Some(t) => match dirty.filter(|&d| d < t) {
                Some(d) => Some(d),
                None if t > 0 && self.cache.line_start(t).is_none() => Some(t),
                None => None,
            },
            None => dirty,
        }
    }

    fn resume_parser(&self, from: usize) -> SessionResult<Box<dyn LanguageParser>> {
        if from == 0 {
            return Ok(self.registry.make(self.language, 0)?);
        }
        let start = self
            .cache
            .line_start(from)
            .ok_or(SessionError::CheckpointMissing { line: from })?;
        log_debug!("Resuming from checkpoint", "line" => from);
        Ok(start.checkpoint.restore())
    }

    fn parse_forward(
        &mut self,
        parser: &mut dyn LanguageParser,
        stream: &mut CharacterStream,
        from: usize,
        target: Option<usize>,
        budget: &PassBudget,
        report: &mut PassReport,
    ) -> SessionResult<StopReason> {
        let clock = Instant::now();
        let mut line = from;
        let mut spans = Vec::new();
        let mut text = String::new();
        let mut clean_run = 0;

        loop {
            let Some(token) = parser.next(stream)? else {
                if line != self.document.line_count() - 1 {
                    return Err(self.out_of_sync(line, "text ended before the last line"));
                }
                self.finish_line(line, std::mem::take(&mut spans), &text)?;
                report.lines_parsed += 1;
                return Ok(StopReason::EndOfDocument);
            };
            report.tokens += 1;

            if !token.is_newline() {
                text.push_str(&token.value);
                spans.push(StyledSpan::from(&token));
                continue;
            }

            let dirty = self.finish_line(line, std::mem::take(&mut spans), &text)?;
            text.clear();
            report.lines_parsed += 1;
            line += 1;
            if line >= self.document.line_count() {
                return Err(self.out_of_sync(line, "newline past the end of the document"));
            }

            let had_start = self.cache.line_start(line).is_some();
            self.cache.store_line_start(
                line,
                LineStart {
                    checkpoint: Checkpoint::capture(parser),
                    indentation: token.indentation.unwrap_or_else(|| Indentation::fixed(0)),
                },
            );
            if dirty || !had_start {
                clean_run = 0;
            } else {
                clean_run += 1;
            }

            if let Some(t) = target {
                if line >= t {
                    return Ok(StopReason::TargetReached);
                }
            } else if clean_run >= CLEAN_LINES_BEFORE_STOP {
                return Ok(StopReason::Clean);
            }
            if budget.time.map_or(false, |limit| clock.elapsed() >= limit) {
                return Ok(StopReason::TimeBudget);
            }
            if budget.max_lines.map_or(false, |max| report.lines_parsed >= max) {
                return Ok(StopReason::LineBudget);
            }
        }
    }

    /// Check a parsed line against the document and record its spans.
    /// Returns whether the line needed re-parsing.
    fn finish_line(&mut self, line: usize, spans: Vec<StyledSpan>, text: &str) -> SessionResult<bool> {
        let expected = self.document.line(line)?;
        if text != expected {
            let detail = format!("tokens spell {:?}, line holds {:?}", text, expected);
            return Err(self.out_of_sync(line, &detail));
        }
        let was_dirty = self.document.is_dirty(line);
        let changed = self.cache.store_spans(line, spans);
        self.document.mark_clean(line);
        Ok(was_dirty || changed)
    }

    fn out_of_sync(&self, line: usize, detail: &str) -> SessionError {
        log_error!(codes::stream::OUT_OF_SYNC, "Parser out of sync with document lines",
            "line" => line,
            "detail" => detail
        );
        SessionError::out_of_sync(line, detail)
    }

    /// Drop checkpoints from `from` on so the next pass restarts earlier
    fn discard_from(&mut self, from: usize) {
        self.cache.invalidate_from(from);
        self.document.mark_dirty_from(from);
    }
}
