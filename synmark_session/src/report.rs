//! # Highlight Pass Reports
//!
//! What one highlight pass did and why it stopped. Serialisable so editors
//! and the CLI can emit it as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synmark_engine::Language;

/// Why a highlight pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No dirty lines before the pass started
    NothingDirty,
    /// Enough consecutive lines came out unchanged
    Clean,
    /// The time budget ran out
    TimeBudget,
    /// The line budget ran out
    LineBudget,
    /// The requested line has an up to date checkpoint
    TargetReached,
    /// The whole rest of the document was parsed
    EndOfDocument,
    /// No checkpoint within the allowed backtracking distance
    BacktrackLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::NothingDirty => "nothing_dirty",
            StopReason::Clean => "clean",
            StopReason::TimeBudget => "time_budget",
            StopReason::LineBudget => "line_budget",
            StopReason::TargetReached => "target_reached",
            StopReason::EndOfDocument => "end_of_document",
            StopReason::BacktrackLimit => "backtrack_limit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    pub document: String,
    pub language: Language,

    /// Line parsing resumed at
    pub start_line: usize,

    /// Lines walked back from the first dirty line to find a checkpoint
    pub backtracked: usize,

    pub lines_parsed: usize,

    /// Tokens produced, newlines included
    pub tokens: usize,

    pub stop: StopReason,

    /// Dirty lines left for later passes
    pub remaining_dirty: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl PassReport {
    pub fn new(document: &str, language: Language, start_line: usize) -> Self {
        let now = Utc::now();
        Self {
            document: document.to_string(),
            language,
            start_line,
            backtracked: 0,
            lines_parsed: 0,
            tokens: 0,
            stop: StopReason::NothingDirty,
            remaining_dirty: 0,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    pub fn finalize(&mut self, stop: StopReason, remaining_dirty: usize) {
        self.stop = stop;
        self.remaining_dirty = remaining_dirty;
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
    }

    /// Whether the document is fully highlighted after this pass
    pub fn is_complete(&self) -> bool {
        self.remaining_dirty == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} [{}]: {} lines from line {}, {} tokens, stopped ({}), {} dirty left, {}ms",
            self.document,
            self.language,
            self.lines_parsed,
            self.start_line,
            self.tokens,
            self.stop.as_str(),
            self.remaining_dirty,
            self.duration_ms
        )
    }
}
