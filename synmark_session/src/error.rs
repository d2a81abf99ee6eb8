//! # Session Errors

use synmark_engine::logging::{codes, Code};
use synmark_engine::{GrammarError, StreamError};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Line {line} is out of range: document has {line_count} lines")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("No checkpoint stored at the start of line {line}")]
    CheckpointMissing { line: usize },

    /// Token boundaries stopped lining up with document lines. The pass that
    /// raised it must be restarted from an earlier checkpoint.
    #[error("Parser out of sync at line {line}: {detail}")]
    OutOfSync { line: usize, detail: String },

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    pub fn line_out_of_range(line: usize, line_count: usize) -> Self {
        Self::LineOutOfRange { line, line_count }
    }

    pub fn out_of_sync(line: usize, detail: impl Into<String>) -> Self {
        Self::OutOfSync {
            line,
            detail: detail.into(),
        }
    }

    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            SessionError::LineOutOfRange { .. } => codes::session::LINE_OUT_OF_RANGE,
            SessionError::CheckpointMissing { .. } => codes::session::CHECKPOINT_MISSING,
            SessionError::OutOfSync { .. } => codes::stream::OUT_OF_SYNC,
            SessionError::Stream(e) => e.error_code(),
            SessionError::Grammar(e) => e.error_code(),
            SessionError::Io { .. } => codes::session::DOCUMENT_IO_ERROR,
        }
    }

    /// Whether a later pass from an earlier checkpoint can be expected to succeed
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
