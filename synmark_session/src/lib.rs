//! # Synmark Session
//!
//! The editor side of incremental highlighting: a line store, a checkpoint
//! per line, budgeted highlight passes and indentation.

pub mod cache;
pub mod document;
pub mod error;
pub mod highlighter;
pub mod indent;
pub mod report;

// Convenience re-exports
pub use cache::{CheckpointCache, LineStart, StyledSpan};
pub use document::Document;
pub use error::{SessionError, SessionResult};
pub use highlighter::{HighlightSession, PassBudget};
pub use indent::{IndentChange, ShiftDirection};
pub use report::{PassReport, StopReason};

pub mod prelude {
    pub use crate::{
        Document, HighlightSession, IndentChange, PassBudget, PassReport, SessionError,
        SessionResult, ShiftDirection, StopReason, StyledSpan,
    };
    pub use synmark_engine::config::{EditorPreferences, TabMode};
    pub use synmark_engine::{GrammarOptions, Language};
}
