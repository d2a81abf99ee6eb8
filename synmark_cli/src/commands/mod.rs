//! # Commands
//!
//! One module per subcommand of the `synmark` binary. Each takes the
//! collected sources and writes its result to the given writer.

pub mod highlight;
pub mod indent;
pub mod tokens;

pub use highlight::{highlight_file, FileHighlight};
pub use indent::{indent_file, FileIndent};
pub use tokens::{tokenize_file, TokenRecord};

use crate::collectors::SourceFile;
use crate::error::CliResult;
use crate::output::OutputFormat;
use synmark_engine::config::EditorPreferences;
use synmark_session::{Document, HighlightSession};

/// Settings every command runs with
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub preferences: EditorPreferences,
    pub format: OutputFormat,
}

impl CommandContext {
    pub fn new(preferences: EditorPreferences, format: OutputFormat) -> Self {
        Self {
            preferences,
            format,
        }
    }

    pub fn open_session(&self, source: &SourceFile) -> CliResult<HighlightSession> {
        let document = Document::load(&source.path)?;
        let session =
            HighlightSession::new(source.language, document, self.preferences.clone())?;
        Ok(session)
    }
}
