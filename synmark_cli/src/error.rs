use std::path::PathBuf;
use synmark_engine::{GrammarError, StreamError};
use synmark_session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("No recognised source files under {}", path.display())]
    NoSources { path: PathBuf },

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InputNotFound { .. } | CliError::NoSources { .. } => 2,
            CliError::Config { .. } => 3,
            CliError::Grammar(_) => 4,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
