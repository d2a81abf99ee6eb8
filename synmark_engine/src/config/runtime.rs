// RUNTIME PREFERENCES (User Experience)

use super::compile_time::{highlight, indentation};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;

/// How the Tab key re-indents a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabMode {
    /// Ask the grammar's indentation function for the column.
    Indent,
    /// Move the line one indent unit left or right.
    Shift,
}

impl TabMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "indent" => Some(TabMode::Indent),
            "shift" => Some(TabMode::Shift),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabMode::Indent => "indent",
            TabMode::Shift => "shift",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Columns per indentation level
    pub indent_unit: usize,

    /// Tab key behaviour
    pub tab_mode: TabMode,

    /// Time budget of one highlight pass in milliseconds
    pub pass_time_ms: u64,

    /// Delay between two background highlight passes in milliseconds
    pub pass_delay_ms: u64,

    /// How many lines a pass may walk back looking for a stored checkpoint
    pub max_backtrack_lines: usize,

    /// Re-indent every line after a document is loaded
    pub reindent_on_load: bool,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            indent_unit: env::var(env_vars::INDENT_UNIT)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|unit| *unit >= 1 && *unit <= indentation::MAX_INDENT_UNIT)
                .unwrap_or(indentation::DEFAULT_INDENT_UNIT),
            tab_mode: env::var(env_vars::TAB_MODE)
                .ok()
                .and_then(|v| TabMode::parse(&v))
                .unwrap_or(TabMode::Indent),
            pass_time_ms: env::var(env_vars::PASS_TIME_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(highlight::DEFAULT_PASS_TIME_MS),
            pass_delay_ms: env::var(env_vars::PASS_DELAY_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(highlight::DEFAULT_PASS_DELAY_MS),
            max_backtrack_lines: env::var(env_vars::MAX_BACKTRACK)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(highlight::DEFAULT_MAX_BACKTRACK_LINES),
            reindent_on_load: env::var(env_vars::REINDENT_ON_LOAD)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of human readable text
    pub use_structured_logging: bool,

    /// Write events to stderr at all
    pub enable_console_logging: bool,

    /// Events below this level are dropped
    pub min_log_level: LogLevel,

    /// Attach the current document name to events
    pub include_document_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            include_document_context: env::var(env_vars::LOGGING_INCLUDE_DOCUMENT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub editor: EditorPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Editor
    pub const INDENT_UNIT: &str = "SYNMARK_INDENT_UNIT";
    pub const TAB_MODE: &str = "SYNMARK_TAB_MODE";
    pub const PASS_TIME_MS: &str = "SYNMARK_PASS_TIME_MS";
    pub const PASS_DELAY_MS: &str = "SYNMARK_PASS_DELAY_MS";
    pub const MAX_BACKTRACK: &str = "SYNMARK_MAX_BACKTRACK";
    pub const REINDENT_ON_LOAD: &str = "SYNMARK_REINDENT_ON_LOAD";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SYNMARK_STRUCTURED_LOGGING";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SYNMARK_CONSOLE_LOGGING";
    pub const LOGGING_MIN_LEVEL: &str = "SYNMARK_LOG_LEVEL";
    pub const LOGGING_INCLUDE_DOCUMENT: &str = "SYNMARK_LOG_DOCUMENT_CONTEXT";
}
