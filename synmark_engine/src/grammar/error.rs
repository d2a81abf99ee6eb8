//! Grammar construction errors

use super::language::Language;

pub type GrammarResult<T> = Result<T, GrammarError>;

/// Failures while picking or configuring a grammar. All of them surface when
/// a parser is constructed, never while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("No grammar named '{name}'")]
    UnknownLanguage { name: String },

    #[error("No grammar for files with extension '{extension}'")]
    UnknownExtension { extension: String },

    #[error("Grammar {language} needs {missing}, which is disabled")]
    MissingSubGrammar {
        language: Language,
        missing: Language,
    },

    #[error("Invalid grammar option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },
}

impl GrammarError {
    pub fn unknown_language(name: &str) -> Self {
        Self::UnknownLanguage {
            name: name.to_string(),
        }
    }

    pub fn unknown_extension(extension: &str) -> Self {
        Self::UnknownExtension {
            extension: extension.to_string(),
        }
    }

    pub fn invalid_option(option: &str, reason: &str) -> Self {
        Self::InvalidOption {
            option: option.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::codes::Code {
        use crate::logging::codes;
        match self {
            Self::UnknownLanguage { .. } | Self::UnknownExtension { .. } => {
                codes::grammar::UNKNOWN_LANGUAGE
            }
            Self::MissingSubGrammar { .. } => codes::grammar::MISSING_SUB_GRAMMAR,
            Self::InvalidOption { .. } => codes::grammar::INVALID_OPTION,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        crate::logging::codes::is_recoverable(self.error_code().as_str())
    }
}
