//! Per-grammar options
//!
//! A value handed to each parser at construction; there is no module-level
//! configuration state.

use super::error::{GrammarError, GrammarResult};
use crate::config::compile_time::indentation::{DEFAULT_INDENT_UNIT, MAX_INDENT_UNIT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarOptions {
    /// Columns per indentation level
    pub indent_unit: usize,

    /// JavaScript: parse a single expression instead of statements
    pub json: bool,

    /// XML: treat HTML void elements as self-closing and leave `pre` alone
    pub use_html_kludges: bool,

    /// XML: indent CDATA continuation lines past the opening marker
    pub align_cdata: bool,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            json: false,
            use_html_kludges: true,
            align_cdata: false,
        }
    }
}

impl GrammarOptions {
    pub fn with_indent_unit(mut self, indent_unit: usize) -> Self {
        self.indent_unit = indent_unit;
        self
    }

    pub fn validate(&self) -> GrammarResult<()> {
        if self.indent_unit == 0 || self.indent_unit > MAX_INDENT_UNIT {
            return Err(GrammarError::invalid_option(
                "indent_unit",
                &format!("must be between 1 and {}", MAX_INDENT_UNIT),
            ));
        }
        Ok(())
    }
}
