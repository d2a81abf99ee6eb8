//! # Synmark CLI
//!
//! Commands behind the `synmark` binary: batch highlighting, token dumps and
//! re-indentation of source files on disk.

pub mod collectors;
pub mod commands;
pub mod error;
pub mod output;

pub use collectors::{FileSystemCollector, SourceFile};
pub use commands::CommandContext;
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

use std::path::Path;
use synmark_engine::config::RuntimeConfig;

/// Read a TOML runtime config. Missing keys keep their defaults.
pub fn load_runtime_config(path: &Path) -> CliResult<RuntimeConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|e| CliError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
