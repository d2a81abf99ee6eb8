//! Grammar registry
//!
//! Maps language names and file extensions to parsers, carries the options a
//! parser is built with, and wraps parser values as line checkpoints.

pub mod checkpoint;
pub mod error;
pub mod language;
pub mod options;

pub use checkpoint::Checkpoint;
pub use error::{GrammarError, GrammarResult};
pub use language::{GrammarRegistry, Language};
pub use options::GrammarOptions;
