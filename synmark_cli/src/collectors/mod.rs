//! # Source Collectors

pub mod filesystem;

pub use filesystem::{FileSystemCollector, SourceFile};
