//! # File System Source Collector
//!
//! Turns command line inputs into a list of source files with a grammar each.
//! Files named explicitly must have a known language; directories are walked
//! and files with unrecognised extensions are skipped.

use crate::error::{CliError, CliResult};
use log::debug;
use std::path::{Path, PathBuf};
use synmark_engine::Language;
use walkdir::WalkDir;

/// A file to process and the grammar to process it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

#[derive(Debug, Clone, Default)]
pub struct FileSystemCollector {
    /// Overrides the extension lookup for every collected file
    language: Option<Language>,
    max_depth: Option<usize>,
}

impl FileSystemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn collect(&self, inputs: &[PathBuf]) -> CliResult<Vec<SourceFile>> {
        let mut sources = Vec::new();
        for input in inputs {
            if input.is_file() {
                sources.push(self.collect_file(input)?);
            } else if input.is_dir() {
                let found = self.collect_directory(input)?;
                if found.is_empty() {
                    return Err(CliError::NoSources {
                        path: input.clone(),
                    });
                }
                sources.extend(found);
            } else {
                return Err(CliError::InputNotFound {
                    path: input.clone(),
                });
            }
        }
        Ok(sources)
    }

    fn collect_file(&self, path: &Path) -> CliResult<SourceFile> {
        let language = match self.language {
            Some(language) => language,
            None => Language::from_path(path)?,
        };
        Ok(SourceFile {
            path: path.to_path_buf(),
            language,
        })
    }

    fn collect_directory(&self, dir: &Path) -> CliResult<Vec<SourceFile>> {
        let mut walker = WalkDir::new(dir).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut sources = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| CliError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            match Language::from_path(path) {
                Ok(detected) => sources.push(SourceFile {
                    path: path.to_path_buf(),
                    language: self.language.unwrap_or(detected),
                }),
                Err(_) => debug!("Skipping {}", path.display()),
            }
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "a();\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "plain\n").unwrap();
        fs::create_dir(dir.path().join("styles")).unwrap();
        fs::write(dir.path().join("styles").join("site.css"), "a {}\n").unwrap();
        dir
    }

    #[test]
    fn test_walks_directories_and_skips_unknown() {
        let dir = tree();
        let sources = FileSystemCollector::new()
            .collect(&[dir.path().to_path_buf()])
            .unwrap();
        let languages: Vec<_> = sources.iter().map(|s| s.language).collect();
        assert_eq!(languages, vec![Language::JavaScript, Language::Css]);
    }

    #[test]
    fn test_max_depth() {
        let dir = tree();
        let sources = FileSystemCollector::new()
            .with_max_depth(1)
            .collect(&[dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_explicit_file_needs_known_language() {
        let dir = tree();
        let notes = dir.path().join("notes.txt");
        let err = FileSystemCollector::new().collect(&[notes.clone()]);
        assert!(matches!(err, Err(CliError::Grammar(_))));

        let sources = FileSystemCollector::new()
            .with_language(Some(Language::Sql))
            .collect(&[notes])
            .unwrap();
        assert_eq!(sources[0].language, Language::Sql);
    }

    #[test]
    fn test_missing_and_empty_inputs() {
        let dir = TempDir::new().unwrap();
        let collector = FileSystemCollector::new();
        assert!(matches!(
            collector.collect(&[dir.path().join("gone.js")]),
            Err(CliError::InputNotFound { .. })
        ));
        assert!(matches!(
            collector.collect(&[dir.path().to_path_buf()]),
            Err(CliError::NoSources { .. })
        ));
    }
}
