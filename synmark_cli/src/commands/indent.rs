//! `synmark indent`: re-indent whole files with their grammar's rules

use super::CommandContext;
use crate::collectors::SourceFile;
use crate::error::CliResult;
use crate::output::{write_json, OutputFormat};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use synmark_engine::Language;
use synmark_session::IndentChange;

#[derive(Debug, Clone, Serialize)]
pub struct FileIndent {
    pub path: PathBuf,
    pub language: Language,
    pub changes: Vec<IndentChange>,
    pub written: bool,
    #[serde(skip)]
    pub text: String,
}

/// How `run` treats the re-indented text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentMode {
    /// Print the re-indented text
    Print,
    /// Save files that changed
    Write,
    /// Only report which lines would move
    Check,
}

pub fn indent_file(ctx: &CommandContext, source: &SourceFile, write: bool) -> CliResult<FileIndent> {
    let mut session = ctx.open_session(source)?;
    let changes = session.reindent_document()?;
    let written = write && !changes.is_empty();
    if written {
        session.document().save(&source.path)?;
        info!("Re-indented {} lines of {}", changes.len(), source.path.display());
    }
    Ok(FileIndent {
        path: source.path.clone(),
        language: source.language,
        changes,
        written,
        text: session.document().text(),
    })
}

/// Returns whether any file had lines that moved
pub fn run(
    ctx: &CommandContext,
    sources: &[SourceFile],
    mode: IndentMode,
    out: &mut dyn Write,
) -> CliResult<bool> {
    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        results.push(indent_file(ctx, source, mode == IndentMode::Write)?);
    }
    let changed = results.iter().any(|r| !r.changes.is_empty());

    match (ctx.format, mode) {
        (OutputFormat::Json, _) => write_json(out, &results)?,
        (OutputFormat::Text, IndentMode::Print) => {
            for result in &results {
                writeln!(out, "{}", result.text)?;
            }
        }
        (OutputFormat::Text, _) => {
            for result in &results {
                for change in &result.changes {
                    writeln!(
                        out,
                        "{}:{}: indent {} -> {}",
                        result.path.display(),
                        change.line + 1,
                        change.old,
                        change.new
                    )?;
                }
            }
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ctx() -> CommandContext {
        let mut ctx = CommandContext::default();
        ctx.preferences.indent_unit = 2;
        ctx
    }

    fn css(dir: &TempDir) -> SourceFile {
        let path = dir.path().join("site.css");
        fs::write(&path, "a {\ncolor: red;\n}").unwrap();
        SourceFile {
            path,
            language: Language::Css,
        }
    }

    #[test]
    fn test_check_mode_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let source = css(&dir);
        let mut out = Vec::new();
        let changed = run(&ctx(), &[source.clone()], IndentMode::Check, &mut out).unwrap();
        assert!(changed);
        assert!(String::from_utf8(out).unwrap().contains("site.css:2: indent 0 -> 2"));
        assert_eq!(fs::read_to_string(&source.path).unwrap(), "a {\ncolor: red;\n}");
    }

    #[test]
    fn test_write_mode_saves() {
        let dir = TempDir::new().unwrap();
        let source = css(&dir);
        let result = indent_file(&ctx(), &source, true).unwrap();
        assert!(result.written);
        assert_eq!(
            fs::read_to_string(&source.path).unwrap(),
            "a {\n  color: red;\n}"
        );

        // A second run finds nothing to move
        let again = indent_file(&ctx(), &source, true).unwrap();
        assert!(again.changes.is_empty());
        assert!(!again.written);
    }

    #[test]
    fn test_print_mode() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        run(&ctx(), &[css(&dir)], IndentMode::Print, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a {\n  color: red;\n}\n");
    }
}
