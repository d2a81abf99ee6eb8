//! `synmark highlight`: run budgeted passes over each file until no line is
//! dirty, then report the passes and optionally the styled lines.

use super::CommandContext;
use crate::collectors::SourceFile;
use crate::error::CliResult;
use crate::output::{render_spans, write_json, OutputFormat};
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use synmark_engine::Language;
use synmark_session::{PassBudget, PassReport, StyledSpan};

#[derive(Debug, Clone, Serialize)]
pub struct FileHighlight {
    pub path: PathBuf,
    pub language: Language,
    pub passes: Vec<PassReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Vec<StyledSpan>>,
}

impl FileHighlight {
    pub fn lines_parsed(&self) -> usize {
        self.passes.iter().map(|p| p.lines_parsed).sum()
    }

    pub fn tokens(&self) -> usize {
        self.passes.iter().map(|p| p.tokens).sum()
    }
}

/// Highlight one file. `pass_lines` caps each pass by lines instead of the
/// configured pass time.
pub fn highlight_file(
    ctx: &CommandContext,
    source: &SourceFile,
    pass_lines: Option<usize>,
    with_spans: bool,
) -> CliResult<FileHighlight> {
    let mut session = ctx.open_session(source)?;
    let budget = match pass_lines {
        Some(lines) => PassBudget::lines(lines.max(1)),
        None => PassBudget::timed(Duration::from_millis(ctx.preferences.pass_time_ms)),
    };

    let mut passes = Vec::new();
    while session.document().first_dirty().is_some() {
        passes.push(session.highlight(&budget)?);
    }

    let lines = if with_spans {
        (0..session.document().line_count())
            .map(|line| session.line_spans(line).map(<[_]>::to_vec).unwrap_or_default())
            .collect()
    } else {
        Vec::new()
    };

    Ok(FileHighlight {
        path: source.path.clone(),
        language: source.language,
        passes,
        lines,
    })
}

pub fn run(
    ctx: &CommandContext,
    sources: &[SourceFile],
    pass_lines: Option<usize>,
    with_spans: bool,
    out: &mut dyn Write,
) -> CliResult<Vec<FileHighlight>> {
    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        let result = highlight_file(ctx, source, pass_lines, with_spans)?;
        info!(
            "Highlighted {} in {} passes",
            source.path.display(),
            result.passes.len()
        );
        results.push(result);
    }

    match ctx.format {
        OutputFormat::Json => write_json(out, &results)?,
        OutputFormat::Text => {
            for result in &results {
                writeln!(
                    out,
                    "{} ({}): {} passes, {} lines, {} tokens",
                    result.path.display(),
                    result.language,
                    result.passes.len(),
                    result.lines_parsed(),
                    result.tokens()
                )?;
                for (number, spans) in result.lines.iter().enumerate() {
                    writeln!(out, "{:>5} | {}", number + 1, render_spans(spans))?;
                }
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source(dir: &TempDir, name: &str, text: &str, language: Language) -> SourceFile {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        SourceFile { path, language }
    }

    #[test]
    fn test_line_budget_splits_passes() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, "a.js", "a;\nb;\nc;\nd;\ne;", Language::JavaScript);
        let result = highlight_file(&CommandContext::default(), &src, Some(2), false).unwrap();
        assert_eq!(result.passes.len(), 3);
        assert_eq!(result.lines_parsed(), 5);
        assert!(result.passes.last().unwrap().is_complete());
        assert!(result.lines.is_empty());
    }

    #[test]
    fn test_text_output_with_spans() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, "q.sql", "select 1;", Language::Sql);
        let mut out = Vec::new();
        run(&CommandContext::default(), &[src], None, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(sql): 1 passes, 1 lines"));
        assert!(text.contains("    1 | ["));
        assert!(text.contains("select"));
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir, "s.css", "a {\n  color: red;\n}", Language::Css);
        let ctx = CommandContext {
            format: OutputFormat::Json,
            ..CommandContext::default()
        };
        let mut out = Vec::new();
        run(&ctx, &[src], None, true, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["language"], "css");
        assert_eq!(json[0]["lines"].as_array().unwrap().len(), 3);
        assert_eq!(json[0]["passes"][0]["stop"], "end_of_document");
    }
}
