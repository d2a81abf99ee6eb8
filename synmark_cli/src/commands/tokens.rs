//! `synmark tokens`: dump the token sequence of one file, straight from a
//! fresh parser with no session or cache involved.

use super::CommandContext;
use crate::collectors::SourceFile;
use crate::error::{CliError, CliResult};
use crate::output::{write_json, OutputFormat};
use serde::Serialize;
use std::io::Write;
use synmark_engine::stream::is_inline_whitespace;
use synmark_engine::{CharacterStream, GrammarOptions, Language};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    /// 1-based line the token starts on
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    pub content: String,
    pub value: String,
    /// For newline tokens, the column the following line should start at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

pub fn tokenize_file(ctx: &CommandContext, source: &SourceFile) -> CliResult<Vec<TokenRecord>> {
    let text = std::fs::read_to_string(&source.path).map_err(|source_err| CliError::Read {
        path: source.path.clone(),
        source: source_err,
    })?;
    tokenize_text(ctx, source.language, &text)
}

pub fn tokenize_text(
    ctx: &CommandContext,
    language: Language,
    text: &str,
) -> CliResult<Vec<TokenRecord>> {
    let options = GrammarOptions::default().with_indent_unit(ctx.preferences.indent_unit);
    let mut parser = language.make(0, &options)?;
    let mut stream = CharacterStream::from_text(text);
    let lines: Vec<&str> = text.split('\n').collect();

    let mut records = Vec::new();
    let mut line = 0;
    while let Some(token) = parser.next(&mut stream)? {
        let newline = token.is_newline();
        let indent = if newline {
            let next = lines.get(line + 1).copied().unwrap_or("");
            let rest = next.trim_start_matches(is_inline_whitespace);
            let current = next.chars().count() - rest.chars().count();
            token.indentation.as_ref().map(|rule| rule.compute(rest, current))
        } else {
            None
        };
        records.push(TokenRecord {
            line: line + 1,
            kind: token.kind.to_string(),
            style: token.style,
            content: token.content,
            value: token.value,
            indent,
        });
        if newline {
            line += 1;
        }
    }
    Ok(records)
}

pub fn run(ctx: &CommandContext, source: &SourceFile, out: &mut dyn Write) -> CliResult<usize> {
    let records = tokenize_file(ctx, source)?;
    match ctx.format {
        OutputFormat::Json => write_json(out, &records)?,
        OutputFormat::Text => {
            for record in &records {
                write!(
                    out,
                    "{:>5}  {:<20} {:<28} {:?}",
                    record.line, record.kind, record.style, record.value
                )?;
                match record.indent {
                    Some(column) => writeln!(out, "  -> {}", column)?,
                    None => writeln!(out)?,
                }
            }
        }
    }
    Ok(records.len())
}
