//! Output formats shared by the commands

use crate::error::CliResult;
use serde::Serialize;
use std::io::Write;
use synmark_session::StyledSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Text,
    /// One pretty-printed JSON document
    Json,
}

pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// `[style]text` per span; unstyled text is written as is
pub fn render_spans(spans: &[StyledSpan]) -> String {
    let mut line = String::new();
    for span in spans {
        if span.style.is_empty() {
            line.push_str(&span.text);
        } else {
            line.push('[');
            line.push_str(&span.style);
            line.push(']');
            line.push_str(&span.text);
        }
    }
    line
}
