//! Line checkpoints
//!
//! A checkpoint is a frozen copy of a parser taken right after a newline
//! token. Restoring hands out a new clone, so one checkpoint can seed any
//! number of independent parses.

use crate::log_success;
use crate::logging::codes;
use crate::syntax::LanguageParser;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Checkpoint(Arc<Box<dyn LanguageParser>>);

impl Checkpoint {
    pub fn capture(parser: &dyn LanguageParser) -> Self {
        Self(Arc::new(parser.boxed_clone()))
    }

    /// A parser ready to read the line that followed the capture point
    pub fn restore(&self) -> Box<dyn LanguageParser> {
        let mut parser = self.0.boxed_clone();
        parser.reset_line();
        log_success!(codes::success::CHECKPOINT_RESTORED, "Restored parser from checkpoint",
            "parser" => format!("{:p}", Arc::as_ptr(&self.0))
        );
        parser
    }

    /// The frozen parser, for inspection
    pub fn parser(&self) -> &dyn LanguageParser {
        self.0.as_ref().as_ref()
    }

    /// Whether two handles share the same frozen parser
    pub fn ptr_eq(&self, other: &Checkpoint) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarOptions, Language};
    use crate::stream::CharacterStream;
    use crate::tokens::Token;

    /// Parse `text`, capturing a checkpoint after every newline
    fn parse_with_checkpoints(language: Language, text: &str) -> (Vec<Token>, Vec<Checkpoint>) {
        let mut parser = language.make(0, &GrammarOptions::default()).unwrap();
        let mut stream = CharacterStream::from_text(text);
        let mut tokens = Vec::new();
        let mut checkpoints = Vec::new();
        while let Some(token) = parser.next(&mut stream).unwrap() {
            if token.is_newline() {
                checkpoints.push(Checkpoint::capture(parser.as_ref()));
            }
            tokens.push(token);
        }
        (tokens, checkpoints)
    }

    fn parse_rest(checkpoint: &Checkpoint, rest: &str) -> Vec<Token> {
        let mut parser = checkpoint.restore();
        let mut stream = CharacterStream::from_text(rest);
        std::iter::from_fn(|| parser.next(&mut stream).unwrap()).collect()
    }

    const PHP_IN_HTML: &str = "<div>\n<?php\nif ($a) {\n  echo 1;\n}\n?>\n<p>x</p>\n</div>";

    /// Parse one line of `rest` from `checkpoint`, capturing again at its newline
    fn parse_line(checkpoint: &Checkpoint, rest: &str) -> (Vec<Token>, Checkpoint) {
        let mut parser = checkpoint.restore();
        let mut stream = CharacterStream::from_text(rest);
        let mut tokens = Vec::new();
        while let Some(token) = parser.next(&mut stream).unwrap() {
            let newline = token.is_newline();
            tokens.push(token);
            if newline {
                break;
            }
        }
        (tokens, Checkpoint::capture(parser.as_ref()))
    }

    fn tail_after_line(tokens: &[Token], line: usize) -> Vec<Token> {
        let start = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_newline())
            .nth(line)
            .map(|(i, _)| i + 1)
            .unwrap();
        tokens[start..].to_vec()
    }

    #[test]
    fn test_resumption_matches_full_parse() {
        let cases = [
            (Language::JavaScript, "function f(x) {\n  var y = x;\n  return y + z;\n}\nf(1);"),
            (Language::Php, "if ($a) {\n  echo $a;\n}\n$b = 1;"),
            (Language::Css, "a {\n  color: red;\n}\nb { margin: 0 }"),
            (Language::Html, "<div>\n<script>\nvar a;\n</script>\n</div>"),
            (Language::Sql, "select a,\n  b\nfrom t;\nselect 1;"),
            (Language::PhpHtml, PHP_IN_HTML),
        ];
        for (language, text) in cases {
            let (tokens, checkpoints) = parse_with_checkpoints(language, text);
            for (line, checkpoint) in checkpoints.iter().enumerate() {
                let rest: String = text.split_inclusive('\n').skip(line + 1).collect();
                assert_eq!(
                    parse_rest(checkpoint, &rest),
                    tail_after_line(&tokens, line),
                    "{} resumed after line {}",
                    language,
                    line
                );
            }
        }
    }

    #[test]
    fn test_reparsing_a_line_is_idempotent() {
        for language in [Language::PhpHtml, Language::Php, Language::JavaScript] {
            let text = match language {
                Language::PhpHtml => PHP_IN_HTML,
                Language::Php => "function f($a) {\n  $s = <<<EOT\nx\nEOT;\n}\n",
                _ => "if (a) {\n  /* open\n  */ b();\n}\n",
            };
            let (_, checkpoints) = parse_with_checkpoints(language, text);
            let lines: Vec<&str> = text.split_inclusive('\n').collect();
            for (line, checkpoint) in checkpoints.iter().enumerate() {
                let from_next: String = lines[line + 1..].concat();
                let (first, first_checkpoint) = parse_line(checkpoint, &from_next);
                let (second, second_checkpoint) = parse_line(checkpoint, &from_next);
                assert_eq!(first, second, "{} line {}", language, line + 1);

                let after: String = lines.get(line + 2..).map(|l| l.concat()).unwrap_or_default();
                let resumed = parse_rest(&first_checkpoint, &after);
                assert_eq!(resumed, parse_rest(&second_checkpoint, &after));
                if let Some(stored) = checkpoints.get(line + 1) {
                    assert_eq!(resumed, parse_rest(stored, &after), "{} line {}", language, line + 1);
                }
            }
        }
    }

    #[test]
    fn test_restore_is_logged() {
        let capture = crate::logging::test_capture();
        let (_, checkpoints) = parse_with_checkpoints(Language::Css, "a {\n}");
        checkpoints[0].restore();
        assert!(capture.has_success_with_code(codes::success::CHECKPOINT_RESTORED));
    }

    #[test]
    fn test_restore_twice_is_independent() {
        let (_, checkpoints) = parse_with_checkpoints(Language::JavaScript, "if (a) {\n");
        let checkpoint = &checkpoints[0];
        let first = parse_rest(checkpoint, "b();\n}");
        let second = parse_rest(checkpoint, "b();\n}");
        assert_eq!(first, second);
        let shared = checkpoint.clone();
        assert!(shared.ptr_eq(checkpoint));
    }

    #[test]
    fn test_block_comment_state_survives_checkpoint() {
        let (_, checkpoints) = parse_with_checkpoints(Language::JavaScript, "/* comment\n");
        let tokens = parse_rest(&checkpoints[0], " still comment */");
        let comment = tokens.iter().find(|t| !t.is_whitespace()).unwrap();
        assert_eq!(comment.style, "js-comment");
    }

    #[test]
    fn test_unterminated_string_state_survives_checkpoint() {
        let (tokens, checkpoints) = parse_with_checkpoints(Language::JavaScript, "a('\n");
        assert!(tokens.iter().any(|t| t.kind == "string_not_terminated"));
        let rest = parse_rest(&checkpoints[0], "b'");
        assert_eq!(rest[0].style, "js-string");
    }
}
