//! Mixed-mode parsing: HTML hosting JavaScript, CSS and PHP
//!
//! The XML parser (with HTML kludges) runs as the host. After the `>` of a
//! `<script>` or `<style>` tag, or after a `<?php` processing token, tokens
//! come from an embedded parser until the stream reaches the region's closing
//! marker. The marker is matched textually, so it also ends a region when it
//! shows up inside an embedded token; such a token is cut short and the rest
//! is pushed back onto the stream for the host.

use crate::grammar::GrammarOptions;
use crate::logging::codes;
use crate::{log_debug, log_success};
use crate::stream::{CharacterStream, StreamResult};
use crate::syntax::{CssParser, JsParser, LanguageParser, PhpParser, XmlParser};
use crate::tokens::{Indentation, Token};

/// Which embedded languages the host recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedKind {
    /// `<script>` and `<style>`
    Html,
    /// `<script>`, `<style>` and `<?php ... ?>`
    PhpHtml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedded {
    Script,
    Style,
    Php,
}

impl Embedded {
    /// Text that ends the region, compared case-insensitively
    pub fn close_marker(self) -> &'static str {
        match self {
            Embedded::Script => "</script",
            Embedded::Style => "</style",
            Embedded::Php => "?>",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Embedded::Script => "javascript",
            Embedded::Style => "css",
            Embedded::Php => "php",
        }
    }
}

/// Progress through a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
enum TagState {
    Outside,
    /// After `<`, before the tag name
    Opened,
    Named(String),
}

#[derive(Debug, Clone)]
enum LocalParser {
    Js(JsParser),
    Css(CssParser),
    Php(PhpParser),
}

impl LocalParser {
    fn as_dyn(&mut self) -> &mut dyn LanguageParser {
        match self {
            LocalParser::Js(parser) => parser,
            LocalParser::Css(parser) => parser,
            LocalParser::Php(parser) => parser,
        }
    }
}

#[derive(Debug, Clone)]
struct Region {
    embedded: Embedded,
    parser: LocalParser,
    /// Indentation of the host line that opened the region
    base_indent: usize,
}

#[derive(Debug, Clone)]
pub struct MixedParser {
    kind: MixedKind,
    html: XmlParser,
    tag: TagState,
    region: Option<Region>,
    /// PHP parser as it was at the end of the previous PHP region
    saved_php: Option<PhpParser>,
    options: GrammarOptions,
}

impl MixedParser {
    pub fn new(kind: MixedKind, options: &GrammarOptions) -> Self {
        let host_options = GrammarOptions {
            use_html_kludges: true,
            ..options.clone()
        };
        Self {
            kind,
            html: XmlParser::new(&host_options),
            tag: TagState::Outside,
            region: None,
            saved_php: None,
            options: options.clone(),
        }
    }

    pub fn kind(&self) -> MixedKind {
        self.kind
    }

    /// The embedded language currently producing tokens
    pub fn active_region(&self) -> Option<Embedded> {
        self.region.as_ref().map(|region| region.embedded)
    }

    pub fn saved_php(&self) -> Option<&PhpParser> {
        self.saved_php.as_ref()
    }

    pub fn host(&self) -> &XmlParser {
        &self.html
    }

    fn enter_region(&mut self, embedded: Embedded) {
        let base_indent = self.html.indented();
        let base_column = base_indent + self.options.indent_unit;
        let parser = match embedded {
            Embedded::Script => LocalParser::Js(JsParser::new(base_column, &self.options)),
            Embedded::Style => LocalParser::Css(CssParser::new(base_column, &self.options)),
            Embedded::Php => match self.saved_php.take() {
                Some(mut saved) => {
                    log_debug!("Resuming saved PHP parser", "base_column" => base_column);
                    saved.rebase(base_column);
                    saved.reset_line();
                    LocalParser::Php(saved)
                }
                None => LocalParser::Php(PhpParser::new(base_column, &self.options)),
            },
        };
        log_success!(codes::success::EMBEDDED_REGION_ENTERED, "Entering embedded region",
            "language" => embedded.name(),
            "base_indent" => base_indent
        );
        self.region = Some(Region {
            embedded,
            parser,
            base_indent,
        });
    }

    fn leave_region(&mut self) {
        if let Some(region) = self.region.take() {
            log_debug!("Leaving embedded region", "language" => region.embedded.name());
            if let LocalParser::Php(mut parser) = region.parser {
                parser.settle();
                self.saved_php = Some(parser);
            }
        }
    }

    /// Next token from the host, watching for region openers
    fn host_next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(token) = self.html.next(stream)? else {
            return Ok(None);
        };

        if token.content == "<" {
            self.tag = TagState::Opened;
        } else if token.style == "xml-tagname" && self.tag == TagState::Opened {
            self.tag = TagState::Named(token.content.to_lowercase());
        } else if token.kind == "xml-processing" {
            if self.kind == MixedKind::PhpHtml && token.content.eq_ignore_ascii_case("<?php") {
                self.enter_region(Embedded::Php);
            }
        } else if token.content == ">" {
            let opened = match &self.tag {
                TagState::Named(name) if name == "script" => Some(Embedded::Script),
                TagState::Named(name) if name == "style" => Some(Embedded::Style),
                _ => None,
            };
            self.tag = TagState::Outside;
            if let Some(embedded) = opened {
                self.enter_region(embedded);
            }
        }
        Ok(Some(token))
    }

    fn region_next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(region) = self.region.as_mut() else {
            return self.host_next(stream);
        };
        let Some(mut token) = region.parser.as_dyn().next(stream)? else {
            return Ok(None);
        };

        let marker = region.embedded.close_marker();
        split_at_marker(&mut token, marker, stream);

        if let Some(inner) = token.indentation.take() {
            let base = region.base_indent;
            token.indentation = Some(Indentation::new(move |next_chars, current| {
                if next_chars.starts_with("</") || next_chars.starts_with(marker) {
                    base
                } else {
                    inner.compute(next_chars, current)
                }
            }));
        }
        Ok(Some(token))
    }
}

/// Cut `token` where a closing marker starts, when the marker continues
/// in the stream. The cut-off text goes back onto the stream.
fn split_at_marker(token: &mut Token, marker: &str, stream: &mut CharacterStream) {
    if !marker.starts_with('<') {
        return;
    }
    let Some(lt) = token.value.rfind('<') else {
        return;
    };
    let size = (token.value.len() - lt).min(marker.len());
    let matches_prefix = token
        .value
        .get(lt..lt + size)
        .map_or(false, |seen| seen.eq_ignore_ascii_case(&marker[..size]));
    if !matches_prefix || !stream.look_ahead(&marker[size..], false, false, true) {
        return;
    }

    stream.pushback(&token.value[lt..]);
    token.value.truncate(lt);
    if token.content.len() > lt {
        token.content.truncate(lt);
    }
}

impl LanguageParser for MixedParser {
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(embedded) = self.active_region() else {
            return self.host_next(stream);
        };
        if stream.look_ahead(embedded.close_marker(), false, false, true) {
            self.leave_region();
            return self.host_next(stream);
        }
        self.region_next(stream)
    }

    fn reset_line(&mut self) {
        self.html.reset_line();
        if let Some(region) = self.region.as_mut() {
            region.parser.as_dyn().reset_line();
        }
    }

    fn boxed_clone(&self) -> Box<dyn LanguageParser> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tests::{line_indent, parse_all, style_of, styles_of};

    fn parse(kind: MixedKind, text: &str) -> (MixedParser, Vec<Token>) {
        let mut parser = MixedParser::new(kind, &GrammarOptions::default());
        let tokens = parse_all(&mut parser, text);
        (parser, tokens)
    }

    #[test]
    fn test_script_region() {
        let text = "<script>\nvar a = 1;\n</script>\n<p>";
        let (parser, tokens) = parse(MixedKind::Html, text);
        assert_eq!(style_of(&tokens, "var"), "js-keyword");
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 0);
        assert_eq!(styles_of(&tokens, "script"), vec!["xml-tagname", "xml-tagname"]);
        assert_eq!(parser.active_region(), None);
        assert!(parser.host().context().is_some());
    }

    #[test]
    fn test_style_region_uses_host_indentation() {
        let text = "<div>\n  <style>\np { color: red; }\n  </style>";
        let (_, tokens) = parse(MixedKind::Html, text);
        assert_eq!(style_of(&tokens, "p"), "css-selector");
        assert_eq!(style_of(&tokens, "red"), "css-value");
        assert_eq!(line_indent(&tokens, text, 2), 4);
        assert_eq!(line_indent(&tokens, text, 3), 2);
    }

    #[test]
    fn test_closing_marker_inside_a_token() {
        let (parser, tokens) = parse(MixedKind::Html, "<script>x = '</script>';</script>");
        let quote = tokens.iter().find(|t| t.content == "'").unwrap();
        assert_eq!(quote.style, "js-string");
        // the leftover `</script>` no longer has an open element to close
        assert_eq!(
            styles_of(&tokens, "script"),
            vec!["xml-tagname", "xml-tagname", "xml-tagname xml-error"]
        );
        assert_eq!(parser.active_region(), None);
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let (parser, tokens) = parse(MixedKind::Html, "<SCRIPT>a;</Script><b>");
        assert_eq!(style_of(&tokens, "a"), "js-variable");
        assert_eq!(parser.active_region(), None);
        assert_eq!(parser.host().context().map(|c| c.name.as_str()), Some("b"));
    }

    #[test]
    fn test_plain_html_ignores_php() {
        let (parser, tokens) = parse(MixedKind::Html, "<?php $x = 1; ?>");
        assert!(tokens.iter().all(|t| !t.style.starts_with("php-")));
        assert!(parser.saved_php().is_none());
    }

    #[test]
    fn test_php_regions_share_one_parser() {
        let (parser, tokens) = parse(MixedKind::PhpHtml, "<?php $x = 1; ?>text<?php echo $x; ?>");
        assert_eq!(styles_of(&tokens, "$x"), vec!["php-variable", "php-variable"]);
        assert_eq!(style_of(&tokens, "echo"), "php-reserved-language-construct");
        assert_eq!(style_of(&tokens, "text"), "xml-text");
        assert_eq!(parser.active_region(), None);
        assert!(parser.saved_php().is_some());
    }

    #[test]
    fn test_php_block_spans_regions() {
        let text = "<?php if ($a) { ?>\n<b>x</b>\n<?php } ?>\n";
        let mut parser = MixedParser::new(MixedKind::PhpHtml, &GrammarOptions::default());
        let mut stream = CharacterStream::from_text(text);
        let mut tokens = Vec::new();
        let mut open_depth = None;
        while let Some(token) = parser.next(&mut stream).unwrap() {
            if token.content == "x" {
                open_depth = parser.saved_php().map(|php| php.lexical().depth());
            }
            tokens.push(token);
        }
        assert!(open_depth.unwrap() > 1);
        assert_eq!(parser.saved_php().unwrap().lexical().depth(), 1);
        assert!(!tokens.iter().any(|t| t.style.contains("syntax-error")));
    }

    #[test]
    fn test_saved_php_is_rebased_to_current_host_line() {
        let text = "<?php function f() { ?>\n    <?php }\nfoo();";
        let (parser, tokens) = parse(MixedKind::PhpHtml, text);
        assert_eq!(parser.active_region(), Some(Embedded::Php));
        // top-level PHP follows the host line that reopened PHP
        let newline = tokens.iter().filter(|t| t.is_newline()).last().unwrap();
        let rule = newline.indentation.as_ref().unwrap();
        assert_eq!(rule.compute("foo();", 0), 6);
        assert_eq!(rule.compute("?>", 0), 4);
    }

    #[test]
    fn test_entering_a_region_is_logged() {
        let capture = crate::logging::test_capture();
        parse(MixedKind::Html, "<style>a {}</style>");
        assert!(capture.has_success_with_code(codes::success::EMBEDDED_REGION_ENTERED));
    }

    #[test]
    fn test_checkpoint_inside_region() {
        let mut parser = MixedParser::new(MixedKind::Html, &GrammarOptions::default());
        parse_all(&mut parser, "<script>\nif (a) {\n");
        let mut checkpoint = parser.clone();
        let rest = "  b();\n}\n</script>\n";
        let straight = parse_all(&mut parser, rest);
        checkpoint.reset_line();
        assert_eq!(straight, parse_all(&mut checkpoint, rest));
        assert_eq!(checkpoint.active_region(), None);
    }
}
