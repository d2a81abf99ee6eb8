//! XML/HTML parser
//!
//! Keeps a stack of open elements for indentation and marks mismatched
//! closing tags with `xml-error`. With HTML kludges enabled, void elements
//! such as `<br>` never open a context and `<pre>` content is left alone.

use super::continuation::{self, ContinuationStack, Cursor, Dispatch, Grammar, Step};
use super::LanguageParser;
use crate::grammar::GrammarOptions;
use crate::lexical::XmlState;
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{Indentation, Token, Tokenizer, WHITESPACE};
use std::sync::Arc;

const AUTO_SELF_CLOSERS: &[&str] = &[
    "br", "img", "hr", "link", "input", "meta", "col", "frame", "base", "area",
];

/// Pseudo element name for CDATA sections
const CDATA: &str = "!cdata";

const HARMLESS: &[&str] = &["xml-text", "xml-entity", "xml-comment", "xml-processing"];

/// An open element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlContext {
    pub name: String,
    /// Indentation of the line the start tag was on
    pub indent: usize,
    /// Whether the start tag was the first thing on its line
    pub start_of_line: bool,
    /// Content is not reindented (inside `<pre>` or CDATA)
    pub no_indent: bool,
    pub prev: Option<Arc<XmlContext>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlAction {
    Base,
    Element,
    TagName,
    Attributes,
    Attribute,
    Value,
    EndTag { start_of_line: bool },
    CloseTagName,
    Expect(&'static str),
}

use XmlAction::*;

#[derive(Debug, Clone)]
pub struct XmlParser {
    tokens: Tokenizer<XmlState>,
    stack: ContinuationStack<XmlAction>,
    context: Option<Arc<XmlContext>>,
    current_tag: Option<String>,
    /// Tokens seen on this line, leading whitespace excluded
    token_nr: usize,
    indented: usize,
    html_kludges: bool,
    align_cdata: bool,
    unit: usize,
}

impl XmlParser {
    pub fn new(options: &GrammarOptions) -> Self {
        Self {
            tokens: Tokenizer::new(XmlState::default()),
            stack: ContinuationStack::new(vec![Base]),
            context: None,
            current_tag: None,
            token_nr: 0,
            indented: 0,
            html_kludges: options.use_html_kludges,
            align_cdata: options.align_cdata,
            unit: options.indent_unit,
        }
    }

    /// Leading whitespace of the current line
    pub fn indented(&self) -> usize {
        self.indented
    }

    pub fn context(&self) -> Option<&XmlContext> {
        self.context.as_deref()
    }

    /// Lowercased name of the tag being read, if any
    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    pub fn tokenizer_state(&self) -> &XmlState {
        self.tokens.state()
    }

    /// Indentation for a line in the current element context
    pub fn indentation(&self) -> Indentation {
        let context = self.context.clone();
        let unit = self.unit;
        let align_cdata = self.align_cdata;
        Indentation::new(move |next_chars, current| {
            compute_indentation(context.as_deref(), unit, align_cdata, next_chars, current)
        })
    }

    fn is_auto_self_closer(&self, tag: Option<&str>) -> bool {
        self.html_kludges && tag.map_or(false, |tag| AUTO_SELF_CLOSERS.contains(&tag))
    }

    fn push_context(&mut self, name: String, start_of_line: bool) {
        let no_indent = name == CDATA
            || (self.html_kludges && name == "pre")
            || self.context.as_ref().map_or(false, |c| c.no_indent);
        self.context = Some(Arc::new(XmlContext {
            name,
            indent: self.indented,
            start_of_line,
            no_indent,
            prev: self.context.take(),
        }));
    }

    fn pop_context(&mut self) {
        if let Some(context) = self.context.take() {
            self.context = context.prev.clone();
        }
    }

    fn element(&mut self, cursor: &mut Cursor<'_>) -> Step<XmlAction> {
        let style = cursor.kind();
        match cursor.content() {
            "<" => Step::Cont(vec![
                TagName,
                Attributes,
                EndTag {
                    start_of_line: self.token_nr == 1,
                },
            ]),
            "</" => Step::Cont(vec![CloseTagName, Expect(">")]),
            _ if style == "xml-cdata" => {
                if self.context.as_ref().map_or(true, |c| c.name != CDATA) {
                    self.push_context(CDATA.to_string(), false);
                }
                if cursor.content().ends_with("]]>") {
                    self.pop_context();
                }
                Step::done()
            }
            _ if HARMLESS.contains(&style) => Step::done(),
            _ => {
                cursor.mark_error("xml-error");
                Step::done()
            }
        }
    }
}

fn compute_indentation(
    context: Option<&XmlContext>,
    unit: usize,
    align_cdata: bool,
    next_chars: &str,
    current: usize,
) -> usize {
    let mut context = context;
    if context.map_or(false, |c| c.no_indent) {
        return current;
    }
    if align_cdata && next_chars.contains("<![CDATA[") {
        return 0;
    }
    if next_chars.starts_with("</") {
        context = context.and_then(|c| c.prev.as_deref());
    }
    while let Some(c) = context {
        if c.start_of_line {
            return c.indent + unit;
        }
        context = c.prev.as_deref();
    }
    0
}

impl Grammar for XmlParser {
    type Action = XmlAction;

    fn stack(&mut self) -> &mut ContinuationStack<XmlAction> {
        &mut self.stack
    }

    fn is_immediate(_action: &XmlAction) -> bool {
        false
    }

    fn run_immediate(&mut self, _action: XmlAction) {}

    fn apply(&mut self, action: XmlAction, cursor: &mut Cursor<'_>) -> Step<XmlAction> {
        let style = cursor.kind();
        match action {
            Base => Step::Pass(vec![Element, Base]),
            Element => self.element(cursor),
            TagName if style == "xml-name" => {
                self.current_tag = Some(cursor.content().to_lowercase());
                cursor.mark("xml-tagname");
                Step::done()
            }
            TagName => {
                self.current_tag = None;
                Step::skip()
            }
            CloseTagName => {
                if style == "xml-name" {
                    cursor.mark("xml-tagname");
                    let name = cursor.content().to_lowercase();
                    if self.context.as_ref().map_or(false, |c| c.name == name) {
                        self.pop_context();
                    } else {
                        cursor.mark_error("xml-error");
                    }
                }
                Step::done()
            }
            EndTag { start_of_line } => {
                let content = cursor.content();
                let self_closing = content == "/>"
                    || (content == ">" && self.is_auto_self_closer(self.current_tag.as_deref()));
                if self_closing {
                    Step::done()
                } else if content == ">" {
                    let name = self.current_tag.clone().unwrap_or_default();
                    self.push_context(name, start_of_line);
                    Step::done()
                } else {
                    cursor.mark_error("xml-error");
                    Step::Cont(vec![EndTag { start_of_line }])
                }
            }
            Attributes if style == "xml-name" => {
                cursor.mark("xml-attname");
                Step::Cont(vec![Attribute, Attributes])
            }
            Attribute if cursor.content() == "=" => Step::Cont(vec![Value]),
            Value if style == "xml-attribute" => Step::Cont(vec![Value]),
            Expect(text) if cursor.content() == text => Step::done(),
            Expect(text) => {
                cursor.mark_error("xml-error");
                Step::Cont(vec![Expect(text)])
            }
            Attributes | Attribute | Value => Step::skip(),
        }
    }
}

impl LanguageParser for XmlParser {
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        let Some(mut token) = self.tokens.next(stream)? else {
            return Ok(None);
        };

        if token.kind == WHITESPACE && self.token_nr == 0 {
            self.indented = token.width();
        } else {
            self.token_nr += 1;
        }
        if token.is_newline() {
            self.indented = 0;
            self.token_nr = 0;
            token.indentation = Some(self.indentation());
        }
        if token.kind == WHITESPACE || token.kind == "xml-comment" {
            return Ok(Some(token));
        }

        if let Dispatch::Consumed { marked: Some(style) } = continuation::dispatch(self, &token) {
            token.style = style;
        }
        Ok(Some(token))
    }

    fn reset_line(&mut self) {
        self.token_nr = 0;
        self.indented = 0;
    }

    fn boxed_clone(&self) -> Box<dyn LanguageParser> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tests::{line_indent, parse_all, style_of};

    fn parse_with(options: &GrammarOptions, text: &str) -> (XmlParser, Vec<Token>) {
        let mut parser = XmlParser::new(options);
        let tokens = parse_all(&mut parser, text);
        (parser, tokens)
    }

    fn parse(text: &str) -> (XmlParser, Vec<Token>) {
        parse_with(&GrammarOptions::default(), text)
    }

    fn no_kludges() -> GrammarOptions {
        GrammarOptions {
            use_html_kludges: false,
            ..GrammarOptions::default()
        }
    }

    #[test]
    fn test_nested_elements() {
        let text = "<div>\n  <p class=\"a\">x</p>\n</div>";
        let (parser, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 0);
        assert_eq!(style_of(&tokens, "div"), "xml-tagname");
        assert_eq!(style_of(&tokens, "class"), "xml-attname");
        assert!(parser.context().is_none());
    }

    #[test]
    fn test_tags_after_line_start_defer_to_enclosing_element() {
        let text = "<ul>\n  <li><b>\n  x";
        let (parser, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 2), 4);
        assert_eq!(parser.context().map(|c| c.name.as_str()), Some("b"));
    }

    #[test]
    fn test_mismatched_close_tag() {
        let (parser, tokens) = parse("<a></b>");
        assert_eq!(style_of(&tokens, "b"), "xml-tagname xml-error");
        assert_eq!(parser.context().map(|c| c.name.as_str()), Some("a"));
    }

    #[test]
    fn test_junk_in_tag_is_an_error() {
        let (_, tokens) = parse("<a b=\"1\" = >");
        let marked: Vec<_> = tokens.iter().filter(|t| t.style.contains("xml-error")).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].content, "=");
    }

    #[test]
    fn test_void_elements_with_kludges() {
        let text = "<br>\n<p>";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 0);

        let (parser, tokens) = parse_with(&no_kludges(), text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(parser.context().map(|c| c.name.as_str()), Some("p"));
    }

    #[test]
    fn test_pre_keeps_current_indentation() {
        let text = "<pre>\n     x";
        let (_, tokens) = parse(text);
        let newline = tokens.iter().find(|t| t.is_newline()).unwrap();
        assert_eq!(newline.indentation.as_ref().unwrap().compute("x", 5), 5);

        let (_, tokens) = parse_with(&no_kludges(), text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
    }

    #[test]
    fn test_cdata_section() {
        let text = "<a>\n<![CDATA[ x\n  y ]]>\n</a>";
        let (parser, tokens) = parse(text);
        let newline = tokens.iter().filter(|t| t.is_newline()).nth(1).unwrap();
        assert_eq!(newline.indentation.as_ref().unwrap().compute("y ]]>", 2), 2);
        assert_eq!(line_indent(&tokens, text, 3), 0);
        assert!(parser.context().is_none());
    }

    #[test]
    fn test_align_cdata() {
        let options = GrammarOptions {
            align_cdata: true,
            ..GrammarOptions::default()
        };
        let text = "<a>\n<![CDATA[x]]>";
        let (_, tokens) = parse_with(&options, text);
        assert_eq!(line_indent(&tokens, text, 1), 0);
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "<a>\n<!-- <b> -->\nx";
        let (parser, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 2), 2);
        assert_eq!(parser.context().map(|c| c.name.as_str()), Some("a"));
    }

    #[test]
    fn test_copy_resets_line_position() {
        let mut parser = XmlParser::new(&GrammarOptions::default());
        parse_all(&mut parser, "<a>\n  <b>");
        let mut copy = parser.clone();
        copy.reset_line();
        assert_eq!(copy.indented(), 0);
        assert_eq!(copy.context(), parser.context());
    }
}
