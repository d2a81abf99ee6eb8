//! JavaScript parser
//!
//! Recognises enough structure for indentation and for telling local
//! variables (declared in an enclosing function or catch clause) apart from
//! globals. Malformed input never stops it: `Expect` actions swallow tokens
//! until the one they wait for shows up.

use super::continuation::{self, ContinuationStack, Cursor, Dispatch, Grammar, Step};
use super::scope::{LexicalStack, LineState, ScopeChain, ScopeKind};
use super::LanguageParser;
use crate::grammar::GrammarOptions;
use crate::lexical::JsState;
use crate::log_debug;
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{Token, Tokenizer, WHITESPACE};

/// What a comma-separated list is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItem {
    Expression,
    ObjProp,
    FunArg,
}

impl ListItem {
    fn action(self) -> JsAction {
        match self {
            ListItem::Expression => JsAction::Expression,
            ListItem::ObjProp => JsAction::ObjProp,
            ListItem::FunArg => JsAction::FunArg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsAction {
    PushLex(ScopeKind, Option<&'static str>),
    PopLex,
    PushContext,
    PopContext,
    Statements,
    /// Root rule in JSON mode
    SingleExpr,
    Statement,
    Expression,
    MaybeOperator,
    MaybeLabel,
    Property,
    ObjProp,
    CommaSep(ListItem, &'static str),
    Proceed(ListItem, &'static str),
    Expect(&'static str),
    Block,
    VarDef1,
    VarDef2,
    ForSpec1,
    ForMaybeIn,
    ForSpec2,
    ForSpec3,
    FunctionDef,
    FunArg,
}

use JsAction::*;

fn is_atomic(kind: &str) -> bool {
    matches!(kind, "atom" | "number" | "variable" | "string" | "regexp")
}

fn push(kind: ScopeKind) -> JsAction {
    PushLex(kind, None)
}

#[derive(Debug, Clone)]
pub struct JsParser {
    tokens: Tokenizer<JsState>,
    stack: ContinuationStack<JsAction>,
    lexical: LexicalStack,
    scopes: ScopeChain,
    line: LineState,
    unit: usize,
}

impl JsParser {
    pub fn new(base_column: usize, options: &GrammarOptions) -> Self {
        let root = if options.json { SingleExpr } else { Statements };
        log_debug!("Creating JavaScript parser",
            "base_column" => base_column,
            "json" => options.json
        );
        Self {
            tokens: Tokenizer::new(JsState::default()),
            stack: ContinuationStack::new(vec![root]),
            lexical: LexicalStack::new(base_column, options.indent_unit),
            scopes: ScopeChain::default(),
            line: LineState::default(),
            unit: options.indent_unit,
        }
    }

    pub fn tokenizer_state(&self) -> &JsState {
        self.tokens.state()
    }

    pub fn lexical(&self) -> &LexicalStack {
        &self.lexical
    }

    fn register(&mut self, cursor: &mut Cursor<'_>) {
        if self.scopes.register(cursor.content()) {
            cursor.mark("js-variabledef");
        }
    }

    fn statement(kind: &str) -> Step<JsAction> {
        match kind {
            "var" => Step::Cont(vec![push(ScopeKind::VarDef), VarDef1, Expect(";"), PopLex]),
            "keyword a" => Step::Cont(vec![push(ScopeKind::Form), Expression, Statement, PopLex]),
            "keyword b" => Step::Cont(vec![push(ScopeKind::Form), Statement, PopLex]),
            "{" => Step::Cont(vec![push(ScopeKind::Closer('}')), Block, PopLex]),
            "function" => Step::Cont(vec![FunctionDef]),
            "for" => Step::Cont(vec![
                push(ScopeKind::Form),
                Expect("("),
                push(ScopeKind::Closer(')')),
                ForSpec1,
                Expect(")"),
                PopLex,
                Statement,
                PopLex,
            ]),
            "variable" => Step::Cont(vec![push(ScopeKind::Stat), MaybeLabel]),
            "switch" => Step::Cont(vec![
                push(ScopeKind::Form),
                Expression,
                PushLex(ScopeKind::Closer('}'), Some("switch")),
                Expect("{"),
                Block,
                PopLex,
                PopLex,
            ]),
            "case" => Step::Cont(vec![Expression, Expect(":")]),
            "default" => Step::Cont(vec![Expect(":")]),
            "catch" => Step::Cont(vec![
                push(ScopeKind::Form),
                PushContext,
                Expect("("),
                FunArg,
                Expect(")"),
                Statement,
                PopLex,
                PopContext,
            ]),
            _ => Step::Pass(vec![push(ScopeKind::Stat), Expression, Expect(";"), PopLex]),
        }
    }

    fn expression(kind: &str) -> Step<JsAction> {
        match kind {
            _ if is_atomic(kind) => Step::Cont(vec![MaybeOperator]),
            "function" => Step::Cont(vec![FunctionDef]),
            "keyword c" | "operator" => Step::Cont(vec![Expression]),
            "(" => Step::Cont(vec![
                push(ScopeKind::Closer(')')),
                Expression,
                Expect(")"),
                PopLex,
                MaybeOperator,
            ]),
            "[" => Step::Cont(vec![
                push(ScopeKind::Closer(']')),
                CommaSep(ListItem::Expression, "]"),
                PopLex,
                MaybeOperator,
            ]),
            "{" => Step::Cont(vec![
                push(ScopeKind::Closer('}')),
                CommaSep(ListItem::ObjProp, "}"),
                PopLex,
                MaybeOperator,
            ]),
            _ => Step::skip(),
        }
    }

    fn maybe_operator(kind: &str) -> Step<JsAction> {
        match kind {
            "operator" => Step::Cont(vec![Expression]),
            "(" => Step::Cont(vec![
                push(ScopeKind::Closer(')')),
                Expression,
                CommaSep(ListItem::Expression, ")"),
                PopLex,
                MaybeOperator,
            ]),
            "." => Step::Cont(vec![Property, MaybeOperator]),
            "[" => Step::Cont(vec![
                push(ScopeKind::Closer(']')),
                Expression,
                Expect("]"),
                PopLex,
                MaybeOperator,
            ]),
            _ => Step::skip(),
        }
    }
}

impl Grammar for JsParser {
    type Action = JsAction;

    fn stack(&mut self) -> &mut ContinuationStack<JsAction> {
        &mut self.stack
    }

    fn is_immediate(action: &JsAction) -> bool {
        matches!(action, PushLex(..) | PopLex | PushContext | PopContext)
    }

    fn run_immediate(&mut self, action: JsAction) {
        match action {
            PushLex(kind, info) => {
                self.lexical
                    .push(kind, info, self.line.indented, self.line.column)
            }
            PopLex => self.lexical.pop(),
            PushContext => self.scopes.push(),
            PopContext => self.scopes.pop(),
            _ => {}
        }
    }

    fn apply(&mut self, action: JsAction, cursor: &mut Cursor<'_>) -> Step<JsAction> {
        let kind = cursor.kind();
        match action {
            Statements => Step::Pass(vec![Statement, Statements]),
            SingleExpr => Step::Pass(vec![Expression, Statements]),
            Statement => Self::statement(kind),
            Expression => Self::expression(kind),
            MaybeOperator => Self::maybe_operator(kind),
            MaybeLabel if kind == ":" => Step::Cont(vec![PopLex, Statement]),
            MaybeLabel => Step::Pass(vec![MaybeOperator, Expect(";"), PopLex]),
            Property if kind == "variable" => {
                cursor.mark("js-property");
                Step::done()
            }
            ObjProp => {
                if kind == "variable" {
                    cursor.mark("js-property");
                }
                if is_atomic(kind) {
                    Step::Cont(vec![Expect(":"), Expression])
                } else {
                    Step::skip()
                }
            }
            CommaSep(_, end) if kind == end => Step::done(),
            CommaSep(item, end) => Step::Pass(vec![item.action(), Proceed(item, end)]),
            Proceed(item, end) if kind == "," => Step::Cont(vec![item.action(), Proceed(item, end)]),
            Proceed(_, end) if kind == end => Step::done(),
            Proceed(_, end) => Step::Cont(vec![Expect(end)]),
            Expect(wanted) if kind == wanted => Step::done(),
            Expect(wanted) => Step::Cont(vec![Expect(wanted)]),
            Block if kind == "}" => Step::done(),
            Block => Step::Pass(vec![Statement, Block]),
            VarDef1 if kind == "variable" => {
                self.register(cursor);
                Step::Cont(vec![VarDef2])
            }
            VarDef1 => Step::done(),
            VarDef2 if cursor.content() == "=" => Step::Cont(vec![Expression, VarDef2]),
            VarDef2 if kind == "," => Step::Cont(vec![VarDef1]),
            ForSpec1 => match kind {
                "var" => Step::Cont(vec![VarDef1, ForSpec2]),
                "variable" => Step::Cont(vec![ForMaybeIn]),
                _ => Step::Pass(vec![ForSpec2]),
            },
            ForMaybeIn if cursor.content() == "in" => Step::Cont(vec![Expression]),
            ForMaybeIn => Step::Cont(vec![MaybeOperator, ForSpec2]),
            ForSpec2 if kind == ";" => Step::Cont(vec![ForSpec3]),
            ForSpec2 if cursor.content() == "in" => Step::Cont(vec![Expression]),
            ForSpec2 => Step::Cont(vec![Expression, Expect(";"), ForSpec3]),
            ForSpec3 if kind == ")" => Step::skip(),
            ForSpec3 => Step::Cont(vec![Expression]),
            FunctionDef if kind == "variable" => {
                self.register(cursor);
                Step::Cont(vec![FunctionDef])
            }
            FunctionDef if kind == "(" => Step::Cont(vec![
                PushContext,
                CommaSep(ListItem::FunArg, ")"),
                Statement,
                PopContext,
            ]),
            FunArg if kind == "variable" => {
                self.register(cursor);
                Step::done()
            }
            _ => Step::skip(),
        }
    }

    fn resync(&mut self) {
        self.lexical.unwind();
        self.scopes = ScopeChain::default();
    }
}

impl LanguageParser for JsParser {
    fn next(&mut self, stream: &mut CharacterStream) -> StreamResult<Option<Token>> {
        continuation::run_immediate_actions(self);

        let Some(mut token) = self.tokens.next(stream)? else {
            return Ok(None);
        };

        if self.line.observe(&token) {
            self.lexical.settle_align(false);
            token.indentation = Some(self.lexical.indentation(self.unit));
        }
        if matches!(token.kind, WHITESPACE | "comment" | "string_not_terminated") {
            return Ok(Some(token));
        }
        self.lexical.settle_align(true);

        if let Dispatch::Consumed { marked } = continuation::dispatch(self, &token) {
            match marked {
                Some(style) => token.style = style,
                None if token.kind == "variable" && self.scopes.contains(&token.content) => {
                    token.style = "js-localvariable".to_string();
                }
                None => {}
            }
        }
        Ok(Some(token))
    }

    fn reset_line(&mut self) {
        self.line.reset();
    }

    fn boxed_clone(&self) -> Box<dyn LanguageParser> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::JsInside;
    use crate::syntax::tests::{line_indent, parse_all, style_of, styles_of};

    fn parse(text: &str) -> (JsParser, Vec<Token>) {
        let mut parser = JsParser::new(0, &GrammarOptions::default());
        let tokens = parse_all(&mut parser, text);
        (parser, tokens)
    }

    #[test]
    fn test_var_statements_return_to_top_level() {
        let text = "var a = 1;\nvar b = 2;";
        let (parser, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 0);
        assert_eq!(parser.lexical().depth(), 1);
        assert_eq!(styles_of(&tokens, "var"), vec!["js-keyword", "js-keyword"]);
    }

    #[test]
    fn test_if_block_indentation() {
        let text = "if (x) {\n  y();\n}";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 0);
    }

    #[test]
    fn test_local_variables() {
        let (_, tokens) = parse("function f(x) { return x + y; }");
        assert_eq!(style_of(&tokens, "f"), "js-variable");
        assert_eq!(styles_of(&tokens, "x"), vec!["js-variabledef", "js-localvariable"]);
        assert_eq!(style_of(&tokens, "y"), "js-variable");
    }

    #[test]
    fn test_locals_do_not_leak_out_of_functions() {
        let (_, tokens) = parse("function f(a) { var b; }\nb = a;");
        assert_eq!(styles_of(&tokens, "b"), vec!["js-variabledef", "js-variable"]);
        assert_eq!(styles_of(&tokens, "a"), vec!["js-variabledef", "js-variable"]);
    }

    #[test]
    fn test_catch_clause_scope() {
        let (_, tokens) = parse("try { } catch (e) { e.message; }");
        assert_eq!(styles_of(&tokens, "e"), vec!["js-variabledef", "js-localvariable"]);
        assert_eq!(style_of(&tokens, "message"), "js-property");
    }

    #[test]
    fn test_object_literal_properties() {
        let (_, tokens) = parse("x = {a: 1, b: [2, 3]};");
        assert_eq!(style_of(&tokens, "a"), "js-property");
        assert_eq!(style_of(&tokens, "b"), "js-property");
    }

    #[test]
    fn test_aligned_arguments() {
        let text = "foo(a,\nb);";
        let (_, tokens) = parse(text);
        // aligned with the first argument after "foo("
        assert_eq!(line_indent(&tokens, text, 1), 4);
    }

    #[test]
    fn test_unaligned_brackets_and_closers() {
        let text = "x = [\n1,\n];";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 0);
    }

    #[test]
    fn test_switch_indentation() {
        let text = "switch (x) {\ncase 1:\nfoo();\n}";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 2);
        assert_eq!(line_indent(&tokens, text, 2), 4);
        assert_eq!(line_indent(&tokens, text, 3), 0);
    }

    #[test]
    fn test_vardef_continuation_lines() {
        let text = "var a = 1,\nb = 2;";
        let (_, tokens) = parse(text);
        assert_eq!(line_indent(&tokens, text, 1), 4);
        assert_eq!(style_of(&tokens, "a"), "js-variable");
    }

    #[test]
    fn test_for_loop_balances_scopes() {
        let (parser, _) = parse("for (var i = 0; i < n; i++) { f(i); }\n");
        assert_eq!(parser.lexical().depth(), 1);
        let (parser, _) = parse("for (k in obj) x(k);\n");
        assert_eq!(parser.lexical().depth(), 1);
    }

    #[test]
    fn test_unbalanced_closers_never_underflow() {
        let (parser, tokens) = parse("}}) ]; x;\n");
        assert_eq!(parser.lexical().depth(), 1);
        assert!(tokens.iter().any(|t| t.content == "x"));
    }

    #[test]
    fn test_checkpoint_resumes_identically() {
        let first = "function f(a) {\n  if (a) {\n";
        let rest = "    return a;\n  }\n}\n";
        let mut parser = JsParser::new(0, &GrammarOptions::default());
        parse_all(&mut parser, first);
        let mut checkpoint = parser.clone();

        let straight = parse_all(&mut parser, rest);
        checkpoint.reset_line();
        let resumed = parse_all(&mut checkpoint, rest);
        assert_eq!(straight, resumed);
        assert_eq!(style_of(&resumed, "a"), "js-localvariable");
    }

    #[test]
    fn test_block_comment_state_survives_checkpoints() {
        let mut parser = JsParser::new(0, &GrammarOptions::default());
        parse_all(&mut parser, "/* comment\n");
        assert_eq!(parser.tokenizer_state().inside, JsInside::BlockComment);
        let tokens = parse_all(&mut parser.clone(), " still comment */ x;");
        assert_eq!(tokens[1].style, "js-comment");
        assert_eq!(style_of(&tokens, "x"), "js-variable");
    }

    #[test]
    fn test_json_mode() {
        let options = GrammarOptions {
            json: true,
            ..GrammarOptions::default()
        };
        let text = "{\"a\": [1,\n2]}";
        let mut parser = JsParser::new(0, &options);
        let tokens = parse_all(&mut parser, text);
        assert_eq!(line_indent(&tokens, text, 1), 7);
    }

    #[test]
    fn test_base_column() {
        let text = "x;\ny;";
        let mut parser = JsParser::new(4, &GrammarOptions::default());
        let tokens = parse_all(&mut parser, text);
        assert_eq!(line_indent(&tokens, text, 1), 4);
    }
}
