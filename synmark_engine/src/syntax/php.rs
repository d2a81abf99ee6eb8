//! PHP parser
//!
//! Tracks statement structure for indentation. Tokens that are required but
//! missing are not skipped silently: the offending token gets a
//! `syntax-error` class and the requirement stays pending.

use super::continuation::{self, ContinuationStack, Cursor, Dispatch, Grammar, Step};
use super::scope::{LexicalStack, LineState, ScopeKind};
use super::LanguageParser;
use crate::grammar::GrammarOptions;
use crate::lexical::PhpState;
use crate::log_debug;
use crate::stream::{CharacterStream, StreamResult};
use crate::tokens::{Indentation, Token, Tokenizer, WHITESPACE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhpItem {
    Expression,
    FuncArg,
}

impl PhpItem {
    fn action(self) -> PhpAction {
        match self {
            PhpItem::Expression => PhpAction::Expression,
            PhpItem::FuncArg => PhpAction::FuncArg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpAction {
    PushLex(ScopeKind, Option<&'static str>),
    PopLex,
    Statements,
    Statement,
    Expression,
    MaybeOperator,
    MaybeDoubleColon,
    /// One of these token types must come next
    Require(&'static [&'static str]),
    /// What follows a modifier such as `public`; a `function` starts a
    /// function definition
    ModifierTarget,
    Expect(&'static str),
    CommaSep(PhpItem),
    Proceed(PhpItem),
    Block,
    /// Braced body, or `;` for abstract and interface methods
    FunctionBody,
    FuncArg,
    MaybeDefaultParameter,
    NamespaceDef,
    MaybeDoubleColonDef,
}

use PhpAction::*;

fn is_atomic(kind: &str) -> bool {
    matches!(kind, "atom" | "number" | "variable" | "string")
}

fn push(kind: ScopeKind) -> PhpAction {
    PushLex(kind, None)
}

/// Actions after the `function` keyword
fn funcdef() -> Vec<PhpAction> {
    vec![
        Require(&["t_string"]),
        Require(&["("]),
        push(ScopeKind::Closer(')')),
        CommaSep(PhpItem::FuncArg),
        Require(&[")"]),
        PopLex,
        FunctionBody,
    ]
}

#[derive(Debug, Clone)]
pub struct PhpParser {
    tokens: Tokenizer<PhpState>,
    stack: ContinuationStack<PhpAction>,
    lexical: LexicalStack,
    line: LineState,
    unit: usize,
}

impl PhpParser {
    pub fn new(base_column: usize, options: &GrammarOptions) -> Self {
        log_debug!("Creating PHP parser", "base_column" => base_column);
        Self {
            tokens: Tokenizer::new(PhpState::default()),
            stack: ContinuationStack::new(vec![Statements]),
            lexical: LexicalStack::new(base_column, options.indent_unit),
            line: LineState::default(),
            unit: options.indent_unit,
        }
    }

    pub fn tokenizer_state(&self) -> &PhpState {
        self.tokens.state()
    }

    pub fn lexical(&self) -> &LexicalStack {
        &self.lexical
    }

    /// Move top-level statements to `base_column`, keeping open scopes.
    /// Used when a PHP section is resumed inside markup at another column.
    pub fn rebase(&mut self, base_column: usize) {
        self.lexical.rebase_root(base_column, self.unit);
    }

    /// Apply scope changes still pending from the last token, so a saved
    /// parser shows the scopes that token opened or closed
    pub fn settle(&mut self) {
        continuation::run_immediate_actions(self);
    }

    /// Indentation for a line that starts in this parser's current scope
    pub fn indentation(&self) -> Indentation {
        self.lexical.indentation(self.unit)
    }

    fn statement(kind: &str) -> Step<PhpAction> {
        match kind {
            "keyword a" => Step::Cont(vec![push(ScopeKind::Form), Expression, Statement, PopLex]),
            "keyword b" => Step::Cont(vec![push(ScopeKind::Form), Statement, PopLex]),
            "{" => Step::Cont(vec![push(ScopeKind::Closer('}')), Block, PopLex]),
            "function" => Step::Cont(funcdef()),
            "class" => Step::Cont(vec![
                Require(&["t_string"]),
                Expect("{"),
                push(ScopeKind::Closer('}')),
                Block,
                PopLex,
            ]),
            "foreach" => Step::Cont(vec![
                push(ScopeKind::Form),
                Require(&["("]),
                push(ScopeKind::Closer(')')),
                Expression,
                Require(&["as"]),
                Require(&["variable"]),
                Expect(")"),
                PopLex,
                Statement,
                PopLex,
            ]),
            "for" => Step::Cont(vec![
                push(ScopeKind::Form),
                Require(&["("]),
                push(ScopeKind::Closer(')')),
                Expression,
                Require(&[";"]),
                Expression,
                Require(&[";"]),
                Expression,
                Require(&[")"]),
                PopLex,
                Statement,
                PopLex,
            ]),
            "modifier" => Step::Cont(vec![ModifierTarget]),
            "switch" => Step::Cont(vec![
                push(ScopeKind::Form),
                Require(&["("]),
                Expression,
                Require(&[")"]),
                PushLex(ScopeKind::Closer('}'), Some("switch")),
                Require(&[":", "{"]),
                Block,
                PopLex,
                PopLex,
            ]),
            "case" => Step::Cont(vec![Expression, Require(&[":"])]),
            "default" => Step::Cont(vec![Require(&[":"])]),
            "catch" => Step::Cont(vec![
                push(ScopeKind::Form),
                Require(&["("]),
                Require(&["t_string"]),
                Require(&["variable"]),
                Require(&[")"]),
                Statement,
                PopLex,
            ]),
            "const" => Step::Cont(vec![Require(&["t_string"])]),
            "namespace" => Step::Cont(vec![NamespaceDef, Require(&[";"])]),
            _ => Step::Pass(vec![push(ScopeKind::Stat), Expression, Require(&[";"]), PopLex]),
        }
    }

    fn expression(kind: &str) -> Step<PhpAction> {
        match kind {
            _ if is_atomic(kind) => Step::Cont(vec![MaybeOperator]),
            "<<<" => Step::Cont(vec![Require(&["string"]), MaybeOperator]),
            "t_string" => Step::Cont(vec![MaybeDoubleColon, MaybeOperator]),
            "keyword c" | "operator" => Step::Cont(vec![Expression]),
            "(" => Step::Cont(vec![
                push(ScopeKind::Closer(')')),
                CommaSep(PhpItem::Expression),
                Require(&[")"]),
                PopLex,
                MaybeOperator,
            ]),
            _ => Step::skip(),
        }
    }

    fn maybe_operator(kind: &str, content: &str) -> Step<PhpAction> {
        match kind {
            "operator" if content == "?" => {
                Step::Cont(vec![Expression, Require(&[":"]), Expression])
            }
            "operator" => Step::Cont(vec![Expression]),
            "(" => Step::Cont(vec![
                push(ScopeKind::Closer(')')),
                Expression,
                CommaSep(PhpItem::Expression),
                Require(&[")"]),
                PopLex,
                MaybeOperator,
            ]),
            "[" => Step::Cont(vec![
                push(ScopeKind::Closer(']')),
                Expression,
                Require(&["]"]),
                MaybeOperator,
                PopLex,
            ]),
            _ => Step::skip(),
        }
    }
}

impl Grammar for PhpParser {
    type Action = PhpAction;

    fn stack(&mut self) -> &mut ContinuationStack<PhpAction> {
        &mut self.stack
    }

    fn is_immediate(action: &PhpAction) -> bool {
        matches!(action, PushLex(..) | PopLex)
    }

    fn run_immediate(&mut self, action: PhpAction) {
        match action {
            PushLex(kind, info) => {
                self.lexical
                    .push(kind, info, self.line.indented, self.line.column)
            }
            PopLex => self.lexical.pop(),
            _ => {}
        }
    }

    fn apply(&mut self, action: PhpAction, cursor: &mut Cursor<'_>) -> Step<PhpAction> {
        let kind = cursor.kind();
        match action {
            Statements => Step::Pass(vec![Statement, Statements]),
            Statement => Self::statement(kind),
            Expression => Self::expression(kind),
            MaybeOperator => Self::maybe_operator(kind, cursor.content()),
            MaybeDoubleColon if kind == "t_double_colon" => {
                Step::Cont(vec![Require(&["t_string", "variable"]), MaybeOperator])
            }
            MaybeDoubleColon => Step::Pass(vec![Expression]),
            Require(wanted) if wanted.contains(&kind) => Step::done(),
            Require(wanted) => {
                cursor.mark_error("syntax-error");
                Step::Cont(vec![Require(wanted)])
            }
            ModifierTarget => match kind {
                "modifier" | "variable" => Step::done(),
                "function" => Step::Cont(funcdef()),
                _ => {
                    cursor.mark_error("syntax-error");
                    Step::Cont(vec![ModifierTarget])
                }
            },
            Expect(wanted) if kind == wanted => Step::done(),
            Expect(wanted) => Step::Cont(vec![Expect(wanted)]),
            CommaSep(item) => Step::Pass(vec![item.action(), Proceed(item)]),
            Proceed(item) if kind == "," => Step::Cont(vec![item.action(), Proceed(item)]),
            Block if kind == "}" => Step::done(),
            Block => Step::Pass(vec![Statement, Block]),
            FunctionBody if kind == "{" => {
                Step::Cont(vec![push(ScopeKind::Closer('}')), Block, PopLex])
            }
            FunctionBody if kind == ";" => Step::done(),
            FuncArg if kind == "t_string" => {
                Step::Cont(vec![Require(&["variable"]), MaybeDefaultParameter])
            }
            FuncArg if kind == "variable" => Step::Cont(vec![MaybeDefaultParameter]),
            MaybeDefaultParameter if cursor.content() == "=" => Step::Cont(vec![Expression]),
            NamespaceDef => Step::Pass(vec![Require(&["t_string"]), MaybeDoubleColonDef]),
            MaybeDoubleColonDef if kind == "t_double_colon" => Step::Cont(vec![NamespaceDef]),
            _ => Step::skip(),
        }
    }

    fn resync(&mut self) {
        self.lexical.unwind();
    }
}

impl LanguageParser for PhpParser {
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

        if let Dispatch::Consumed { marked: Some(style) } = continuation::dispatch(self, &token) {
            token.style = style;
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
