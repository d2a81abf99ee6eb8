//! Continuation-stack driver shared by the statement grammars
//!
//! A grammar is an enum of pending actions. The driver pops one action per
//! step and asks the grammar to apply it to the current token. The action
//! answers with a [`Step`]: `Cont` consumes the token, `Pass` leaves it for the
//! next action. Either way the returned actions are pushed so that the first
//! one runs next.
//!
//! Some actions never look at the token (pushing and popping scopes). They are
//! *immediate*: the driver runs them whenever they reach the top of the stack,
//! including before the next token is read, so scope frames record the column
//! right after the token that opened them.

use crate::config::compile_time::parser::{MAX_CONTINUATION_DEPTH, MAX_DISPATCH_STEPS};
use crate::log_warning;
use crate::logging::codes;
use crate::tokens::Token;
use std::fmt;

/// Outcome of applying one action
#[derive(Debug, Clone, PartialEq)]
pub enum Step<A> {
    /// Consume the token, then run these actions
    Cont(Vec<A>),
    /// Leave the token for these actions
    Pass(Vec<A>),
}

impl<A> Step<A> {
    /// Consume the token and schedule nothing
    pub fn done() -> Self {
        Step::Cont(Vec::new())
    }

    /// An action that matches nothing hands the token back
    pub fn skip() -> Self {
        Step::Pass(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationStack<A> {
    /// Top of stack is the last element
    actions: Vec<A>,
    root: Vec<A>,
}

impl<A: Clone> ContinuationStack<A> {
    /// Stack holding `root`, which is also restored whenever the stack drains
    pub fn new(root: Vec<A>) -> Self {
        let mut stack = Self {
            actions: Vec::new(),
            root,
        };
        stack.reset();
        stack
    }

    /// Push so that `actions[0]` runs first. Returns false when the stack
    /// would grow past its limit; the stack is then reset to its root.
    pub fn push(&mut self, actions: Vec<A>) -> bool {
        if self.actions.len() + actions.len() > MAX_CONTINUATION_DEPTH {
            log_warning!(codes::syntax::CONTINUATION_OVERFLOW, "continuation stack overflow, resetting",
                "depth" => self.actions.len(),
                "max" => MAX_CONTINUATION_DEPTH
            );
            self.reset();
            return false;
        }
        self.actions.extend(actions.into_iter().rev());
        true
    }

    /// Next action; `None` only when the root itself is empty
    pub fn pop(&mut self) -> Option<A> {
        if self.actions.is_empty() {
            self.reset();
        }
        self.actions.pop()
    }

    pub fn peek(&self) -> Option<&A> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn reset(&mut self) {
        self.actions.clear();
        self.actions.extend(self.root.iter().rev().cloned());
    }
}

/// The current token as seen by grammar actions, plus the style they assign
#[derive(Debug)]
pub struct Cursor<'t> {
    token: &'t Token,
    marked: Option<String>,
}

impl<'t> Cursor<'t> {
    pub fn new(token: &'t Token) -> Self {
        Self {
            token,
            marked: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.token.kind
    }

    pub fn content(&self) -> &'t str {
        &self.token.content
    }

    pub fn token(&self) -> &'t Token {
        self.token
    }

    pub fn marked(&self) -> Option<&str> {
        self.marked.as_deref()
    }

    /// Replace the style the token will carry
    pub fn mark(&mut self, style: impl Into<String>) {
        self.marked = Some(style.into());
    }

    /// Append an error class to whatever style the token would carry
    pub fn mark_error(&mut self, class: &str) {
        let base = self
            .marked
            .take()
            .unwrap_or_else(|| self.token.style.clone());
        self.marked = Some(format!("{} {}", base, class));
    }
}

/// A grammar driven by a [`ContinuationStack`]
pub trait Grammar {
    type Action: Clone + fmt::Debug;

    fn stack(&mut self) -> &mut ContinuationStack<Self::Action>;

    /// Whether `action` ignores the token and runs as soon as it is on top
    fn is_immediate(action: &Self::Action) -> bool;

    fn run_immediate(&mut self, action: Self::Action);

    fn apply(&mut self, action: Self::Action, cursor: &mut Cursor<'_>) -> Step<Self::Action>;

    /// Called after the stack was reset by a limit, to bring other state back
    /// in line with the root rule
    fn resync(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Consumed { marked: Option<String> },
    /// No action consumed the token within the step limit
    Abandoned,
}

/// Run immediate actions sitting on top of the stack
pub fn run_immediate_actions<G: Grammar>(grammar: &mut G) {
    loop {
        let immediate = grammar.stack().peek().map_or(false, G::is_immediate);
        if !immediate {
            break;
        }
        if let Some(action) = grammar.stack().pop() {
            grammar.run_immediate(action);
        }
    }
}

/// Pop and apply actions until one consumes `token`
pub fn dispatch<G: Grammar>(grammar: &mut G, token: &Token) -> Dispatch {
    let mut cursor = Cursor::new(token);
    for _ in 0..MAX_DISPATCH_STEPS {
        let Some(action) = grammar.stack().pop() else {
            return Dispatch::Abandoned;
        };
        if G::is_immediate(&action) {
            grammar.run_immediate(action);
            continue;
        }
        cursor.marked = None;
        match grammar.apply(action, &mut cursor) {
            Step::Cont(next) => {
                if !grammar.stack().push(next) {
                    grammar.resync();
                }
                return Dispatch::Consumed {
                    marked: cursor.marked,
                };
            }
            Step::Pass(next) => {
                if !grammar.stack().push(next) {
                    grammar.resync();
                }
            }
        }
    }

    log_warning!(codes::syntax::DISPATCH_LIMIT_EXCEEDED, "no action consumed the token",
        "token" => token.content.as_str(),
        "steps" => MAX_DISPATCH_STEPS
    );
    grammar.stack().reset();
    grammar.resync();
    Dispatch::Abandoned
}
