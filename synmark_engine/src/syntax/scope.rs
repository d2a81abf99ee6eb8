//! Lexical scope frames, line tracking and local-variable scopes
//!
//! Frames are immutable once shared: a checkpoint holds an `Arc` to the top
//! frame, and any later change (resolving `align`, rebasing the root) clones
//! the frame first.

use crate::config::compile_time::indentation::VARDEF_EXTRA_INDENT;
use crate::config::compile_time::parser::MAX_LEXICAL_DEPTH;
use crate::log_warning;
use crate::logging::codes;
use crate::tokens::{Indentation, Token, WHITESPACE};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Outermost frame
    Block,
    /// Expression statement
    Stat,
    /// Keyword form such as `if (...)`
    Form,
    /// `var` declaration list
    VarDef,
    /// Bracketed scope, tagged with its closing character
    Closer(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexFrame {
    /// Indentation of the line the frame was opened on
    pub indented: isize,
    /// Column just after the opening token
    pub column: usize,
    pub kind: ScopeKind,
    /// Whether lines inside align with `column`; unknown until the end of
    /// the opening line
    pub align: Option<bool>,
    pub info: Option<&'static str>,
    pub prev: Option<Arc<LexFrame>>,
}

impl LexFrame {
    /// Indentation of a line starting with `next_chars` inside this frame
    pub fn indent_for(&self, next_chars: &str, unit: usize) -> usize {
        let first = next_chars.chars().next();
        let closing = matches!(self.kind, ScopeKind::Closer(c) if first == Some(c));
        let unit = unit as isize;
        let column = match self.kind {
            ScopeKind::VarDef => self.indented + VARDEF_EXTRA_INDENT as isize,
            ScopeKind::Form if first == Some('{') => self.indented,
            ScopeKind::Stat | ScopeKind::Form => self.indented + unit,
            _ if self.info == Some("switch") && !closing => {
                if starts_case_label(next_chars) {
                    self.indented + unit
                } else {
                    self.indented + 2 * unit
                }
            }
            _ if self.align == Some(true) => self.column as isize - if closing { 1 } else { 0 },
            _ => self.indented + if closing { 0 } else { unit },
        };
        column.max(0) as usize
    }
}

/// `case` or `default` as a whole word
fn starts_case_label(text: &str) -> bool {
    ["case", "default"].iter().any(|label| {
        text.strip_prefix(label).map_or(false, |rest| {
            !rest
                .chars()
                .next()
                .map_or(false, |c| c.is_alphanumeric() || c == '_')
        })
    })
}

/// Singly linked stack of [`LexFrame`]s
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalStack {
    top: Arc<LexFrame>,
    depth: usize,
    /// Pushes refused at the depth limit, matched by the next pops
    suppressed: usize,
}

impl LexicalStack {
    /// Root frame for a parser whose top-level statements sit at `base_column`
    pub fn new(base_column: usize, unit: usize) -> Self {
        Self {
            top: Arc::new(LexFrame {
                indented: base_column as isize - unit as isize,
                column: 0,
                kind: ScopeKind::Block,
                align: Some(false),
                info: None,
                prev: None,
            }),
            depth: 1,
            suppressed: 0,
        }
    }

    pub fn top(&self) -> &LexFrame {
        &self.top
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push(&mut self, kind: ScopeKind, info: Option<&'static str>, indented: usize, column: usize) {
        if self.depth >= MAX_LEXICAL_DEPTH {
            log_warning!(codes::syntax::LEXICAL_DEPTH_EXCEEDED, "lexical scope not opened",
                "depth" => self.depth,
                "max" => MAX_LEXICAL_DEPTH
            );
            self.suppressed += 1;
            return;
        }
        self.top = Arc::new(LexFrame {
            indented: indented as isize,
            column,
            kind,
            align: None,
            info,
            prev: Some(self.top.clone()),
        });
        self.depth += 1;
    }

    /// Popping the root frame leaves it in place
    pub fn pop(&mut self) {
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return;
        }
        match self.top.prev.clone() {
            Some(prev) => {
                self.top = prev;
                self.depth -= 1;
            }
            None => {
                log_warning!(codes::syntax::LEXICAL_UNDERFLOW, "pop on the root lexical scope");
            }
        }
    }

    /// Decide `align` for the top frame if still unknown
    pub fn settle_align(&mut self, align: bool) {
        if self.top.align.is_none() {
            Arc::make_mut(&mut self.top).align = Some(align);
        }
    }

    /// Drop every frame above the root
    pub fn unwind(&mut self) {
        while let Some(prev) = self.top.prev.clone() {
            self.top = prev;
        }
        self.depth = 1;
        self.suppressed = 0;
    }

    /// Same frames with the root moved so top-level lines start at
    /// `base_column`
    pub fn rebase_root(&mut self, base_column: usize, unit: usize) {
        let root_indented = base_column as isize - unit as isize;
        self.top = rebased(&self.top, root_indented);
    }

    /// Indentation rule for the line after a newline, fixed to the current
    /// top frame
    pub fn indentation(&self, unit: usize) -> Indentation {
        let frame = self.top.clone();
        Indentation::new(move |next_chars, _| frame.indent_for(next_chars, unit))
    }
}

fn rebased(frame: &Arc<LexFrame>, root_indented: isize) -> Arc<LexFrame> {
    let mut copy = LexFrame::clone(frame);
    match &frame.prev {
        Some(prev) => copy.prev = Some(rebased(prev, root_indented)),
        None => copy.indented = root_indented,
    }
    Arc::new(copy)
}

/// Column and current-line indentation while reading tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    pub column: usize,
    pub indented: usize,
}

impl LineState {
    /// Account for `token`; returns true for a newline
    pub fn observe(&mut self, token: &Token) -> bool {
        if token.kind == WHITESPACE && self.column == 0 {
            self.indented = token.width();
        }
        self.column += token.width();
        if token.is_newline() {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.column = 0;
        self.indented = 0;
    }
}

/// Variables declared in one function body or catch clause
#[derive(Debug, Clone, PartialEq)]
pub struct VariableScope {
    vars: HashSet<String>,
    prev: Option<Arc<VariableScope>>,
}

/// Chain of [`VariableScope`]s; empty at the top level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeChain {
    top: Option<Arc<VariableScope>>,
}

impl ScopeChain {
    pub fn push(&mut self) {
        let vars = ["this", "arguments"].iter().map(|v| v.to_string()).collect();
        self.top = Some(Arc::new(VariableScope {
            vars,
            prev: self.top.take(),
        }));
    }

    pub fn pop(&mut self) {
        if let Some(top) = self.top.take() {
            self.top = top.prev.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Declare `name` in the innermost scope; false at the top level
    pub fn register(&mut self, name: &str) -> bool {
        match self.top.as_mut() {
            Some(top) => {
                Arc::make_mut(top).vars.insert(name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let mut cursor = self.top.as_deref();
        while let Some(scope) = cursor {
            if scope.vars.contains(name) {
                return true;
            }
            cursor = scope.prev.as_deref();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: usize = 2;

    fn frame(kind: ScopeKind, indented: isize, column: usize, align: Option<bool>) -> LexFrame {
        LexFrame {
            indented,
            column,
            kind,
            align,
            info: None,
            prev: None,
        }
    }

    #[test]
    fn test_indentation_rules() {
        let stat = frame(ScopeKind::Stat, 4, 10, Some(false));
        assert_eq!(stat.indent_for("foo", UNIT), 6);

        let form = frame(ScopeKind::Form, 4, 10, Some(false));
        assert_eq!(form.indent_for("{", UNIT), 4);
        assert_eq!(form.indent_for("x", UNIT), 6);

        let vardef = frame(ScopeKind::VarDef, 2, 6, Some(true));
        assert_eq!(vardef.indent_for("b = 2", UNIT), 2 + VARDEF_EXTRA_INDENT);

        let aligned = frame(ScopeKind::Closer(')'), 0, 8, Some(true));
        assert_eq!(aligned.indent_for("b)", UNIT), 8);
        assert_eq!(aligned.indent_for(")", UNIT), 7);

        let open = frame(ScopeKind::Closer('}'), 4, 12, Some(false));
        assert_eq!(open.indent_for("x;", UNIT), 6);
        assert_eq!(open.indent_for("}", UNIT), 4);
    }

    #[test]
    fn test_switch_indentation() {
        let mut switch = frame(ScopeKind::Closer('}'), 2, 12, Some(false));
        switch.info = Some("switch");
        assert_eq!(switch.indent_for("case 1:", UNIT), 4);
        assert_eq!(switch.indent_for("default:", UNIT), 4);
        assert_eq!(switch.indent_for("cases();", UNIT), 6);
        assert_eq!(switch.indent_for("}", UNIT), 2);
    }

    #[test]
    fn test_root_frame_puts_top_level_at_base() {
        let stack = LexicalStack::new(0, UNIT);
        assert_eq!(stack.top().indent_for("var x;", UNIT), 0);
        assert_eq!(stack.top().indent_for("}", UNIT), 0);

        let nested = LexicalStack::new(4, UNIT);
        assert_eq!(nested.indentation(UNIT).compute("x", 0), 4);
    }

    #[test]
    fn test_pop_never_underflows() {
        let mut stack = LexicalStack::new(0, UNIT);
        stack.push(ScopeKind::Stat, None, 0, 3);
        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().kind, ScopeKind::Block);
    }

    #[test]
    fn test_settle_align_does_not_touch_shared_frames() {
        let mut stack = LexicalStack::new(0, UNIT);
        stack.push(ScopeKind::Closer(')'), None, 0, 4);
        let saved = stack.clone();
        stack.settle_align(true);
        assert_eq!(stack.top().align, Some(true));
        assert_eq!(saved.top().align, None);
        stack.settle_align(false);
        assert_eq!(stack.top().align, Some(true));
    }

    #[test]
    fn test_rebase_root_keeps_inner_frames() {
        let mut stack = LexicalStack::new(0, UNIT);
        stack.push(ScopeKind::Closer('}'), None, 0, 1);
        stack.rebase_root(6, UNIT);
        assert_eq!(stack.top().kind, ScopeKind::Closer('}'));
        stack.pop();
        assert_eq!(stack.top().indent_for("x", UNIT), 6);
    }

    #[test]
    fn test_scope_chain() {
        let mut chain = ScopeChain::default();
        assert!(!chain.register("top"));
        chain.push();
        assert!(chain.contains("this"));
        assert!(chain.register("x"));
        let saved = chain.clone();
        chain.push();
        chain.register("y");
        assert!(chain.contains("x") && chain.contains("y"));
        chain.pop();
        assert!(!chain.contains("y"));
        assert_eq!(chain, saved);
        chain.pop();
        assert!(chain.is_empty());
        assert!(!chain.contains("x"));
    }
}
