//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the engine and its collaborators log.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Character stream and tokenizer desync codes
pub mod stream {
    use super::Code;

    pub const PENDING_AT_END_OF_STREAM: Code = Code::new("E010");
    pub const OUT_OF_SYNC: Code = Code::new("E011");
    pub const LOOKAHEAD_TOO_LONG: Code = Code::new("E012");
    pub const TOKENIZER_STALLED: Code = Code::new("E013");
}

/// Continuation-stack parser codes
pub mod syntax {
    use super::Code;

    pub const SYNTAX_RESYNC: Code = Code::new("E040");
    pub const DISPATCH_LIMIT_EXCEEDED: Code = Code::new("E041");
    pub const CONTINUATION_OVERFLOW: Code = Code::new("E042");
    pub const LEXICAL_UNDERFLOW: Code = Code::new("E043");
    pub const LEXICAL_DEPTH_EXCEEDED: Code = Code::new("E044");
}

/// Grammar registry and configuration codes
pub mod grammar {
    use super::Code;

    pub const UNKNOWN_LANGUAGE: Code = Code::new("E060");
    pub const MISSING_SUB_GRAMMAR: Code = Code::new("E061");
    pub const INVALID_OPTION: Code = Code::new("E062");
}

/// Highlight session codes
pub mod session {
    use super::Code;

    pub const LINE_OUT_OF_RANGE: Code = Code::new("E080");
    pub const CHECKPOINT_MISSING: Code = Code::new("E081");
    pub const BACKTRACK_LIMIT_REACHED: Code = Code::new("E082");
    pub const DOCUMENT_IO_ERROR: Code = Code::new("E083");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CHECKPOINT_RESTORED: Code = Code::new("I021");
    pub const EMBEDDED_REGION_ENTERED: Code = Code::new("I022");
    pub const HIGHLIGHT_PASS_COMPLETE: Code = Code::new("I040");
    pub const DOCUMENT_REINDENTED: Code = Code::new("I041");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Internal engine error",
                "File a bug report with the input that triggered it",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Logging or configuration initialization failure",
                "Check SYNMARK_* environment variables",
            ),
        );

        // Stream desync
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "Stream",
                Severity::High,
                false,
                true,
                "Text source ended while characters were still uncommitted",
                "Fix the chunk producer so tokens never straddle the end of input",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "Stream",
                Severity::High,
                true,
                false,
                "Token stream and document lines disagree",
                "Restart parsing from an earlier checkpoint or the document start",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "Stream",
                Severity::Low,
                true,
                false,
                "Look-ahead text longer than the configured maximum",
                "Shorten the look-ahead text",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "Stream",
                Severity::High,
                false,
                true,
                "Tokenizer state changed repeatedly without producing a token",
                "Fix the tokenizer state graph",
            ),
        );

        // Parser
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Unexpected token, marked as syntax error and skipped",
                "None; parsing resynchronizes at the expected token",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "No action consumed the token within the dispatch limit",
                "Token was consumed unchanged; check the grammar for a pass loop",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Continuation stack exceeded its maximum depth",
                "Stack was reset to statement level",
            ),
        );
        registry.insert(
            "E043",
            ErrorMetadata::new(
                "E043",
                "Syntax",
                Severity::Low,
                true,
                false,
                "Lexical scope pop with no open scope",
                "None; the pop was ignored",
            ),
        );
        registry.insert(
            "E044",
            ErrorMetadata::new(
                "E044",
                "Syntax",
                Severity::Medium,
                true,
                false,
                "Lexical scope nesting exceeded its maximum depth",
                "Reduce nesting or raise max_lexical_depth",
            ),
        );

        // Grammar configuration
        registry.insert(
            "E060",
            ErrorMetadata::new(
                "E060",
                "Grammar",
                Severity::High,
                false,
                true,
                "Unknown language name or file extension",
                "Use one of the registered language names",
            ),
        );
        registry.insert(
            "E061",
            ErrorMetadata::new(
                "E061",
                "Grammar",
                Severity::Critical,
                false,
                true,
                "Mixed-mode grammar is missing a required sub-grammar",
                "Enable the embedded grammars the mixed mode depends on",
            ),
        );
        registry.insert(
            "E062",
            ErrorMetadata::new(
                "E062",
                "Grammar",
                Severity::High,
                false,
                true,
                "Grammar option out of range",
                "Check indent unit and grammar options",
            ),
        );

        // Session
        registry.insert(
            "E080",
            ErrorMetadata::new(
                "E080",
                "Session",
                Severity::Medium,
                true,
                false,
                "Line index outside the document",
                "Clamp the line index to the document length",
            ),
        );
        registry.insert(
            "E081",
            ErrorMetadata::new(
                "E081",
                "Session",
                Severity::Low,
                true,
                false,
                "No checkpoint stored for the requested line",
                "Run a highlight pass first",
            ),
        );
        registry.insert(
            "E082",
            ErrorMetadata::new(
                "E082",
                "Session",
                Severity::Low,
                true,
                false,
                "Backtrack limit reached before a clean checkpoint was found",
                "Raise SYNMARK_MAX_BACKTRACK or highlight from the top",
            ),
        );
        registry.insert(
            "E083",
            ErrorMetadata::new(
                "E083",
                "Session",
                Severity::Medium,
                false,
                false,
                "Document could not be read",
                "Check the path and permissions",
            ),
        );

        // Success codes
        registry.insert(
            "I004",
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "None",
            ),
        );
        registry.insert(
            "I020",
            ErrorMetadata::new(
                "I020",
                "Stream",
                Severity::Low,
                true,
                false,
                "Tokenization of the input completed",
                "None",
            ),
        );
        registry.insert(
            "I021",
            ErrorMetadata::new(
                "I021",
                "Session",
                Severity::Low,
                true,
                false,
                "Parser resumed from a stored checkpoint",
                "None",
            ),
        );
        registry.insert(
            "I022",
            ErrorMetadata::new(
                "I022",
                "Grammar",
                Severity::Low,
                true,
                false,
                "Mixed-mode parser switched to an embedded grammar",
                "None",
            ),
        );
        registry.insert(
            "I040",
            ErrorMetadata::new(
                "I040",
                "Session",
                Severity::Low,
                true,
                false,
                "Highlight pass finished",
                "None",
            ),
        );
        registry.insert(
            "I041",
            ErrorMetadata::new(
                "I041",
                "Session",
                Severity::Low,
                true,
                false,
                "Document re-indented",
                "None",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires the current parse attempt to stop
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
