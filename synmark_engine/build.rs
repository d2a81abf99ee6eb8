// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    tokenizer: TokenizerLimits,
    parser: ParserLimits,
    indentation: IndentationDefaults,
    highlight: HighlightDefaults,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct TokenizerLimits {
    max_state_transitions: usize,
    max_lookahead_length: usize,
}

#[derive(serde::Deserialize)]
struct ParserLimits {
    max_continuation_depth: usize,
    max_dispatch_steps: usize,
    max_lexical_depth: usize,
}

#[derive(serde::Deserialize)]
struct IndentationDefaults {
    default_indent_unit: usize,
    max_indent_unit: usize,
    vardef_extra_indent: usize,
}

#[derive(serde::Deserialize)]
struct HighlightDefaults {
    default_pass_time_ms: u64,
    default_pass_delay_ms: u64,
    default_max_backtrack_lines: usize,
    clean_lines_before_stop: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    memory_logger_capacity: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SYNMARK_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SYNMARK_CONFIG_DIR");

    let profile = env::var("SYNMARK_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SYNMARK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the synmark_engine directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_CONTINUATION_DEPTH: usize = 1_000_000;
    const ABSOLUTE_MAX_PASS_TIME_MS: u64 = 60_000;

    let indentation = &config.indentation;
    if indentation.default_indent_unit == 0 {
        panic!("CONFIG: default_indent_unit must be at least 1");
    }
    if indentation.default_indent_unit > indentation.max_indent_unit {
        panic!("CONFIG: default_indent_unit exceeds max_indent_unit");
    }

    if config.parser.max_continuation_depth > ABSOLUTE_MAX_CONTINUATION_DEPTH {
        panic!("CONFIG: max_continuation_depth exceeds absolute maximum");
    }
    if config.parser.max_dispatch_steps == 0 {
        panic!("CONFIG: max_dispatch_steps must be at least 1");
    }
    if config.tokenizer.max_state_transitions == 0 {
        panic!("CONFIG: max_state_transitions must be at least 1");
    }

    if config.highlight.default_pass_time_ms > ABSOLUTE_MAX_PASS_TIME_MS {
        panic!("CONFIG: default_pass_time_ms exceeds absolute maximum");
    }
    if config.highlight.clean_lines_before_stop == 0 {
        panic!("CONFIG: clean_lines_before_stop must be at least 1");
    }

    if profile == "production" && config.highlight.default_pass_time_ms > 200 {
        panic!("PRODUCTION: default_pass_time_ms too high for an interactive editor");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod tokenizer {{
        pub const MAX_STATE_TRANSITIONS: usize = {};
        pub const MAX_LOOKAHEAD_LENGTH: usize = {};
    }}

    pub mod parser {{
        pub const MAX_CONTINUATION_DEPTH: usize = {};
        pub const MAX_DISPATCH_STEPS: usize = {};
        pub const MAX_LEXICAL_DEPTH: usize = {};
    }}

    pub mod indentation {{
        pub const DEFAULT_INDENT_UNIT: usize = {};
        pub const MAX_INDENT_UNIT: usize = {};
        pub const VARDEF_EXTRA_INDENT: usize = {};
    }}

    pub mod highlight {{
        pub const DEFAULT_PASS_TIME_MS: u64 = {};
        pub const DEFAULT_PASS_DELAY_MS: u64 = {};
        pub const DEFAULT_MAX_BACKTRACK_LINES: usize = {};
        pub const CLEAN_LINES_BEFORE_STOP: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MEMORY_LOGGER_CAPACITY: usize = {};
    }}
}}
"#,
        profile,
        // Tokenizer
        config.tokenizer.max_state_transitions,
        config.tokenizer.max_lookahead_length,
        // Parser
        config.parser.max_continuation_depth,
        config.parser.max_dispatch_steps,
        config.parser.max_lexical_depth,
        // Indentation
        config.indentation.default_indent_unit,
        config.indentation.max_indent_unit,
        config.indentation.vardef_extra_indent,
        // Highlight
        config.highlight.default_pass_time_ms,
        config.highlight.default_pass_delay_ms,
        config.highlight.default_max_backtrack_lines,
        config.highlight.clean_lines_before_stop,
        // Logging
        config.logging.max_log_message_length,
        config.logging.memory_logger_capacity,
    );

    fs::write(output_path, constants_code).unwrap();
}
