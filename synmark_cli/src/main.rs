//! # Synmark CLI
//!

use clap::{ArgAction, Parser, Subcommand};
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use synmark_cli::commands::{self, indent::IndentMode, CommandContext};
use synmark_cli::{load_runtime_config, CliResult, FileSystemCollector, OutputFormat};
use synmark_engine::config::RuntimeConfig;
use synmark_engine::logging::{self, LogLevel};
use synmark_engine::Language;

#[derive(Parser)]
#[command(name = "synmark")]
#[command(version, about = "Incremental syntax highlighting and indentation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Grammar to use instead of guessing from file extensions
    #[arg(short, long, global = true)]
    language: Option<Language>,

    /// Columns per indentation level
    #[arg(long, global = true)]
    indent_unit: Option<usize>,

    /// TOML file with [editor] and [logging] settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// More output on stderr; repeat for debug events
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight files or directories pass by pass
    Highlight {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Cap every pass at this many lines instead of the pass time
        #[arg(long)]
        pass_lines: Option<usize>,

        /// Print the styled spans of every line
        #[arg(long)]
        spans: bool,
    },

    /// Print the token sequence of one file
    Tokens { file: PathBuf },

    /// Re-indent files with their grammar's indentation rules
    Indent {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Save the re-indented files
        #[arg(long, conflicts_with = "check")]
        write: bool,

        /// Report lines that would move; exit 1 if any would
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => load_runtime_config(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(unit) = cli.indent_unit {
        config.editor.indent_unit = unit;
    }
    config.logging.min_log_level = match cli.verbose {
        0 => config.logging.min_log_level.min(LogLevel::Warning),
        1 => LogLevel::Info,
        _ => LogLevel::Debug,
    };
    if let Err(e) = logging::init_global_logging(&config.logging) {
        error!("Engine logging unavailable: {}", e);
    }

    let collector = FileSystemCollector::new().with_language(cli.language);
    let ctx = CommandContext::new(config.editor, cli.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match cli.command {
        Commands::Highlight {
            paths,
            pass_lines,
            spans,
        } => {
            let sources = collector.collect(&paths)?;
            info!("Highlighting {} files", sources.len());
            commands::highlight::run(&ctx, &sources, pass_lines, spans, &mut out)?;
            ExitCode::SUCCESS
        }
        Commands::Tokens { file } => {
            let sources = collector.collect(&[file])?;
            for source in &sources {
                commands::tokens::run(&ctx, source, &mut out)?;
            }
            ExitCode::SUCCESS
        }
        Commands::Indent {
            paths,
            write,
            check,
        } => {
            let mode = if write {
                IndentMode::Write
            } else if check {
                IndentMode::Check
            } else {
                IndentMode::Print
            };
            let sources = collector.collect(&paths)?;
            let changed = commands::indent::run(&ctx, &sources, mode, &mut out)?;
            if mode == IndentMode::Check && changed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    };
    out.flush()?;
    Ok(code)
}
