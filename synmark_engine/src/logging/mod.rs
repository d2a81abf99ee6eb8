//! Global logging for the synmark engine
//!
//! A process-wide `LoggingService` plus a per-thread document context that
//! every event logged through the macros picks up.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::LoggingPreferences;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{DocPosition, LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, EventSummary, Logger, LoggingService, MemoryLogger, MultiLogger, NullLogger,
    StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static INCLUDE_DOCUMENT_CONTEXT: AtomicBool = AtomicBool::new(true);

thread_local! {
    static DOCUMENT_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the given preferences
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    let logging_service = Arc::new(LoggingService::with_config(preferences));
    if GLOBAL_LOGGER.set(logging_service.clone()).is_err() {
        safe_log_error(
            codes::system::INITIALIZATION_FAILURE,
            "Global logger already initialized",
        );
        return Err("Global logger already initialized".to_string());
    }
    INCLUDE_DOCUMENT_CONTEXT.store(preferences.include_document_context, Ordering::Relaxed);

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::stream::OUT_OF_SYNC,
        codes::syntax::SYNTAX_RESYNC,
        codes::grammar::UNKNOWN_LANGUAGE,
        codes::session::LINE_OUT_OF_RANGE,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            let message = format!("Missing metadata for error code: {}", code);
            logging_service.log_event(LogEvent::error(
                codes::system::INITIALIZATION_FAILURE,
                &message,
            ));
            return Err(message);
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a caller-built service (tests, embedding editors)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// True when a debug event would reach a logger
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// DOCUMENT CONTEXT
// ============================================================================

pub fn set_document_context(name: &str) {
    DOCUMENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(name.to_string());
    });
}

pub fn clear_document_context() {
    DOCUMENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with `name` as the current thread's document
pub fn with_document_context<F, R>(name: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_document_context();
    set_document_context(name);
    let result = f();
    match previous {
        Some(previous) => set_document_context(&previous),
        None => clear_document_context(),
    }
    result
}

pub fn get_current_document_context() -> Option<String> {
    DOCUMENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_document(event: LogEvent) -> LogEvent {
    if !INCLUDE_DOCUMENT_CONTEXT.load(Ordering::Relaxed) {
        return event;
    }
    match get_current_document_context() {
        Some(name) => event.with_document(&name),
        None => event,
    }
}

fn dispatch(mut event: LogEvent, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    logger.log_event(attach_document(event));
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

pub fn log_error_with_context(
    code: Code,
    message: &str,
    position: Option<DocPosition>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(position) = position {
        event = event.at(position);
    }
    dispatch(event, context);
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    position: Option<DocPosition>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::warning_with_code(code, message);
    if let Some(position) = position {
        event = event.at(position);
    }
    dispatch(event, context);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::success(code, message), context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::info(message), context);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::debug(message), context);
}

/// Error logging that falls back to stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_document(LogEvent::error(code, message)));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

/// Memory logger installed as the global logger of the test binary
#[cfg(test)]
pub(crate) fn test_capture() -> Arc<MemoryLogger> {
    static CAPTURE: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    CAPTURE
        .get_or_init(|| {
            let memory = Arc::new(MemoryLogger::with_capacity(100_000));
            let service = LoggingService::new(memory.clone(), LogLevel::Debug);
            let _ = init_global_logging_with_service(Arc::new(service));
            memory
        })
        .clone()
}
