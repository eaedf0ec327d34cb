//! Global logging for the accident analyzer
//!
//! Thread-safe global service, a per-file error collector for batch runs, a
//! thread-local file context, and the `log_*!` macros.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::CellLocation;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime preferences
///
/// Returns an error if called twice; tests ignore it with `let _ =`.
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with_service(Arc::new(service::create_configured_service()))
}

/// Initialize with a custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    let required = [
        codes::system::INTERNAL_ERROR,
        codes::file_processing::FILE_NOT_FOUND,
        codes::format::FORMAT_VIOLATION,
        codes::coherence::COHERENCE_VIOLATION,
    ];
    for code in required {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    service.log_success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    );

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

/// Whether debug events would reach any logger
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    if let Some(collector) = try_get_global_error_collector() {
        collector.register_file(&file_path);
    }

    let context = FileProcessingContext::new(file_path, file_id);
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with events on this thread tagged with `file_path`
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn build_event(
    mut event: LogEvent,
    location: Option<CellLocation>,
    context: Vec<(&str, &str)>,
) -> LogEvent {
    if let Some(loc) = location {
        event = event.with_location(loc);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Tag with file context, emit, and record errors/warnings in the collector
fn dispatch(mut event: LogEvent) {
    let file_ctx = get_current_file_context();

    if let Some(ctx) = &file_ctx {
        if config::include_file_context() {
            event = event.with_file_path(&ctx.file_path.display().to_string());
            event = event.with_context("file_id", &ctx.file_id.to_string());
        }
    }

    let collect = event.is_error() || event.is_warning();

    if let Some(logger) = try_get_global_logger() {
        if collect {
            logger.log_event(event.clone());
        } else {
            logger.log_event(event);
            return;
        }
    }

    if collect {
        if let (Some(ctx), Some(collector)) = (file_ctx, try_get_global_error_collector()) {
            collector.record_event(&ctx.file_path, event);
        }
    }
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    location: Option<CellLocation>,
    context: Vec<(&str, &str)>,
) {
    dispatch(build_event(LogEvent::error(code, message), location, context));
}

/// Used by `log_warning!`
pub fn log_warning_with_context(
    code: Code,
    message: &str,
    location: Option<CellLocation>,
    context: Vec<(&str, &str)>,
) {
    dispatch(build_event(
        LogEvent::warning_with_code(code, message),
        location,
        context,
    ));
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::success(code, message), None, context));
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(build_event(LogEvent::info(message), None, context));
}

/// Used by `log_debug!`
pub fn log_debug_with_context(
    message: &str,
    location: Option<CellLocation>,
    context: Vec<(&str, &str)>,
) {
    dispatch(build_event(LogEvent::debug(message), location, context));
}

// ============================================================================
// BATCH SUPPORT
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

/// Print the cargo-style per-file listing to stderr
pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        eprintln!("{}", collector::format_cargo_style_errors(collector));
    }
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Error logging that still reaches stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_error(code, message);
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_error, log_success};

    #[test]
    fn test_global_logging_initialization() {
        let _ = init_global_logging();
        assert!(is_initialized());
        assert!(init_global_logging().is_err());
    }

    #[test]
    fn test_with_file_context() {
        let file_path = PathBuf::from("accidents_march.csv");

        let result = with_file_context(file_path.clone(), 2, || {
            let context = get_current_file_context();
            assert_eq!(context.map(|c| c.file_path), Some(file_path.clone()));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_errors_in_file_context_are_collected() {
        let _ = init_global_logging();
        let file_path = PathBuf::from("collected_errors_march.csv");

        with_file_context(file_path.clone(), 9, || {
            log_error!(codes::format::FORMAT_VIOLATION, "bad id", "row" => 1);
            log_success!(codes::success::REPORT_GENERATED, "not collected");
        });

        let errors = try_get_global_error_collector()
            .map(|collector| collector.get_file_errors(&file_path))
            .unwrap_or_default();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, codes::format::FORMAT_VIOLATION);
    }
}
