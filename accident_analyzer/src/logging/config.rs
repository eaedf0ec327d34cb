//! Logging configuration: compile-time limits plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install preferences before `init_global_logging`; later calls fail
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn use_cargo_style_output() -> bool {
    get_runtime_preferences().enable_cargo_style_output
}

pub fn include_file_context() -> bool {
    get_runtime_preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_file() -> usize {
    MAX_LOG_EVENTS_PER_FILE
}

/// Sanity-check the generated limits
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 1_000_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    Ok(())
}

/// Configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Limits (compile-time, profile {}) ===\n\
         - Log buffer size: {}\n\
         - Max events per file: {}\n\
         - Max message length: {}\n\
         === Preferences (runtime) ===\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Cargo-style output: {}\n\
         - Include file context: {}",
        crate::config::build_info::profile(),
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_FILE,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.enable_cargo_style_output,
        preferences.include_file_context,
    )
}
