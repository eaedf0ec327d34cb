// RUNTIME PREFERENCES (read from ACCIDENT_* environment variables)

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

/// Accepts the usual spellings of a boolean switch
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Field delimiter byte for the delimited-text decoder
    pub delimiter: u8,

    /// Whether to reject inputs without a .csv extension
    pub require_csv_extension: bool,

    /// Whether to trim surrounding whitespace from every cell
    pub trim_whitespace: bool,

    /// Whether to log per-file timing
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            delimiter: env::var(env_vars::DELIMITER)
                .ok()
                .and_then(|v| parse_delimiter(&v))
                .unwrap_or(b','),
            require_csv_extension: env_flag(env_vars::REQUIRE_CSV_EXTENSION, true),
            trim_whitespace: env_flag(env_vars::TRIM_WHITESPACE, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

/// Single ASCII character, or the names `tab` / `semicolon` / `comma`
fn parse_delimiter(value: &str) -> Option<u8> {
    match value.to_lowercase().as_str() {
        "tab" | "\\t" => Some(b'\t'),
        "semicolon" => Some(b';'),
        "comma" => Some(b','),
        other if other.len() == 1 && other.is_ascii() => other.bytes().next(),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPreferences {
    /// Whether the report carries the full classified token list
    pub include_tokens: bool,

    /// Whether JSON output is pretty-printed
    pub pretty_json: bool,
}

impl Default for ReportPreferences {
    fn default() -> Self {
        Self {
            include_tokens: env_flag(env_vars::REPORT_INCLUDE_TOKENS, true),
            pretty_json: env_flag(env_vars::REPORT_PRETTY_JSON, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Write log events to stderr
    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,

    /// Print the cargo-style per-file summary after batch runs
    pub enable_cargo_style_output: bool,

    /// Tag events with the file currently being processed
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Warning),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const DELIMITER: &str = "ACCIDENT_DELIMITER";
    pub const REQUIRE_CSV_EXTENSION: &str = "ACCIDENT_REQUIRE_CSV_EXTENSION";
    pub const TRIM_WHITESPACE: &str = "ACCIDENT_TRIM_WHITESPACE";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "ACCIDENT_ENABLE_PERFORMANCE_LOGGING";

    // Report
    pub const REPORT_INCLUDE_TOKENS: &str = "ACCIDENT_REPORT_INCLUDE_TOKENS";
    pub const REPORT_PRETTY_JSON: &str = "ACCIDENT_REPORT_PRETTY_JSON";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ACCIDENT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ACCIDENT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ACCIDENT_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "ACCIDENT_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "ACCIDENT_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("Semicolon"), Some(b';'));
        assert_eq!(parse_delimiter("::"), None);
        assert_eq!(parse_delimiter("é"), None);
    }

    #[test]
    fn test_env_var_names_are_prefixed() {
        for name in [
            env_vars::DELIMITER,
            env_vars::REPORT_INCLUDE_TOKENS,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("ACCIDENT_"));
        }
    }
}
