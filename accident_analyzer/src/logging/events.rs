//! Log event type shared by every logger

use super::codes::{self, Code};
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::utils::CellLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Parse a level name or its numeric rank
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_lowercase().as_str() {
            "error" | "0" => Some(LogLevel::Error),
            "warning" | "warn" | "1" => Some(LogLevel::Warning),
            "info" | "2" => Some(LogLevel::Info),
            "debug" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub location: Option<CellLocation>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn build(level: LogLevel, code: Code, message: &str) -> Self {
        let message = if message.len() > MAX_LOG_MESSAGE_LENGTH {
            let mut cut = MAX_LOG_MESSAGE_LENGTH;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &message[..cut])
        } else {
            message.to_string()
        };

        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message,
            location: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Error, error_code, message)
    }

    /// Warning without a registered code
    pub fn warning(message: &str) -> Self {
        Self::build(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::build(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info-level event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::build(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_location(mut self, location: CellLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_file_path(self, path: &str) -> Self {
        self.with_context("file", path)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// Single-line display form
    pub fn format(&self) -> String {
        let location_str = self
            .location
            .map(|loc| format!(" at {}", loc))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            location_str
        )
    }

    /// Multi-line form with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// JSON line for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(location) = &self.location {
            json["location"] = serde_json::to_value(location)?;
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_event_with_location_formatting() {
        let event = LogEvent::error(codes::format::FORMAT_VIOLATION, "bad date")
            .with_location(CellLocation::new(3, 2));
        let formatted = event.format();

        assert!(formatted.starts_with("[ERROR] E040 - bad date"));
        assert!(formatted.ends_with("at row 3, field 2"));
    }

    #[test]
    fn test_detailed_format_lists_context_in_key_order() {
        let event = LogEvent::warning_with_code(codes::symbols::DUPLICATE_IDENTIFIER, "dup")
            .with_context("row", "5")
            .with_context("identifier", "ACC-2024-000001");
        let detailed = event.format_detailed();

        let id_pos = detailed.find("identifier:").unwrap();
        let row_pos = detailed.find("row:").unwrap();
        assert!(id_pos < row_pos);
        assert!(detailed.contains("Category: Symbols"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_context("file", "accidents.csv")
            .with_location(CellLocation::new(1, 4));

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E009");
        assert_eq!(json["location"]["row"], 1);
        assert_eq!(json["location"]["position"], 4);
        assert_eq!(json["context"]["file"], "accidents.csv");
        assert_eq!(json["error_metadata"]["requires_halt"], false);
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 50);
        let event = LogEvent::info(&long);
        assert_eq!(event.message.len(), MAX_LOG_MESSAGE_LENGTH + 3);
        assert!(event.message.ends_with("..."));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse("2"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
