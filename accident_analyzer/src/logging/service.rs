//! Logging service and logger targets

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Build the service described by the runtime preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let mut targets = MultiLogger::new(min_level);

        if config::use_console_logging() {
            if config::use_structured_logging() {
                targets.add_logger(Arc::new(StructuredLogger::new(min_level)));
            } else {
                targets.add_logger(Arc::new(ConsoleLogger::new(min_level)));
            }
        }

        Self::new(Arc::new(targets), min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_warning_with_code(&self, warning_code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(warning_code, message));
    }
}

/// Plain-text logger writing to stderr
///
/// Stdout is reserved for report output.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", event.format());
        }
    }
}

/// JSON-lines logger writing to stderr
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.format_json() {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", event.format()),
            }
        }
    }
}

/// Fan-out to several targets
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }

    pub fn target_count(&self) -> usize {
        self.loggers.len()
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

/// In-memory logger bounded by the log buffer size, used by tests
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_warning_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_warning() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();

        let max_events = config::get_error_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

/// Create logging service based on current configuration
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}
