//! Per-file event collection for batch runs with cargo-style output

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// The file a thread is currently analyzing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub clean_files: usize,
    pub files_with_errors: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe collector of error and warning events keyed by input file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a file so it shows up in summaries even without events
    pub fn register_file(&self, file_path: &Path) {
        self.lock().entry(file_path.to_path_buf()).or_default();
    }

    /// Record an event for a file, capped at MAX_LOG_EVENTS_PER_FILE
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.lock();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.lock().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.lock()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.lock().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.lock();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.files_with_errors += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.clean_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE OUTPUT
// ============================================================================

fn push_event(output: &mut String, kind: &str, file_path: &Path, event: &LogEvent) {
    let location_info = event
        .location
        .map(|loc| format!(" --> {}:{}:{}", file_path.display(), loc.row, loc.position))
        .unwrap_or_default();

    output.push_str(&format!(
        "{}[{}]: {}{}\n",
        kind,
        event.code.as_str(),
        event.message,
        location_info
    ));

    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }

    if event.is_error() {
        let action = event.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("  = help: {}\n", action));
        }
    }
}

/// Render every collected error and warning grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in errors {
            push_event(&mut output, "error", file_path, event);
        }
        for event in warnings {
            push_event(&mut output, "warning", file_path, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    output.push_str(&format!(
        "Checked {} file(s): {} error(s), {} warning(s) in {:.2}s",
        summary.total_files,
        summary.total_errors,
        summary.total_warnings,
        summary.total_processing_time.as_secs_f64()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::CellLocation;

    #[test]
    fn test_summary_classifies_files() {
        let collector = ErrorCollector::new();
        let clean = PathBuf::from("clean.csv");
        let warned = PathBuf::from("warned.csv");
        let broken = PathBuf::from("broken.csv");

        collector.register_file(&clean);
        collector.record_event(
            &warned,
            LogEvent::warning_with_code(codes::symbols::DUPLICATE_IDENTIFIER, "dup"),
        );
        collector.record_event(
            &broken,
            LogEvent::error(codes::format::FORMAT_VIOLATION, "bad id"),
        );

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.clean_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.files_with_errors, 1);
        assert!(summary.has_errors());
        assert_eq!(collector.get_file_errors(&broken).len(), 1);
    }

    #[test]
    fn test_per_file_event_cap() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("noisy.csv");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 10 {
            collector.record_event(&path, LogEvent::error(codes::format::FORMAT_VIOLATION, "x"));
        }

        assert_eq!(
            collector.get_file_events(&path).len(),
            MAX_LOG_EVENTS_PER_FILE + 1
        );
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("accidents.csv");
        collector.record_event(
            &path,
            LogEvent::error(codes::format::FORMAT_VIOLATION, "bad id")
                .with_location(CellLocation::new(2, 1))
                .with_context("value", "BAD-ID"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking accidents.csv..."));
        assert!(output.contains("error[E040]: bad id --> accidents.csv:2:1"));
        assert!(output.contains("  = value: BAD-ID"));
        assert!(output.contains("Checked 1 file(s): 1 error(s), 0 warning(s)"));
    }
}
