//! Consolidated event codes and classification system
//!
//! Single source of truth for every error, warning and success code emitted by
//! the analyzer, together with the behavioral metadata attached to each code.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
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
// CLASSIFICATION TYPES
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

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
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
    pub const fn new(
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

/// Input file acquisition error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const MALFORMED_CSV: Code = Code::new("E013");
    pub const FIELD_TOO_LONG: Code = Code::new("E014");
    pub const RAGGED_ROW: Code = Code::new("W013");
}

/// Field classification codes
pub mod lexical {
    use super::Code;

    pub const EMPTY_INPUT: Code = Code::new("E020");
    pub const TOO_MANY_RECORDS: Code = Code::new("E021");
    pub const UNRECOGNIZED_FIELD: Code = Code::new("W020");
}

/// Format validation codes
pub mod format {
    use super::Code;

    pub const FORMAT_VIOLATION: Code = Code::new("E040");
}

/// Coherence validation codes
pub mod coherence {
    use super::Code;

    pub const COHERENCE_VIOLATION: Code = Code::new("E060");
    pub const COHERENCE_SKIPPED: Code = Code::new("W062");
}

/// Accepted-record lookup table codes
pub mod symbols {
    use super::Code;

    pub const DUPLICATE_IDENTIFIER: Code = Code::new("W080");
}

/// Report assembly and output codes
pub mod report {
    use super::Code;

    pub const SERIALIZATION_FAILURE: Code = Code::new("E100");
    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E101");
}

/// Batch processing codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E120");
    pub const NO_INPUT_FILES: Code = Code::new("E121");
    pub const TOO_MANY_FILES: Code = Code::new("E122");
    pub const WORKER_FAILURE: Code = Code::new("E123");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I020");
    pub const FORMAT_VALIDATION_COMPLETE: Code = Code::new("I040");
    pub const COHERENCE_VALIDATION_COMPLETE: Code = Code::new("I060");
    pub const SYMBOL_TABLE_COMPLETE: Code = Code::new("I080");
    pub const REPORT_GENERATED: Code = Code::new("I100");
    pub const BATCH_COMPLETE: Code = Code::new("I120");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal system error",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Logging or configuration initialization failed",
        "Check ACCIDENT_* environment variables and the build profile",
    ),
    // File processing
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Input file not found",
        "Check the input path",
    ),
    ErrorMetadata::new(
        "E006",
        "FileProcessing",
        Severity::Medium,
        true,
        false,
        "Input file does not have a .csv extension",
        "Rename the file or unset ACCIDENT_REQUIRE_CSV_EXTENSION",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Input file exceeds the configured size limit",
        "Split the file or build with a profile that allows larger inputs",
    ),
    ErrorMetadata::new(
        "E008",
        "FileProcessing",
        Severity::Medium,
        true,
        false,
        "Input file is empty",
        "Provide a file with a header row and at least one record",
    ),
    ErrorMetadata::new(
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Permission denied reading input file",
        "Check file permissions",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Input file is not valid UTF-8",
        "Re-export the file with UTF-8 encoding",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "I/O error while reading input",
        "Check disk and filesystem health",
    ),
    ErrorMetadata::new(
        "E012",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "Invalid input path",
        "Provide a path to a regular file",
    ),
    ErrorMetadata::new(
        "E013",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Delimited text could not be decoded",
        "Check quoting and the configured delimiter",
    ),
    ErrorMetadata::new(
        "E014",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "A field value exceeds the configured length limit",
        "Shorten the value or raise max_field_length in the build profile",
    ),
    ErrorMetadata::new(
        "W013",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "Row has a different number of cells than the header",
        "Check the row for a missing or extra delimiter",
    ),
    // Classification
    ErrorMetadata::new(
        "E020",
        "Classification",
        Severity::High,
        false,
        true,
        "No records supplied for analysis",
        "Provide at least one record",
    ),
    ErrorMetadata::new(
        "E021",
        "Classification",
        Severity::High,
        false,
        true,
        "Record count exceeds the configured limit",
        "Split the input into smaller batches",
    ),
    ErrorMetadata::new(
        "W020",
        "Classification",
        Severity::Low,
        true,
        false,
        "Field name is not part of the accident schema",
        "Rename the column if it was meant to be validated",
    ),
    // Format validation
    ErrorMetadata::new(
        "E040",
        "FormatValidation",
        Severity::Medium,
        true,
        false,
        "Field value does not match its format rule",
        "Correct the value to match the expected pattern",
    ),
    // Coherence validation
    ErrorMetadata::new(
        "E060",
        "CoherenceValidation",
        Severity::Medium,
        true,
        false,
        "Field value fails its coherence rule",
        "Correct the value to a permitted one",
    ),
    ErrorMetadata::new(
        "W062",
        "CoherenceValidation",
        Severity::Low,
        true,
        false,
        "Coherence validation skipped because of format errors",
        "Fix the format errors first",
    ),
    // Lookup table
    ErrorMetadata::new(
        "W080",
        "Symbols",
        Severity::Low,
        true,
        false,
        "Duplicate accident identifier; later record replaces the earlier entry",
        "Give each accident a unique identifier",
    ),
    // Report
    ErrorMetadata::new(
        "E100",
        "Report",
        Severity::High,
        false,
        false,
        "Report could not be serialized",
        "File a bug report with the input that triggered it",
    ),
    ErrorMetadata::new(
        "E101",
        "Report",
        Severity::High,
        false,
        false,
        "Report could not be written",
        "Check the output path and permissions",
    ),
    // Batch
    ErrorMetadata::new(
        "E120",
        "Batch",
        Severity::High,
        false,
        true,
        "Batch input directory not found",
        "Check the directory path",
    ),
    ErrorMetadata::new(
        "E121",
        "Batch",
        Severity::Medium,
        true,
        false,
        "No .csv files found in directory",
        "Place input files with a .csv extension in the directory",
    ),
    ErrorMetadata::new(
        "E122",
        "Batch",
        Severity::High,
        false,
        true,
        "Too many files for one batch",
        "Split the directory or raise max_files_per_batch",
    ),
    ErrorMetadata::new(
        "E123",
        "Batch",
        Severity::High,
        false,
        false,
        "A batch worker thread failed",
        "Re-run with --sequential to isolate the failing file",
    ),
    // Success
    ErrorMetadata::new(
        "I001",
        "Success",
        Severity::Low,
        true,
        false,
        "Operation completed successfully",
        "None",
    ),
    ErrorMetadata::new(
        "I004",
        "Success",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "None",
    ),
    ErrorMetadata::new(
        "I006",
        "Success",
        Severity::Low,
        true,
        false,
        "Input file decoded into records",
        "Continue to field classification",
    ),
    ErrorMetadata::new(
        "I020",
        "Success",
        Severity::Low,
        true,
        false,
        "Field classification completed",
        "Continue to format validation",
    ),
    ErrorMetadata::new(
        "I040",
        "Success",
        Severity::Low,
        true,
        false,
        "Format validation completed",
        "Continue to coherence validation",
    ),
    ErrorMetadata::new(
        "I060",
        "Success",
        Severity::Low,
        true,
        false,
        "Coherence validation completed",
        "Continue to report generation",
    ),
    ErrorMetadata::new(
        "I080",
        "Success",
        Severity::Low,
        true,
        false,
        "Accepted-record lookup table built",
        "None",
    ),
    ErrorMetadata::new(
        "I100",
        "Success",
        Severity::Low,
        true,
        false,
        "Report generated",
        "None",
    ),
    ErrorMetadata::new(
        "I120",
        "Success",
        Severity::Low,
        true,
        false,
        "Batch processing completed",
        "None",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
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

/// Check if error requires immediate halt
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_CODES: &[Code] = &[
        system::INTERNAL_ERROR,
        system::INITIALIZATION_FAILURE,
        file_processing::FILE_NOT_FOUND,
        file_processing::INVALID_EXTENSION,
        file_processing::FILE_TOO_LARGE,
        file_processing::EMPTY_FILE,
        file_processing::PERMISSION_DENIED,
        file_processing::INVALID_ENCODING,
        file_processing::IO_ERROR,
        file_processing::INVALID_PATH,
        file_processing::MALFORMED_CSV,
        file_processing::FIELD_TOO_LONG,
        file_processing::RAGGED_ROW,
        lexical::EMPTY_INPUT,
        lexical::TOO_MANY_RECORDS,
        lexical::UNRECOGNIZED_FIELD,
        format::FORMAT_VIOLATION,
        coherence::COHERENCE_VIOLATION,
        coherence::COHERENCE_SKIPPED,
        symbols::DUPLICATE_IDENTIFIER,
        report::SERIALIZATION_FAILURE,
        report::OUTPUT_WRITE_FAILURE,
        batch::DIRECTORY_NOT_FOUND,
        batch::NO_INPUT_FILES,
        batch::TOO_MANY_FILES,
        batch::WORKER_FAILURE,
        success::OPERATION_COMPLETED_SUCCESSFULLY,
        success::SYSTEM_INITIALIZATION_COMPLETED,
        success::FILE_PROCESSING_SUCCESS,
        success::CLASSIFICATION_COMPLETE,
        success::FORMAT_VALIDATION_COMPLETE,
        success::COHERENCE_VALIDATION_COMPLETE,
        success::SYMBOL_TABLE_COMPLETE,
        success::REPORT_GENERATED,
        success::BATCH_COMPLETE,
    ];

    #[test]
    fn test_every_code_has_metadata() {
        for code in ALL_CODES {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
        assert_eq!(REGISTRY_ENTRIES.len(), ALL_CODES.len());
    }

    #[test]
    fn test_codes_are_unique() {
        let unique: HashSet<&str> = ALL_CODES.iter().map(|c| c.as_str()).collect();
        assert_eq!(unique.len(), ALL_CODES.len());
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E040"), "FormatValidation");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("E020"));
        assert!(is_recoverable("W080"));
        assert_eq!(get_description("nope"), "Unknown error");
        assert_eq!(get_action("nope"), "No specific action available");
    }

    #[test]
    fn test_severity_round_trip_names() {
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ] {
            assert_eq!(Severity::parse(severity.as_str()), Some(severity));
        }
    }
}
