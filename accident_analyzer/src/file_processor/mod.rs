//! Input acquisition: delimited-text files into raw records

mod processor;

use crate::config::compile_time::file_processing::{MAX_FIELD_LENGTH, MAX_FILE_SIZE};
use crate::logging::codes;
use crate::log_debug;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with preferences from the environment
pub fn process_file(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    processor::process_file(file_path)
}

/// Check that every file processing code has registry metadata
pub fn init_file_processor_logging() -> Result<(), String> {
    let required = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
        codes::file_processing::MALFORMED_CSV,
        codes::file_processing::FIELD_TOO_LONG,
        codes::file_processing::RAGGED_ROW,
    ];

    for code in &required {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "max_field_length" => MAX_FIELD_LENGTH
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::FileProcessorPreferences;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("accidents.csv");
        fs::write(&file_path, "id,gravedad\nACC-2024-000001,leve\n").unwrap();

        let result = process_file(&file_path).unwrap();
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_processor_from_preferences() {
        let prefs = FileProcessorPreferences {
            delimiter: b'\t',
            require_csv_extension: true,
            trim_whitespace: true,
            enable_performance_logging: false,
        };

        let processor = FileProcessor::from_preferences(&prefs);
        assert_eq!(processor.delimiter, b'\t');
        assert!(processor.require_csv_extension);
        assert!(processor.trim_whitespace);
        assert!(!processor.enable_performance_logging);
    }

    #[test]
    fn test_error_codes_do_not_halt() {
        let error = FileProcessorError::FileNotFound {
            path: "accidents.csv".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E005");
        assert!(!codes::requires_halt(error.error_code().as_str()));
        assert!(codes::is_recoverable(
            FileProcessorError::EmptyFile.error_code().as_str()
        ));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}
