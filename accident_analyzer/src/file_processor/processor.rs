//! Delimited-text input: path and size checks, then decoding into raw records

use crate::config::compile_time::file_processing::{MAX_FIELD_LENGTH, MAX_FILE_SIZE};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::records::RawRecord;
use crate::utils::CellLocation;
use crate::{log_debug, log_error, log_success, log_warning};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .csv, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Malformed delimited text at line {line}: {message}")]
    MalformedCsv { line: u64, message: String },

    #[error("Field '{field}' in row {row} is {length} bytes (max: {max_length})")]
    FieldTooLong {
        row: usize,
        field: String,
        length: usize,
        max_length: usize,
    },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::MalformedCsv { .. } => codes::file_processing::MALFORMED_CSV,
            FileProcessorError::FieldTooLong { .. } => codes::file_processing::FIELD_TOO_LONG,
        }
    }
}

/// What was learned about the input file while reading it
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub is_csv_file: bool,
    /// Data rows decoded (header excluded)
    pub record_count: usize,
    pub column_count: usize,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    /// Records per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.records.len() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

pub struct FileProcessor {
    pub delimiter: u8,
    pub require_csv_extension: bool,
    pub trim_whitespace: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            require_csv_extension: true,
            trim_whitespace: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            delimiter: prefs.delimiter,
            require_csv_extension: prefs.require_csv_extension,
            trim_whitespace: prefs.trim_whitespace,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_csv_extension_required(mut self, required: bool) -> Self {
        self.require_csv_extension = required;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Read and decode a file into raw records
    pub fn process_file(&self, file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let display_path = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => &display_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata, &display_path)?;
        let content = self.read_file(&path, &display_path)?;

        let (headers, records) = self.decode(&content)?;
        metadata.record_count = records.len();
        metadata.column_count = headers.len();

        let result = FileProcessingResult {
            headers,
            records,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, &display_path);
        Ok(result)
    }

    /// Decode delimited text with a header row
    ///
    /// Short rows yield only the cells present; cells beyond the header are
    /// dropped. A header repeated in one row keeps its column position and
    /// the last cell's value.
    pub fn decode(&self, content: &str) -> Result<(Vec<String>, Vec<RawRecord>), FileProcessorError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim_whitespace { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        let mut row = StringRecord::new();
        loop {
            match reader.read_record(&mut row) {
                Ok(true) => {
                    let record = self.build_record(records.len() + 1, &headers, &row)?;
                    records.push(record);
                }
                Ok(false) => break,
                Err(e) => return Err(malformed(e)),
            }
        }

        log_debug!("Delimited text decoded",
            "columns" => headers.len(),
            "records" => records.len()
        );

        Ok((headers, records))
    }

    fn build_record(
        &self,
        row_number: usize,
        headers: &[String],
        row: &StringRecord,
    ) -> Result<RawRecord, FileProcessorError> {
        if row.len() != headers.len() {
            log_warning!(
                codes::file_processing::RAGGED_ROW,
                "Row cell count differs from header",
                location = CellLocation::row_only(row_number),
                "cells" => row.len(),
                "columns" => headers.len()
            );
        }

        let mut record = RawRecord::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            if value.len() > MAX_FIELD_LENGTH {
                let error = FileProcessorError::FieldTooLong {
                    row: row_number,
                    field: header.clone(),
                    length: value.len(),
                    max_length: MAX_FIELD_LENGTH,
                };
                log_error!(error.error_code(), "Field exceeds maximum length",
                    "row" => row_number,
                    "field" => header,
                    "length" => value.len()
                );
                return Err(error);
            }
            record.insert(header.as_str(), value);
        }
        Ok(record)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);

        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file_path,
                "size_bytes" => result.metadata.size,
                "size_human" => result.metadata.human_readable_size(),
                "records" => result.records.len(),
                "columns" => result.headers.len(),
                "duration_ms" => duration_ms,
                "records_per_ms" => format!("{:.2}", result.processing_rate())
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file_path,
                "records" => result.records.len(),
                "duration_ms" => duration_ms
            );
        }
    }

    fn validate_path(&self, file_path: &Path) -> Result<PathBuf, FileProcessorError> {
        let display_path = file_path.display().to_string();

        if file_path.as_os_str().is_empty() {
            let error = FileProcessorError::InvalidPath { path: display_path };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        if !file_path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: display_path.clone(),
            };
            log_error!(error.error_code(), "File not found", "path" => &display_path);
            return Err(error);
        }

        if !file_path.is_file() {
            let error = FileProcessorError::InvalidPath {
                path: display_path.clone(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => &display_path);
            return Err(error);
        }

        file_path.canonicalize().map_err(|e| {
            let error = FileProcessorError::IoError {
                message: format!("Failed to resolve path '{}': {}", display_path, e),
            };
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => &display_path,
                "io_error" => e
            );
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| io_failure(path, e, "Failed to read file metadata"))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_csv_file = extension.as_deref() == Some("csv");

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            is_csv_file,
            record_count: 0,
            column_count: 0,
            modified: metadata.modified().ok(),
        };

        log_debug!("File metadata collected",
            "size_bytes" => file_metadata.size,
            "size_human" => file_metadata.human_readable_size(),
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "max_size_bytes" => MAX_FILE_SIZE
        );

        Ok(file_metadata)
    }

    fn validate_file(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds compile-time maximum size limit",
                "file" => file_path,
                "size_bytes" => metadata.size,
                "limit_bytes" => MAX_FILE_SIZE
            );
            return Err(error);
        }

        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }

        if self.require_csv_extension && !metadata.is_csv_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have required .csv extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none")
            );
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        let bytes = fs::read(path).map_err(|e| io_failure(path, e, "Failed to read file"))?;

        String::from_utf8(bytes).map_err(|_| {
            let error = FileProcessorError::InvalidEncoding {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File is not valid UTF-8", "file" => file_path);
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn io_failure(path: &Path, e: std::io::Error, message: &str) -> FileProcessorError {
    let path_str = path.display().to_string();
    let error = match e.kind() {
        std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
            path: path_str.clone(),
        },
        _ => FileProcessorError::IoError {
            message: format!("{} '{}': {}", message, path_str, e),
        },
    };
    log_error!(error.error_code(), message,
        "path" => &path_str,
        "io_error" => e
    );
    error
}

fn malformed(e: csv::Error) -> FileProcessorError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    let error = FileProcessorError::MalformedCsv {
        line,
        message: e.to_string(),
    };
    log_error!(error.error_code(), "Malformed delimited text",
        "line" => line,
        "error" => &e
    );
    error
}

/// Process a file with preferences from the environment
pub fn process_file(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::from_preferences(&FileProcessorPreferences::default()).process_file(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_decodes_header_and_rows() {
        let _ = crate::logging::init_global_logging();
        let dir = tempdir().unwrap();
        let path = dir.path().join("accidents.csv");
        fs::write(
            &path,
            "id,fecha,gravedad\nACC-2024-000001,2023-05-01,leve\n\nACC-2024-000002,2023-05-02,grave\n",
        )
        .unwrap();

        let result = FileProcessor::new().process_file(&path).unwrap();

        assert_eq!(result.headers, vec!["id", "fecha", "gravedad"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].get("gravedad"), Some("grave"));
        assert_eq!(result.metadata.record_count, 2);
        assert!(result.metadata.is_csv_file);
    }

    #[test]
    fn test_ragged_rows() {
        let processor = FileProcessor::new();
        let (_, records) = processor.decode("id,hora,victimas\nA,10:00\nB,11:00,2,extra\n").unwrap();

        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0].get("victimas"), None);
        assert_eq!(records[1].len(), 3);
    }

    #[test]
    fn test_ragged_rows_are_logged() {
        let _ = crate::logging::init_global_logging();
        let path = PathBuf::from("ragged_rows_march.csv");

        crate::logging::with_file_context(path.clone(), 0, || {
            FileProcessor::new()
                .decode("id,hora,victimas\nA,10:00\nB,11:00,2\nC,12:00,1,extra\n")
                .unwrap();
        });

        let ragged_rows: Vec<usize> = crate::logging::try_get_global_error_collector()
            .map(|collector| collector.get_file_events(&path))
            .unwrap_or_default()
            .iter()
            .filter(|event| event.code == codes::file_processing::RAGGED_ROW)
            .filter_map(|event| event.location.map(|loc| loc.row))
            .collect();
        assert_eq!(ragged_rows, vec![1, 3]);
    }

    #[test]
    fn test_values_kept_verbatim_unless_trimming() {
        let content = "gravedad, hora\n leve ,10:00\n";

        let (headers, records) = FileProcessor::new().decode(content).unwrap();
        assert_eq!(headers[1], " hora");
        assert_eq!(records[0].get("gravedad"), Some(" leve "));

        let (_, records) = FileProcessor::new().with_trim(true).decode(content).unwrap();
        assert_eq!(records[0].get("gravedad"), Some("leve"));
        assert_eq!(records[0].get("hora"), Some("10:00"));
    }

    #[test]
    fn test_semicolon_delimiter_and_bom() {
        let (headers, records) = FileProcessor::new()
            .with_delimiter(b';')
            .decode("\u{feff}id;gravedad\nACC-2024-000001;leve\n")
            .unwrap();

        assert_eq!(headers[0], "id");
        assert_eq!(records[0].get("gravedad"), Some("leve"));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let (headers, records) = FileProcessor::new().decode("id,fecha\n").unwrap();
        assert_eq!(headers.len(), 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(&dir.path().join("missing.csv"));
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let result = FileProcessor::new().process_file(&path);
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accidents.txt");
        fs::write(&path, "id\nACC-2024-000001\n").unwrap();

        assert!(FileProcessor::new()
            .with_csv_extension_required(false)
            .process_file(&path)
            .is_ok());
        let result = FileProcessor::new().process_file(&path);
        assert_matches!(result, Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt");
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        fs::write(&path, b"id,ubicacion\nA,Le\xf3n\n").unwrap();

        let result = FileProcessor::new().process_file(&path);
        assert_matches!(result, Err(FileProcessorError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_field_too_long() {
        let long_value = "x".repeat(MAX_FIELD_LENGTH + 1);
        let content = format!("ubicacion\n{}\n", long_value);

        let result = FileProcessor::new().decode(&content);
        assert_matches!(result, Err(FileProcessorError::FieldTooLong { row: 1, .. }));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FileProcessorError::EmptyFile.error_code().as_str(), "E008");
        let error = FileProcessorError::MalformedCsv {
            line: 3,
            message: "x".to_string(),
        };
        assert_eq!(error.error_code(), codes::file_processing::MALFORMED_CSV);
    }
}
