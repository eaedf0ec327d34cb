use crate::file_processor::FileProcessorError;
use crate::logging::codes::{self, Code};
use crate::report::ReportError;

/// Hard failures of an analysis run
///
/// Row-level problems are never reported here; they end up in the report.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No accident records supplied")]
    EmptyInput,

    #[error("Too many records: {count} (max: {max})")]
    TooManyRecords { count: usize, max: usize },

    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Report output failed: {0}")]
    Report(#[from] ReportError),
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::EmptyInput => codes::lexical::EMPTY_INPUT,
            PipelineError::TooManyRecords { .. } => codes::lexical::TOO_MANY_RECORDS,
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::Report(e) => e.error_code(),
        }
    }
}
