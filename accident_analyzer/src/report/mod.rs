//! Aggregation and report assembly
//!
//! The report is the persisted artifact of a run. Its JSON key order and
//! nesting are fixed by the field order of the types below.

pub mod aggregates;
pub mod summary;

pub use aggregates::{DetailedData, Tally};
pub use summary::{ErrorSummary, SuccessSummary, Summary};

use crate::logging::codes::{self, Code};
use crate::semantic_analysis::{SemanticResult, ValidationError};
use crate::symbols::SymbolTable;
use crate::tokens::FieldToken;
use crate::{log_error, log_success};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write report to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn error_code(&self) -> Code {
        match self {
            ReportError::Serialization(_) => codes::report::SERIALIZATION_FAILURE,
            ReportError::Write { .. } => codes::report::OUTPUT_WRITE_FAILURE,
        }
    }
}

// ============================================================================
// REPORT STRUCTURE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Success => "success",
            ReportStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalSection {
    pub tokens: Vec<FieldToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyntacticSection {
    Failed {
        errors: Vec<ValidationError>,
        #[serde(rename = "isValid")]
        is_valid: bool,
    },
    Passed {
        #[serde(rename = "isValid")]
        is_valid: bool,
        #[serde(rename = "validatedRows")]
        validated_rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SemanticSection {
    Failed {
        errors: Vec<ValidationError>,
        #[serde(rename = "isValid")]
        is_valid: bool,
    },
    Passed {
        #[serde(rename = "isValid")]
        is_valid: bool,
        #[serde(rename = "symbolTable")]
        symbol_table: SymbolTable,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub status: ReportStatus,
    pub lexical_analysis: LexicalSection,
    pub syntactic_analysis: SyntacticSection,
    pub semantic_analysis: SemanticSection,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_data: Option<DetailedData>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Success
    }

    /// Errors surfaced by the error path; empty on success
    pub fn errors(&self) -> &[ValidationError] {
        match &self.semantic_analysis {
            SemanticSection::Failed { errors, .. } => errors,
            SemanticSection::Passed { .. } => &[],
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string(self).map_err(|e| self.serialization_failed(e))
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(|e| self.serialization_failed(e))
    }

    /// Write the report as JSON to `path`
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<(), ReportError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };

        std::fs::write(path, json).map_err(|source| {
            let error = ReportError::Write {
                path: path.to_path_buf(),
                source,
            };
            log_error!(error.error_code(), "Failed to write report",
                "path" => path.display(),
                "error" => &error
            );
            error
        })
    }

    fn serialization_failed(&self, source: serde_json::Error) -> ReportError {
        let error = ReportError::from(source);
        log_error!(error.error_code(), "Report serialization failed",
            "status" => self.status.as_str(),
            "error" => &error
        );
        error
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Assemble the report from the coherence result
///
/// `record_count` is the number of input rows; `tokens` is the classification
/// output shown in the lexical section.
pub fn generate_report(
    semantic: &SemanticResult,
    record_count: usize,
    tokens: Vec<FieldToken>,
) -> Report {
    let lexical_analysis = LexicalSection { tokens };

    let report = if !semantic.is_valid {
        Report {
            status: ReportStatus::Error,
            lexical_analysis,
            syntactic_analysis: SyntacticSection::Failed {
                errors: semantic.errors.clone(),
                is_valid: false,
            },
            semantic_analysis: SemanticSection::Failed {
                errors: semantic.errors.clone(),
                is_valid: false,
            },
            summary: Summary::for_error(record_count),
            detailed_data: None,
        }
    } else {
        let accepted = semantic.valid_rows.len();
        let data = DetailedData::from_rows(&semantic.valid_rows);

        Report {
            status: ReportStatus::Success,
            lexical_analysis,
            syntactic_analysis: SyntacticSection::Passed {
                is_valid: true,
                validated_rows: accepted,
            },
            semantic_analysis: SemanticSection::Passed {
                is_valid: true,
                symbol_table: semantic.symbol_table.clone(),
            },
            summary: Summary::for_success(record_count, accepted, &data),
            detailed_data: Some(data),
        }
    };

    log_success!(
        codes::success::REPORT_GENERATED,
        "Report generated",
        "status" => report.status.as_str(),
        "records" => record_count,
        "accepted" => report.summary.valid(),
        "errors" => report.errors().len()
    );

    report
}
