//! Analysis pipeline
//!
//! Classification, format validation, coherence validation and report
//! generation, in that order. Each `AccidentAnalyzer` owns its lookup table,
//! so concurrent analyses need separate analyzers.

mod error;
mod result;

pub use error::PipelineError;
pub use result::PipelineResult;

use crate::config::compile_time::file_processing::MAX_RECORD_COUNT;
use crate::config::runtime::ReportPreferences;
use crate::lexical::{self, LexicalResult};
use crate::logging;
use crate::records::RawRecord;
use crate::report::{self, Report};
use crate::semantic_analysis::{CoherenceValidator, SemanticResult};
use crate::symbols::SymbolTable;
use crate::syntax::{FormatValidator, SyntacticResult};
use crate::{log_error, log_info};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Instant;

#[derive(Debug)]
pub struct AccidentAnalyzer {
    records: Vec<RawRecord>,
    symbol_table: SymbolTable,
    preferences: ReportPreferences,
}

impl AccidentAnalyzer {
    /// Analyzer over `records`, with report preferences from the environment
    pub fn new(records: Vec<RawRecord>) -> Result<Self, PipelineError> {
        Self::with_preferences(records, ReportPreferences::default())
    }

    pub fn with_preferences(
        records: Vec<RawRecord>,
        preferences: ReportPreferences,
    ) -> Result<Self, PipelineError> {
        if records.is_empty() {
            let error = PipelineError::EmptyInput;
            log_error!(error.error_code(), "No records supplied for analysis");
            return Err(error);
        }

        if records.len() > MAX_RECORD_COUNT {
            let error = PipelineError::TooManyRecords {
                count: records.len(),
                max: MAX_RECORD_COUNT,
            };
            log_error!(error.error_code(), "Record count exceeds compile-time limit",
                "records" => records.len(),
                "max_records" => MAX_RECORD_COUNT
            );
            return Err(error);
        }

        Ok(Self {
            records,
            symbol_table: SymbolTable::new(),
            preferences,
        })
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Lookup table from the most recent coherence run
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn lexical_analysis(&self) -> LexicalResult {
        lexical::classify_records(&self.records)
    }

    pub fn syntactic_analysis(&self, lexical: &LexicalResult) -> SyntacticResult {
        FormatValidator::new().validate(lexical)
    }

    /// Rebuilds this analyzer's lookup table
    pub fn semantic_analysis(
        &mut self,
        syntactic: &SyntacticResult,
        now: DateTime<Utc>,
    ) -> SemanticResult {
        CoherenceValidator::new().validate(syntactic, &mut self.symbol_table, now)
    }

    /// Build the report, classifying the records again for the token listing
    pub fn generate_report(&self, semantic: &SemanticResult) -> Report {
        let tokens = if self.preferences.include_tokens {
            self.lexical_analysis().tokens
        } else {
            Vec::new()
        };
        report::generate_report(semantic, self.records.len(), tokens)
    }

    /// All four stages as of `now`
    pub fn run(&mut self, now: DateTime<Utc>) -> Report {
        log_info!("Starting accident analysis",
            "records" => self.records.len(),
            "now" => now.to_rfc3339()
        );

        let lexical = self.lexical_analysis();
        let syntactic = self.syntactic_analysis(&lexical);
        let semantic = self.semantic_analysis(&syntactic, now);
        self.generate_report(&semantic)
    }
}

/// Analyze records with a fresh analyzer
pub fn analyze_records(records: Vec<RawRecord>, now: DateTime<Utc>) -> Result<Report, PipelineError> {
    let mut analyzer = AccidentAnalyzer::new(records)?;
    Ok(analyzer.run(now))
}

/// Read a delimited-text file and analyze its records
pub fn process_file(file_path: &Path, now: DateTime<Utc>) -> Result<PipelineResult, PipelineError> {
    logging::with_file_context(file_path.to_path_buf(), 0, || process_file_in_context(file_path, now))
}

/// Like `process_file`, without touching the thread's file context
pub(crate) fn process_file_in_context(
    file_path: &Path,
    now: DateTime<Utc>,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let display_path = file_path.display().to_string();

    log_info!("Starting accident file analysis", "file" => &display_path);

    let file_result = crate::file_processor::process_file(file_path)?;
    let record_count = file_result.records.len();
    let report = analyze_records(file_result.records, now)?;

    let result = PipelineResult::new(report, file_result.metadata, record_count, start_time.elapsed());
    result.log_success(&display_path);
    Ok(result)
}
