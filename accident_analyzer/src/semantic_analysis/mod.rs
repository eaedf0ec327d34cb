//! Coherence validation stage
//!
//! Runs only when format validation found no errors at all; otherwise the
//! format errors are carried forward and no predicate is evaluated. Each
//! validated row either passes every applicable predicate and is registered
//! in the lookup table, or contributes its violations and is excluded.

pub mod predicates;
pub mod types;

pub use types::{CoherenceError, SemanticResult, ValidationError};

use crate::logging::codes;
use crate::symbols::{self, SymbolTable};
use crate::syntax::{SyntacticResult, ValidatedRow};
use crate::{log_debug, log_success, log_warning};
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Carried by the result when coherence checking is skipped
pub const SKIPPED_MESSAGE: &str =
    "No se puede realizar el análisis semántico debido a errores sintácticos.";

pub struct CoherenceValidator;

impl CoherenceValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate as of `now`, rebuilding `table` from the accepted rows
    pub fn validate(
        &self,
        syntactic: &SyntacticResult,
        table: &mut SymbolTable,
        now: DateTime<Utc>,
    ) -> SemanticResult {
        let start_time = Instant::now();
        table.clear();

        if !syntactic.is_valid {
            log_warning!(
                codes::coherence::COHERENCE_SKIPPED,
                "Coherence validation skipped due to format errors",
                "format_errors" => syntactic.errors.len()
            );
            return SemanticResult::skipped(&syntactic.errors);
        }

        log_debug!("Starting coherence validation",
            "rows" => syntactic.validated_rows.len(),
            "now" => now.to_rfc3339()
        );

        let mut errors: Vec<ValidationError> = Vec::new();
        let mut valid_rows = Vec::new();

        for (validated_index, row) in syntactic.validated_rows.iter().enumerate() {
            let row_errors = check_row(row, now);

            if row_errors.is_empty() {
                symbols::register_accepted(table, row.clone(), validated_index);
                valid_rows.push(row.clone());
                continue;
            }

            for error in row_errors {
                log_debug!(&error.message,
                    location = error.location(),
                    "field" => &error.field,
                    "value" => &error.value
                );
                errors.push(error.into());
            }
        }

        let rejected_rows = syntactic.validated_rows.len() - valid_rows.len();
        if rejected_rows > 0 {
            log_warning!(
                codes::coherence::COHERENCE_VIOLATION,
                "Coherence validation rejected rows",
                "rejected_rows" => rejected_rows,
                "errors" => errors.len()
            );
        }

        log_success!(
            codes::success::SYMBOL_TABLE_COMPLETE,
            "Lookup table built",
            "entries" => table.len(),
            "accepted_rows" => valid_rows.len()
        );

        log_success!(
            codes::success::COHERENCE_VALIDATION_COMPLETE,
            "Coherence validation completed",
            "accepted_rows" => valid_rows.len(),
            "rejected_rows" => rejected_rows,
            "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
        );

        SemanticResult {
            is_valid: rejected_rows == 0,
            errors,
            valid_rows,
            symbol_table: table.clone(),
            message: None,
        }
    }
}

impl Default for CoherenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Every predicate violation in a row, in field order
fn check_row(row: &ValidatedRow, now: DateTime<Utc>) -> Vec<CoherenceError> {
    row.fields()
        .iter()
        .filter(|token| !token.value.is_empty())
        .filter_map(|token| {
            let rule = predicates::rule_for(token.kind)?;
            (!rule.holds(&token.value, now)).then(|| CoherenceError::for_token(token, rule.message))
        })
        .collect()
}

/// Validate with a default validator
pub fn validate_coherence(
    syntactic: &SyntacticResult,
    table: &mut SymbolTable,
    now: DateTime<Utc>,
) -> SemanticResult {
    CoherenceValidator::new().validate(syntactic, table, now)
}
