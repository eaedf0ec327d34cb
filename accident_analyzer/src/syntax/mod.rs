//! Format validation stage
//!
//! Groups tokens by row and tests every value whose kind has a format rule.
//! A row with any violation is excluded as a whole; all of its violations are
//! reported. Rows are independent of each other.

mod error;
mod row;
pub mod rules;

pub use error::FormatError;
pub use row::ValidatedRow;

use crate::lexical::LexicalResult;
use crate::logging::codes;
use crate::tokens::FieldToken;
use crate::{log_debug, log_success, log_warning};
use serde::Serialize;
use std::time::Instant;

/// Output of the format validation stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntacticResult {
    pub is_valid: bool,
    pub errors: Vec<FormatError>,
    pub validated_rows: Vec<ValidatedRow>,
}

impl SyntacticResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

pub struct FormatValidator;

impl FormatValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, lexical: &LexicalResult) -> SyntacticResult {
        let start_time = Instant::now();
        log_debug!("Starting format validation",
            "rows" => lexical.row_count,
            "tokens" => lexical.tokens.len()
        );

        let mut result = SyntacticResult {
            is_valid: true,
            errors: Vec::new(),
            validated_rows: Vec::new(),
        };
        let mut rejected_rows = 0usize;

        for row_number in 1..=lexical.row_count {
            let row_tokens = tokens_for_row(&lexical.tokens, row_number);
            let row_errors = self.check_row(row_tokens);

            if row_errors.is_empty() {
                result
                    .validated_rows
                    .push(ValidatedRow::new(row_number, row_tokens.to_vec()));
                continue;
            }

            rejected_rows += 1;
            result.is_valid = false;
            for error in row_errors {
                log_debug!(&error.message,
                    location = error.location(),
                    "column" => &error.column,
                    "value" => &error.value
                );
                result.errors.push(error);
            }
        }

        if !result.is_valid {
            log_warning!(
                codes::format::FORMAT_VIOLATION,
                "Format validation found malformed rows",
                "rejected_rows" => rejected_rows,
                "errors" => result.errors.len()
            );
        }

        log_success!(
            codes::success::FORMAT_VALIDATION_COMPLETE,
            "Format validation completed",
            "validated_rows" => result.validated_rows.len(),
            "rejected_rows" => rejected_rows,
            "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
        );

        result
    }

    fn check_row(&self, row_tokens: &[FieldToken]) -> Vec<FormatError> {
        row_tokens
            .iter()
            .filter_map(|token| {
                let rule = rules::rule_for(token.kind)?;
                (!rule.matches(&token.value))
                    .then(|| FormatError::for_token(token, rule.rule.message))
            })
            .collect()
    }
}

impl Default for FormatValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokens of one row; tokens are ordered by row so this is a binary search
fn tokens_for_row(tokens: &[FieldToken], row: usize) -> &[FieldToken] {
    let start = tokens.partition_point(|t| t.row < row);
    let end = tokens.partition_point(|t| t.row <= row);
    &tokens[start..end]
}

/// Validate with a default validator
pub fn validate_format(lexical: &LexicalResult) -> SyntacticResult {
    FormatValidator::new().validate(lexical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::classify_records;
    use crate::records::RawRecord;

    fn valid_row(id: &str) -> RawRecord {
        RawRecord::new()
            .with_field("id", id)
            .with_field("fecha", "2023-05-01")
            .with_field("hora", "14:30")
            .with_field("gravedad", "leve")
            .with_field("victimas", "2")
            .with_field("edad_conductor", "30")
            .with_field("alcohol_involucrado", "no")
            .with_field("exceso_velocidad", "si")
    }

    #[test]
    fn test_all_rows_valid() {
        let _ = crate::logging::init_global_logging();
        let records = vec![valid_row("ACC-2024-000001"), valid_row("ACC-2024-000002")];

        let result = validate_format(&classify_records(&records));

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.validated_rows.len(), 2);
        assert_eq!(result.validated_rows[1].row(), 2);
    }

    #[test]
    fn test_bad_identifier_rejects_row() {
        let records = vec![valid_row("ACC-2024-000001"), valid_row("BAD-ID")];

        let result = validate_format(&classify_records(&records));

        assert!(!result.is_valid);
        assert_eq!(result.validated_rows.len(), 1);
        assert_eq!(
            result.errors,
            vec![FormatError {
                row: 2,
                column: "id".to_string(),
                message: "ID del accidente debe tener formato ACC-YYYY-XXXXXX".to_string(),
                value: "BAD-ID".to_string(),
                position: 1,
            }]
        );
    }

    #[test]
    fn test_every_violation_of_a_row_is_reported() {
        let record = valid_row("ACC-2024-000001")
            .with_field("hora", "2:30")
            .with_field("victimas", "dos");

        let result = validate_format(&classify_records(&[record]));

        let columns: Vec<&str> = result.errors.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["hora", "victimas"]);
        assert!(result.validated_rows.is_empty());
    }

    #[test]
    fn test_free_text_and_unknown_fields_pass() {
        let record = valid_row("ACC-2024-000001")
            .with_field("gravedad", "catastrofico")
            .with_field("ubicacion", "")
            .with_field("comentario", "???");

        let result = validate_format(&classify_records(&[record]));
        assert!(result.is_valid);
    }

    #[test]
    fn test_empty_value_fails_a_ruled_field() {
        let record = valid_row("ACC-2024-000001").with_field("fecha", "");
        let result = validate_format(&classify_records(&[record]));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].column, "fecha");
    }

    #[test]
    fn test_row_without_fields_is_validated() {
        let records = vec![valid_row("ACC-2024-000001"), RawRecord::new()];
        let result = validate_format(&classify_records(&records));

        assert!(result.is_valid);
        assert_eq!(result.validated_rows.len(), 2);
        assert!(result.validated_rows[1].fields().is_empty());
    }

    #[test]
    fn test_every_rejected_row_is_named_in_errors() {
        let row_count = 2_000;
        let records: Vec<RawRecord> = (0..row_count)
            .map(|_| valid_row("BAD").with_field("hora", "9"))
            .collect();

        let result = validate_format(&classify_records(&records));

        assert!(!result.is_valid);
        assert!(result.validated_rows.is_empty());
        assert_eq!(result.errors.len(), row_count * 2);
        assert_eq!(result.errors.last().map(|e| e.row), Some(row_count));
        assert_eq!(result.errors[result.errors.len() - 2].row, row_count);
    }

    #[test]
    fn test_membership_matches_error_rows() {
        let records = vec![
            valid_row("ACC-2024-000001"),
            valid_row("ACC-24-1"),
            valid_row("ACC-2024-000003").with_field("edad_conductor", "1000"),
            valid_row("ACC-2024-000004"),
        ];

        let result = validate_format(&classify_records(&records));

        let validated: Vec<usize> = result.validated_rows.iter().map(|r| r.row()).collect();
        let errored: Vec<usize> = result.errors.iter().map(|e| e.row).collect();
        assert_eq!(validated, vec![1, 4]);
        assert_eq!(errored, vec![2, 3]);
    }
}
