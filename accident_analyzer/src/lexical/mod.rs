//! Field classification stage
//!
//! Turns the raw record sequence into a flat sequence of [`FieldToken`]s.
//! This stage never rejects input.

pub mod classifier;

use crate::records::RawRecord;
use crate::tokens::FieldToken;
use serde::Serialize;

pub use classifier::{ClassificationMetrics, FieldClassifier};

/// Output of the classification stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalResult {
    pub tokens: Vec<FieldToken>,
    #[serde(skip)]
    pub row_count: usize,
}

impl LexicalResult {
    /// Tokens grouped by row number, rows in ascending order
    ///
    /// Rows without fields are absent from the grouping.
    pub fn rows(&self) -> impl Iterator<Item = &[FieldToken]> {
        self.tokens.chunk_by(|a, b| a.row == b.row)
    }
}

/// Classify every field of every record
pub fn classify_records(records: &[RawRecord]) -> LexicalResult {
    LexicalResult {
        tokens: FieldClassifier::new().classify(records),
        row_count: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_groups_consecutive_tokens() {
        let records: Vec<RawRecord> = vec![
            vec![("id", "A"), ("fecha", "B")].into_iter().collect(),
            RawRecord::new(),
            vec![("hora", "C")].into_iter().collect(),
        ];

        let result = classify_records(&records);
        let rows: Vec<Vec<usize>> = result
            .rows()
            .map(|row| row.iter().map(|t| t.row).collect())
            .collect();

        assert_eq!(result.row_count, 3);
        assert_eq!(rows, vec![vec![1, 1], vec![3]]);
    }

    #[test]
    fn test_serializes_tokens_only() {
        let records: Vec<RawRecord> = vec![vec![("hora", "10:00")].into_iter().collect()];
        let json = serde_json::to_value(classify_records(&records)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tokens": [{"name": "hora", "type": "hora", "value": "10:00", "row": 1, "position": 1}]
            })
        );
    }
}
