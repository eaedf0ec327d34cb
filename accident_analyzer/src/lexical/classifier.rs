//! Field classifier: raw records to a flat token sequence

use crate::logging::codes;
use crate::records::RawRecord;
use crate::tokens::{FieldKind, FieldToken};
use crate::utils::CellLocation;
use crate::{log_debug, log_success, log_warning};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Counts gathered while classifying one record sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationMetrics {
    pub total_tokens: usize,
    pub row_count: usize,
    pub tokens_per_kind: BTreeMap<FieldKind, usize>,
    /// Distinct field names that matched no recognized kind
    pub unknown_fields: BTreeSet<String>,
}

impl ClassificationMetrics {
    fn record(&mut self, token: &FieldToken) {
        self.total_tokens += 1;
        *self.tokens_per_kind.entry(token.kind).or_insert(0) += 1;
        if !token.is_recognized() {
            self.unknown_fields.insert(token.name.clone());
        }
    }

    pub fn recognized_tokens(&self) -> usize {
        self.total_tokens - self.tokens_per_kind.get(&FieldKind::Unknown).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub struct FieldClassifier {
    metrics: ClassificationMetrics,
}

impl FieldClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &ClassificationMetrics {
        &self.metrics
    }

    /// One token per field per row, in row then column order
    pub fn classify(&mut self, records: &[RawRecord]) -> Vec<FieldToken> {
        self.metrics = ClassificationMetrics::default();
        let start_time = Instant::now();

        log_debug!("Starting field classification", "rows" => records.len());

        let mut tokens = Vec::with_capacity(records.iter().map(RawRecord::len).sum());
        let mut row_start = CellLocation::start();

        for record in records {
            let mut location = row_start;
            for (name, value) in record.iter() {
                let token = FieldToken::new(name, value, location);
                self.metrics.record(&token);
                tokens.push(token);
                location = location.next_position();
            }
            self.metrics.row_count += 1;
            row_start = row_start.next_row();
        }

        for name in &self.metrics.unknown_fields {
            log_warning!(
                codes::lexical::UNRECOGNIZED_FIELD,
                "Field name is not part of the accident schema",
                "field" => name
            );
        }

        log_success!(
            codes::success::CLASSIFICATION_COMPLETE,
            "Field classification completed",
            "rows" => self.metrics.row_count,
            "tokens" => self.metrics.total_tokens,
            "recognized" => self.metrics.recognized_tokens(),
            "duration_ms" => format!("{:.2}", start_time.elapsed().as_secs_f64() * 1000.0)
        );

        tokens
    }
}
