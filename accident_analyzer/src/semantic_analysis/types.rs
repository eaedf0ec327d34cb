//! Coherence stage types

use crate::logging::codes::{self, Code};
use crate::symbols::SymbolTable;
use crate::syntax::{FormatError, ValidatedRow};
use crate::tokens::FieldToken;
use crate::utils::CellLocation;
use serde::Serialize;

/// A format-valid field that fails its semantic predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoherenceError {
    /// 1-based row number in the input
    pub row: usize,
    /// Field name as supplied
    pub field: String,
    pub message: String,
    pub value: String,
    #[serde(skip)]
    pub position: usize,
}

impl CoherenceError {
    pub fn for_token(token: &FieldToken, message: &str) -> Self {
        Self {
            row: token.row,
            field: token.name.clone(),
            message: message.to_string(),
            value: token.value.clone(),
            position: token.position,
        }
    }

    pub fn location(&self) -> CellLocation {
        CellLocation::new(self.row, self.position)
    }

    pub fn error_code(&self) -> Code {
        codes::coherence::COHERENCE_VIOLATION
    }
}

/// Any row-level error surfaced by the coherence stage
///
/// Serializes as the wrapped error's own shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationError {
    Format(FormatError),
    Coherence(CoherenceError),
}

impl ValidationError {
    pub fn row(&self) -> usize {
        match self {
            ValidationError::Format(e) => e.row,
            ValidationError::Coherence(e) => e.row,
        }
    }

    /// Offending field name
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Format(e) => &e.column,
            ValidationError::Coherence(e) => &e.field,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationError::Format(e) => &e.message,
            ValidationError::Coherence(e) => &e.message,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ValidationError::Format(e) => &e.value,
            ValidationError::Coherence(e) => &e.value,
        }
    }

    pub fn location(&self) -> CellLocation {
        match self {
            ValidationError::Format(e) => e.location(),
            ValidationError::Coherence(e) => e.location(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            ValidationError::Format(e) => e.error_code(),
            ValidationError::Coherence(e) => e.error_code(),
        }
    }
}

impl From<FormatError> for ValidationError {
    fn from(error: FormatError) -> Self {
        ValidationError::Format(error)
    }
}

impl From<CoherenceError> for ValidationError {
    fn from(error: CoherenceError) -> Self {
        ValidationError::Coherence(error)
    }
}

/// Output of the coherence stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub valid_rows: Vec<ValidatedRow>,
    pub symbol_table: SymbolTable,
    /// Present only when coherence checking was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SemanticResult {
    /// Result carrying format errors forward without any coherence check
    pub fn skipped(format_errors: &[FormatError]) -> Self {
        Self {
            is_valid: false,
            errors: format_errors.iter().cloned().map(ValidationError::from).collect(),
            valid_rows: Vec::new(),
            symbol_table: SymbolTable::new(),
            message: Some(super::SKIPPED_MESSAGE.to_string()),
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.message.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
