//! Rows that passed format validation

use crate::tokens::{FieldKind, FieldToken};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A format-valid row: its original row number plus its classified fields
///
/// Serializes as an ordered field-name to value map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    row: usize,
    fields: Vec<FieldToken>,
}

impl ValidatedRow {
    pub fn new(row: usize, fields: Vec<FieldToken>) -> Self {
        Self { row, fields }
    }

    /// 1-based row number in the input
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn fields(&self) -> &[FieldToken] {
        &self.fields
    }

    /// Value of the first field of this kind
    pub fn value_of(&self, kind: FieldKind) -> Option<&str> {
        self.fields
            .iter()
            .find(|token| token.kind == kind)
            .map(|token| token.value.as_str())
    }

    /// Value of the first field of this kind, if present and non-empty
    pub fn non_empty(&self, kind: FieldKind) -> Option<&str> {
        self.value_of(kind).filter(|value| !value.is_empty())
    }
}

impl Serialize for ValidatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for token in &self.fields {
            map.serialize_entry(&token.name, &token.value)?;
        }
        map.end()
    }
}
