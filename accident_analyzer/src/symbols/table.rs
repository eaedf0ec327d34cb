//! Identifier-keyed lookup table of accepted records

use crate::syntax::ValidatedRow;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::HashMap;

/// Accepted records keyed by identifier, in first-insertion order
///
/// Re-inserting an existing key replaces the stored row but keeps the
/// entry's original position. Serializes as an array of `[key, record]`
/// pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: Vec<(String, ValidatedRow)>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the row number of the replaced entry
    pub fn insert(&mut self, key: String, row: ValidatedRow) -> Option<usize> {
        match self.index.get(&key) {
            Some(&slot) => {
                let previous = std::mem::replace(&mut self.entries[slot].1, row);
                Some(previous.row())
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, row));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ValidatedRow> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidatedRow)> {
        self.entries.iter().map(|(key, row)| (key.as_str(), row))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (key, row) in &self.entries {
            seq.serialize_element(&(key, row))?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::FieldToken;
    use crate::utils::CellLocation;

    fn row(number: usize, severity: &str) -> ValidatedRow {
        ValidatedRow::new(
            number,
            vec![FieldToken::new("gravedad", severity, CellLocation::new(number, 1))],
        )
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut table = SymbolTable::new();
        assert_eq!(table.insert("A".to_string(), row(1, "leve")), None);
        assert_eq!(table.insert("B".to_string(), row(2, "grave")), None);
        assert_eq!(table.insert("A".to_string(), row(3, "fatal")), Some(1));

        assert_eq!(table.len(), 2);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.get("A").map(ValidatedRow::row), Some(3));
    }

    #[test]
    fn test_serializes_as_entry_pairs() {
        let mut table = SymbolTable::new();
        table.insert("accident-0".to_string(), row(1, "leve"));

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[["accident-0",{"gravedad":"leve"}]]"#);
    }

    #[test]
    fn test_clear() {
        let mut table = SymbolTable::new();
        table.insert("A".to_string(), row(1, "leve"));
        table.clear();
        assert!(table.is_empty());
        assert!(!table.contains("A"));
    }
}
