//! Lookup table of accepted records
//!
//! Owned by one analyzer and filled only by the coherence stage. Later rows
//! with an identifier already in the table replace the earlier entry.

mod table;

pub use table::SymbolTable;

use crate::logging::codes;
use crate::syntax::ValidatedRow;
use crate::tokens::FieldKind;
use crate::utils::CellLocation;
use crate::log_warning;

/// Prefix of keys given to accepted rows without an identifier
pub const SYNTHETIC_KEY_PREFIX: &str = "accident-";

/// Lookup key for an accepted row
///
/// The identifier value when present and non-empty, otherwise a synthetic key
/// built from the row's 0-based index within the validated set.
pub fn record_key(row: &ValidatedRow, validated_index: usize) -> String {
    match row.non_empty(FieldKind::Identifier) {
        Some(identifier) => identifier.to_string(),
        None => format!("{}{}", SYNTHETIC_KEY_PREFIX, validated_index),
    }
}

/// Insert an accepted row, warning when it replaces an earlier one
pub fn register_accepted(table: &mut SymbolTable, row: ValidatedRow, validated_index: usize) {
    let key = record_key(&row, validated_index);
    let row_number = row.row();

    if let Some(replaced_row) = table.insert(key.clone(), row) {
        log_warning!(
            codes::symbols::DUPLICATE_IDENTIFIER,
            "Duplicate identifier replaces an earlier accepted record",
            location = CellLocation::row_only(row_number),
            "identifier" => key,
            "replaced_row" => replaced_row
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::FieldToken;

    fn row(number: usize, fields: &[(&str, &str)]) -> ValidatedRow {
        let tokens = fields
            .iter()
            .enumerate()
            .map(|(i, (name, value))| FieldToken::new(*name, *value, CellLocation::new(number, i + 1)))
            .collect();
        ValidatedRow::new(number, tokens)
    }

    #[test]
    fn test_key_uses_identifier() {
        let accepted = row(1, &[("ID", "ACC-2024-000001")]);
        assert_eq!(record_key(&accepted, 0), "ACC-2024-000001");
    }

    #[test]
    fn test_synthetic_key_when_identifier_missing_or_empty() {
        assert_eq!(record_key(&row(3, &[("gravedad", "leve")]), 2), "accident-2");
        assert_eq!(record_key(&row(4, &[("id", "")]), 3), "accident-3");
    }

    #[test]
    fn test_duplicate_identifier_overwrites() {
        let _ = crate::logging::init_global_logging();
        let mut table = SymbolTable::new();

        register_accepted(&mut table, row(1, &[("id", "ACC-2024-000001"), ("gravedad", "leve")]), 0);
        register_accepted(&mut table, row(2, &[("id", "ACC-2024-000001"), ("gravedad", "grave")]), 1);

        assert_eq!(table.len(), 1);
        let stored = table.get("ACC-2024-000001").unwrap();
        assert_eq!(stored.row(), 2);
        assert_eq!(stored.value_of(FieldKind::Severity), Some("grave"));
    }
}
