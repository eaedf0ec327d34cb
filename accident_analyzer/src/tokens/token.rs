//! Field tokens produced by classification

use super::FieldKind;
use crate::utils::CellLocation;
use serde::{Deserialize, Serialize};

/// One classified field of one row. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldToken {
    /// Field name exactly as supplied
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: String,
    /// 1-based row number
    pub row: usize,
    /// 1-based column index within the row
    pub position: usize,
}

impl FieldToken {
    pub fn new(name: &str, value: &str, location: CellLocation) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::classify(name),
            value: value.to_string(),
            row: location.row,
            position: location.position,
        }
    }

    pub fn location(&self) -> CellLocation {
        CellLocation::new(self.row, self.position)
    }

    pub fn is_recognized(&self) -> bool {
        self.kind.is_recognized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_classifies_on_creation() {
        let token = FieldToken::new(" Gravedad", "leve", CellLocation::new(2, 6));
        assert_eq!(token.kind, FieldKind::Severity);
        assert_eq!(token.name, " Gravedad");
        assert_eq!(token.location(), CellLocation::new(2, 6));
    }

    #[test]
    fn test_token_serialization_shape() {
        let token = FieldToken::new("hora", "14:30", CellLocation::new(1, 3));
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(
            json,
            r#"{"name":"hora","type":"hora","value":"14:30","row":1,"position":3}"#
        );
    }
}
