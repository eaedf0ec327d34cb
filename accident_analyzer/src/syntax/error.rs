//! Row-level format errors
//!
//! These are data, not Rust errors: they are collected into the stage result
//! and never abort the run.

use crate::logging::codes::{self, Code};
use crate::tokens::FieldToken;
use crate::utils::CellLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatError {
    /// 1-based row number in the input
    pub row: usize,
    /// Field name as supplied
    pub column: String,
    pub message: String,
    pub value: String,
    #[serde(skip)]
    pub position: usize,
}

impl FormatError {
    pub fn for_token(token: &FieldToken, message: &str) -> Self {
        Self {
            row: token.row,
            column: token.name.clone(),
            message: message.to_string(),
            value: token.value.clone(),
            position: token.position,
        }
    }

    pub fn location(&self) -> CellLocation {
        CellLocation::new(self.row, self.position)
    }

    pub fn error_code(&self) -> Code {
        codes::format::FORMAT_VIOLATION
    }
}
