//! Cell location tracking for tabular input
//!
//! Every value in the input is addressed by its 1-based row number and its
//! 1-based position within that row. Locations are derived solely from input
//! order and never change once assigned.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell address inside the record sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellLocation {
    /// Row number (1-based)
    pub row: usize,
    /// Field position within the row (1-based)
    pub position: usize,
}

impl CellLocation {
    pub fn new(row: usize, position: usize) -> Self {
        Self { row, position }
    }

    /// Location of the first field of the first row
    pub fn start() -> Self {
        Self {
            row: 1,
            position: 1,
        }
    }

    /// Location addressing a whole row rather than a single cell
    pub fn row_only(row: usize) -> Self {
        Self { row, position: 0 }
    }

    /// Whether this location addresses a specific cell
    pub fn has_position(&self) -> bool {
        self.position > 0
    }

    /// Next field in the same row
    pub fn next_position(self) -> Self {
        Self {
            row: self.row,
            position: self.position + 1,
        }
    }

    /// First field of the following row
    pub fn next_row(self) -> Self {
        Self {
            row: self.row + 1,
            position: 1,
        }
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_position() {
            write!(f, "row {}, field {}", self.row, self.position)
        } else {
            write!(f, "row {}", self.row)
        }
    }
}
