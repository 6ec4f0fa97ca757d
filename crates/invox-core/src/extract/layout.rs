//! Layout templates: fixed cell coordinates for known invoice formats.
//!
//! Positional table indexing is inherently brittle, so the whole mapping
//! from logical field to grid coordinate is data. An alternate vendor
//! layout is a different template loaded from configuration, not a change
//! to the extraction algorithm.

use serde::{Deserialize, Serialize};

/// Row coordinate within a table, counted from either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAddr {
    /// Zero-based index from the first row.
    FromStart(usize),

    /// Zero-based index from the last row (0 = last).
    FromEnd(usize),
}

impl RowAddr {
    /// Resolve to a concrete index for a table with `len` rows.
    pub fn resolve(&self, len: usize) -> Option<usize> {
        match *self {
            RowAddr::FromStart(i) if i < len => Some(i),
            RowAddr::FromEnd(i) if i < len => Some(len - 1 - i),
            _ => None,
        }
    }
}

/// A single templated cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAddr {
    /// Row coordinate.
    pub row: RowAddr,
    /// Zero-based column index.
    pub col: usize,
}

impl CellAddr {
    /// Create a cell address.
    pub const fn new(row: RowAddr, col: usize) -> Self {
        Self { row, col }
    }
}

/// Column positions of the four parallel line-item lists within one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRow {
    /// The row whose cells hold the newline-delimited lists.
    pub row: RowAddr,
    /// Column of the charge-code list.
    pub code: usize,
    /// Column of the quantity list.
    pub quantity: usize,
    /// Column of the unit-rate list.
    pub rate: usize,
    /// Column of the extended-amount list.
    pub amount: usize,
}

/// Fixed cell coordinates for one invoice template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTemplate {
    /// Index of the table holding the invoice-number cell.
    pub header_table: usize,

    /// Invoice-number cell within the header table.
    pub invoice_number: CellAddr,

    /// Index of the table holding identifier, purchase order, total and
    /// line items.
    pub main_table: usize,

    /// Raw job-identifier cell.
    pub identifier: CellAddr,

    /// Purchase-order cell.
    pub purchase_order: CellAddr,

    /// Invoice-total cell.
    pub total_amount: CellAddr,

    /// The newline-delimited line-item row.
    pub line_items: LineItemRow,
}

impl Default for LayoutTemplate {
    /// Coordinates of the known vendor layout.
    fn default() -> Self {
        Self {
            header_table: 0,
            invoice_number: CellAddr::new(RowAddr::FromStart(1), 1),
            main_table: 2,
            identifier: CellAddr::new(RowAddr::FromStart(1), 5),
            purchase_order: CellAddr::new(RowAddr::FromStart(3), 0),
            total_amount: CellAddr::new(RowAddr::FromEnd(0), 9),
            line_items: LineItemRow {
                row: RowAddr::FromStart(5),
                code: 0,
                quantity: 3,
                rate: 5,
                amount: 10,
            },
        }
    }
}
