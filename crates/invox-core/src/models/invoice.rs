//! Invoice record models for accounting import.

use serde::{Deserialize, Serialize};

/// A fully extracted invoice document.
///
/// Produced once per source PDF and immediately flattened into output rows;
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Canonical job identifier (`JB...`/`REQ...`).
    pub identifier: String,

    /// Invoice number, from the header cell or the source filename.
    pub invoice_number: String,

    /// Invoice total as a plain decimal string.
    ///
    /// Currency is never parsed into a number; the value stays exactly as
    /// printed minus the currency symbol and thousands separators.
    pub total_amount: String,

    /// Purchase-order reference, verbatim.
    pub purchase_order: String,

    /// Line items in appearance order.
    pub line_items: Vec<LineItem>,
}

/// One logical invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Charge code.
    pub code: String,

    /// Quantity, verbatim.
    pub quantity: String,

    /// Unit rate, verbatim.
    pub rate: String,

    /// Extended amount, verbatim.
    pub amount: String,
}

impl LineItem {
    /// Fixed marker column the accounting import requires on every row.
    pub const CONSTANT: &'static str = "1";
}

/// One position in the newline-delimited line-item row.
///
/// The vendor pads sparse rows with empty codes. Those positions stay
/// explicit here instead of being silently dropped during the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSlot {
    /// A real invoice line.
    Item(LineItem),

    /// Padding position (empty code).
    Placeholder,
}

impl LineSlot {
    /// Whether this slot holds a real line item.
    pub fn is_item(&self) -> bool {
        matches!(self, LineSlot::Item(_))
    }

    /// Unwrap into the line item, if any.
    pub fn into_item(self) -> Option<LineItem> {
        match self {
            LineSlot::Item(item) => Some(item),
            LineSlot::Placeholder => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_slot_item() {
        let slot = LineSlot::Item(LineItem {
            code: "SVC-100".to_string(),
            quantity: "2".to_string(),
            rate: "150.00".to_string(),
            amount: "300.00".to_string(),
        });
        assert!(slot.is_item());
        assert_eq!(slot.into_item().unwrap().code, "SVC-100");
    }

    #[test]
    fn test_line_slot_placeholder() {
        assert!(!LineSlot::Placeholder.is_item());
        assert_eq!(LineSlot::Placeholder.into_item(), None);
    }
}
