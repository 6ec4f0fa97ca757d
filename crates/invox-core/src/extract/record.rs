//! Fixed-coordinate invoice record extraction.

use tracing::debug;

use super::Result;
use super::identifier::IdentifierNormalizer;
use super::layout::{CellAddr, LayoutTemplate};
use crate::error::ExtractionError;
use crate::models::config::{CorePolicy, InvoiceNumberSource};
use crate::models::invoice::{InvoiceRecord, LineItem, LineSlot};
use crate::pdf::TableGrid;

/// Extracts one [`InvoiceRecord`] per document from its table grids.
///
/// All coordinates come from the layout template; the extractor itself has
/// no knowledge of any particular vendor format.
pub struct RecordExtractor {
    layout: LayoutTemplate,
    number_source: InvoiceNumberSource,
    normalizer: IdentifierNormalizer,
}

impl RecordExtractor {
    /// Create an extractor with the default template and settings.
    pub fn new() -> Self {
        Self {
            layout: LayoutTemplate::default(),
            number_source: InvoiceNumberSource::default(),
            normalizer: IdentifierNormalizer::new(),
        }
    }

    /// Set the layout template.
    pub fn with_layout(mut self, layout: LayoutTemplate) -> Self {
        self.layout = layout;
        self
    }

    /// Set the invoice-number strategy.
    pub fn with_number_source(mut self, source: InvoiceNumberSource) -> Self {
        self.number_source = source;
        self
    }

    /// Set the identifier core-length policy.
    pub fn with_core_policy(mut self, policy: CorePolicy) -> Self {
        self.normalizer = IdentifierNormalizer::new().with_policy(policy);
        self
    }

    /// Extract a complete record from one document's tables.
    ///
    /// `label` is the document name (filename stem) used in errors and,
    /// under [`InvoiceNumberSource::FilenameStem`], as the invoice number.
    /// Either the whole record is produced or nothing is: a failure never
    /// yields partial line items.
    pub fn extract(&self, label: &str, tables: &[TableGrid]) -> Result<InvoiceRecord> {
        let main = self.table(label, tables, self.layout.main_table, "main table")?;

        let raw_identifier = self.cell(label, main, self.layout.identifier, "identifier")?;
        let identifier =
            self.normalizer
                .normalize(raw_identifier)
                .map_err(|source| ExtractionError::Identifier {
                    document: label.to_string(),
                    source,
                })?;

        let invoice_number = match self.number_source {
            InvoiceNumberSource::FilenameStem => label.to_string(),
            InvoiceNumberSource::TableCell => {
                let header =
                    self.table(label, tables, self.layout.header_table, "header table")?;
                self.cell(label, header, self.layout.invoice_number, "invoice number")?
                    .trim()
                    .to_string()
            }
        };

        let purchase_order = self
            .cell(label, main, self.layout.purchase_order, "purchase order")?
            .trim()
            .to_string();

        let total_amount =
            clean_amount(self.cell(label, main, self.layout.total_amount, "total amount")?);

        let slots = self.line_slots(label, main)?;
        let placeholders = slots.iter().filter(|s| !s.is_item()).count();
        if placeholders > 0 {
            debug!("{}: {} placeholder line positions skipped", label, placeholders);
        }
        let line_items: Vec<LineItem> = slots.into_iter().filter_map(LineSlot::into_item).collect();

        Ok(InvoiceRecord {
            identifier,
            invoice_number,
            total_amount,
            purchase_order,
            line_items,
        })
    }

    fn table<'a>(
        &self,
        label: &str,
        tables: &'a [TableGrid],
        index: usize,
        what: &str,
    ) -> Result<&'a TableGrid> {
        tables.get(index).ok_or_else(|| {
            malformed(
                label,
                format!("{what} (table {index}) missing, document has {} tables", tables.len()),
            )
        })
    }

    fn cell<'a>(
        &self,
        label: &str,
        grid: &'a TableGrid,
        addr: CellAddr,
        what: &str,
    ) -> Result<&'a str> {
        let row = addr.row.resolve(grid.num_rows()).ok_or_else(|| {
            malformed(
                label,
                format!("{what} row out of range (table has {} rows)", grid.num_rows()),
            )
        })?;
        grid.cell(row, addr.col).ok_or_else(|| {
            malformed(
                label,
                format!("{what} cell missing at row {row}, col {}", addr.col),
            )
        })
    }

    /// Split the four parallel line-item lists into explicit slots.
    ///
    /// The four cells must split to the same number of entries; a mismatch
    /// fails the whole document rather than pairing values by luck.
    fn line_slots(&self, label: &str, main: &TableGrid) -> Result<Vec<LineSlot>> {
        let cols = self.layout.line_items;

        let codes = self.cell(label, main, CellAddr::new(cols.row, cols.code), "line item codes")?;
        let quantities =
            self.cell(label, main, CellAddr::new(cols.row, cols.quantity), "line item quantities")?;
        let rates = self.cell(label, main, CellAddr::new(cols.row, cols.rate), "line item rates")?;
        let amounts =
            self.cell(label, main, CellAddr::new(cols.row, cols.amount), "line item amounts")?;

        let codes: Vec<&str> = codes.split('\n').collect();
        let quantities: Vec<&str> = quantities.split('\n').collect();
        let rates: Vec<&str> = rates.split('\n').collect();
        let amounts: Vec<&str> = amounts.split('\n').collect();

        if quantities.len() != codes.len()
            || rates.len() != codes.len()
            || amounts.len() != codes.len()
        {
            return Err(malformed(
                label,
                format!(
                    "line item columns split to {}/{}/{}/{} entries",
                    codes.len(),
                    quantities.len(),
                    rates.len(),
                    amounts.len()
                ),
            ));
        }

        let mut slots = Vec::with_capacity(codes.len());
        for i in 0..codes.len() {
            let code = codes[i].trim();
            if code.is_empty() {
                slots.push(LineSlot::Placeholder);
            } else {
                slots.push(LineSlot::Item(LineItem {
                    code: code.to_string(),
                    quantity: quantities[i].trim().to_string(),
                    rate: rates[i].trim().to_string(),
                    amount: amounts[i].trim().to_string(),
                }));
            }
        }

        Ok(slots)
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(document: &str, detail: String) -> ExtractionError {
    ExtractionError::MalformedLayout {
        document: document.to_string(),
        detail,
    }
}

/// Strip the currency symbol and thousands separators, leaving a plain
/// decimal string. The amount is never parsed into a number.
fn clean_amount(raw: &str) -> String {
    raw.trim().replace(['$', ','], "")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Grids shaped like the known vendor layout: a header table with the
    /// invoice number, a filler table, and the main table.
    fn vendor_tables() -> Vec<TableGrid> {
        let header = TableGrid::new(vec![
            vec!["Invoice".into(), "Date".into()],
            vec!["".into(), "INV-2024-001".into()],
        ]);
        let filler = TableGrid::new(vec![vec!["Remit to".into()]]);
        let main = TableGrid::new(vec![
            row(11, &[]),
            row(11, &[(5, "REQ-123456-99")]),
            row(11, &[]),
            row(11, &[(0, "PO-7781")]),
            row(11, &[]),
            row(
                11,
                &[
                    (0, "SVC-100\n\nSVC-220"),
                    (3, "2\n\n1"),
                    (5, "$150.00\n\n$75.50"),
                    (10, "$300.00\n\n$75.50"),
                ],
            ),
            row(11, &[(9, "$1,375.50")]),
        ]);
        vec![header, filler, main]
    }

    fn row(width: usize, cells: &[(usize, &str)]) -> Vec<String> {
        let mut out = vec![String::new(); width];
        for (col, value) in cells {
            out[*col] = (*value).to_string();
        }
        out
    }

    #[test]
    fn test_extract_full_record() {
        let record = RecordExtractor::new()
            .extract("inv_0001", &vendor_tables())
            .unwrap();

        assert_eq!(record.identifier, "REQ0000123456");
        assert_eq!(record.invoice_number, "inv_0001");
        assert_eq!(record.purchase_order, "PO-7781");
        assert_eq!(record.total_amount, "1375.50");

        // Three split positions, one of them a padding slot.
        assert_eq!(record.line_items.len(), 2);
        assert_eq!(record.line_items[0].code, "SVC-100");
        assert_eq!(record.line_items[0].quantity, "2");
        assert_eq!(record.line_items[0].rate, "$150.00");
        assert_eq!(record.line_items[1].code, "SVC-220");
        assert_eq!(record.line_items[1].amount, "$75.50");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let tables = vendor_tables();
        let extractor = RecordExtractor::new();
        let first = extractor.extract("inv_0001", &tables).unwrap();
        let second = extractor.extract("inv_0001", &tables).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invoice_number_from_table_cell() {
        let record = RecordExtractor::new()
            .with_number_source(InvoiceNumberSource::TableCell)
            .extract("inv_0001", &vendor_tables())
            .unwrap();
        assert_eq!(record.invoice_number, "INV-2024-001");
    }

    #[test]
    fn test_missing_main_table() {
        let err = RecordExtractor::new()
            .extract("inv_0002", &[TableGrid::new(vec![])])
            .unwrap_err();
        match err {
            ExtractionError::MalformedLayout { document, detail } => {
                assert_eq!(document, "inv_0002");
                assert!(detail.contains("main table"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cardinality_mismatch_yields_no_items() {
        let mut tables = vendor_tables();
        // Drop one quantity entry: 3 codes against 2 quantities.
        tables[2] = {
            let mut rows: Vec<Vec<String>> = tables[2].rows().to_vec();
            rows[5][3] = "2\n1".to_string();
            TableGrid::new(rows)
        };

        let err = RecordExtractor::new().extract("inv_0003", &tables).unwrap_err();
        match err {
            ExtractionError::MalformedLayout { detail, .. } => {
                assert!(detail.contains("3/2/3/3"), "detail was: {detail}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_identifier_failure_carries_document_label() {
        let mut tables = vendor_tables();
        tables[2] = {
            let mut rows: Vec<Vec<String>> = tables[2].rows().to_vec();
            rows[1][5] = "scribble".to_string();
            TableGrid::new(rows)
        };

        let err = RecordExtractor::new().extract("inv_0004", &tables).unwrap_err();
        match err {
            ExtractionError::Identifier { document, source } => {
                assert_eq!(document, "inv_0004");
                assert_eq!(source, crate::error::NormalizeError::NoDigits);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_documents_contribute_nothing() {
        let extractor = RecordExtractor::new();
        let good = vendor_tables();
        let bad = vec![TableGrid::new(vec![])];

        // Isolate-and-continue: one bad document in the middle of a batch
        // costs exactly that document, nothing else.
        let docs = [("inv_a", &good), ("inv_b", &bad), ("inv_c", &good)];
        let mut rows = 0;
        let mut failures = Vec::new();
        for (label, tables) in docs {
            match extractor.extract(label, tables) {
                Ok(record) => rows += record.line_items.len(),
                Err(e) => failures.push((label, e)),
            }
        }

        assert_eq!(rows, 4);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "inv_b");
    }

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("$1,375.50"), "1375.50");
        assert_eq!(clean_amount(" 980.00 "), "980.00");
    }
}
