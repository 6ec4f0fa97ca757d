//! Bundled table reader built on lopdf and pdf-extract.

use lazy_static::lazy_static;
use lopdf::Document;
use regex::Regex;
use tracing::debug;

use super::{Result, TableGrid, TableSource};
use crate::error::PdfError;

lazy_static! {
    static ref CELL_SEPARATOR: Regex = Regex::new(r"\t| {2,}").unwrap();
}

/// Text-layer table reader.
///
/// Loads the document with lopdf for structural checks, extracts the first
/// page's text with pdf-extract, and segments it into grids: a blank line
/// ends a table, cells split on tabs or runs of two or more spaces, and an
/// indented continuation line folds into the row above as in-cell newlines.
///
/// This is a lineless best-effort segmentation. A deployment extracting
/// grids with a geometric backend implements [`TableSource`] against that
/// backend and ships a layout template matching its grid shape.
pub struct PdfTableReader {
    min_columns: usize,
}

impl PdfTableReader {
    /// Create a reader with the default settings.
    pub fn new() -> Self {
        Self { min_columns: 1 }
    }

    /// Discard segmented rows with fewer than `min` cells.
    pub fn with_min_columns(mut self, min: usize) -> Self {
        self.min_columns = min;
        self
    }
}

impl Default for PdfTableReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSource for PdfTableReader {
    fn first_page_tables(&self, data: &[u8]) -> Result<Vec<TableGrid>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty-password encryption.
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        let first_page = first_page_text(&text, page_count);

        let tables = segment_tables(&first_page, self.min_columns);
        debug!("Segmented first page into {} tables", tables.len());

        if tables.is_empty() {
            return Err(PdfError::NoTables);
        }

        Ok(tables)
    }
}

/// Take the first page's share of the extracted text.
///
/// pdf-extract returns one undifferentiated stream, so the split divides
/// lines evenly across pages.
fn first_page_text(text: &str, page_count: usize) -> String {
    if page_count <= 1 {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let lines_per_page = lines.len() / page_count;
    lines[..lines_per_page.min(lines.len())].join("\n")
}

/// Segment page text into table grids.
///
/// Blank lines separate tables. Within a table, a line starting with a
/// two-space indent is a continuation: its cells append to the previous
/// row's cells with `\n`, which is how tall newline-delimited cells
/// survive text extraction.
fn segment_tables(text: &str, min_columns: usize) -> Vec<TableGrid> {
    let mut tables = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !rows.is_empty() {
                tables.push(TableGrid::new(std::mem::take(&mut rows)));
            }
            continue;
        }

        let continuation = line.starts_with("  ") && !rows.is_empty();
        let cells = split_cells(line);
        if cells.len() < min_columns {
            continue;
        }

        if continuation {
            let last = rows.last_mut().unwrap();
            for (i, cell) in cells.into_iter().enumerate() {
                match last.get_mut(i) {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(&cell);
                    }
                    None => last.push(cell),
                }
            }
        } else {
            rows.push(cells);
        }
    }

    if !rows.is_empty() {
        tables.push(TableGrid::new(rows));
    }

    tables
}

/// Split a text line into cells on tabs or runs of two or more spaces.
fn split_cells(line: &str) -> Vec<String> {
    CELL_SEPARATOR
        .split(line.trim())
        .map(|c| c.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cells_on_wide_gaps() {
        assert_eq!(split_cells("SVC-100   2   $150.00"), vec!["SVC-100", "2", "$150.00"]);
        assert_eq!(split_cells("one two"), vec!["one two"]);
        assert_eq!(split_cells("a\tb\tc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_blank_lines_separate_tables() {
        let text = "Invoice   INV-01\n\nPO   Amount\nPO-1   $10.00\n";
        let tables = segment_tables(text, 1);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].cell(0, 1), Some("INV-01"));
        assert_eq!(tables[1].cell(1, 0), Some("PO-1"));
    }

    #[test]
    fn test_continuation_lines_fold_into_cells() {
        let text = "CODE   QTY\nSVC-100   2\n  SVC-220   1\n";
        let tables = segment_tables(text, 1);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cell(1, 0), Some("SVC-100\nSVC-220"));
        assert_eq!(tables[0].cell(1, 1), Some("2\n1"));
    }

    #[test]
    fn test_min_columns_drops_narrow_rows() {
        let text = "stray\nCODE   QTY   RATE\n";
        let tables = segment_tables(text, 2);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].num_rows(), 1);
    }

    #[test]
    fn test_first_page_text_single_page() {
        assert_eq!(first_page_text("a\nb", 1), "a\nb");
    }

    #[test]
    fn test_first_page_text_splits_evenly() {
        assert_eq!(first_page_text("a\nb\nc\nd", 2), "a\nb");
    }

    #[test]
    fn test_reject_garbage_bytes() {
        let reader = PdfTableReader::new();
        assert!(matches!(
            reader.first_page_tables(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
