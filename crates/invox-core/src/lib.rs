//! Core library for vendor invoice conversion.
//!
//! This crate provides:
//! - PDF table-grid acquisition (text-layer extraction behind a trait seam)
//! - Fixed-coordinate layout templates for known invoice formats
//! - Job-identifier normalization
//! - Invoice record extraction with typed per-document errors

pub mod error;
pub mod models;
pub mod pdf;
pub mod extract;

pub use error::{ExtractionError, InvoxError, NormalizeError, PdfError, Result};
pub use models::config::{CorePolicy, CsvSchema, InvoiceNumberSource, InvoxConfig};
pub use models::invoice::{InvoiceRecord, LineItem, LineSlot};
pub use pdf::{PdfTableReader, TableGrid, TableSource};
pub use extract::{IdentifierNormalizer, LayoutTemplate, RecordExtractor, normalize_identifier};
