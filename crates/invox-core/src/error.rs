//! Error types for the invox-core library.

use thiserror::Error;

/// Main error type for the invox library.
#[derive(Error, Debug)]
pub enum InvoxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Record extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF table acquisition.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The first page yielded no tables.
    #[error("no tables found on first page")]
    NoTables,
}

/// Errors related to invoice record extraction.
///
/// All variants are per-document and recoverable: a batch driver logs them
/// and moves on to the next file.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A templated table, row, or cell was absent, or the parallel
    /// line-item lists disagreed on length.
    #[error("malformed layout in {document}: {detail}")]
    MalformedLayout { document: String, detail: String },

    /// The identifier cell failed normalization.
    #[error("identifier in {document}: {source}")]
    Identifier {
        document: String,
        #[source]
        source: NormalizeError,
    },
}

/// Errors from the job-identifier normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The raw identifier contains no digits at all.
    #[error("identifier contains no digits")]
    NoDigits,

    /// The trimmed core number is outside the supported 6-7 digit range.
    #[error("core number {digits:?} has {len} digits, expected 6 or 7")]
    CoreLength { digits: String, len: usize },
}

/// Result type for the invox library.
pub type Result<T> = std::result::Result<T, InvoxError>;
