//! Invoice field extraction module.

pub mod identifier;
pub mod layout;
mod record;

pub use identifier::{IdentifierNormalizer, normalize_identifier};
pub use layout::{CellAddr, LayoutTemplate, LineItemRow, RowAddr};
pub use record::RecordExtractor;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
