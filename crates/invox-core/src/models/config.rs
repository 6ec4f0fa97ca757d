//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};

use crate::extract::layout::LayoutTemplate;

/// Main configuration for the invox pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoxConfig {
    /// Cell coordinates of the invoice template.
    pub layout: LayoutTemplate,

    /// Record extraction configuration.
    pub extraction: ExtractionConfig,

    /// CSV output configuration.
    pub output: OutputConfig,
}

impl Default for InvoxConfig {
    fn default() -> Self {
        Self {
            layout: LayoutTemplate::default(),
            extraction: ExtractionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Record extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Where the invoice number comes from.
    pub number_source: InvoiceNumberSource,

    /// How core numbers outside the 6-7 digit range are handled.
    pub core_policy: CorePolicy,
}

/// Strategy for deriving the invoice number.
///
/// Both strategies shipped at different points in the layout's history, so
/// the choice is explicit configuration rather than a second code path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceNumberSource {
    /// Source filename with the extension stripped (newer layout).
    #[default]
    FilenameStem,

    /// Header-table cell named by the layout template.
    TableCell,
}

/// Padding policy for trimmed core numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorePolicy {
    /// Fail when the core is not 6 or 7 digits.
    #[default]
    Strict,

    /// Pad any non-6-digit core through the 7-digit branch, matching
    /// historical batches.
    Legacy,
}

/// CSV output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output column convention.
    pub schema: CsvSchema,

    /// Project number stamped on every row.
    pub project_number: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            schema: CsvSchema::Simple,
            project_number: String::new(),
        }
    }
}

/// CSV column conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvSchema {
    /// Ten columns, no marker row.
    #[default]
    Simple,

    /// Eleven columns with a leading `Source File` column, preceded by the
    /// literal `InvoiceCSV_V2` marker row.
    V2,
}

impl InvoxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
