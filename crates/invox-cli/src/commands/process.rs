//! Process command - convert a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use invox_core::extract::RecordExtractor;
use invox_core::models::config::{CsvSchema, InvoiceNumberSource, InvoxConfig};
use invox_core::models::invoice::{InvoiceRecord, LineItem};
use invox_core::pdf::{PdfTableReader, TableSource};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// CSV schema (csv format only)
    #[arg(long, value_enum)]
    schema: Option<CsvSchemaArg>,

    /// Project number stamped on every row (csv format only)
    #[arg(long)]
    project: Option<String>,

    /// Invoice number strategy
    #[arg(long, value_enum)]
    number_source: Option<NumberSourceArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON record
    Json,
    /// CSV rows (one per line item)
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CsvSchemaArg {
    /// Ten columns, no marker row
    Simple,
    /// Eleven columns behind the InvoiceCSV_V2 marker row
    V2,
}

impl From<CsvSchemaArg> for CsvSchema {
    fn from(arg: CsvSchemaArg) -> Self {
        match arg {
            CsvSchemaArg::Simple => CsvSchema::Simple,
            CsvSchemaArg::V2 => CsvSchema::V2,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum NumberSourceArg {
    /// Filename with the extension stripped
    Filename,
    /// Header-table cell from the layout template
    Cell,
}

impl From<NumberSourceArg> for InvoiceNumberSource {
    fn from(arg: NumberSourceArg) -> Self {
        match arg {
            NumberSourceArg::Filename => InvoiceNumberSource::FilenameStem,
            NumberSourceArg::Cell => InvoiceNumberSource::TableCell,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        InvoxConfig::from_file(Path::new(path))?
    } else {
        InvoxConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let schema = args.schema.map(CsvSchema::from).unwrap_or(config.output.schema);
    let project = args.project.clone().unwrap_or(config.output.project_number.clone());
    let number_source = args
        .number_source
        .map(InvoiceNumberSource::from)
        .unwrap_or(config.extraction.number_source);

    let label = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
        .to_string();
    let source_file = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice.pdf")
        .to_string();

    let data = fs::read(&args.input)?;
    let tables = PdfTableReader::new().first_page_tables(&data)?;

    let extractor = RecordExtractor::new()
        .with_layout(config.layout.clone())
        .with_number_source(number_source)
        .with_core_policy(config.extraction.core_policy);
    let record = extractor.extract(&label, &tables)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Csv => format_record_csv(schema, &project, &source_file, &record)?,
        OutputFormat::Text => format_record_text(&record),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Column header for the given schema.
pub fn csv_header(schema: CsvSchema) -> Vec<&'static str> {
    let mut header = vec![
        "Project #",
        "PID # / Job ID #",
        "Invoice #",
        "Total Amount",
        "P.O. #",
        "Constant",
        "Code",
        "Quantity",
        "Rate",
        "Amount",
    ];
    if schema == CsvSchema::V2 {
        header.insert(0, "Source File");
    }
    header
}

/// Flatten a record into CSV rows, one per line item.
pub fn record_rows(
    schema: CsvSchema,
    project: &str,
    source_file: &str,
    record: &InvoiceRecord,
) -> Vec<Vec<String>> {
    record
        .line_items
        .iter()
        .map(|item| {
            let mut row = vec![
                project.to_string(),
                record.identifier.clone(),
                record.invoice_number.clone(),
                record.total_amount.clone(),
                record.purchase_order.clone(),
                LineItem::CONSTANT.to_string(),
                item.code.clone(),
                item.quantity.clone(),
                item.rate.clone(),
                item.amount.clone(),
            ];
            if schema == CsvSchema::V2 {
                row.insert(0, source_file.to_string());
            }
            row
        })
        .collect()
}

fn format_record_csv(
    schema: CsvSchema,
    project: &str,
    source_file: &str,
    record: &InvoiceRecord,
) -> anyhow::Result<String> {
    let mut out = String::new();
    if schema == CsvSchema::V2 {
        out.push_str("InvoiceCSV_V2\n");
    }

    // Everything is quoted: identifiers and currency must survive
    // spreadsheet round-trips untouched.
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);

    wtr.write_record(csv_header(schema))?;
    for row in record_rows(schema, project, source_file, record) {
        wtr.write_record(&row)?;
    }

    out.push_str(&String::from_utf8(wtr.into_inner()?)?);
    Ok(out)
}

fn format_record_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Job ID:  {}\n", record.identifier));
    output.push_str(&format!("P.O.:    {}\n", record.purchase_order));
    output.push_str(&format!("Total:   {}\n", record.total_amount));
    output.push('\n');

    output.push_str("Line items:\n");
    for item in &record.line_items {
        output.push_str(&format!(
            "  {} x{} @ {} = {}\n",
            item.code, item.quantity, item.rate, item.amount
        ));
    }

    output
}
