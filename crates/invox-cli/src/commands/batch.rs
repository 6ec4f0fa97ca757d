//! Batch command - convert a directory of invoices into one CSV.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use invox_core::extract::RecordExtractor;
use invox_core::models::config::{CsvSchema, InvoiceNumberSource, InvoxConfig};
use invox_core::models::invoice::InvoiceRecord;
use invox_core::pdf::{PdfTableReader, TableSource};

use super::process::{self, CsvSchemaArg, NumberSourceArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output CSV path (default: invoices_<batch><type>_<date>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CSV schema
    #[arg(long, value_enum)]
    schema: Option<CsvSchemaArg>,

    /// Batch letter (A-Z) stamped into the default output filename
    #[arg(long, default_value = "A")]
    batch_letter: String,

    /// Invoice type stamped into the default output filename
    #[arg(long, value_enum, default_value = "expense")]
    invoice_type: InvoiceType,

    /// Project number stamped on every row
    #[arg(long)]
    project: Option<String>,

    /// Invoice number strategy
    #[arg(long, value_enum)]
    number_source: Option<NumberSourceArg>,

    /// Abort on the first failed document instead of continuing
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InvoiceType {
    /// Expense invoices
    Expense,
    /// Commercial invoices
    Commercial,
}

impl InvoiceType {
    fn code(self) -> char {
        match self {
            InvoiceType::Expense => 'E',
            InvoiceType::Commercial => 'C',
        }
    }
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        InvoxConfig::from_file(Path::new(path))?
    } else {
        InvoxConfig::default()
    };

    let batch_letter = parse_batch_letter(&args.batch_letter)?;

    let files = collect_pdf_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found for input: {}", args.input);
    }

    println!(
        "{} Found {} invoices to process",
        style("ℹ").blue(),
        files.len()
    );

    let schema = args.schema.map(CsvSchema::from).unwrap_or(config.output.schema);
    let project = args.project.clone().unwrap_or(config.output.project_number.clone());
    let number_source = args
        .number_source
        .map(InvoiceNumberSource::from)
        .unwrap_or(config.extraction.number_source);

    let extractor = RecordExtractor::new()
        .with_layout(config.layout.clone())
        .with_number_source(number_source)
        .with_core_policy(config.extraction.core_policy);
    let reader = PdfTableReader::new();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Each document is processed in isolation: one bad invoice never takes
    // the batch down unless --fail-fast asks for it.
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match process_single_file(&path, &reader, &extractor) {
            Ok(record) => {
                debug!("{}: {} line items", path.display(), record.line_items.len());
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    error: None,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.fail_fast {
                    pb.abandon();
                    anyhow::bail!("Failed to process {}: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                results.push(ProcessResult {
                    path,
                    record: None,
                    error: Some(error_msg),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let output_path = args.output.clone().unwrap_or_else(|| {
        default_output_path(&args.input, batch_letter, args.invoice_type)
    });
    write_batch_csv(&output_path, schema, &project, &results)?;

    let successful = results.iter().filter(|r| r.record.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} invoices in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );
    println!(
        "{} Output written to {}",
        style("✓").green(),
        output_path.display()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed invoices:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    reader: &PdfTableReader,
    extractor: &RecordExtractor,
) -> invox_core::Result<InvoiceRecord> {
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    let data = fs::read(path)?;
    let tables = reader.first_page_tables(&data)?;
    Ok(extractor.extract(label, &tables)?)
}

fn parse_batch_letter(raw: &str) -> anyhow::Result<char> {
    let letter = raw.trim().to_ascii_uppercase();
    match letter.chars().next() {
        Some(c) if letter.len() == 1 && c.is_ascii_uppercase() => Ok(c),
        _ => anyhow::bail!("Batch letter must be a single letter A-Z, got {:?}", raw),
    }
}

/// Scan a directory for PDFs (case-insensitive extension), or expand a glob
/// pattern. Files are sorted so output order is stable across runs.
fn collect_pdf_files(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);

    let mut files: Vec<PathBuf> = if path.is_dir() {
        fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| is_pdf(p))
            .collect()
    } else {
        glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| is_pdf(p))
            .collect()
    };

    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Default output filename: batch letter, invoice type code, and today's
/// date, placed next to the inputs when the input is a directory.
fn default_output_path(input: &str, batch_letter: char, invoice_type: InvoiceType) -> PathBuf {
    let name = format!(
        "invoices_{}{}_{}.csv",
        batch_letter,
        invoice_type.code(),
        chrono::Local::now().format("%Y%m%d")
    );

    let path = Path::new(input);
    if path.is_dir() {
        path.join(name)
    } else {
        PathBuf::from(name)
    }
}

/// Write all successful documents' rows, contiguous per document.
///
/// Failed documents contribute nothing - not even partial rows.
fn write_batch_csv(
    path: &Path,
    schema: CsvSchema,
    project: &str,
    results: &[ProcessResult],
) -> anyhow::Result<()> {
    let mut file = std::io::BufWriter::new(fs::File::create(path)?);
    if schema == CsvSchema::V2 {
        writeln!(file, "InvoiceCSV_V2")?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);

    wtr.write_record(process::csv_header(schema))?;

    for result in results {
        let Some(record) = &result.record else { continue };
        let source_file = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice.pdf");

        for row in process::record_rows(schema, project, source_file, record) {
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_letter() {
        assert_eq!(parse_batch_letter("a").unwrap(), 'A');
        assert_eq!(parse_batch_letter("Q").unwrap(), 'Q');
        assert!(parse_batch_letter("AB").is_err());
        assert!(parse_batch_letter("7").is_err());
    }

    #[test]
    fn test_is_pdf_case_insensitive() {
        assert!(is_pdf(Path::new("inv_0001.pdf")));
        assert!(is_pdf(Path::new("inv_0001.PDF")));
        assert!(!is_pdf(Path::new("inv_0001.csv")));
        assert!(!is_pdf(Path::new("inv_0001")));
    }
}
