//! Scan command - OCR bill images and extract their fields.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, warn};

use purctally_core::{DataDir, ExtractedFields, ImagePreprocessor, InvoiceScanner, Record};

use super::{OutputFormat, emit};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Image files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Apply adaptive thresholding before OCR
    #[arg(long)]
    enhance: bool,

    /// Scan files in place instead of copying them into the uploads directory
    #[arg(long)]
    no_stage: bool,

    /// Tesseract language(s), e.g. "eng" or "eng+hin"
    #[arg(short, long)]
    lang: Option<String>,

    /// Save every successful extraction as a record
    #[arg(long)]
    confirm: bool,
}

pub async fn run(args: ScanArgs, data: &DataDir) -> anyhow::Result<()> {
    let start = Instant::now();
    data.ensure()?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    let mut scanner = InvoiceScanner::from_data_dir(data)?
        .with_preprocessor(ImagePreprocessor::new().with_threshold(args.enhance));
    if let Some(lang) = args.lang {
        scanner = scanner.with_language(lang);
    }

    if !scanner.engine().is_available() {
        warn!(
            "Tesseract not found at '{}'. Run 'purctally config set tesseract_cmd <path>' to point at it.",
            scanner.engine().command()
        );
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut items = Vec::with_capacity(files.len());
    for path in &files {
        pb.set_message(path.display().to_string());

        let target = if !args.no_stage && path.is_file() {
            data.stage_upload(path)?
        } else {
            path.clone()
        };

        let fields = scanner.scan(&target)?;
        if let Some(ref error) = fields.error {
            warn!("{}: {}", path.display(), error);
        }
        items.push(fields);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({ "items": items }))?,
        OutputFormat::Csv => format_csv(&items)?,
        OutputFormat::Text => format_text(&items),
    };
    emit(&content, args.output.as_deref())?;

    if args.confirm {
        let store = data.record_store();
        let mut saved = 0;
        for fields in items.iter().filter(|f| !f.is_failed()) {
            store.append(Record::confirm(fields))?;
            saved += 1;
        }
        eprintln!("{} Confirmed {} record(s)", style("✓").green(), saved);
    }

    debug!("Scanned {} files in {:?}", files.len(), start.elapsed());

    Ok(())
}

/// Expand glob patterns; plain paths are kept even if they do not exist so
/// the scan can report them.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.contains(['*', '?', '[']) {
            files.extend(glob(input)?.filter_map(|r| r.ok()).filter(|p| is_image(p)));
        } else {
            files.push(PathBuf::from(input));
        }
    }

    Ok(files)
}

fn is_image(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(
        ext.to_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp"
    )
}

fn format_csv(items: &[ExtractedFields]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "source_file",
        "supplier",
        "invoice_no",
        "invoice_date",
        "invoice_amount",
        "error",
    ])?;

    for item in items {
        wtr.write_record([
            item.source_file.as_deref().unwrap_or(""),
            item.supplier.as_str(),
            item.invoice_no.as_str(),
            item.invoice_date.as_str(),
            item.invoice_amount.as_str(),
            item.error.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(items: &[ExtractedFields]) -> String {
    let mut output = String::new();

    for item in items {
        output.push_str(&format!("File: {}\n", item.source_file.as_deref().unwrap_or("-")));
        if let Some(ref error) = item.error {
            output.push_str(&format!("  Error: {}\n\n", error));
            continue;
        }
        output.push_str(&format!("  Supplier:   {}\n", item.supplier));
        output.push_str(&format!("  Invoice No: {}\n", item.invoice_no));
        output.push_str(&format!("  Date:       {}\n", item.invoice_date));
        output.push_str(&format!("  Amount:     {}\n\n", item.invoice_amount));
    }

    output
}
