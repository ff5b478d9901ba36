//! Grid command - list saved records.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use serde_json::json;

use purctally_core::{DataDir, Record};

use super::{OutputFormat, emit};

/// Arguments for the grid command.
#[derive(Args)]
pub struct GridArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Only list records of one day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Only list records not yet sent to Tally
    #[arg(long)]
    unsent: bool,
}

pub async fn run(args: GridArgs, data: &DataDir) -> anyhow::Result<()> {
    let store = data.record_store();

    let mut records = match args.date {
        Some(date) => store.load_partition(date)?,
        None => store.aggregate()?,
    };
    if args.unsent {
        records.retain(|r| !r.is_sent());
    }

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({ "items": records }))?,
        OutputFormat::Csv => format_csv(&records)?,
        OutputFormat::Text => format_text(&records),
    };

    emit(&content, args.output.as_deref())
}

fn format_csv(records: &[Record]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "supplier",
        "invoice_no",
        "invoice_date",
        "invoice_amount",
        "source_file",
        "created_at",
        "sent_to_tally",
    ])?;

    for record in records {
        wtr.write_record([
            record.id.as_str(),
            record.supplier.as_str(),
            record.invoice_no.as_str(),
            record.invoice_date.as_str(),
            record.invoice_amount.as_str(),
            record.source_file.as_str(),
            record.created_at.as_str(),
            record.sent_to_tally.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(records: &[Record]) -> String {
    if records.is_empty() {
        return "No records.".to_string();
    }

    let mut output = format!(
        "{:<19}  {:<24}  {:<14}  {:<10}  {:>12}  {}\n",
        "Created", "Supplier", "Invoice No", "Date", "Amount", "Sent"
    );

    for record in records {
        output.push_str(&format!(
            "{:<19}  {:<24}  {:<14}  {:<10}  {:>12}  {}\n",
            record.created_at.replacen('T', " ", 1),
            record.supplier,
            record.invoice_no,
            record.invoice_date,
            record.invoice_amount,
            record.sent_to_tally.as_str()
        ));
    }

    output.push_str(&format!("\n{} record(s)", records.len()));
    output
}
