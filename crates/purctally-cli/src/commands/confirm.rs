//! Confirm command - save extracted fields as records.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;

use purctally_core::{DataDir, ExtractedFields, Record};

/// Arguments for the confirm command.
#[derive(Args)]
pub struct ConfirmArgs {
    /// JSON file with fields: one object, an array, or scan output (`{"items": [...]}`)
    #[arg(long, conflicts_with_all = ["supplier", "invoice_no", "invoice_date", "invoice_amount", "full_text", "source_file"])]
    from: Option<PathBuf>,

    #[arg(long, default_value = "")]
    supplier: String,

    #[arg(long, default_value = "")]
    invoice_no: String,

    #[arg(long, default_value = "")]
    invoice_date: String,

    #[arg(long, default_value = "")]
    invoice_amount: String,

    #[arg(long, default_value = "")]
    full_text: String,

    #[arg(long)]
    source_file: Option<String>,
}

pub async fn run(args: ConfirmArgs, data: &DataDir) -> anyhow::Result<()> {
    let batch = match args.from {
        Some(ref path) => parse_fields(&fs::read_to_string(path)?)?,
        None => vec![ExtractedFields {
            supplier: args.supplier,
            invoice_no: args.invoice_no,
            invoice_date: args.invoice_date,
            invoice_amount: args.invoice_amount,
            full_text: args.full_text,
            source_file: args.source_file,
            error: None,
        }],
    };

    let store = data.record_store();
    for fields in &batch {
        let record = Record::confirm(fields);
        let id = record.id.clone();
        store.append(record)?;
        println!("{} Confirmed record {}", style("✓").green(), id);
    }

    Ok(())
}

/// Accept a single field object, an array of them, or scan output.
fn parse_fields(json: &str) -> anyhow::Result<Vec<ExtractedFields>> {
    let value: Value = serde_json::from_str(json)?;

    let items = match value {
        Value::Object(ref obj) if obj.get("items").is_some_and(Value::is_array) => {
            serde_json::from_value(obj["items"].clone())?
        }
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(_) => vec![serde_json::from_value(value)?],
        _ => anyhow::bail!("Expected a JSON object or array of fields"),
    };

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object() {
        let items = parse_fields(r#"{"supplier": "Acme Corp", "invoice_no": "INV-99"}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].supplier, "Acme Corp");
        assert_eq!(items[0].invoice_date, "");
    }

    #[test]
    fn test_parse_scan_output() {
        let json = r#"{"items": [{"supplier": "A"}, {"supplier": "B", "source_file": "b.png"}]}"#;
        let items = parse_fields(json).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].source_file.as_deref(), Some("b.png"));
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(parse_fields("42").is_err());
    }
}
