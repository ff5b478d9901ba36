//! Extracted field sets and confirmed purchase records.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Fields extracted from a scanned bill, before the user confirms them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFields {
    pub supplier: String,
    pub invoice_no: String,
    pub invoice_date: String,
    pub invoice_amount: String,

    /// Raw OCR text.
    pub full_text: String,

    /// File name of the scanned image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Set when the image could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractedFields {
    /// An all-empty field set carrying only raw text.
    pub fn from_text(text: &str) -> Self {
        Self {
            full_text: text.to_string(),
            ..Default::default()
        }
    }

    /// An all-empty field set marking a failed read.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_source_file(mut self, name: impl Into<String>) -> Self {
        self.source_file = Some(name.into());
        self
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Format of `Record::created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Whether a record has been pushed to Tally. Stored as `"Yes"` / `"No"`.
///
/// Partition files may be edited by hand, so any stored value other than
/// the exact string `"Yes"` reads as unsent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SentFlag {
    #[serde(rename = "Yes")]
    Yes,
    #[default]
    #[serde(rename = "No")]
    No,
}

impl SentFlag {
    pub fn is_sent(self) -> bool {
        self == SentFlag::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentFlag::Yes => "Yes",
            SentFlag::No => "No",
        }
    }
}

impl<'de> Deserialize<'de> for SentFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s == "Yes" => SentFlag::Yes,
            _ => SentFlag::No,
        })
    }
}

/// Read any JSON scalar as a string; `null` and containers become empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// A confirmed purchase record.
///
/// Every field tolerates hand-edited values. Keys this type does not know
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub supplier: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_file: String,
    /// Local time, `YYYY-MM-DDTHH:MM:SS` for records created here.
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default)]
    pub sent_to_tally: SentFlag,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Build a new unsent record from confirmed fields, stamped with the
    /// current local time at second precision.
    pub fn confirm(fields: &ExtractedFields) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            supplier: fields.supplier.clone(),
            invoice_no: fields.invoice_no.clone(),
            invoice_date: fields.invoice_date.clone(),
            invoice_amount: fields.invoice_amount.clone(),
            full_text: fields.full_text.clone(),
            source_file: fields.source_file.clone().unwrap_or_default(),
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
            sent_to_tally: SentFlag::No,
            extra: Map::new(),
        }
    }

    /// `created_at` as a timestamp, if it holds one.
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }

    pub fn is_sent(&self) -> bool {
        self.sent_to_tally.is_sent()
    }

    /// Flip the record to sent. Returns false if it already was.
    pub fn mark_sent(&mut self) -> bool {
        if self.is_sent() {
            return false;
        }
        self.sent_to_tally = SentFlag::Yes;
        true
    }
}
