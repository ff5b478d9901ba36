//! Layered regex extraction with per-supplier overrides.

use regex::{Captures, Regex, RegexBuilder};
use tracing::{debug, info};

use super::cleaning::{clean_value, first_line, truncate_chars};
use crate::error::{ExtractionError, Result};
use crate::models::config::RegexConfig;
use crate::models::patterns::PatternUpdate;
use crate::models::record::ExtractedFields;
use crate::storage::PatternStore;

/// Maximum length kept for the invoice date.
const DATE_MAX_CHARS: usize = 10;

/// Extracts supplier, number, date and amount from OCR text.
///
/// The supplier is always found with the default supplier pattern. Its
/// name then selects the number/date/amount patterns from the pattern store,
/// falling back to the defaults field by field. A supplier seen for the first
/// time is registered in the store with the default patterns.
pub struct FieldExtractor<'a> {
    patterns: &'a PatternStore,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(patterns: &'a PatternStore) -> Self {
        Self { patterns }
    }

    /// Run the extraction over `text`. Fields without a match stay empty.
    pub fn extract(&self, text: &str, defaults: &RegexConfig) -> Result<ExtractedFields> {
        let mut fields = ExtractedFields::from_text(text);

        let supplier_re = compile("supplier", &defaults.supplier)?;
        if let Some(caps) = supplier_re.captures(text) {
            let raw = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            fields.supplier = clean_value(first_line(clean_value(raw))).to_string();
        }

        let known = if fields.supplier.is_empty() {
            None
        } else {
            self.patterns
                .get(&fields.supplier)?
                .filter(|entry| !entry.is_empty())
        };

        let active = match known {
            Some(ref entry) => {
                debug!("Using pattern overrides for supplier '{}'", fields.supplier);
                entry.resolve(defaults)
            }
            None => defaults.clone(),
        };

        if let Some(value) = match_value("invno", &active.invno, text)? {
            fields.invoice_no = value.to_string();
        }

        if let Some(value) = match_value("invdt", &active.invdt, text)? {
            fields.invoice_date = truncate_chars(value, DATE_MAX_CHARS).to_string();
        }

        if let Some(value) = match_value("invamt", &active.invamt, text)? {
            fields.invoice_amount = value.to_string();
        }

        // Registers the defaults that were just used; the stored entry only
        // marks the supplier as known.
        if !fields.supplier.is_empty() && known.is_none() {
            self.patterns
                .upsert(&fields.supplier, &PatternUpdate::from_defaults(defaults))?;
            info!("Registered new supplier '{}' with default patterns", fields.supplier);
        }

        debug!(
            "Extracted supplier='{}' invoice_no='{}' invoice_date='{}' invoice_amount='{}'",
            fields.supplier, fields.invoice_no, fields.invoice_date, fields.invoice_amount
        );

        Ok(fields)
    }
}

fn compile(field: &str, pattern: &str) -> std::result::Result<Regex, ExtractionError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractionError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

/// Match `pattern` and return the cleaned value of its selected group.
fn match_value<'t>(field: &str, pattern: &str, text: &'t str) -> Result<Option<&'t str>> {
    let re = compile(field, pattern)?;
    let ranks = closing_ranks(pattern);
    Ok(re
        .captures(text)
        .and_then(|caps| selected_group(&caps, &ranks))
        .map(clean_value))
}

/// The participating group that closed last: the one ending furthest into
/// the text, ties going to the group whose `)` comes later in the pattern.
/// For `(Total:\s*(\d+))` that is group 1. Patterns without capture groups
/// yield the whole match.
fn selected_group<'t>(caps: &Captures<'t>, ranks: &[usize]) -> Option<&'t str> {
    if caps.len() == 1 {
        return caps.get(0).map(|m| m.as_str());
    }
    (1..caps.len())
        .filter_map(|i| caps.get(i).map(|m| (i, m)))
        .max_by_key(|(i, m)| (m.end(), ranks.get(*i).copied().unwrap_or(*i)))
        .map(|(_, m)| m.as_str())
}

/// Order in which capture groups close in `pattern`, indexed by group
/// number. Index 0 is unused.
fn closing_ranks(pattern: &str) -> Vec<usize> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut ranks = vec![0];
    let mut open = Vec::new();
    let mut closed = 0;
    let mut class_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => {
                class_depth += 1;
                if chars.get(i + 1) == Some(&'^') {
                    i += 1;
                }
                // `]` right after the opening bracket is a literal
                if chars.get(i + 1) == Some(&']') {
                    i += 1;
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 => {
                let rest: String = chars[i + 1..].iter().take(3).collect();
                let capturing =
                    !rest.starts_with('?') || rest.starts_with("?P<") || rest.starts_with("?<");
                if capturing {
                    ranks.push(0);
                    open.push(Some(ranks.len() - 1));
                } else {
                    open.push(None);
                }
            }
            ')' if class_depth == 0 => {
                if let Some(Some(group)) = open.pop() {
                    ranks[group] = closed;
                    closed += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patterns::PatternOverride;
    use pretty_assertions::assert_eq;

    const ACME_BILL: &str =
        "Supplier: Acme Corp\nInvoice No: INV-99\nInvoice Date: 2024-01-05\nGrand Total: 500";

    fn store() -> (tempfile::TempDir, PatternStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PatternStore::new(dir.path().join("supplier_patterns.json"));
        (dir, store)
    }

    #[test]
    fn test_extract_basic_bill() {
        let (_dir, patterns) = store();
        let fields = FieldExtractor::new(&patterns)
            .extract(ACME_BILL, &RegexConfig::default())
            .unwrap();

        assert_eq!(fields.supplier, "Acme Corp");
        assert_eq!(fields.invoice_no, "INV-99");
        assert_eq!(fields.invoice_date, "2024-01-05");
        assert_eq!(fields.invoice_amount, "500");
        assert_eq!(fields.full_text, ACME_BILL);
        assert!(fields.error.is_none());
    }

    #[test]
    fn test_first_sighting_registers_defaults() {
        let (_dir, patterns) = store();
        let defaults = RegexConfig::default();

        FieldExtractor::new(&patterns).extract(ACME_BILL, &defaults).unwrap();

        let entry = patterns.get("Acme Corp").unwrap().unwrap();
        assert_eq!(
            entry,
            PatternOverride {
                invno_pattern: Some(defaults.invno.clone()),
                invdt_pattern: Some(defaults.invdt.clone()),
                invamt_pattern: Some(defaults.invamt.clone()),
            }
        );
    }

    #[test]
    fn test_no_supplier_leaves_store_untouched() {
        let (_dir, patterns) = store();
        let text = "Invoice No: 42\nsome noise";

        let fields = FieldExtractor::new(&patterns)
            .extract(text, &RegexConfig::default())
            .unwrap();

        assert_eq!(fields.supplier, "");
        assert_eq!(fields.invoice_no, "42");
        assert_eq!(fields.invoice_date, "");
        assert_eq!(fields.invoice_amount, "");
        assert!(!patterns.path().exists());
    }

    #[test]
    fn test_no_matches_at_all() {
        let (_dir, patterns) = store();
        let fields = FieldExtractor::new(&patterns)
            .extract("", &RegexConfig::default())
            .unwrap();

        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn test_supplier_override_used_per_field() {
        let (_dir, patterns) = store();
        patterns
            .upsert(
                "Acme Corp",
                &PatternUpdate {
                    invno: Some(r"Ref\s*:\s*(\S+)".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let text = "Supplier: Acme Corp\nRef: R-7\nInvoice No: INV-99\nBill Date: 05/01/2024 extra";
        let fields = FieldExtractor::new(&patterns)
            .extract(text, &RegexConfig::default())
            .unwrap();

        assert_eq!(fields.invoice_no, "R-7");
        assert_eq!(fields.invoice_date, "05/01/2024");

        // Existing entries are not overwritten by the learning step.
        let entry = patterns.get("Acme Corp").unwrap().unwrap();
        assert_eq!(entry.invdt_pattern, None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let (_dir, patterns) = store();
        let text = "vendor: Globex |\nBILL NO # B/2024/17\nnet amount: 1,250.00 =";

        let fields = FieldExtractor::new(&patterns)
            .extract(text, &RegexConfig::default())
            .unwrap();

        assert_eq!(fields.supplier, "Globex");
        assert_eq!(fields.invoice_no, "B/2024/17");
        assert_eq!(fields.invoice_amount, "1,250.00");
    }

    #[test]
    fn test_pattern_without_groups_uses_whole_match() {
        let (_dir, patterns) = store();
        let defaults = RegexConfig {
            invamt: r"\d+\.\d{2}".to_string(),
            ..RegexConfig::default()
        };

        let fields = FieldExtractor::new(&patterns)
            .extract("Total due 99.50 now", &defaults)
            .unwrap();

        assert_eq!(fields.invoice_amount, "99.50");
    }

    #[test]
    fn test_nested_groups_use_outer_group() {
        let (_dir, patterns) = store();
        let defaults = RegexConfig {
            invamt: r"(Total:\s*(\d+))".to_string(),
            ..RegexConfig::default()
        };

        let fields = FieldExtractor::new(&patterns)
            .extract("Total: 500", &defaults)
            .unwrap();

        assert_eq!(fields.invoice_amount, "Total: 500");
    }

    #[test]
    fn test_group_closing_last_wins() {
        let select = |pattern: &str, text: &str| {
            let re = compile("test", pattern).unwrap();
            let caps = re.captures(text).unwrap();
            selected_group(&caps, &closing_ranks(pattern)).map(str::to_string)
        };

        assert_eq!(select(r"(a)(b)", "ab").as_deref(), Some("b"));
        assert_eq!(select(r"((a))", "a").as_deref(), Some("a"));
        assert_eq!(select(r"(\d+)(\s*)", "500").as_deref(), Some(""));
        assert_eq!(select(r"(x)?(\d+)", "500").as_deref(), Some("500"));
        assert_eq!(select(r"(?:No)[:\s]*(\w+)", "No: 17").as_deref(), Some("17"));
    }

    #[test]
    fn test_closing_ranks_skip_non_capturing_and_classes() {
        assert_eq!(closing_ranks(r"(a(b))"), vec![0, 1, 0]);
        assert_eq!(closing_ranks(r"(?i)(a)[()](?:b)(?P<n>c)"), vec![0, 0, 1]);
        assert_eq!(closing_ranks(r"\((a)\)"), vec![0, 0]);
        assert_eq!(closing_ranks(r"[]()](b)"), vec![0, 0]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let (_dir, patterns) = store();
        let defaults = RegexConfig {
            invdt: "(unclosed".to_string(),
            ..RegexConfig::default()
        };

        let err = FieldExtractor::new(&patterns)
            .extract(ACME_BILL, &defaults)
            .unwrap_err();

        assert!(err.to_string().contains("invdt"));
    }
}
