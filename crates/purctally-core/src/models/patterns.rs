//! Per-supplier pattern overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::RegexConfig;

/// Mapping from supplier name to its pattern overrides, as stored in
/// `supplier_patterns.json`.
pub type SupplierPatterns = BTreeMap<String, PatternOverride>;

/// Regex overrides for one supplier. A missing field falls back to the
/// configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invno_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invdt_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invamt_pattern: Option<String>,
}

impl PatternOverride {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.invno_pattern.is_none() && self.invdt_pattern.is_none() && self.invamt_pattern.is_none()
    }

    /// Merge an update into this entry. Empty values leave the field as is.
    pub fn apply(&mut self, update: &PatternUpdate) {
        merge_field(&mut self.invno_pattern, update.invno.as_deref());
        merge_field(&mut self.invdt_pattern, update.invdt.as_deref());
        merge_field(&mut self.invamt_pattern, update.invamt.as_deref());
    }

    /// Resolve the effective pattern set against the defaults.
    pub fn resolve(&self, defaults: &RegexConfig) -> RegexConfig {
        RegexConfig {
            supplier: defaults.supplier.clone(),
            invno: self.invno_pattern.clone().unwrap_or_else(|| defaults.invno.clone()),
            invdt: self.invdt_pattern.clone().unwrap_or_else(|| defaults.invdt.clone()),
            invamt: self.invamt_pattern.clone().unwrap_or_else(|| defaults.invamt.clone()),
        }
    }
}

fn merge_field(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = Some(value.to_string());
    }
}

/// A partial update for a supplier's overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternUpdate {
    pub invno: Option<String>,
    pub invdt: Option<String>,
    pub invamt: Option<String>,
}

impl PatternUpdate {
    /// An update carrying all three default patterns.
    pub fn from_defaults(defaults: &RegexConfig) -> Self {
        Self {
            invno: Some(defaults.invno.clone()),
            invdt: Some(defaults.invdt.clone()),
            invamt: Some(defaults.invamt.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_skips_empty_values() {
        let mut entry = PatternOverride {
            invno_pattern: Some("old-no".to_string()),
            invdt_pattern: Some("old-dt".to_string()),
            invamt_pattern: None,
        };

        entry.apply(&PatternUpdate {
            invno: Some(String::new()),
            invdt: None,
            invamt: Some("new-amt".to_string()),
        });

        assert_eq!(entry.invno_pattern.as_deref(), Some("old-no"));
        assert_eq!(entry.invdt_pattern.as_deref(), Some("old-dt"));
        assert_eq!(entry.invamt_pattern.as_deref(), Some("new-amt"));
    }

    #[test]
    fn test_resolve_falls_back_per_field() {
        let defaults = RegexConfig::default();
        let entry = PatternOverride {
            invno_pattern: Some(r"Ref\s*(\S+)".to_string()),
            ..Default::default()
        };

        let resolved = entry.resolve(&defaults);
        assert_eq!(resolved.invno, r"Ref\s*(\S+)");
        assert_eq!(resolved.invdt, defaults.invdt);
        assert_eq!(resolved.invamt, defaults.invamt);
        assert_eq!(resolved.supplier, defaults.supplier);
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let entry = PatternOverride {
            invno_pattern: Some("X".to_string()),
            ..Default::default()
        };

        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"invno_pattern":"X"}"#);
    }
}
