//! `supplier_patterns.json` store.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{read_json, write_json};
use crate::error::{Result, StoreError};
use crate::models::patterns::{PatternOverride, PatternUpdate, SupplierPatterns};

/// Per-supplier regex overrides. Entries are never removed.
#[derive(Debug, Clone)]
pub struct PatternStore {
    path: PathBuf,
}

impl PatternStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full mapping; empty when the file is absent.
    pub fn load(&self) -> Result<SupplierPatterns> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Overrides for one supplier, if any.
    pub fn get(&self, supplier: &str) -> Result<Option<PatternOverride>> {
        Ok(self.load()?.remove(supplier))
    }

    /// Merge the non-empty fields of `update` into the supplier's entry,
    /// creating it if needed, and write the whole file back.
    pub fn upsert(&self, supplier: &str, update: &PatternUpdate) -> Result<PatternOverride> {
        let supplier = supplier.trim();
        if supplier.is_empty() {
            return Err(StoreError::EmptySupplier.into());
        }

        let mut patterns = self.load()?;
        let entry = patterns.entry(supplier.to_string()).or_default();
        entry.apply(update);
        let updated = entry.clone();

        write_json(&self.path, &patterns)?;
        debug!("Upserted patterns for supplier '{}'", supplier);

        Ok(updated)
    }
}
