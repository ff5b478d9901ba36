//! Date-partitioned record files (`invoices-YYYY-MM-DD.json`).

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use glob::glob;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use super::{read_json, write_json};
use crate::error::{Result, StoreError};
use crate::models::record::Record;

lazy_static! {
    static ref PARTITION_FILE: Regex =
        Regex::new(r"^invoices-(\d{4}-\d{2}-\d{2})\.json$").unwrap();
}

/// Append-only store with one JSON array file per calendar day.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local calendar date used for today's partition.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// File holding the records of `date`.
    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("invoices-{}.json", date.format("%Y-%m-%d")))
    }

    /// Records of one day; empty when the file is absent.
    pub fn load_partition(&self, date: NaiveDate) -> Result<Vec<Record>> {
        Ok(read_json(&self.partition_path(date))?.unwrap_or_default())
    }

    /// Overwrite one day's file.
    pub fn save_partition(&self, date: NaiveDate, records: &[Record]) -> Result<()> {
        write_json(&self.partition_path(date), records)?;
        Ok(())
    }

    /// Append a record to today's file.
    pub fn append(&self, record: Record) -> Result<()> {
        self.append_on(Self::today(), record)
    }

    /// Append a record to the file of `date`.
    pub fn append_on(&self, date: NaiveDate, record: Record) -> Result<()> {
        let mut records = self.load_partition(date)?;
        let id = record.id.clone();
        records.push(record);
        self.save_partition(date, &records)?;

        info!("Appended record {} to {} ({} total)", id, date, records.len());
        Ok(())
    }

    /// Dates that have a partition file, in file-name order.
    pub fn partitions(&self) -> Result<Vec<NaiveDate>> {
        let dates = self
            .partition_files()?
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .filter_map(|name| PARTITION_FILE.captures(name))
            .filter_map(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
            .collect();
        Ok(dates)
    }

    /// Concatenate every partition. Files that cannot be read or parsed are
    /// skipped.
    pub fn aggregate(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for path in self.partition_files()? {
            match read_json::<Vec<Record>>(&path) {
                Ok(Some(items)) => records.extend(items),
                Ok(None) => {}
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(records)
    }

    fn partition_files(&self) -> Result<Vec<PathBuf>> {
        let dir = glob::Pattern::escape(&self.dir.to_string_lossy());
        let pattern = format!("{}/invoices-*.json", dir);

        let paths = glob(&pattern)
            .map_err(|e| StoreError::Glob(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .collect();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::ExtractedFields;
    use std::fs;

    fn record(supplier: &str) -> Record {
        Record::confirm(&ExtractedFields {
            supplier: supplier.to_string(),
            ..Default::default()
        })
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_partition_file_name() {
        let store = RecordStore::new("/data");
        assert_eq!(
            store.partition_path(date(5)),
            PathBuf::from("/data/invoices-2024-01-05.json")
        );
    }

    #[test]
    fn test_append_twice_same_day() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.append_on(date(4), record("Other")).unwrap();
        store.append_on(date(5), record("Acme")).unwrap();
        store.append_on(date(5), record("Globex")).unwrap();

        let day = store.load_partition(date(5)).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].supplier, "Acme");
        assert_eq!(day[1].supplier, "Globex");
        assert_eq!(store.load_partition(date(4)).unwrap().len(), 1);
    }

    #[test]
    fn test_append_uses_today() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.append(record("Acme")).unwrap();
        assert_eq!(store.load_partition(RecordStore::today()).unwrap().len(), 1);
    }

    #[test]
    fn test_aggregate_across_days() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        for _ in 0..2 {
            store.append_on(date(5), record("Acme")).unwrap();
        }
        for _ in 0..3 {
            store.append_on(date(6), record("Globex")).unwrap();
        }

        let all = store.aggregate().unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(store.partitions().unwrap(), vec![date(5), date(6)]);
    }

    #[test]
    fn test_aggregate_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.append_on(date(5), record("Acme")).unwrap();
        fs::write(dir.path().join("invoices-2024-01-06.json"), "[{ broken").unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();

        assert_eq!(store.aggregate().unwrap().len(), 1);
    }

    #[test]
    fn test_hand_edited_partition_stays_usable() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.append_on(date(5), record("Acme")).unwrap();
        let path = store.partition_path(date(5));
        let mut items: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        items.push(serde_json::json!({"supplier": "Globex", "sent_to_tally": "no"}));
        fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();

        assert_eq!(store.aggregate().unwrap().len(), 2);

        store.append_on(date(5), record("Initech")).unwrap();
        let day = store.load_partition(date(5)).unwrap();
        assert_eq!(day.len(), 3);
        assert_eq!(day[1].supplier, "Globex");
        assert!(!day[1].is_sent());
    }

    #[test]
    fn test_aggregate_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("missing"));

        assert!(store.aggregate().unwrap().is_empty());
        assert!(store.partitions().unwrap().is_empty());
    }
}
