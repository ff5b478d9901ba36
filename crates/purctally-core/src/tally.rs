//! Mocked Tally sync.
//!
//! No request is made: sending a record only flips its `sent_to_tally` flag.
//! Only today's partition is considered, so unsent records from earlier days
//! stay unsent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::TallyConfig;
use crate::storage::RecordStore;

/// Outcome of a send run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Sent/unsent counts across all partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub sent: usize,
    pub unsent: usize,
}

/// Tally client. Holds the configured endpoint, which the mock never calls.
#[derive(Debug, Clone)]
pub struct TallyClient {
    config: TallyConfig,
}

impl TallyClient {
    pub fn new(config: TallyConfig) -> Self {
        Self { config }
    }

    /// Mark every unsent record in today's partition as sent.
    pub fn send_all(&self, store: &RecordStore) -> Result<SendSummary> {
        self.send_all_on(store, RecordStore::today())
    }

    /// Mark every unsent record in the partition of `date` as sent.
    ///
    /// A day without a file yields an empty summary and writes nothing.
    pub fn send_all_on(&self, store: &RecordStore, date: NaiveDate) -> Result<SendSummary> {
        if !store.partition_path(date).exists() {
            debug!("No records for {}, nothing to send", date);
            return Ok(SendSummary::default());
        }

        if !self.config.base_url.is_empty() {
            debug!("Tally endpoint {} configured but sync is mocked", self.config.base_url);
        }

        let mut records = store.load_partition(date)?;
        let mut summary = SendSummary::default();

        for record in records.iter_mut() {
            if record.mark_sent() {
                summary.sent += 1;
            }
        }

        store.save_partition(date, &records)?;
        info!("Tally sync for {}: {} sent, {} failed", date, summary.sent, summary.failed);

        Ok(summary)
    }

    /// Count sent and unsent records across every partition.
    pub fn status(&self, store: &RecordStore) -> Result<SyncStatus> {
        let records = store.aggregate()?;
        let sent = records.iter().filter(|r| r.is_sent()).count();

        Ok(SyncStatus {
            sent,
            unsent: records.len() - sent,
        })
    }
}
