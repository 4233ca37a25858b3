//! In-memory readings store (no persistence)
//!
//! Holds records in a plain `Vec` behind an `RwLock`. Useful for:
//! - Testing the pipeline without database dependencies
//! - Demo runs where readings are pushed in by hand

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::ReadingsStore;
use super::error::StoreResult;
use super::schema::ReadingRecord;

/// In-memory readings store
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ReadingRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with records
    pub fn with_records(records: Vec<ReadingRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Append a record
    pub async fn push(&self, record: ReadingRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl ReadingsStore for MemoryStore {
    async fn fetch_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ReadingRecord>> {
        let records = self.records.read().await;
        let matching: Vec<_> = records
            .iter()
            .filter(|r| r.recorded_at >= since)
            .cloned()
            .collect();

        debug!(
            "in-memory store: {} of {} records since {}",
            matching.len(),
            records.len(),
            since
        );

        Ok(matching)
    }
}
