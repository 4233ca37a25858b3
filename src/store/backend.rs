//! Readings store trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreResult;
use super::schema::ReadingRecord;

/// Trait for readings store backends
///
/// The monitor is a pure consumer of the store: one time-filtered read per
/// evaluation cycle, nothing else. Implementations must be `Send + Sync`
/// as they are shared across async tasks.
///
/// ## Error Handling
///
/// Methods return `StoreResult<T>`. A failure here fails the whole
/// evaluation cycle; the scheduler logs it and waits for the next tick.
#[async_trait]
pub trait ReadingsStore: Send + Sync {
    /// Fetch all samples recorded at or after `since`
    ///
    /// Each returned record is annotated with the owning device's owner
    /// username and location names, and the measurement's name and bounds.
    /// Ordering is unspecified; the aggregation step groups rows itself.
    async fn fetch_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ReadingRecord>>;
}
