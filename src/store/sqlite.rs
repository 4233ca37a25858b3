//! SQLite readings store implementation
//!
//! Reads the database the ingestion side maintains. The schema belongs to
//! the ingestion side; this backend only issues one joined SELECT per
//! evaluation cycle and never migrates or writes.
//!
//! Expected tables:
//!
//! ```text
//! measurements(id, name, min_value, max_value)
//! devices(id, owner, city, state, country)
//! readings(id, device_id, measurement_id, recorded_at, value)
//! ```
//!
//! `recorded_at` is stored as Unix milliseconds.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::backend::ReadingsStore;
use super::error::{StoreError, StoreResult};
use super::schema::ReadingRecord;

/// SQLite readings store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open the readings database
    ///
    /// The file must already exist (the ingestion side creates it and owns
    /// its journal mode); the busy timeout keeps reads well-behaved while
    /// ingestion writes.
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("opening readings store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .read_only(true)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Open with write access, used by tests to seed data
    #[doc(hidden)]
    pub async fn open_writable(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Access the underlying pool (for test fixtures)
    #[doc(hidden)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl ReadingsStore for SqliteStore {
    #[instrument(skip(self))]
    async fn fetch_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<ReadingRecord>> {
        let since_millis = since.timestamp_millis();

        debug!("querying readings since {}", since);

        let rows = sqlx::query(
            r#"
            SELECT r.device_id, r.measurement_id, r.recorded_at, r.value,
                   m.name AS measurement_name, m.min_value, m.max_value,
                   d.owner, d.city, d.state, d.country
            FROM readings r
            JOIN devices d ON d.id = r.device_id
            JOIN measurements m ON m.id = r.measurement_id
            WHERE r.recorded_at >= ?
            "#,
        )
        .bind(since_millis)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| ReadingRecord {
                device_id: row.get("device_id"),
                measurement_id: row.get("measurement_id"),
                recorded_at: Self::millis_to_timestamp(row.get("recorded_at")),
                value: row.get("value"),
                measurement_name: row.get("measurement_name"),
                min_value: row.get("min_value"),
                max_value: row.get("max_value"),
                owner: row.get("owner"),
                city: row.get("city"),
                state: row.get("state"),
                country: row.get("country"),
            })
            .collect();

        Ok(records)
    }
}
