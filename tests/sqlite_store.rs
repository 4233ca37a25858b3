//! SQLite store integration tests
//!
//! The monitor only reads the database; these tests stand in for the
//! ingestion side by creating the expected tables and seeding rows through
//! a writable connection.

#![cfg(feature = "store-sqlite")]

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vigia::store::sqlite::SqliteStore;
use vigia::store::ReadingsStore;

async fn seeded_store(dir: &TempDir) -> SqliteStore {
    let path = dir.path().join("readings.db");
    let store = SqliteStore::open_writable(&path).await.unwrap();

    sqlx::query(
        r#"
        CREATE TABLE measurements (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            min_value REAL,
            max_value REAL
        );
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE devices (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            country TEXT NOT NULL
        );
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE readings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id INTEGER NOT NULL,
            measurement_id INTEGER NOT NULL,
            recorded_at INTEGER NOT NULL,
            value REAL NOT NULL
        );
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    sqlx::query("INSERT INTO measurements (id, name, min_value, max_value) VALUES (1, 'Temp', 0.0, 40.0), (2, 'Humidity', NULL, NULL)")
        .execute(store.pool())
        .await
        .unwrap();

    sqlx::query("INSERT INTO devices (id, owner, city, state, country) VALUES (1, 'alice', 'CityZ', 'StateY', 'CountryX')")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

async fn insert_reading(
    store: &SqliteStore,
    device_id: i64,
    measurement_id: i64,
    recorded_at_millis: i64,
    value: f64,
) {
    sqlx::query(
        "INSERT INTO readings (device_id, measurement_id, recorded_at, value) VALUES (?, ?, ?, ?)",
    )
    .bind(device_id)
    .bind(measurement_id)
    .bind(recorded_at_millis)
    .bind(value)
    .execute(store.pool())
    .await
    .unwrap();
}

#[tokio::test]
async fn test_fetch_since_joins_metadata() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    let now = Utc::now();
    insert_reading(&store, 1, 1, now.timestamp_millis(), 25.5).await;

    let records = store.fetch_since(now - Duration::hours(1)).await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.device_id, 1);
    assert_eq!(record.measurement_id, 1);
    assert_eq!(record.value, 25.5);
    assert_eq!(record.measurement_name, "Temp");
    assert_eq!(record.min_value, Some(0.0));
    assert_eq!(record.max_value, Some(40.0));
    assert_eq!(record.owner, "alice");
    assert_eq!(record.city, "CityZ");
    assert_eq!(record.state, "StateY");
    assert_eq!(record.country, "CountryX");
}

#[tokio::test]
async fn test_fetch_since_excludes_old_readings() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    let now = Utc::now();
    insert_reading(&store, 1, 1, (now - Duration::hours(2)).timestamp_millis(), 10.0).await;
    insert_reading(&store, 1, 1, now.timestamp_millis(), 20.0).await;

    let records = store.fetch_since(now - Duration::hours(1)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, 20.0);
}

#[tokio::test]
async fn test_null_bounds_surface_as_none() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    let now = Utc::now();
    insert_reading(&store, 1, 2, now.timestamp_millis(), 55.0).await;

    let records = store.fetch_since(now - Duration::hours(1)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].measurement_name, "Humidity");
    assert_eq!(records[0].min_value, None);
    assert_eq!(records[0].max_value, None);
}

#[tokio::test]
async fn test_empty_window_returns_no_records() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    let records = store.fetch_since(Utc::now()).await.unwrap();
    assert!(records.is_empty());
}
