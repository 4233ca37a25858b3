//! Read access to the readings store
//!
//! The monitor never writes readings; ingestion happens elsewhere. This
//! module exposes the single capability the evaluation loop needs: fetch
//! every sample recorded since a point in time, flattened with its device
//! and measurement metadata.
//!
//! ## Backends
//!
//! - **SQLite** (default): reads the database the ingestion side writes
//! - **In-Memory**: no persistence, for demos and tests

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "store-sqlite")]
pub mod sqlite;

pub use backend::ReadingsStore;
pub use error::{StoreError, StoreResult};
pub use schema::ReadingRecord;
