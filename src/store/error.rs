//! Error types for readings store access

use std::fmt;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading from the store
#[derive(Debug)]
pub enum StoreError {
    /// Connection to the backing database failed
    ConnectionFailed(String),

    /// Query failed
    QueryFailed(String),

    /// A row could not be decoded into a [`ReadingRecord`](super::ReadingRecord)
    InvalidRow(String),

    /// I/O error (file access, etc.)
    IoError(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConnectionFailed(msg) => {
                write!(f, "failed to connect to readings store: {}", msg)
            }
            StoreError::QueryFailed(msg) => write!(f, "readings query failed: {}", msg),
            StoreError::InvalidRow(msg) => write!(f, "invalid reading row: {}", msg),
            StoreError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

// sqlx error conversion (used in sqlite.rs)
#[cfg(feature = "store-sqlite")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(io_err) => StoreError::IoError(io_err),
            sqlx::Error::ColumnDecode { .. } => StoreError::InvalidRow(err.to_string()),
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}
