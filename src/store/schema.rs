//! Flat record shape returned by the readings store
//!
//! The store query joins three tables (readings, devices, measurements) and
//! hands the pipeline one denormalized row per sample. Grouping, averaging
//! and routing all work off this shape; nothing downstream touches the
//! store again within a cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample joined with its device and measurement metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Device the sample belongs to
    pub device_id: i64,

    /// Measurement kind of the sample
    pub measurement_id: i64,

    /// When the sample was recorded (always UTC)
    pub recorded_at: DateTime<Utc>,

    /// Observed value
    pub value: f64,

    /// Measurement name (e.g. "temperature")
    pub measurement_name: String,

    /// Configured lower bound, if any
    pub min_value: Option<f64>,

    /// Configured upper bound, if any
    pub max_value: Option<f64>,

    /// Username of the device owner
    pub owner: String,

    /// Device location
    pub city: String,
    pub state: String,
    pub country: String,
}
