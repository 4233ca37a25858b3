//! Helper functions for integration tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use vigia::pipeline::{Alert, AlertSink};
use vigia::store::ReadingRecord;

/// Builder for flat reading records with sensible defaults
pub struct RecordBuilder {
    record: ReadingRecord,
}

impl RecordBuilder {
    pub fn new(device_id: i64, measurement_id: i64, value: f64) -> Self {
        Self {
            record: ReadingRecord {
                device_id,
                measurement_id,
                recorded_at: Utc::now(),
                value,
                measurement_name: "Temp".into(),
                min_value: Some(0.0),
                max_value: Some(40.0),
                owner: "alice".into(),
                city: "CityZ".into(),
                state: "StateY".into(),
                country: "CountryX".into(),
            },
        }
    }

    pub fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.record.recorded_at = recorded_at;
        self
    }

    pub fn measurement(mut self, name: &str) -> Self {
        self.record.measurement_name = name.into();
        self
    }

    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.record.min_value = min;
        self.record.max_value = max;
        self
    }

    pub fn build(self) -> ReadingRecord {
        self.record
    }
}

/// Alert sink that records everything it is handed
#[derive(Default)]
pub struct CollectingSink {
    pub alerts: Mutex<Vec<Alert>>,
}

impl CollectingSink {
    pub async fn take(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock().await)
    }
}

#[async_trait]
impl AlertSink for CollectingSink {
    async fn deliver(&self, alert: Alert) {
        self.alerts.lock().await.push(alert);
    }
}
