//! Per-group mean aggregation over the trailing window

use std::collections::BTreeMap;

use crate::store::ReadingRecord;

/// Mean of one (device, measurement) group within the window
///
/// Created fresh each cycle and never persisted. Metadata is carried along
/// from the group's rows so that routing needs no second store round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub device_id: i64,
    pub measurement_id: i64,

    /// Arithmetic mean of all values in the group
    pub mean_value: f64,

    /// Number of samples behind the mean
    pub sample_count: usize,

    pub measurement_name: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,

    pub owner: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Group records by (device, measurement) and compute each group's mean
///
/// Groups with no samples simply do not appear; there is no zero-value
/// placeholder. Output order is deterministic (sorted by group key) so that
/// two cycles over the same data produce identical output.
pub fn aggregate(records: Vec<ReadingRecord>) -> Vec<Aggregate> {
    let mut groups: BTreeMap<(i64, i64), (f64, usize, ReadingRecord)> = BTreeMap::new();

    for record in records {
        let key = (record.device_id, record.measurement_id);
        groups
            .entry(key)
            .and_modify(|(sum, count, _)| {
                *sum += record.value;
                *count += 1;
            })
            .or_insert((record.value, 1, record));
    }

    groups
        .into_values()
        .map(|(sum, count, meta)| Aggregate {
            device_id: meta.device_id,
            measurement_id: meta.measurement_id,
            mean_value: sum / count as f64,
            sample_count: count,
            measurement_name: meta.measurement_name,
            min_value: meta.min_value,
            max_value: meta.max_value,
            owner: meta.owner,
            city: meta.city,
            state: meta.state,
            country: meta.country,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(device_id: i64, measurement_id: i64, value: f64) -> ReadingRecord {
        ReadingRecord {
            device_id,
            measurement_id,
            recorded_at: Utc::now(),
            value,
            measurement_name: "temperature".into(),
            min_value: Some(0.0),
            max_value: Some(40.0),
            owner: "alice".into(),
            city: "CityZ".into(),
            state: "StateY".into(),
            country: "CountryX".into(),
        }
    }

    #[test]
    fn test_empty_input_yields_no_aggregates() {
        assert_eq!(aggregate(vec![]), vec![]);
    }

    #[test]
    fn test_single_group_mean() {
        let aggregates = aggregate(vec![record(1, 1, 10.0), record(1, 1, 50.0)]);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].mean_value, 30.0);
        assert_eq!(aggregates[0].sample_count, 2);
    }

    #[test]
    fn test_one_aggregate_per_group() {
        let aggregates = aggregate(vec![
            record(1, 1, 10.0),
            record(1, 2, 70.0),
            record(2, 1, 30.0),
            record(1, 1, 20.0),
        ]);

        assert_eq!(aggregates.len(), 3);

        let d1m1 = aggregates
            .iter()
            .find(|a| a.device_id == 1 && a.measurement_id == 1)
            .unwrap();
        assert_eq!(d1m1.mean_value, 15.0);
        assert_eq!(d1m1.sample_count, 2);

        let d1m2 = aggregates
            .iter()
            .find(|a| a.device_id == 1 && a.measurement_id == 2)
            .unwrap();
        assert_eq!(d1m2.mean_value, 70.0);
    }

    #[test]
    fn test_metadata_carried_through() {
        let aggregates = aggregate(vec![record(1, 1, 10.0)]);

        assert_eq!(aggregates[0].owner, "alice");
        assert_eq!(aggregates[0].country, "CountryX");
        assert_eq!(aggregates[0].measurement_name, "temperature");
        assert_eq!(aggregates[0].max_value, Some(40.0));
    }

    #[test]
    fn test_deterministic_order() {
        let a = aggregate(vec![record(2, 1, 1.0), record(1, 1, 2.0)]);
        let b = aggregate(vec![record(1, 1, 2.0), record(2, 1, 1.0)]);
        assert_eq!(a, b);
    }
}
