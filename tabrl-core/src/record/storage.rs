//! Aggregation of stored records.
use super::{Record, RecordValue};
use log::warn;
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores records and aggregates them on demand.
///
/// Scalars stored under the same key are summarized by their min, max and
/// mean. For other value types only the most recent value is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn mean(vs: &[f32]) -> f32 {
    vs.iter().sum::<f32>() / vs.len() as f32
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// The number of records stored since the last aggregation.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            keys.extend(record.keys().cloned());
        }
        keys
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        match vs.len() {
            0 => Record::empty(),
            1 => Record::from_scalar(key, vs[0]),
            _ => Record::from_slice(&[
                (format!("{}_min", key), RecordValue::Scalar(min(&vs))),
                (format!("{}_max", key), RecordValue::Scalar(max(&vs))),
                (format!("{}_mean", key), RecordValue::Scalar(mean(&vs))),
            ]),
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys().iter() {
            let r = match self.latest(key) {
                Some(RecordValue::Scalar(..)) => self.scalar(key),
                Some(value) => Record::from_slice(&[(key.as_str(), value.clone())]),
                None => Record::empty(),
            };
            if r.is_empty() {
                warn!("Values of key '{}' could not be aggregated", key);
            }
            record = record.merge(r);
        }

        self.data = vec![];

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_scalars() {
        let mut storage = RecordStorage::new();
        for x in [1.0, 2.0, 6.0] {
            storage.store(Record::from_scalar("episode_return", x));
        }
        storage.store(Record::from_scalar("epsilon", 0.5));
        let record = storage.aggregate();

        assert_eq!(record.get_scalar("episode_return_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("episode_return_max").unwrap(), 6.0);
        assert_eq!(record.get_scalar("episode_return_mean").unwrap(), 3.0);
        assert_eq!(record.get_scalar("epsilon").unwrap(), 0.5);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_aggregate_keeps_latest_string() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_slice(&[(
            "state",
            RecordValue::String("RunEpisode".to_string()),
        )]));
        storage.store(Record::from_slice(&[(
            "state",
            RecordValue::String("Done".to_string()),
        )]));
        let record = storage.aggregate();
        assert_eq!(record.get_string("state").unwrap(), "Done");
    }
}
