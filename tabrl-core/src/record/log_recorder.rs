use super::{AggregateRecorder, Record, RecordStorage, RecordValue};
use log::info;

/// Writes aggregated records with [`log::info!`].
///
/// Values are printed in key order, one line per flush.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn format(step: i64, record: &Record) -> String {
        let mut keys: Vec<&String> = record.keys().collect();
        keys.sort();
        let fields: Vec<String> = keys
            .into_iter()
            .filter_map(|k| {
                let v = match record.get(k)? {
                    RecordValue::Scalar(v) => format!("{:.4}", v),
                    RecordValue::DateTime(t) => t.to_rfc3339(),
                    RecordValue::Array1(xs) => format!("{:?}", xs),
                    RecordValue::String(s) => s.clone(),
                };
                Some(format!("{}={}", k, v))
            })
            .collect();
        format!("episode {}: {}", step, fields.join(", "))
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("{}", Self::format(step, &record));
    }
}
