use super::{AggregateRecorder, Record};

/// Buffered recorder.
///
/// Keeps every record in memory, in the order they arrived. Flushing only
/// counts the flushes. This is used for inspecting training runs in tests.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    n_flushes: usize,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.buf.iter()
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record was stored.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The number of calls of [`AggregateRecorder::flush`].
    pub fn n_flushes(&self) -> usize {
        self.n_flushes
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.buf.push(record);
    }

    fn flush(&mut self, _step: i64) {
        self.n_flushes += 1;
    }
}
