use super::Record;

/// Stores records, then writes values aggregated from them with
/// [`AggregateRecorder::flush`].
pub trait AggregateRecorder {
    /// Store the record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is the episode count at the time of flushing.
    fn flush(&mut self, step: i64);
}
