//! Eligibility traces for TD(λ).
//!
//! A trace is a per-entry decaying memory of recent visits. It is reset to all
//! zero at the start of every episode, decayed by `gamma * lambda` and
//! incremented on each visit within the episode.

/// Dense accumulating eligibility trace.
///
/// Entries are indexed like the table the trace is attached to: by state for
/// [`ValueTable`](crate::ValueTable), by flat pair index for
/// [`ActionValueTable`](crate::ActionValueTable).
#[derive(Clone, Debug, PartialEq)]
pub struct EligibilityTrace {
    traces: Vec<f64>,
}

impl EligibilityTrace {
    /// Creates an all-zero trace with `n` entries.
    pub fn new(n: usize) -> Self {
        Self { traces: vec![0.0; n] }
    }

    /// Resets every entry to zero.
    pub fn reset(&mut self) {
        self.traces.iter_mut().for_each(|e| *e = 0.0);
    }

    /// Multiplies every entry by `factor`.
    pub fn decay(&mut self, factor: f64) {
        self.traces.iter_mut().for_each(|e| *e *= factor);
    }

    /// Adds one to entry `ix`.
    pub fn increment(&mut self, ix: usize) {
        self.traces[ix] += 1.0;
    }

    /// Trace of entry `ix`.
    pub fn get(&self, ix: usize) -> f64 {
        self.traces[ix]
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.traces.iter()
    }

    /// Applies `values[i] += step * trace[i]` for every entry.
    pub fn apply(&self, values: &mut [f64], step: f64) {
        debug_assert_eq!(values.len(), self.traces.len());
        for (v, e) in values.iter_mut().zip(self.traces.iter()) {
            *v += step * e;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_lifecycle() {
        let mut trace = EligibilityTrace::new(3);
        trace.increment(1);
        assert_eq!(trace.get(1), 1.0);

        trace.decay(0.5);
        trace.increment(1);
        trace.increment(2);
        assert_eq!(trace.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.5, 1.0]);

        let mut values = vec![1.0; 3];
        trace.apply(&mut values, 2.0);
        assert_eq!(values, vec![1.0, 4.0, 3.0]);

        trace.reset();
        assert!(trace.iter().all(|&e| e == 0.0));
    }
}
