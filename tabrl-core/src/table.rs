//! Value and action-value tables.
//!
//! Every entry is materialised at construction with an explicit initial
//! value, so a state that was never visited reads as that value. Visit counts
//! are kept alongside the estimates and persist across episodes.
use serde::{Deserialize, Serialize};

/// State-value table `V`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    values: Vec<f64>,
    visits: Vec<u64>,
    init_value: f64,
}

impl ValueTable {
    /// Constructs a table with all entries set to `init_value`.
    pub fn new(n_states: usize, init_value: f64) -> Self {
        Self {
            values: vec![init_value; n_states],
            visits: vec![0; n_states],
            init_value,
        }
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the table has no state.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value the entries started from.
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Value of state `s`.
    #[inline]
    pub fn get(&self, s: usize) -> f64 {
        self.values[s]
    }

    /// Sets the value of state `s`.
    #[inline]
    pub fn set(&mut self, s: usize, v: f64) {
        self.values[s] = v;
    }

    /// Adds `dv` to the value of state `s`.
    #[inline]
    pub fn add(&mut self, s: usize, dv: f64) {
        self.values[s] += dv;
    }

    /// Counts a visit of state `s` and returns the new count.
    pub fn visit(&mut self, s: usize) -> u64 {
        self.visits[s] += 1;
        self.visits[s]
    }

    /// The number of visits of state `s`.
    pub fn visits(&self, s: usize) -> u64 {
        self.visits[s]
    }

    /// All values, indexed by state.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

/// Action-value table `Q`, stored row-major as `n_states × n_actions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionValueTable {
    n_actions: usize,
    values: Vec<f64>,
    visits: Vec<u64>,
    init_value: f64,
}

impl ActionValueTable {
    /// Constructs a table with all entries set to `init_value`.
    pub fn new(n_states: usize, n_actions: usize, init_value: f64) -> Self {
        Self {
            n_actions,
            values: vec![init_value; n_states * n_actions],
            visits: vec![0; n_states * n_actions],
            init_value,
        }
    }

    /// The number of states.
    pub fn n_states(&self) -> usize {
        if self.n_actions == 0 {
            0
        } else {
            self.values.len() / self.n_actions
        }
    }

    /// The number of actions.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// The value the entries started from.
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Flat index of the pair `(s, a)`.
    #[inline]
    pub fn index(&self, s: usize, a: usize) -> usize {
        debug_assert!(a < self.n_actions);
        s * self.n_actions + a
    }

    /// Value of the pair `(s, a)`.
    #[inline]
    pub fn get(&self, s: usize, a: usize) -> f64 {
        self.values[self.index(s, a)]
    }

    /// Sets the value of the pair `(s, a)`.
    #[inline]
    pub fn set(&mut self, s: usize, a: usize, v: f64) {
        let ix = self.index(s, a);
        self.values[ix] = v;
    }

    /// Adds `dv` to the value of the pair `(s, a)`.
    #[inline]
    pub fn add(&mut self, s: usize, a: usize, dv: f64) {
        let ix = self.index(s, a);
        self.values[ix] += dv;
    }

    /// Action values of state `s`.
    pub fn row(&self, s: usize) -> &[f64] {
        let start = s * self.n_actions;
        &self.values[start..start + self.n_actions]
    }

    /// The maximum action value at state `s`.
    ///
    /// The value does not depend on which maximiser is picked, so no
    /// tie-breaking is needed here.
    pub fn max(&self, s: usize) -> f64 {
        self.row(s)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Counts a visit of the pair `(s, a)` and returns the new count.
    pub fn visit(&mut self, s: usize, a: usize) -> u64 {
        let ix = self.index(s, a);
        self.visits[ix] += 1;
        self.visits[ix]
    }

    /// The number of visits of the pair `(s, a)`.
    pub fn visits(&self, s: usize, a: usize) -> u64 {
        self.visits[self.index(s, a)]
    }

    /// All values, in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}
