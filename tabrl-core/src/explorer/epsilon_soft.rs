//! Epsilon-soft policy with an explicit probability table.
use crate::util::argmax_random;
use rand::{distributions::WeightedIndex, Rng};
use serde::{Deserialize, Serialize};

/// Epsilon-soft explorer.
///
/// Keeps one action-probability row per state. After `Q[s, :]` changes, the
/// row of `s` is rebuilt as `epsilon / |A|` for every action plus
/// `1 - epsilon` on the greedy action (ties broken at random). Rows start
/// uniform.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonSoft {
    /// Probability mass spread over all actions.
    pub epsilon: f64,

    #[serde(skip)]
    n_actions: usize,

    #[serde(skip)]
    probs: Vec<f64>,
}

impl EpsilonSoft {
    /// Constructs the explorer. The table is allocated by [`EpsilonSoft::init`].
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            n_actions: 0,
            probs: vec![],
        }
    }

    /// Allocates uniform rows for `n_states` states.
    pub fn init(&mut self, n_states: usize, n_actions: usize) {
        self.n_actions = n_actions;
        self.probs = vec![1.0 / n_actions as f64; n_states * n_actions];
    }

    /// Action probabilities at state `s`.
    pub fn row(&self, s: usize) -> &[f64] {
        let start = s * self.n_actions;
        &self.probs[start..start + self.n_actions]
    }

    /// Rebuilds the row of state `s` from its action values.
    pub fn refresh<R: Rng + ?Sized>(&mut self, s: usize, values: &[f64], rng: &mut R) {
        let best = argmax_random(values, rng);
        let n = self.n_actions;
        let base = self.epsilon / n as f64;
        let row = &mut self.probs[s * n..(s + 1) * n];
        row.iter_mut().for_each(|p| *p = base);
        row[best] += 1.0 - self.epsilon;
    }

    /// Samples an action at state `s`.
    pub fn action<R: Rng + ?Sized>(&self, s: usize, rng: &mut R) -> usize {
        match WeightedIndex::new(self.row(s)) {
            Ok(dist) => rng.sample(dist),
            Err(_) => rng.gen_range(0..self.n_actions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_rows_stay_normalized() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut explorer = EpsilonSoft::new(0.3);
        explorer.init(2, 3);
        assert!((explorer.row(1).iter().sum::<f64>() - 1.0).abs() < 1e-12);

        explorer.refresh(1, &[0.0, 5.0, 1.0], &mut rng);
        let row = explorer.row(1);
        assert!((row[1] - (0.1 + 0.7)).abs() < 1e-12);
        assert!((row[0] - 0.1).abs() < 1e-12);
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(explorer.row(0), &[1.0 / 3.0; 3]);
    }

    #[test]
    fn test_samples_follow_row() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut explorer = EpsilonSoft::new(0.0);
        explorer.init(1, 4);
        explorer.refresh(0, &[0.0, 0.0, 0.0, 1.0], &mut rng);
        for _ in 0..50 {
            assert_eq!(explorer.action(0, &mut rng), 3);
        }
    }
}
