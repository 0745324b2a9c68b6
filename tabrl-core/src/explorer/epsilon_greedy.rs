//! Epsilon-greedy action selection.
use super::{DecayClock, EpsilonSchedule};
use crate::util::{argmax_random, maximizers};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer.
///
/// With probability `epsilon(t)` an action is chosen uniformly at random,
/// otherwise greedily with random tie-breaking. `t` counts steps or episodes
/// according to `clock`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Exploration-rate schedule.
    pub schedule: EpsilonSchedule,

    /// Counter driving the schedule.
    #[serde(default)]
    pub clock: DecayClock,

    #[serde(skip)]
    n_steps: usize,

    #[serde(skip)]
    n_episodes: usize,
}

impl EpsilonGreedy {
    /// Constructs an explorer with a fixed exploration rate.
    pub fn new(eps: f64) -> Self {
        Self::with_schedule(EpsilonSchedule::Constant(eps))
    }

    /// Constructs an explorer with an exploration-rate schedule, counted in episodes.
    pub fn with_schedule(schedule: EpsilonSchedule) -> Self {
        Self {
            schedule,
            clock: DecayClock::Episode,
            n_steps: 0,
            n_episodes: 0,
        }
    }

    /// Sets the counter driving the schedule.
    pub fn clock(mut self, clock: DecayClock) -> Self {
        self.clock = clock;
        self
    }

    /// The current exploration rate.
    pub fn epsilon(&self) -> f64 {
        let t = match self.clock {
            DecayClock::Step => self.n_steps,
            DecayClock::Episode => self.n_episodes,
        };
        self.schedule.value(t)
    }

    /// Counts an environment step.
    pub fn tick_step(&mut self) {
        self.n_steps += 1;
    }

    /// Counts a finished episode.
    pub fn tick_episode(&mut self) {
        self.n_episodes += 1;
    }

    /// Takes an action based on action values.
    pub fn action<R: Rng + ?Sized>(&self, values: &[f64], rng: &mut R) -> usize {
        if rng.gen::<f64>() < self.epsilon() {
            rng.gen_range(0..values.len())
        } else {
            argmax_random(values, rng)
        }
    }

    /// Action probabilities based on action values.
    pub fn probs(&self, values: &[f64]) -> Vec<f64> {
        let eps = self.epsilon();
        let n = values.len() as f64;
        let best = maximizers(values);
        let mut probs = vec![eps / n; values.len()];
        let share = (1.0 - eps) / best.len().max(1) as f64;
        best.into_iter().for_each(|a| probs[a] += share);
        probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_probs_split_ties() {
        let explorer = EpsilonGreedy::new(0.4);
        let probs = explorer.probs(&[1.0, 0.0, 1.0, 0.5]);
        let expected = [0.4, 0.1, 0.4, 0.1];
        for (p, e) in probs.iter().zip(expected.iter()) {
            assert!((p - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let explorer = EpsilonGreedy::new(0.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(explorer.action(&[0.0, 2.0, 1.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_episode_clock_decays() {
        let mut explorer = EpsilonGreedy::with_schedule(EpsilonSchedule::Inverse);
        explorer.tick_step();
        assert_eq!(explorer.epsilon(), 1.0);
        explorer.tick_episode();
        assert_eq!(explorer.epsilon(), 0.5);

        let mut explorer = explorer.clock(DecayClock::Step);
        explorer.tick_step();
        assert_eq!(explorer.epsilon(), 1.0 / 3.0);
    }
}
