//! UCB1 arm selection for single-state bandits.
use crate::{bandit::ArmStats, util::argmax_random};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// UCB1 explorer.
///
/// Picks `argmax_a mean[a] + sqrt(2 ln(1/delta) / N[a])`. Arms never pulled
/// score infinity, so each arm is pulled once before any bonus is computed.
/// Without a fixed `delta`, `delta = 1/t` with `t` the total number of
/// pulls, which is the classic `sqrt(2 ln t / N[a])` bonus.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Ucb1 {
    /// Fixed confidence parameter in `(0, 1)`.
    #[serde(default)]
    pub delta: Option<f64>,
}

impl Ucb1 {
    /// Constructs the anytime variant.
    pub fn new() -> Self {
        Self { delta: None }
    }

    /// Constructs the variant with a fixed confidence parameter.
    pub fn with_delta(delta: f64) -> Self {
        Self { delta: Some(delta) }
    }

    /// Upper confidence bounds of the arms.
    pub fn scores(&self, stats: &ArmStats) -> Vec<f64> {
        let t = stats.total_pulls().max(1) as f64;
        let log_term = match self.delta {
            Some(delta) => (1.0 / delta).ln(),
            None => t.ln(),
        };
        (0..stats.n_arms())
            .map(|a| match stats.pulls(a) {
                0 => f64::INFINITY,
                n => stats.mean(a) + (2.0 * log_term / n as f64).sqrt(),
            })
            .collect()
    }

    /// Selects an arm.
    pub fn action<R: Rng + ?Sized>(&self, stats: &ArmStats, rng: &mut R) -> usize {
        argmax_random(&self.scores(stats), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_unpulled_arms_come_first() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut stats = ArmStats::new(3, 0.0);
        let ucb = Ucb1::new();
        let mut pulled = vec![];
        for _ in 0..3 {
            let a = ucb.action(&stats, &mut rng);
            stats.update(a, 1.0);
            pulled.push(a);
        }
        pulled.sort();
        assert_eq!(pulled, vec![0, 1, 2]);
    }

    #[test]
    fn test_scores() {
        let mut stats = ArmStats::new(2, 0.0);
        stats.update(0, 1.0);
        stats.update(1, 0.0);
        stats.update(1, 0.0);
        let scores = Ucb1::new().scores(&stats);
        let t = (3.0f64).ln();
        assert!((scores[0] - (1.0 + (2.0 * t).sqrt())).abs() < 1e-12);
        assert!((scores[1] - (t).sqrt()).abs() < 1e-12);
    }
}
