//! Thompson sampling for Beta-Bernoulli bandits.
use crate::{bandit::ArmStats, util::argmax_random};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};

/// Thompson sampling explorer.
///
/// Draws `theta_a ~ Beta(alpha + successes[a], beta + failures[a])` for every
/// arm and picks the largest draw.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Thompson {
    /// Prior pseudo-count of successes.
    pub alpha: f64,

    /// Prior pseudo-count of failures.
    pub beta: f64,
}

impl Default for Thompson {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl Thompson {
    /// Constructs the explorer with a `Beta(alpha, beta)` prior.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Posterior parameters of arm `a`.
    pub fn posterior(&self, stats: &ArmStats, a: usize) -> (f64, f64) {
        let s = stats.successes(a);
        let f = stats.pulls(a) as f64 - s;
        (self.alpha + s, self.beta + f.max(0.0))
    }

    /// Draws one sample per arm from the posteriors.
    pub fn draw<R: Rng + ?Sized>(&self, stats: &ArmStats, rng: &mut R) -> Vec<f64> {
        (0..stats.n_arms())
            .map(|a| {
                let (alpha, beta) = self.posterior(stats, a);
                match Beta::new(alpha, beta) {
                    Ok(dist) => dist.sample(rng),
                    // Parameters are checked positive when the explorer is built
                    Err(_) => alpha / (alpha + beta),
                }
            })
            .collect()
    }

    /// Selects an arm.
    pub fn action<R: Rng + ?Sized>(&self, stats: &ArmStats, rng: &mut R) -> usize {
        argmax_random(&self.draw(stats, rng), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posterior_counts() {
        let mut stats = ArmStats::new(2, 0.0);
        stats.update(0, 1.0);
        stats.update(0, 0.0);
        stats.update(0, 1.0);
        let ts = Thompson::default();
        assert_eq!(ts.posterior(&stats, 0), (3.0, 2.0));
        assert_eq!(ts.posterior(&stats, 1), (1.0, 1.0));
    }
}
