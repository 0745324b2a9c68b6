//! Bernoulli multi-armed bandit.
use anyhow::{bail, Result};
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tabrl_core::{Env, Step};

/// Configuration of [`BernoulliBanditEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BernoulliBanditConfig {
    /// Success probability of every arm.
    pub means: Vec<f64>,

    /// The number of pulls in an episode.
    pub pulls_per_episode: usize,
}

impl BernoulliBanditConfig {
    /// Constructs a bandit with one pull per episode.
    pub fn new(means: Vec<f64>) -> Self {
        Self {
            means,
            pulls_per_episode: 1,
        }
    }

    /// Sets the number of pulls in an episode.
    pub fn pulls_per_episode(mut self, v: usize) -> Self {
        self.pulls_per_episode = v;
        self
    }
}

/// Single-state bandit; action `a` pays `1` with probability `means[a]`.
///
/// The last pull of an episode is flagged as terminated.
pub struct BernoulliBanditEnv {
    config: BernoulliBanditConfig,
    t: usize,
    rng: StdRng,
}

impl BernoulliBanditEnv {
    /// Index of the best arm, the lowest one among ties.
    pub fn best_arm(&self) -> usize {
        let mut best = 0;
        for (a, &m) in self.config.means.iter().enumerate() {
            if m > self.config.means[best] {
                best = a;
            }
        }
        best
    }

    /// Success probabilities of the arms.
    pub fn means(&self) -> &[f64] {
        &self.config.means
    }
}

impl Env for BernoulliBanditEnv {
    type Config = BernoulliBanditConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if let Some(m) = config.means.iter().find(|m| !(0.0..=1.0).contains(*m)) {
            bail!("Arm mean {} is not a probability", m);
        }
        if config.pulls_per_episode == 0 {
            bail!("pulls_per_episode must be positive");
        }
        Ok(Self {
            config: config.clone(),
            t: 0,
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn n_states(&self) -> usize {
        1
    }

    fn n_actions(&self) -> usize {
        self.config.means.len()
    }

    fn reset(&mut self) -> Result<usize> {
        self.t = 0;
        Ok(0)
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        let p = match self.config.means.get(act) {
            Some(&p) => p,
            None => bail!("Arm {} out of 0..{}", act, self.config.means.len()),
        };
        let reward = if self.rng.gen_bool(p) { 1.0 } else { 0.0 };
        self.t += 1;
        debug!("Pulled arm {}, reward {}", act, reward);
        let is_terminated = self.t >= self.config.pulls_per_episode;
        Ok(Step::new(0, act, reward, is_terminated, false))
    }
}
