//! Single-state bandits.
//!
//! A bandit is an environment with one state; every step is a pull of the arm
//! given as the action. [`BanditAgent`] keeps per-arm statistics and selects
//! arms with a [`BanditStrategy`].
use crate::{
    error::TabularError,
    explorer::{EpsilonGreedy, ExplorationStrategy, Softmax, Thompson, Ucb1},
    util::argmax_random,
    Agent, EpisodeTrace, Policy, Transition,
};
use anyhow::Result;
use log::warn;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-arm pull counts and reward statistics.
///
/// An update is a single read-modify-write of one arm through `&mut self`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pulls: Vec<u64>,
    reward_sums: Vec<f64>,
    successes: Vec<f64>,
    init_value: f64,
}

impl ArmStats {
    /// Constructs statistics of `n_arms` arms, never pulled.
    ///
    /// `init_value` is the mean reported for an arm before its first pull.
    pub fn new(n_arms: usize, init_value: f64) -> Self {
        Self {
            pulls: vec![0; n_arms],
            reward_sums: vec![0.0; n_arms],
            successes: vec![0.0; n_arms],
            init_value,
        }
    }

    /// The number of arms.
    pub fn n_arms(&self) -> usize {
        self.pulls.len()
    }

    /// Records a pull of arm `a`.
    ///
    /// The reward counts as a (fractional) Bernoulli success after being
    /// clamped to `[0, 1]`. Returns `false` if clamping was needed.
    pub fn update(&mut self, a: usize, reward: f64) -> bool {
        self.pulls[a] += 1;
        self.reward_sums[a] += reward;
        let clamped = reward.clamp(0.0, 1.0);
        self.successes[a] += clamped;
        clamped == reward
    }

    /// The number of pulls of arm `a`.
    pub fn pulls(&self, a: usize) -> u64 {
        self.pulls[a]
    }

    /// The number of pulls of all arms.
    pub fn total_pulls(&self) -> u64 {
        self.pulls.iter().sum()
    }

    /// Sum of the clamped rewards of arm `a`.
    pub fn successes(&self, a: usize) -> f64 {
        self.successes[a]
    }

    /// Empirical mean reward of arm `a`.
    pub fn mean(&self, a: usize) -> f64 {
        match self.pulls[a] {
            0 => self.init_value,
            n => self.reward_sums[a] / n as f64,
        }
    }

    /// Empirical mean rewards of all arms.
    pub fn means(&self) -> Vec<f64> {
        (0..self.n_arms()).map(|a| self.mean(a)).collect()
    }

    /// Pull counts and empirical means.
    pub fn summary(&self) -> Vec<ArmSummary> {
        (0..self.n_arms())
            .map(|a| ArmSummary {
                pulls: self.pulls[a],
                mean: self.mean(a),
            })
            .collect()
    }
}

/// Pull count and empirical mean of one arm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmSummary {
    /// The number of pulls.
    pub pulls: u64,

    /// Empirical mean reward.
    pub mean: f64,
}

/// Arm selection of [`BanditAgent`].
#[derive(Debug, PartialEq, Clone)]
pub enum BanditStrategy {
    /// Greedy over empirical means.
    Greedy,

    /// Epsilon-greedy over empirical means.
    EpsilonGreedy(EpsilonGreedy),

    /// Softmax over empirical means.
    Softmax(Softmax),

    /// UCB1.
    Ucb1(Ucb1),

    /// Thompson sampling.
    Thompson(Thompson),
}

impl BanditStrategy {
    /// Builds a bandit strategy from the configured exploration strategy.
    pub fn from_strategy(strategy: &ExplorationStrategy) -> Result<Self> {
        match strategy {
            ExplorationStrategy::Greedy => Ok(Self::Greedy),
            ExplorationStrategy::EpsilonGreedy(e) => Ok(Self::EpsilonGreedy(e.clone())),
            ExplorationStrategy::Softmax(s) => Ok(Self::Softmax(s.clone())),
            ExplorationStrategy::Ucb1(u) => Ok(Self::Ucb1(u.clone())),
            ExplorationStrategy::Thompson(t) => Ok(Self::Thompson(t.clone())),
            ExplorationStrategy::EpsilonSoft(_) => Err(TabularError::config(
                "EpsilonSoft keeps a per-state table and is not available for bandits",
            )),
        }
    }

    /// Selects an arm.
    pub fn action(&self, stats: &ArmStats, rng: &mut StdRng) -> usize {
        match self {
            Self::Greedy => argmax_random(&stats.means(), rng),
            Self::EpsilonGreedy(e) => e.action(&stats.means(), rng),
            Self::Softmax(s) => s.action(&stats.means(), rng),
            Self::Ucb1(u) => u.action(stats, rng),
            Self::Thompson(t) => t.action(stats, rng),
        }
    }
}

/// Sample-average bandit agent.
pub struct BanditAgent {
    stats: ArmStats,
    strategy: BanditStrategy,
    rng: StdRng,
    numerical_warnings: usize,
}

impl BanditAgent {
    /// Constructs the agent.
    ///
    /// Fails if there is no arm.
    pub fn new(n_arms: usize, strategy: BanditStrategy, init_value: f64, seed: u64) -> Result<Self> {
        if n_arms == 0 {
            return Err(TabularError::config("A bandit needs at least one arm"));
        }
        Ok(Self {
            stats: ArmStats::new(n_arms, init_value),
            strategy,
            rng: StdRng::seed_from_u64(seed),
            numerical_warnings: 0,
        })
    }

    /// Arm statistics.
    pub fn stats(&self) -> &ArmStats {
        &self.stats
    }

    /// The selection strategy.
    pub fn strategy(&self) -> &BanditStrategy {
        &self.strategy
    }

    /// The number of rewards clamped into `[0, 1]`.
    pub fn numerical_warnings(&self) -> usize {
        self.numerical_warnings
    }

    /// The current exploration rate, if the strategy has one.
    pub fn epsilon(&self) -> Option<f64> {
        match &self.strategy {
            BanditStrategy::EpsilonGreedy(e) => Some(e.epsilon()),
            _ => None,
        }
    }
}

impl Policy for BanditAgent {
    fn sample(&mut self, _state: usize) -> usize {
        self.strategy.action(&self.stats, &mut self.rng)
    }
}

impl Agent for BanditAgent {
    fn begin_episode(&mut self) {}

    fn observe(&mut self, transition: &Transition) -> Result<()> {
        let in_range = self.stats.update(transition.act, transition.reward);
        if !in_range && matches!(self.strategy, BanditStrategy::Thompson(_)) {
            warn!(
                "Reward {} of arm {} clamped into [0, 1] for the Beta posterior",
                transition.reward, transition.act
            );
            self.numerical_warnings += 1;
        }
        if let BanditStrategy::EpsilonGreedy(e) = &mut self.strategy {
            e.tick_step();
        }
        Ok(())
    }

    fn end_episode(&mut self, _trace: &EpisodeTrace) -> Result<()> {
        if let BanditStrategy::EpsilonGreedy(e) = &mut self.strategy {
            e.tick_episode();
        }
        Ok(())
    }
}
