//! Deterministic chain.
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tabrl_core::{Env, Step};

/// Configuration of [`ChainEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChainConfig {
    /// The number of states, the last one being terminal.
    pub n_states: usize,

    /// Reward of the transition into the terminal state.
    pub terminal_reward: f64,

    /// Reward of every other transition.
    pub step_reward: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            n_states: 4,
            terminal_reward: 1.0,
            step_reward: 0.0,
        }
    }
}

impl ChainConfig {
    /// Sets the number of states.
    pub fn n_states(mut self, v: usize) -> Self {
        self.n_states = v;
        self
    }

    /// Sets the reward of the transition into the terminal state.
    pub fn terminal_reward(mut self, v: f64) -> Self {
        self.terminal_reward = v;
        self
    }

    /// Sets the reward of the other transitions.
    pub fn step_reward(mut self, v: f64) -> Self {
        self.step_reward = v;
        self
    }
}

/// Chain `s0 -> s1 -> ... -> s(n-1)` with a single action.
///
/// Episodes start at `s0` and end in the terminal state `s(n-1)`.
pub struct ChainEnv {
    config: ChainConfig,
    state: usize,
}

impl ChainEnv {
    /// The exact value of `s` under discount `gamma`.
    pub fn true_value(&self, s: usize, gamma: f64) -> f64 {
        let n = self.config.n_states - 1;
        if s >= n {
            return 0.0;
        }
        let remaining = n - s;
        (0..remaining)
            .map(|k| {
                let r = if k + 1 == remaining {
                    self.config.terminal_reward
                } else {
                    self.config.step_reward
                };
                gamma.powi(k as i32) * r
            })
            .sum()
    }
}

impl Env for ChainEnv {
    type Config = ChainConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        if config.n_states < 2 {
            bail!("A chain needs at least 2 states, got {}", config.n_states);
        }
        Ok(Self {
            config: config.clone(),
            state: 0,
        })
    }

    fn n_states(&self) -> usize {
        self.config.n_states
    }

    fn n_actions(&self) -> usize {
        1
    }

    fn reset(&mut self) -> Result<usize> {
        self.state = 0;
        Ok(0)
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        let terminal = self.config.n_states - 1;
        if self.state == terminal {
            bail!("Stepped the chain after the terminal state, reset first");
        }
        self.state += 1;
        let is_terminated = self.state == terminal;
        let reward = if is_terminated {
            self.config.terminal_reward
        } else {
            self.config.step_reward
        };
        Ok(Step::new(self.state, act, reward, is_terminated, false))
    }
}
