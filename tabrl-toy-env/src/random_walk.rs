//! Random walk between two terminal states.
use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tabrl_core::{Env, Step};

/// Configuration of [`RandomWalkEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RandomWalkConfig {
    /// The number of non-terminal states.
    pub n_inner: usize,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self { n_inner: 5 }
    }
}

/// Random walk over `n_inner` states with a terminal state on each side.
///
/// State `0` is the left terminal, `n_inner + 1` the right one and walks
/// start in the middle. The single action moves left or right with equal
/// probability. Reaching the right terminal is rewarded with `1`, every other
/// transition with `0`, so the undiscounted value of inner state `i` is
/// `i / (n_inner + 1)`.
pub struct RandomWalkEnv {
    n_inner: usize,
    state: usize,
    rng: StdRng,
}

impl RandomWalkEnv {
    /// The start state.
    pub fn start(&self) -> usize {
        (self.n_inner + 1) / 2
    }

    /// Undiscounted values of all states, terminals included.
    pub fn true_values(&self) -> Vec<f64> {
        let n = (self.n_inner + 1) as f64;
        (0..self.n_inner + 2)
            .map(|s| {
                if s == 0 || s == self.n_inner + 1 {
                    0.0
                } else {
                    s as f64 / n
                }
            })
            .collect()
    }

    fn is_terminal(&self, s: usize) -> bool {
        s == 0 || s == self.n_inner + 1
    }
}

impl Env for RandomWalkEnv {
    type Config = RandomWalkConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.n_inner == 0 {
            bail!("A random walk needs at least one inner state");
        }
        let mut env = Self {
            n_inner: config.n_inner,
            state: 0,
            rng: StdRng::seed_from_u64(seed as u64),
        };
        env.state = env.start();
        Ok(env)
    }

    fn n_states(&self) -> usize {
        self.n_inner + 2
    }

    fn n_actions(&self) -> usize {
        1
    }

    fn reset(&mut self) -> Result<usize> {
        self.state = self.start();
        Ok(self.state)
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        if self.is_terminal(self.state) {
            bail!("Stepped the random walk from terminal state {}", self.state);
        }
        self.state = if self.rng.gen_bool(0.5) {
            self.state + 1
        } else {
            self.state - 1
        };
        let is_terminated = self.is_terminal(self.state);
        let reward = if self.state == self.n_inner + 1 { 1.0 } else { 0.0 };
        Ok(Step::new(self.state, act, reward, is_terminated, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_ends_at_a_terminal() -> Result<()> {
        let mut env = RandomWalkEnv::build(&RandomWalkConfig::default(), 3)?;
        assert_eq!(env.reset()?, 3);
        let mut prev = 3;
        loop {
            let step = env.step(0)?;
            assert_eq!((step.obs as i64 - prev as i64).abs(), 1);
            prev = step.obs;
            if step.is_terminated {
                assert!(step.obs == 0 || step.obs == 6);
                assert_eq!(step.reward, if step.obs == 6 { 1.0 } else { 0.0 });
                break;
            }
            assert_eq!(step.reward, 0.0);
        }
        assert!(env.step(0).is_err());
        Ok(())
    }

    #[test]
    fn test_true_values() -> Result<()> {
        let env = RandomWalkEnv::build(&RandomWalkConfig::default(), 0)?;
        let v = env.true_values();
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], 0.0);
        assert!((v[3] - 0.5).abs() < 1e-12);
        assert!((v[5] - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(v[6], 0.0);
        Ok(())
    }

    #[test]
    fn test_same_seed_same_walk() -> Result<()> {
        let walk = |seed| -> Result<Vec<usize>> {
            let mut env = RandomWalkEnv::build(&RandomWalkConfig::default(), seed)?;
            env.reset()?;
            (0..3).map(|_| Ok(env.step(0)?.obs)).collect()
        };
        assert_eq!(walk(11)?, walk(11)?);
        Ok(())
    }
}
