//! Configuration of [`Trainer`](super::Trainer).
use super::FaultPolicy;
use crate::{error::TabularError, Algorithm, ExplorationStrategy, TruncationPolicy};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Estimation algorithm.
    pub algorithm: Algorithm,

    /// Learning rate, in `(0, 1]`.
    pub alpha: f64,

    /// Discount factor, in `[0, 1]`.
    pub gamma: f64,

    /// Trace decay, in `[0, 1]`. Given for [`Algorithm::TdLambda`] only.
    pub lambda: Option<f64>,

    /// Exploration strategy.
    pub explorer: ExplorationStrategy,

    /// The number of episodes.
    pub n_episodes: usize,

    /// Step cap of an episode.
    pub max_steps_per_episode: usize,

    /// Random seed of the environment. The agent is seeded from it as well.
    pub seed: i64,

    /// Initial value of every table entry.
    pub init_value: f64,

    /// Handling of truncated episodes by Monte Carlo updates.
    pub truncation: TruncationPolicy,

    /// Handling of environment failures.
    pub fault_policy: FaultPolicy,

    /// Window of the moving average of episode returns, in episodes.
    pub reward_window: usize,

    /// Interval of flushing records, in episodes.
    pub record_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            alpha: 0.1,
            gamma: 0.99,
            lambda: None,
            explorer: ExplorationStrategy::default(),
            n_episodes: 1000,
            max_steps_per_episode: 1000,
            seed: 42,
            init_value: 0.0,
            truncation: TruncationPolicy::default(),
            fault_policy: FaultPolicy::default(),
            reward_window: 100,
            record_interval: usize::MAX,
        }
    }
}

impl TrainerConfig {
    /// Sets the algorithm.
    pub fn algorithm(mut self, v: Algorithm) -> Self {
        self.algorithm = v;
        self
    }

    /// Sets the learning rate.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the trace decay.
    pub fn lambda(mut self, v: f64) -> Self {
        self.lambda = Some(v);
        self
    }

    /// Sets the exploration strategy.
    pub fn explorer(mut self, v: ExplorationStrategy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the initial value of table entries.
    pub fn init_value(mut self, v: f64) -> Self {
        self.init_value = v;
        self
    }

    /// Sets the handling of truncated episodes.
    pub fn truncation(mut self, v: TruncationPolicy) -> Self {
        self.truncation = v;
        self
    }

    /// Sets the fault policy.
    pub fn fault_policy(mut self, v: FaultPolicy) -> Self {
        self.fault_policy = v;
        self
    }

    /// Sets the window of the moving average of episode returns.
    pub fn reward_window(mut self, v: usize) -> Self {
        self.reward_window = v;
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Seed of the agent's random number generator.
    ///
    /// Offset from the environment seed so that both streams differ.
    pub fn agent_seed(&self) -> u64 {
        (self.seed as u64).wrapping_add(0x9E37_79B9_7F4A_7C15)
    }

    /// Checks the parameters which do not depend on the environment.
    ///
    /// Returns [`TabularError::Config`] describing the first malformed
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(TabularError::config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(TabularError::config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        match (self.algorithm, self.lambda) {
            (Algorithm::TdLambda, None) => {
                return Err(TabularError::config("lambda is required for TdLambda"))
            }
            (Algorithm::TdLambda, Some(lambda)) if !(0.0..=1.0).contains(&lambda) => {
                return Err(TabularError::config(format!(
                    "lambda must be in [0, 1], got {}",
                    lambda
                )))
            }
            (Algorithm::TdLambda, Some(_)) | (_, None) => {}
            (algorithm, Some(_)) => {
                return Err(TabularError::config(format!(
                    "lambda is given but {:?} does not use it",
                    algorithm
                )))
            }
        }
        if self.n_episodes == 0 {
            return Err(TabularError::config("n_episodes must be positive"));
        }
        if self.max_steps_per_episode == 0 {
            return Err(TabularError::config(
                "max_steps_per_episode must be positive",
            ));
        }
        if self.reward_window == 0 {
            return Err(TabularError::config("reward_window must be positive"));
        }
        if self.record_interval == 0 {
            return Err(TabularError::config("record_interval must be positive"));
        }
        if !self.init_value.is_finite() {
            return Err(TabularError::config("init_value must be finite"));
        }
        self.explorer.check().map_err(TabularError::config)?;
        self.fault_policy.check().map_err(TabularError::config)?;
        if self.explorer.is_bandit_only() && self.algorithm != Algorithm::SampleAverage {
            return Err(TabularError::config(format!(
                "{} is a bandit strategy and requires the SampleAverage algorithm",
                self.explorer.name()
            )));
        }
        if self.algorithm == Algorithm::SampleAverage
            && matches!(self.explorer, ExplorationStrategy::EpsilonSoft(_))
        {
            return Err(TabularError::config(
                "EpsilonSoft is not defined for the SampleAverage algorithm",
            ));
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EpsilonGreedy, EpsilonSchedule, Thompson};
    use tempdir::TempDir;

    fn is_config_error(res: Result<()>) -> bool {
        matches!(
            res.map_err(|e| e.downcast::<TabularError>()),
            Err(Ok(TabularError::Config(_)))
        )
    }

    #[test]
    fn test_default_is_valid() {
        assert!(TrainerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_alpha_range() {
        assert!(is_config_error(TrainerConfig::default().alpha(0.0).validate()));
        assert!(is_config_error(TrainerConfig::default().alpha(1.5).validate()));
        assert!(TrainerConfig::default().alpha(1.0).validate().is_ok());
    }

    #[test]
    fn test_gamma_range() {
        assert!(is_config_error(TrainerConfig::default().gamma(-0.1).validate()));
        assert!(TrainerConfig::default().gamma(0.0).validate().is_ok());
        assert!(TrainerConfig::default().gamma(1.0).validate().is_ok());
    }

    #[test]
    fn test_lambda_only_for_td_lambda() {
        let config = TrainerConfig::default().algorithm(Algorithm::TdLambda);
        assert!(is_config_error(config.clone().validate()));
        assert!(config.clone().lambda(0.5).validate().is_ok());
        assert!(is_config_error(config.lambda(1.5).validate()));

        let config = TrainerConfig::default()
            .algorithm(Algorithm::Td0)
            .lambda(0.5);
        assert!(is_config_error(config.validate()));
    }

    #[test]
    fn test_counts_must_be_positive() {
        assert!(is_config_error(TrainerConfig::default().n_episodes(0).validate()));
        assert!(is_config_error(
            TrainerConfig::default().max_steps_per_episode(0).validate()
        ));
        assert!(is_config_error(TrainerConfig::default().reward_window(0).validate()));
    }

    #[test]
    fn test_retries_beyond_consecutive_limit_are_rejected() {
        let config = TrainerConfig::default().fault_policy(FaultPolicy::retry(5, 3));
        assert!(is_config_error(config.validate()));
        let config = TrainerConfig::default().fault_policy(FaultPolicy::retry(2, 3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explorer_parameters() {
        let config = TrainerConfig::default().explorer(ExplorationStrategy::EpsilonGreedy(
            EpsilonGreedy::new(1.5),
        ));
        assert!(is_config_error(config.validate()));
    }

    #[test]
    fn test_bandit_strategy_requires_sample_average() {
        let thompson = ExplorationStrategy::Thompson(Thompson::default());
        let config = TrainerConfig::default().explorer(thompson.clone());
        assert!(is_config_error(config.validate()));

        let config = TrainerConfig::default()
            .algorithm(Algorithm::SampleAverage)
            .explorer(thompson);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .algorithm(Algorithm::TdLambda)
            .lambda(0.8)
            .alpha(0.05)
            .explorer(ExplorationStrategy::EpsilonGreedy(
                EpsilonGreedy::with_schedule(EpsilonSchedule::Linear {
                    start: 1.0,
                    end: 0.05,
                    final_step: 500,
                }),
            ))
            .n_episodes(2000)
            .seed(7);

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_partial_yaml_uses_defaults() -> Result<()> {
        let config: TrainerConfig = serde_yaml::from_str("algorithm: MonteCarlo\nn_episodes: 10\n")?;
        assert_eq!(config.algorithm, Algorithm::MonteCarlo);
        assert_eq!(config.n_episodes, 10);
        assert_eq!(config.reward_window, 100);
        Ok(())
    }
}
