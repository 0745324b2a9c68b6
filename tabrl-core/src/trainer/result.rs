//! Output of a training run.
use crate::bandit::ArmSummary;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Output of [`Trainer::train`](super::Trainer::train).
///
/// `action_values` is the row-major `n_states × n_actions` table `Q`. For
/// bandit runs it is the single row of empirical arm means and
/// `state_values` holds the best of them.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TrainingResult {
    /// Final state values `V`.
    pub state_values: Vec<f64>,

    /// Final action values `Q`, row-major.
    pub action_values: Vec<f64>,

    /// The number of actions, the row length of `action_values`.
    pub n_actions: usize,

    /// Total reward of every completed episode, in order.
    pub episode_returns: Vec<f64>,

    /// Moving average of `episode_returns`.
    pub moving_average: Vec<f64>,

    /// Length of every completed episode.
    pub episode_lengths: Vec<usize>,

    /// The number of failed episode attempts.
    pub failed_episodes: usize,

    /// The number of completed episodes cut by truncation.
    pub truncated_episodes: usize,

    /// The number of numerical warnings raised while updating estimates.
    pub numerical_warnings: usize,

    /// Pull counts and empirical means of bandit arms.
    pub arms: Option<Vec<ArmSummary>>,

    /// `true` if the run was stopped before the last episode.
    pub cancelled: bool,
}

impl TrainingResult {
    /// The number of states.
    pub fn n_states(&self) -> usize {
        self.state_values.len()
    }

    /// `V[s]`.
    pub fn v(&self, s: usize) -> f64 {
        self.state_values[s]
    }

    /// `Q[s, a]`.
    pub fn q(&self, s: usize, a: usize) -> f64 {
        self.action_values[s * self.n_actions + a]
    }

    /// The row `Q[s, :]`.
    pub fn q_row(&self, s: usize) -> &[f64] {
        let start = s * self.n_actions;
        &self.action_values[start..start + self.n_actions]
    }

    /// Greedy action of every state, ties resolved to the lowest index.
    pub fn greedy_policy(&self) -> Vec<usize> {
        if self.n_actions == 0 {
            return vec![];
        }
        self.action_values
            .chunks(self.n_actions)
            .map(|row| {
                crate::util::maximizers(row)
                    .first()
                    .copied()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// The number of completed episodes.
    pub fn n_episodes(&self) -> usize {
        self.episode_returns.len()
    }

    /// The last value of the moving average of episode returns.
    pub fn final_moving_average(&self) -> Option<f64> {
        self.moving_average.last().copied()
    }

    /// Loads a result from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(rdr)?)
    }

    /// Saves the result as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_greedy_policy_and_rows() {
        let result = TrainingResult {
            state_values: vec![0.0, 0.0],
            action_values: vec![0.1, 0.5, 0.3, 0.3],
            n_actions: 2,
            ..TrainingResult::default()
        };
        assert_eq!(result.greedy_policy(), vec![1, 0]);
        assert_eq!(result.q(1, 0), 0.3);
        assert_eq!(result.q_row(0), &[0.1, 0.5]);
        assert_eq!(result.n_states(), 2);
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let result = TrainingResult {
            state_values: vec![1.0],
            action_values: vec![0.25, 0.75],
            n_actions: 2,
            episode_returns: vec![1.0, 0.0],
            moving_average: vec![1.0, 0.5],
            episode_lengths: vec![1, 1],
            arms: Some(vec![
                ArmSummary { pulls: 4, mean: 0.25 },
                ArmSummary { pulls: 4, mean: 0.75 },
            ]),
            ..TrainingResult::default()
        };
        let dir = TempDir::new("training_result")?;
        let path = dir.path().join("result.yaml");
        result.save(&path)?;
        assert_eq!(TrainingResult::load(&path)?, result);
        Ok(())
    }
}
