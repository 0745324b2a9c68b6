//! Environment.
use super::Step;
use anyhow::Result;

/// Represents an environment, a finite MDP with discrete states and actions.
///
/// States and actions are dense indices, `0..n_states()` and `0..n_actions()`.
/// Both sets are fixed once the environment is built.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// The number of states.
    fn n_states(&self) -> usize;

    /// The number of actions.
    fn n_actions(&self) -> usize;

    /// Resets the environment and returns the initial state.
    fn reset(&mut self) -> Result<usize>;

    /// Performes an environment step.
    ///
    /// The environment may block here, for example when it is backed by an
    /// external simulator.
    fn step(&mut self, act: usize) -> Result<Step>;
}
