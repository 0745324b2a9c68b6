//! Agent.
use super::{EpisodeTrace, Policy, Transition};
use anyhow::Result;

/// Represents a trainable policy on an environment.
///
/// [`Sampler::run_training_episode`](crate::Sampler::run_training_episode)
/// calls the methods of this trait in the following order within an episode:
/// `begin_episode`, then `sample` and `observe` for every step, then
/// `end_episode` with the finished trace. `end_episode` is not called when the
/// environment fails in the middle of the episode.
pub trait Agent: Policy {
    /// Prepares per-episode state, like eligibility traces.
    fn begin_episode(&mut self);

    /// Processes a transition right after the environment step.
    fn observe(&mut self, transition: &Transition) -> Result<()>;

    /// Processes the whole trace of a finished episode.
    fn end_episode(&mut self, trace: &EpisodeTrace) -> Result<()>;
}
