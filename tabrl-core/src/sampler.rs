//! Trajectory sampling.
//!
//! [`Sampler`] drives one episode at a time, from [`Env::reset`] to a terminal
//! state or to the step cap, and records the transitions into an
//! [`EpisodeTrace`].
//!
//! # Episode ends
//!
//! * The transition reaching a terminal state ends the episode as
//!   [`EpisodeEnd::Terminated`].
//! * A step flagged as truncated by the environment, or the `max_steps`-th
//!   step, ends the episode as [`EpisodeEnd::Truncated`].
//!
//! If the environment fails in the middle of an episode, the partial trace is
//! dropped and the error is returned to the caller.
use crate::{Agent, Env, EpisodeEnd, EpisodeTrace, Policy, Transition};
use anyhow::{anyhow, Result};

/// Runs episodes on an environment.
///
/// # Type Parameters
///
/// * `E` - The environment type
pub struct Sampler<E: Env> {
    /// The environment being sampled from
    env: E,

    /// Step cap for an episode
    max_steps: usize,
}

impl<E: Env> Sampler<E> {
    /// Creates a new sampler with the given environment and step cap.
    pub fn new(env: E, max_steps: usize) -> Self {
        Self { env, max_steps }
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The step cap of an episode.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Runs an episode with a policy, without learning.
    pub fn run_episode<P: Policy>(&mut self, policy: &mut P) -> Result<EpisodeTrace> {
        self.drive(policy, |_, _| Ok(()))
    }

    /// Runs an episode with an agent.
    ///
    /// The agent observes every transition right after the environment step
    /// and the whole trace when the episode is over.
    pub fn run_training_episode<A: Agent>(&mut self, agent: &mut A) -> Result<EpisodeTrace> {
        agent.begin_episode();
        let trace = self.drive(agent, |agent, t| agent.observe(t))?;
        agent.end_episode(&trace)?;
        Ok(trace)
    }

    /// Runs `n_episodes` with a policy and returns the total reward of each.
    pub fn evaluate<P: Policy>(&mut self, policy: &mut P, n_episodes: usize) -> Result<Vec<f64>> {
        (0..n_episodes)
            .map(|_| Ok(self.run_episode(policy)?.total_reward()))
            .collect()
    }

    fn drive<P, F>(&mut self, policy: &mut P, mut hook: F) -> Result<EpisodeTrace>
    where
        P: Policy,
        F: FnMut(&mut P, &Transition) -> Result<()>,
    {
        let n_states = self.env.n_states();
        let mut state = check_state(self.env.reset()?, n_states)?;
        let mut transitions = Vec::new();

        loop {
            let act = policy.sample(state);
            debug_assert!(act < self.env.n_actions());
            let step = self.env.step(act)?;
            let next_state = check_state(step.obs, n_states)?;
            let transition =
                Transition::new(state, act, step.reward, next_state, step.is_terminated);
            hook(policy, &transition)?;
            transitions.push(transition);

            if step.is_terminated {
                return Ok(EpisodeTrace::new(transitions, EpisodeEnd::Terminated));
            }
            if step.is_truncated || transitions.len() >= self.max_steps {
                return Ok(EpisodeTrace::new(transitions, EpisodeEnd::Truncated));
            }
            state = next_state;
        }
    }
}

fn check_state(state: usize, n_states: usize) -> Result<usize> {
    if state < n_states {
        Ok(state)
    } else {
        Err(anyhow!(
            "Environment returned state {} out of 0..{}",
            state,
            n_states
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{ScriptedEnv, ScriptedEnvConfig};

    fn chain_script() -> ScriptedEnvConfig {
        ScriptedEnvConfig::new(4, 1, 0)
            .step(1, 0.0, false)
            .step(2, 0.0, false)
            .step(3, 1.0, true)
    }

    #[test]
    fn test_run_episode_until_terminal() -> Result<()> {
        let env = ScriptedEnv::build(&chain_script(), 0)?;
        let mut sampler = Sampler::new(env, 100);
        let mut policy = crate::UniformPolicy::new(1, 0);
        let trace = sampler.run_episode(&mut policy)?;

        assert_eq!(trace.end(), EpisodeEnd::Terminated);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.transitions()[0], Transition::new(0, 0, 0.0, 1, false));
        assert_eq!(trace.transitions()[2], Transition::new(2, 0, 1.0, 3, true));
        assert_eq!(trace.total_reward(), 1.0);
        Ok(())
    }

    #[test]
    fn test_step_cap_truncates() -> Result<()> {
        let env = ScriptedEnv::build(&chain_script(), 0)?;
        let mut sampler = Sampler::new(env, 2);
        let mut policy = crate::UniformPolicy::new(1, 0);
        let trace = sampler.run_episode(&mut policy)?;

        assert!(trace.is_truncated());
        assert_eq!(trace.len(), 2);
        assert!(!trace.transitions()[1].is_terminated);
        Ok(())
    }

    #[test]
    fn test_env_truncation_flag() -> Result<()> {
        let config = ScriptedEnvConfig::new(3, 1, 0)
            .step(1, 0.5, false)
            .truncated_step(2, 0.5);
        let mut sampler = Sampler::new(ScriptedEnv::build(&config, 0)?, 100);
        let trace = sampler.run_episode(&mut crate::UniformPolicy::new(1, 0))?;
        assert_eq!(trace.end(), EpisodeEnd::Truncated);
        assert_eq!(trace.len(), 2);
        Ok(())
    }

    #[test]
    fn test_env_failure_is_propagated() -> Result<()> {
        let config = chain_script().fail_at_step(1);
        let mut sampler = Sampler::new(ScriptedEnv::build(&config, 0)?, 100);
        let res = sampler.run_episode(&mut crate::UniformPolicy::new(1, 0));
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn test_out_of_range_state_is_rejected() -> Result<()> {
        let config = ScriptedEnvConfig::new(2, 1, 0).step(5, 0.0, true);
        let mut sampler = Sampler::new(ScriptedEnv::build(&config, 0)?, 100);
        let res = sampler.run_episode(&mut crate::UniformPolicy::new(1, 0));
        assert!(res.is_err());
        Ok(())
    }
}
