//! This module is used for tests.
use crate::{Env, Step};
use anyhow::{bail, Result};

/// A scripted step of [`ScriptedEnv`].
#[derive(Clone, Debug)]
struct ScriptedStep {
    obs: usize,
    reward: f64,
    is_terminated: bool,
    is_truncated: bool,
}

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedEnvConfig {
    n_states: usize,
    n_actions: usize,
    init_state: usize,
    steps: Vec<ScriptedStep>,

    /// `(episode, step)`; `None` as the episode matches every episode.
    failures: Vec<(Option<usize>, usize)>,
}

impl ScriptedEnvConfig {
    /// Constructs an empty script.
    pub fn new(n_states: usize, n_actions: usize, init_state: usize) -> Self {
        Self {
            n_states,
            n_actions,
            init_state,
            steps: vec![],
            failures: vec![],
        }
    }

    /// Appends a step.
    pub fn step(mut self, obs: usize, reward: f64, is_terminated: bool) -> Self {
        self.steps.push(ScriptedStep {
            obs,
            reward,
            is_terminated,
            is_truncated: false,
        });
        self
    }

    /// Appends a step which the environment flags as truncated.
    pub fn truncated_step(mut self, obs: usize, reward: f64) -> Self {
        self.steps.push(ScriptedStep {
            obs,
            reward,
            is_terminated: false,
            is_truncated: true,
        });
        self
    }

    /// Fails the `step`-th step of every episode.
    pub fn fail_at_step(mut self, step: usize) -> Self {
        self.failures.push((None, step));
        self
    }

    /// Fails the `step`-th step of the `episode`-th episode.
    pub fn fail_in_episode(mut self, episode: usize, step: usize) -> Self {
        self.failures.push((Some(episode), step));
        self
    }
}

/// Replays the same steps in every episode, whatever the actions are.
///
/// After the script runs out, the last step is repeated.
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    episode: Option<usize>,
    t: usize,
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        if config.steps.is_empty() {
            bail!("Empty script");
        }
        Ok(Self {
            config: config.clone(),
            episode: None,
            t: 0,
        })
    }

    fn n_states(&self) -> usize {
        self.config.n_states
    }

    fn n_actions(&self) -> usize {
        self.config.n_actions
    }

    fn reset(&mut self) -> Result<usize> {
        self.episode = Some(self.episode.map_or(0, |e| e + 1));
        self.t = 0;
        Ok(self.config.init_state)
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        let episode = self.episode.unwrap_or(0);
        let fails = self
            .config
            .failures
            .iter()
            .any(|&(e, t)| t == self.t && e.map_or(true, |e| e == episode));
        if fails {
            bail!("Scripted failure at step {} of episode {}", self.t, episode);
        }

        let ix = self.t.min(self.config.steps.len() - 1);
        let s = &self.config.steps[ix];
        self.t += 1;
        Ok(Step::new(
            s.obs,
            act,
            s.reward,
            s.is_terminated,
            s.is_truncated,
        ))
    }
}
