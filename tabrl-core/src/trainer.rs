//! Train tabular and bandit agents.
mod config;
mod fault;
mod result;
use crate::{
    bandit::{BanditAgent, BanditStrategy},
    error::TabularError,
    record::{
        AggregateRecorder, Record,
        RecordValue::{self, Scalar},
    },
    Agent, Algorithm, Env, EpisodeTrace, Explorer, Policy, Sampler, TabularAgent,
    TabularAgentConfig, Transition,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use fault::FaultAction;
pub use fault::{FaultPolicy, OnEnvError};
use log::{debug, info, warn};
pub use result::TrainingResult;
use std::sync::{Arc, Mutex};

/// State of the training loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerState {
    /// Built, no episode run yet.
    Init,

    /// Sampling an episode; per-step updates happen here.
    RunEpisode,

    /// Episode-level bookkeeping after a completed episode.
    Update,

    /// The run is over, finished, cancelled or aborted.
    Done,
}

/// The learning agent driven by [`Trainer`].
pub enum Learner {
    /// Agent of [`Algorithm::MonteCarlo`], [`Algorithm::Td0`],
    /// [`Algorithm::TdLambda`] and [`Algorithm::QLearning`].
    Tabular(TabularAgent),

    /// Agent of [`Algorithm::SampleAverage`].
    Bandit(BanditAgent),
}

impl Learner {
    /// Builds the agent of a configuration for an environment of the given size.
    pub fn build(config: &TrainerConfig, n_states: usize, n_actions: usize) -> Result<Self> {
        match config.algorithm {
            Algorithm::SampleAverage => {
                if n_states != 1 {
                    return Err(TabularError::config(format!(
                        "SampleAverage requires a single-state bandit, the environment has {} states",
                        n_states
                    )));
                }
                let strategy = BanditStrategy::from_strategy(&config.explorer)?;
                let agent =
                    BanditAgent::new(n_actions, strategy, config.init_value, config.agent_seed())?;
                Ok(Self::Bandit(agent))
            }
            algorithm => {
                let explorer = Explorer::from_strategy(&config.explorer, n_states, n_actions)
                    .ok_or_else(|| {
                        TabularError::config(format!(
                            "{} is defined only for single-state bandits",
                            config.explorer.name()
                        ))
                    })?;
                let agent_config = TabularAgentConfig {
                    algorithm,
                    alpha: config.alpha,
                    gamma: config.gamma,
                    lambda: config.lambda.unwrap_or(0.0),
                    init_value: config.init_value,
                    truncation: config.truncation,
                    seed: config.agent_seed(),
                };
                let agent = TabularAgent::new(&agent_config, explorer, n_states, n_actions)?;
                Ok(Self::Tabular(agent))
            }
        }
    }

    /// The current exploration rate, if the strategy has one.
    pub fn epsilon(&self) -> Option<f64> {
        match self {
            Self::Tabular(agent) => agent.explorer().epsilon(),
            Self::Bandit(agent) => agent.epsilon(),
        }
    }

    /// The number of numerical warnings raised so far.
    pub fn numerical_warnings(&self) -> usize {
        match self {
            Self::Tabular(agent) => agent.numerical_warnings(),
            Self::Bandit(agent) => agent.numerical_warnings(),
        }
    }
}

impl Policy for Learner {
    fn sample(&mut self, state: usize) -> usize {
        match self {
            Self::Tabular(agent) => agent.sample(state),
            Self::Bandit(agent) => agent.sample(state),
        }
    }
}

impl Agent for Learner {
    fn begin_episode(&mut self) {
        match self {
            Self::Tabular(agent) => agent.begin_episode(),
            Self::Bandit(agent) => agent.begin_episode(),
        }
    }

    fn observe(&mut self, transition: &Transition) -> Result<()> {
        match self {
            Self::Tabular(agent) => agent.observe(transition),
            Self::Bandit(agent) => agent.observe(transition),
        }
    }

    fn end_episode(&mut self, trace: &EpisodeTrace) -> Result<()> {
        match self {
            Self::Tabular(agent) => agent.end_episode(trace),
            Self::Bandit(agent) => agent.end_episode(trace),
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop of a single run.
///
/// # Training loop
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Init
///     Init --> RunEpisode
///     RunEpisode --> Update: episode completed
///     RunEpisode --> RunEpisode: failure, skipped or retried
///     Update --> RunEpisode
///     RunEpisode --> Done: n_episodes reached, stop flag or abort
///     Done --> [*]
/// ```
///
/// 0. [`Trainer::build`] validates the configuration against the environment
///    and builds the [`Learner`]. Nothing is run if this fails.
/// 1. At the top of each episode the stop flag, if any, is checked. A set
///    flag ends the call with `cancelled = true`; the estimates stay valid and
///    [`Trainer::train`] can be called again to continue.
/// 2. An episode is sampled with [`Sampler::run_training_episode`]. TD rules
///    update the tables after each step, Monte Carlo after the episode.
/// 3. The episode return, its length and the moving average of returns are
///    stored into the recorder, flushed every `record_interval` episodes.
///
/// If the environment fails, the partial episode is dropped and
/// `failed_episodes` is incremented. The [`FaultPolicy`] then decides whether
/// the episode is rerun, skipped, or the run is aborted with
/// [`TabularError::Environment`]. Other errors of the agent end the run as
/// they are.
pub struct Trainer<E: Env> {
    config: TrainerConfig,
    sampler: Sampler<E>,
    learner: Learner,
    stop: Option<Arc<Mutex<bool>>>,
    state: TrainerState,

    /// Index of the next episode; skipped episodes are counted.
    episode: usize,

    episode_returns: Vec<f64>,
    episode_lengths: Vec<usize>,
    failed_episodes: usize,
    truncated_episodes: usize,
    cancelled: bool,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: &E::Config) -> Result<Self> {
        config.validate()?;
        let env = E::build(env_config, config.seed)?;
        let (n_states, n_actions) = (env.n_states(), env.n_actions());
        if n_actions == 0 {
            return Err(TabularError::config("The action set is empty"));
        }
        if n_states == 0 {
            return Err(TabularError::config("The state set is empty"));
        }
        let learner = Learner::build(&config, n_states, n_actions)?;
        let sampler = Sampler::new(env, config.max_steps_per_episode);

        Ok(Self {
            config,
            sampler,
            learner,
            stop: None,
            state: TrainerState::Init,
            episode: 0,
            episode_returns: vec![],
            episode_lengths: vec![],
            failed_episodes: 0,
            truncated_episodes: 0,
            cancelled: false,
        })
    }

    /// Sets a flag stopping the run at the top of the next episode.
    pub fn with_stop_flag(mut self, stop: Arc<Mutex<bool>>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// The learning agent.
    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    /// The sampler, owning the environment.
    pub fn sampler(&self) -> &Sampler<E> {
        &self.sampler
    }

    /// The state of the training loop.
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Index of the next episode.
    pub fn episode(&self) -> usize {
        self.episode
    }

    fn transit(&mut self, next: TrainerState) {
        if self.state != next {
            debug!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn stop_requested(&self) -> bool {
        match &self.stop {
            // A poisoned flag stops the run
            Some(flag) => flag.lock().map(|v| *v).unwrap_or(true),
            None => false,
        }
    }

    fn moving_average(&self) -> f64 {
        let n = self.episode_returns.len();
        let window = &self.episode_returns[n.saturating_sub(self.config.reward_window)..];
        if window.is_empty() {
            0.0
        } else {
            window.iter().sum::<f64>() / window.len() as f64
        }
    }

    fn record_episode(&mut self, trace: &EpisodeTrace, recorder: &mut dyn AggregateRecorder) {
        let ret = trace.total_reward();
        self.episode_returns.push(ret);
        self.episode_lengths.push(trace.len());
        if trace.is_truncated() {
            self.truncated_episodes += 1;
        }

        let mut record = Record::from_slice(&[
            ("episode", Scalar(self.episode as f32)),
            ("episode_return", Scalar(ret as f32)),
            ("episode_length", Scalar(trace.len() as f32)),
            ("moving_average", Scalar(self.moving_average() as f32)),
            ("datetime", RecordValue::DateTime(Local::now())),
        ]);
        if let Some(eps) = self.learner.epsilon() {
            record.insert("epsilon", Scalar(eps as f32));
        }
        recorder.store(record);

        if (self.episode + 1) % self.config.record_interval == 0 {
            recorder.flush((self.episode + 1) as i64);
        }
    }

    fn finish(&mut self, recorder: &mut dyn AggregateRecorder) {
        recorder.flush(self.episode as i64);
        self.transit(TrainerState::Done);
    }

    /// Runs the remaining episodes of the configuration.
    ///
    /// Returns the output of the run when it finished or was cancelled.
    /// On an abort the error is returned and [`Trainer::result`] still gives
    /// the partial output.
    pub fn train(&mut self, recorder: &mut dyn AggregateRecorder) -> Result<TrainingResult> {
        let n_episodes = self.config.n_episodes;
        let mut consecutive_failures = 0;
        let mut retries = 0;
        self.cancelled = false;
        info!(
            "Start training {:?} from episode {} of {}",
            self.config.algorithm, self.episode, n_episodes
        );

        while self.episode < n_episodes {
            if self.stop_requested() {
                info!("Stopped at episode {}", self.episode);
                self.cancelled = true;
                break;
            }
            self.transit(TrainerState::RunEpisode);

            match self.sampler.run_training_episode(&mut self.learner) {
                Ok(trace) => {
                    self.transit(TrainerState::Update);
                    consecutive_failures = 0;
                    retries = 0;
                    self.record_episode(&trace, recorder);
                    self.episode += 1;
                }
                Err(e) if e.is::<TabularError>() => {
                    self.finish(recorder);
                    return Err(e);
                }
                Err(e) => {
                    self.failed_episodes += 1;
                    consecutive_failures += 1;
                    match self
                        .config
                        .fault_policy
                        .decide(consecutive_failures, retries)
                    {
                        FaultAction::Abort => {
                            warn!("Abort at episode {}: {}", self.episode, e);
                            let episode = self.episode;
                            self.finish(recorder);
                            return Err(TabularError::Environment { episode, cause: e }.into());
                        }
                        FaultAction::Retry => {
                            retries += 1;
                            warn!("Retry episode {} ({}): {}", self.episode, retries, e);
                        }
                        FaultAction::Skip => {
                            retries = 0;
                            warn!("Skip episode {}: {}", self.episode, e);
                            self.episode += 1;
                        }
                    }
                }
            }
        }

        self.finish(recorder);
        info!(
            "Finished at episode {}, moving average of returns {:.4}",
            self.episode,
            self.moving_average()
        );
        Ok(self.result())
    }

    /// The output surface of the run so far.
    pub fn result(&self) -> TrainingResult {
        let (state_values, action_values, n_actions, arms) = match &self.learner {
            Learner::Tabular(agent) => (
                agent.state_values().values().to_vec(),
                agent.action_values().values().to_vec(),
                agent.action_values().n_actions(),
                None,
            ),
            Learner::Bandit(agent) => {
                let means = agent.stats().means();
                let best = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let n_arms = means.len();
                (vec![best], means, n_arms, Some(agent.stats().summary()))
            }
        };

        TrainingResult {
            state_values,
            action_values,
            n_actions,
            moving_average: crate::util::moving_average(
                &self.episode_returns,
                self.config.reward_window,
            ),
            episode_returns: self.episode_returns.clone(),
            episode_lengths: self.episode_lengths.clone(),
            failed_episodes: self.failed_episodes,
            truncated_episodes: self.truncated_episodes,
            numerical_warnings: self.learner.numerical_warnings(),
            arms,
            cancelled: self.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{ScriptedEnv, ScriptedEnvConfig},
        record::{BufferedRecorder, NullRecorder},
        ExplorationStrategy, TruncationPolicy,
    };

    fn chain() -> ScriptedEnvConfig {
        ScriptedEnvConfig::new(4, 1, 0)
            .step(1, 0.0, false)
            .step(2, 0.0, false)
            .step(3, 1.0, true)
    }

    fn mc_config(n_episodes: usize) -> TrainerConfig {
        TrainerConfig::default()
            .algorithm(Algorithm::MonteCarlo)
            .gamma(1.0)
            .explorer(ExplorationStrategy::Greedy)
            .n_episodes(n_episodes)
    }

    fn environment_error(e: anyhow::Error) -> Option<usize> {
        match e.downcast::<TabularError>() {
            Ok(TabularError::Environment { episode, .. }) => Some(episode),
            _ => None,
        }
    }

    #[test]
    fn test_monte_carlo_on_chain() -> Result<()> {
        let mut trainer = Trainer::<ScriptedEnv>::build(mc_config(10), &chain())?;
        let result = trainer.train(&mut NullRecorder::new())?;

        assert_eq!(&result.state_values[..3], &[1.0, 1.0, 1.0]);
        assert_eq!(result.state_values[3], 0.0);
        assert_eq!(result.episode_returns, vec![1.0; 10]);
        assert_eq!(result.episode_lengths, vec![3; 10]);
        assert_eq!(result.failed_episodes, 0);
        assert!(!result.cancelled);
        assert_eq!(trainer.state(), TrainerState::Done);
        Ok(())
    }

    #[test]
    fn test_records_every_episode() -> Result<()> {
        let config = mc_config(6).record_interval(2);
        let mut trainer = Trainer::<ScriptedEnv>::build(config, &chain())?;
        let mut recorder = BufferedRecorder::new();
        trainer.train(&mut recorder)?;

        assert_eq!(recorder.len(), 6);
        // Three periodic flushes and the final one
        assert_eq!(recorder.n_flushes(), 4);
        let last = recorder.iter().last().unwrap();
        assert_eq!(last.get_scalar("episode")?, 5.0);
        assert_eq!(last.get_scalar("episode_return")?, 1.0);
        assert_eq!(last.get_scalar("episode_length")?, 3.0);
        assert_eq!(last.get_scalar("moving_average")?, 1.0);
        let first = recorder.iter().next().unwrap().get_datetime("datetime")?;
        assert!(last.get_datetime("datetime")? >= first);
        Ok(())
    }

    #[test]
    fn test_skip_failed_episode() -> Result<()> {
        let env_config = chain().fail_in_episode(1, 1);
        let mut trainer = Trainer::<ScriptedEnv>::build(mc_config(5), &env_config)?;
        let result = trainer.train(&mut NullRecorder::new())?;

        assert_eq!(result.failed_episodes, 1);
        assert_eq!(result.episode_returns.len(), 4);
        assert_eq!(&result.state_values[..3], &[1.0, 1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_abort_after_consecutive_failures() -> Result<()> {
        let env_config = chain().fail_at_step(0);
        let mut trainer = Trainer::<ScriptedEnv>::build(mc_config(10), &env_config)?;
        let res = trainer.train(&mut NullRecorder::new());

        assert_eq!(environment_error(res.unwrap_err()), Some(2));
        let result = trainer.result();
        assert_eq!(result.failed_episodes, 3);
        assert!(result.episode_returns.is_empty());
        Ok(())
    }

    #[test]
    fn test_abort_policy() -> Result<()> {
        let env_config = chain().fail_in_episode(2, 0);
        let config = mc_config(10).fault_policy(FaultPolicy::abort());
        let mut trainer = Trainer::<ScriptedEnv>::build(config, &env_config)?;
        let res = trainer.train(&mut NullRecorder::new());

        assert_eq!(environment_error(res.unwrap_err()), Some(2));
        assert_eq!(trainer.result().episode_returns.len(), 2);
        assert_eq!(trainer.result().failed_episodes, 1);
        Ok(())
    }

    #[test]
    fn test_retry_failed_episode() -> Result<()> {
        // The rerun is the second reset of the environment and does not fail
        let env_config = chain().fail_in_episode(0, 1);
        let config = mc_config(3).fault_policy(FaultPolicy::retry(1, 3));
        let mut trainer = Trainer::<ScriptedEnv>::build(config, &env_config)?;
        let result = trainer.train(&mut NullRecorder::new())?;

        assert_eq!(result.failed_episodes, 1);
        assert_eq!(result.episode_returns.len(), 3);
        Ok(())
    }

    #[test]
    fn test_cancel_and_resume() -> Result<()> {
        let stop = Arc::new(Mutex::new(true));
        let mut trainer =
            Trainer::<ScriptedEnv>::build(mc_config(4), &chain())?.with_stop_flag(stop.clone());

        let result = trainer.train(&mut NullRecorder::new())?;
        assert!(result.cancelled);
        assert!(result.episode_returns.is_empty());

        *stop.lock().unwrap() = false;
        let result = trainer.train(&mut NullRecorder::new())?;
        assert!(!result.cancelled);
        assert_eq!(result.episode_returns.len(), 4);
        assert_eq!(&result.state_values[..3], &[1.0, 1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_rejected_truncation_is_fatal() -> Result<()> {
        let config = mc_config(3)
            .max_steps_per_episode(2)
            .truncation(TruncationPolicy::Reject);
        let mut trainer = Trainer::<ScriptedEnv>::build(config, &chain())?;
        let res = trainer.train(&mut NullRecorder::new());

        assert!(matches!(
            res.unwrap_err().downcast::<TabularError>(),
            Ok(TabularError::TruncatedReturn(2))
        ));
        assert_eq!(trainer.result().failed_episodes, 0);
        Ok(())
    }

    #[test]
    fn test_discarded_truncation_counts() -> Result<()> {
        let config = mc_config(3).max_steps_per_episode(2);
        let mut trainer = Trainer::<ScriptedEnv>::build(config, &chain())?;
        let result = trainer.train(&mut NullRecorder::new())?;

        assert_eq!(result.truncated_episodes, 3);
        assert_eq!(result.state_values, vec![0.0; 4]);
        assert_eq!(result.episode_returns, vec![0.0; 3]);
        Ok(())
    }

    #[test]
    fn test_sample_average_requires_single_state() {
        let config = TrainerConfig::default().algorithm(Algorithm::SampleAverage);
        let res = Trainer::<ScriptedEnv>::build(config, &chain());
        assert!(matches!(
            res.err().map(|e| e.downcast::<TabularError>()),
            Some(Ok(TabularError::Config(_)))
        ));
    }

    #[test]
    fn test_empty_action_set() {
        let env_config = ScriptedEnvConfig::new(2, 0, 0).step(1, 0.0, true);
        let res = Trainer::<ScriptedEnv>::build(mc_config(1), &env_config);
        assert!(matches!(
            res.err().map(|e| e.downcast::<TabularError>()),
            Some(Ok(TabularError::Config(_)))
        ));
    }
}
