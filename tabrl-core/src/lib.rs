#![warn(missing_docs)]
//! Core of tabular reinforcement learning.
//!
//! Environments are finite MDPs with dense state and action indices
//! ([`Env`]). A [`Sampler`] rolls out episodes; a [`TabularAgent`] or a
//! [`BanditAgent`](bandit::BanditAgent) updates value tables from them; and
//! a [`Trainer`] drives the whole run and produces a [`TrainingResult`].
pub mod bandit;
pub mod dummy;
pub mod error;
pub mod explorer;
pub mod record;
pub mod util;

mod base;
pub use base::{Agent, Env, EpisodeEnd, EpisodeTrace, Policy, Step, Transition, UniformPolicy};

mod sampler;
pub use sampler::Sampler;

mod returns;
pub use returns::{compute_returns, discounted_returns, reward_to_go, TruncationPolicy};

mod table;
pub use table::{ActionValueTable, ValueTable};

mod eligibility;
pub use eligibility::EligibilityTrace;

mod update;
pub use update::{
    first_visit_mc_q, first_visit_mc_v, ExpectedSarsa, ExpectedSarsaLambda, McUpdate, QLearning,
    Td0, TdLambda,
};

pub use explorer::{
    DecayClock, EpsilonGreedy, EpsilonSchedule, EpsilonSoft, ExplorationStrategy, Explorer,
    Softmax, Thompson, Ucb1,
};

mod tabular;
pub use tabular::{Algorithm, TabularAgent, TabularAgentConfig};

mod trainer;
pub use trainer::{
    FaultPolicy, Learner, OnEnvError, Trainer, TrainerConfig, TrainerState, TrainingResult,
};
