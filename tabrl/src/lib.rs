//! Tabular reinforcement learning in Rust.
//!
//! This crate collects the following crates:
//!
//! * [`tabrl_core`] provides the environment and agent traits, value tables,
//!   update rules (first-visit Monte Carlo, TD(0), TD(λ), Q-learning),
//!   explorers and the [`Trainer`](tabrl_core::Trainer).
//! * [`tabrl_toy_env`] has small environments with known solutions.
//! * [`tabrl_parallel`] runs independent trainers on worker threads.
//!
//! ```no_run
//! use tabrl::{
//!     core::{record::NullRecorder, Algorithm, ExplorationStrategy, Trainer, TrainerConfig},
//!     env::{ChainConfig, ChainEnv},
//! };
//! # fn main() -> anyhow::Result<()> {
//! let config = TrainerConfig::default()
//!     .algorithm(Algorithm::MonteCarlo)
//!     .gamma(1.0)
//!     .explorer(ExplorationStrategy::Greedy)
//!     .n_episodes(10);
//! let mut trainer = Trainer::<ChainEnv>::build(config, &ChainConfig::default())?;
//! let result = trainer.train(&mut NullRecorder::new())?;
//! assert_eq!(result.v(0), 1.0);
//! # Ok(())
//! # }
//! ```
pub use tabrl_core as core;
pub use tabrl_parallel as parallel;
pub use tabrl_toy_env as env;

pub mod util;
