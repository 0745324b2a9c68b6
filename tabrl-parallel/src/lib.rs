#![warn(missing_docs)]
//! Independent training runs on worker threads.
//!
//! Each run builds its own environment and agent inside a worker, so runs
//! never share tables. Results are returned in the order of the
//! configurations.
//!
//! ```no_run
//! use tabrl_core::{dummy::ScriptedEnv, TrainerConfig};
//! use tabrl_parallel::{mean_curve, run_many, seed_sweep};
//! # fn main() -> anyhow::Result<()> {
//! # let env_config = tabrl_core::dummy::ScriptedEnvConfig::new(2, 1, 0).step(1, 1.0, true);
//! let configs = seed_sweep(&TrainerConfig::default(), 16);
//! let results = run_many::<ScriptedEnv>(configs, &env_config, 4)?
//!     .into_iter()
//!     .collect::<anyhow::Result<Vec<_>>>()?;
//! let curve = mean_curve(&results);
//! # Ok(())
//! # }
//! ```
mod aggregate;
mod runner;
pub use aggregate::{mean_curve, mean_final_average};
pub use runner::{run_many, run_many_with_stop, run_one, seed_sweep};
