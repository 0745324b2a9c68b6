#![warn(missing_docs)]
//! Toy environments for tabular reinforcement learning.
//!
//! Every environment implements [`tabrl_core::Env`] with dense state and
//! action indices, and its configuration is serde-serializable.
mod bandit;
mod chain;
mod grid_world;
mod random_walk;
pub use bandit::{BernoulliBanditConfig, BernoulliBanditEnv};
pub use chain::{ChainConfig, ChainEnv};
pub use grid_world::{GridAction, GridWorldConfig, GridWorldEnv};
pub use random_walk::{RandomWalkConfig, RandomWalkEnv};
