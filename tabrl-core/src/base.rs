//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Policy, UniformPolicy};
pub use step::{EpisodeEnd, EpisodeTrace, Step, Transition};
