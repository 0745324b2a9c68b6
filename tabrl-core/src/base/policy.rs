//! Policy.
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A policy on an environment.
///
/// Policy is a mapping from a state to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy {
    /// Sample an action given a state.
    fn sample(&mut self, state: usize) -> usize;
}

/// Chooses actions uniformly at random.
pub struct UniformPolicy {
    n_actions: usize,
    rng: StdRng,
}

impl UniformPolicy {
    /// Constructs the policy.
    pub fn new(n_actions: usize, seed: u64) -> Self {
        Self {
            n_actions,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for UniformPolicy {
    fn sample(&mut self, _state: usize) -> usize {
        self.rng.gen_range(0..self.n_actions)
    }
}
