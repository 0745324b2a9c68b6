//! Environment step and episode traces.
use serde::{Deserialize, Serialize};

/// Represents an action, next state and reward tuple `(a_t, s_t+1, r_t)`.
///
/// An environment emits a [`Step`] object at every interaction step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Action.
    pub act: usize,

    /// The state after the action.
    pub obs: usize,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if the episode reached a terminal state.
    pub is_terminated: bool,

    /// Flag denoting if the environment cut the episode, like a time limit.
    pub is_truncated: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: usize, act: usize, reward: f64, is_terminated: bool, is_truncated: bool) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A transition `(s_t, a_t, r_t, s_t+1)` recorded by the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// State in which the action was taken.
    pub state: usize,

    /// Action.
    pub act: usize,

    /// Reward.
    pub reward: f64,

    /// Successor state.
    pub next_state: usize,

    /// `true` if `next_state` is terminal. Bootstrapping from it is not allowed.
    pub is_terminated: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(state: usize, act: usize, reward: f64, next_state: usize, is_terminated: bool) -> Self {
        Self {
            state,
            act,
            reward,
            next_state,
            is_terminated,
        }
    }
}

/// How an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// The last transition reached a terminal state.
    Terminated,

    /// The episode was cut by the step cap or the environment.
    ///
    /// The reward-to-go at the cut is only a lower bound of the true return.
    Truncated,
}

/// Ordered, finite sequence of transitions of one episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeTrace {
    transitions: Vec<Transition>,
    end: EpisodeEnd,
}

impl EpisodeTrace {
    /// Constructs a trace.
    pub fn new(transitions: Vec<Transition>, end: EpisodeEnd) -> Self {
        Self { transitions, end }
    }

    /// Transitions in the order they happened.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// How the episode ended.
    pub fn end(&self) -> EpisodeEnd {
        self.end
    }

    /// Returns `true` if the episode did not reach a terminal state.
    pub fn is_truncated(&self) -> bool {
        self.end == EpisodeEnd::Truncated
    }

    /// The number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if no step was taken.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Rewards in the order they were received.
    pub fn rewards(&self) -> Vec<f64> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    /// Undiscounted sum of rewards.
    pub fn total_reward(&self) -> f64 {
        self.transitions.iter().map(|t| t.reward).sum()
    }
}
