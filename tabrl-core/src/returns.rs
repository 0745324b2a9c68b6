//! Discounted returns of episode traces.
use crate::{error::TabularError, EpisodeTrace};
use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

/// How [`compute_returns`] handles a truncated trace.
///
/// The reward-to-go at a truncation point misses the tail of the episode,
/// so it only bounds the true return from below.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Returns `None`; Monte Carlo updates skip the episode.
    Discard,

    /// Returns the lower-bound returns. A warning is logged when `gamma == 1`.
    Accept,

    /// Fails with [`TabularError::TruncatedReturn`].
    Reject,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self::Discard
    }
}

/// Computes `G[t] = r[t] + gamma * G[t+1]` with `G[T] = 0`, in one backward pass.
pub fn discounted_returns(rewards: &[f64], gamma: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut g = 0.0;
    for (t, r) in rewards.iter().enumerate().rev() {
        g = r + gamma * g;
        returns[t] = g;
    }
    returns
}

/// Undiscounted sum of the rewards from each position onward.
///
/// Rewards before position `t` are excluded from the `t`-th entry, since an
/// action at `t` cannot influence them.
pub fn reward_to_go(rewards: &[f64]) -> Vec<f64> {
    discounted_returns(rewards, 1.0)
}

/// Computes the returns of an episode trace, one per transition.
pub fn compute_returns(
    trace: &EpisodeTrace,
    gamma: f64,
    policy: TruncationPolicy,
) -> Result<Option<Vec<f64>>> {
    if !trace.is_truncated() {
        return Ok(Some(discounted_returns(&trace.rewards(), gamma)));
    }

    match policy {
        TruncationPolicy::Discard => Ok(None),
        TruncationPolicy::Accept => {
            if gamma == 1.0 {
                warn!(
                    "Undiscounted returns of a truncated episode of length {} undercount the tail",
                    trace.len()
                );
            }
            Ok(Some(discounted_returns(&trace.rewards(), gamma)))
        }
        TruncationPolicy::Reject => Err(TabularError::TruncatedReturn(trace.len()).into()),
    }
}
