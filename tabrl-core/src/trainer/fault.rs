//! Handling of environment failures.
use serde::{Deserialize, Serialize};

/// Reaction of the trainer to an episode aborted by an environment error.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum OnEnvError {
    /// Abort the run at the first failure.
    Abort,

    /// Skip the tainted episode and go on with the next one.
    Skip,

    /// Rerun the tainted episode up to `max_retries` times, then skip it.
    Retry,
}

/// Fault policy of [`Trainer`](super::Trainer).
///
/// Whatever the reaction, a run is aborted once `max_consecutive_failures`
/// episodes in a row have failed. Each failed attempt counts, retries
/// included.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FaultPolicy {
    /// Reaction to a failure.
    pub on_error: OnEnvError,

    /// The number of reruns of a failed episode with [`OnEnvError::Retry`].
    pub max_retries: usize,

    /// The number of consecutive failures aborting the run.
    pub max_consecutive_failures: usize,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self {
            on_error: OnEnvError::Skip,
            max_retries: 1,
            max_consecutive_failures: 3,
        }
    }
}

/// What to do after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FaultAction {
    Abort,
    Skip,
    Retry,
}

impl FaultPolicy {
    /// Aborts at the first failure.
    pub fn abort() -> Self {
        Self {
            on_error: OnEnvError::Abort,
            ..Self::default()
        }
    }

    /// Skips failed episodes, aborting after `max_consecutive_failures` in a row.
    pub fn skip(max_consecutive_failures: usize) -> Self {
        Self {
            on_error: OnEnvError::Skip,
            max_consecutive_failures,
            ..Self::default()
        }
    }

    /// Reruns failed episodes up to `max_retries` times.
    pub fn retry(max_retries: usize, max_consecutive_failures: usize) -> Self {
        Self {
            on_error: OnEnvError::Retry,
            max_retries,
            max_consecutive_failures,
        }
    }

    /// Retries count toward `max_consecutive_failures`, so a retry policy
    /// must allow more consecutive failures than retries.
    pub(super) fn check(&self) -> Result<(), String> {
        if self.max_consecutive_failures == 0 {
            Err("max_consecutive_failures must be positive".to_string())
        } else if self.on_error == OnEnvError::Retry
            && self.max_retries >= self.max_consecutive_failures
        {
            Err(format!(
                "max_retries ({}) must be less than max_consecutive_failures ({})",
                self.max_retries, self.max_consecutive_failures
            ))
        } else {
            Ok(())
        }
    }

    /// Decides the reaction given the failures counted so far, this one included.
    pub(super) fn decide(&self, consecutive_failures: usize, retries: usize) -> FaultAction {
        if consecutive_failures >= self.max_consecutive_failures {
            return FaultAction::Abort;
        }
        match self.on_error {
            OnEnvError::Abort => FaultAction::Abort,
            OnEnvError::Skip => FaultAction::Skip,
            OnEnvError::Retry if retries < self.max_retries => FaultAction::Retry,
            OnEnvError::Retry => FaultAction::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_until_consecutive_limit() {
        let policy = FaultPolicy::default();
        assert_eq!(policy.decide(1, 0), FaultAction::Skip);
        assert_eq!(policy.decide(2, 0), FaultAction::Skip);
        assert_eq!(policy.decide(3, 0), FaultAction::Abort);
    }

    #[test]
    fn test_retry_then_skip() {
        let policy = FaultPolicy::retry(2, 10);
        assert_eq!(policy.decide(1, 0), FaultAction::Retry);
        assert_eq!(policy.decide(2, 1), FaultAction::Retry);
        assert_eq!(policy.decide(3, 2), FaultAction::Skip);
    }

    #[test]
    fn test_retries_must_stay_under_consecutive_limit() {
        assert!(FaultPolicy::retry(5, 3).check().is_err());
        assert!(FaultPolicy::retry(3, 3).check().is_err());
        assert!(FaultPolicy::retry(2, 3).check().is_ok());
        let skip = FaultPolicy {
            max_retries: 5,
            ..FaultPolicy::skip(3)
        };
        assert!(skip.check().is_ok());
    }

    #[test]
    fn test_abort() {
        assert_eq!(FaultPolicy::abort().decide(1, 0), FaultAction::Abort);
    }
}
