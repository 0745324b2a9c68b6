//! Action selection from value estimates.
//!
//! [`ExplorationStrategy`] is the configured strategy. When a trainer is
//! built, tabular strategies become an [`Explorer`] driving a
//! [`TabularAgent`](crate::TabularAgent), and bandit strategies become a
//! [`BanditStrategy`](crate::bandit::BanditStrategy).
mod epsilon_greedy;
mod epsilon_soft;
mod schedule;
mod softmax;
mod thompson;
mod ucb;
use crate::util::{argmax_random, maximizers};
pub use epsilon_greedy::EpsilonGreedy;
pub use epsilon_soft::EpsilonSoft;
use rand::Rng;
pub use schedule::{DecayClock, EpsilonSchedule, ScheduleFn};
use serde::{Deserialize, Serialize};
pub use softmax::Softmax;
pub use thompson::Thompson;
pub use ucb::Ucb1;

/// Configured exploration strategy.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ExplorationStrategy {
    /// Greedy action selection with random tie-breaking.
    Greedy,

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),

    /// Epsilon-soft policy table.
    EpsilonSoft(EpsilonSoft),

    /// Softmax action selection.
    Softmax(Softmax),

    /// UCB1, single-state bandits only.
    Ucb1(Ucb1),

    /// Thompson sampling, single-state bandits only.
    Thompson(Thompson),
}

impl Default for ExplorationStrategy {
    fn default() -> Self {
        Self::EpsilonGreedy(EpsilonGreedy::new(0.1))
    }
}

impl ExplorationStrategy {
    /// Returns `true` for strategies defined only for single-state bandits.
    pub fn is_bandit_only(&self) -> bool {
        matches!(self, Self::Ucb1(_) | Self::Thompson(_))
    }

    /// Name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "Greedy",
            Self::EpsilonGreedy(_) => "EpsilonGreedy",
            Self::EpsilonSoft(_) => "EpsilonSoft",
            Self::Softmax(_) => "Softmax",
            Self::Ucb1(_) => "Ucb1",
            Self::Thompson(_) => "Thompson",
        }
    }

    /// Checks the parameters, returning a description of the first violation.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::Greedy => Ok(()),
            Self::EpsilonGreedy(e) => e.schedule.check(),
            Self::EpsilonSoft(e) => {
                if (0.0..=1.0).contains(&e.epsilon) {
                    Ok(())
                } else {
                    Err(format!("epsilon must be in [0, 1], got {}", e.epsilon))
                }
            }
            Self::Softmax(s) => {
                if s.temperature > 0.0 && s.temperature.is_finite() {
                    Ok(())
                } else {
                    Err(format!("temperature must be positive, got {}", s.temperature))
                }
            }
            Self::Ucb1(u) => match u.delta {
                Some(delta) if !(delta > 0.0 && delta < 1.0) => {
                    Err(format!("UCB1 delta must be in (0, 1), got {}", delta))
                }
                _ => Ok(()),
            },
            Self::Thompson(t) => {
                if t.alpha > 0.0 && t.beta > 0.0 {
                    Ok(())
                } else {
                    Err(format!(
                        "Beta prior parameters must be positive, got ({}, {})",
                        t.alpha, t.beta
                    ))
                }
            }
        }
    }
}

/// Tabular explorer, selecting actions from rows of `Q`.
#[derive(Debug, PartialEq, Clone)]
pub enum Explorer {
    /// Greedy action selection.
    Greedy,

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),

    /// Epsilon-soft policy table.
    EpsilonSoft(EpsilonSoft),

    /// Softmax action selection.
    Softmax(Softmax),
}

impl Explorer {
    /// Builds a tabular explorer, `None` for bandit-only strategies.
    pub fn from_strategy(
        strategy: &ExplorationStrategy,
        n_states: usize,
        n_actions: usize,
    ) -> Option<Self> {
        match strategy {
            ExplorationStrategy::Greedy => Some(Self::Greedy),
            ExplorationStrategy::EpsilonGreedy(e) => Some(Self::EpsilonGreedy(e.clone())),
            ExplorationStrategy::EpsilonSoft(e) => {
                let mut e = e.clone();
                e.init(n_states, n_actions);
                Some(Self::EpsilonSoft(e))
            }
            ExplorationStrategy::Softmax(s) => Some(Self::Softmax(s.clone())),
            ExplorationStrategy::Ucb1(_) | ExplorationStrategy::Thompson(_) => None,
        }
    }

    /// Chooses an action at state `s` given its action values.
    pub fn action<R: Rng + ?Sized>(&self, s: usize, values: &[f64], rng: &mut R) -> usize {
        match self {
            Self::Greedy => argmax_random(values, rng),
            Self::EpsilonGreedy(e) => e.action(values, rng),
            Self::EpsilonSoft(e) => e.action(s, rng),
            Self::Softmax(e) => e.action(values, rng),
        }
    }

    /// Action probabilities at state `s` given its action values.
    pub fn probs(&self, s: usize, values: &[f64]) -> Vec<f64> {
        match self {
            Self::Greedy => {
                let best = maximizers(values);
                let mut probs = vec![0.0; values.len()];
                let p = 1.0 / best.len().max(1) as f64;
                best.into_iter().for_each(|a| probs[a] = p);
                probs
            }
            Self::EpsilonGreedy(e) => e.probs(values),
            Self::EpsilonSoft(e) => e.row(s).to_vec(),
            Self::Softmax(e) => e.probs(values),
        }
    }

    /// Notifies that `Q[s, :]` changed.
    pub fn on_update<R: Rng + ?Sized>(&mut self, s: usize, values: &[f64], rng: &mut R) {
        if let Self::EpsilonSoft(e) = self {
            e.refresh(s, values, rng);
        }
    }

    /// Counts an environment step.
    pub fn tick_step(&mut self) {
        if let Self::EpsilonGreedy(e) = self {
            e.tick_step();
        }
    }

    /// Counts a finished episode.
    pub fn tick_episode(&mut self) {
        if let Self::EpsilonGreedy(e) = self {
            e.tick_episode();
        }
    }

    /// The current exploration rate, if the strategy has one.
    pub fn epsilon(&self) -> Option<f64> {
        match self {
            Self::EpsilonGreedy(e) => Some(e.epsilon()),
            Self::EpsilonSoft(e) => Some(e.epsilon),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_probs_split_ties() {
        let explorer = Explorer::Greedy;
        assert_eq!(explorer.probs(0, &[1.0, 1.0, 0.0]), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_bandit_strategies_have_no_tabular_explorer() {
        assert!(Explorer::from_strategy(&ExplorationStrategy::Ucb1(Ucb1::new()), 1, 2).is_none());
        assert!(ExplorationStrategy::Thompson(Thompson::default()).is_bandit_only());
    }

    #[test]
    fn test_check() {
        assert!(ExplorationStrategy::Softmax(Softmax::new(0.0)).check().is_err());
        assert!(ExplorationStrategy::EpsilonSoft(EpsilonSoft::new(-0.1))
            .check()
            .is_err());
        assert!(ExplorationStrategy::Ucb1(Ucb1::with_delta(1.0)).check().is_err());
        assert!(ExplorationStrategy::Thompson(Thompson::new(0.0, 1.0))
            .check()
            .is_err());
        assert!(ExplorationStrategy::default().check().is_ok());
    }
}
