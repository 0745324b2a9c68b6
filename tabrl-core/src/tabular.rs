//! Tabular agent.
use crate::{
    compute_returns, error::TabularError, first_visit_mc_q, first_visit_mc_v, ActionValueTable,
    Agent, EpisodeTrace, ExpectedSarsa, ExpectedSarsaLambda, Explorer, Policy, QLearning, Td0,
    TdLambda, Transition, TruncationPolicy, ValueTable,
};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Estimation algorithm.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// First-visit Monte Carlo, applied once per finished episode.
    MonteCarlo,

    /// One-step TD, applied once per step.
    Td0,

    /// TD(λ) with accumulating eligibility traces, applied once per step.
    TdLambda,

    /// Q-learning, applied once per step.
    QLearning,

    /// Sample-average arm values of single-state bandits.
    SampleAverage,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::QLearning
    }
}

/// Parameters of [`TabularAgent`].
#[derive(Clone, Debug, PartialEq)]
pub struct TabularAgentConfig {
    /// Algorithm; [`Algorithm::SampleAverage`] is not tabular and is rejected.
    pub algorithm: Algorithm,

    /// Learning rate of the TD rules.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Trace decay of [`Algorithm::TdLambda`].
    pub lambda: f64,

    /// Initial value of every table entry.
    pub init_value: f64,

    /// Handling of truncated episodes by Monte Carlo updates.
    pub truncation: TruncationPolicy,

    /// Seed of the random number generator of the agent.
    pub seed: u64,
}

enum Rule {
    MonteCarlo,
    Td0 {
        v: Td0,
        q: ExpectedSarsa,
    },
    TdLambda {
        v: TdLambda,
        q: ExpectedSarsaLambda,
    },
    QLearning(QLearning),
}

/// Agent estimating `V` and `Q` with one of the tabular update rules.
///
/// * [`Algorithm::MonteCarlo`] averages first-visit returns into `V` and
///   `Q` at the end of each episode.
/// * [`Algorithm::Td0`] updates `V` with TD(0) and `Q` with expected SARSA
///   after each step.
/// * [`Algorithm::TdLambda`] updates `V` with TD(λ) and `Q` with expected
///   SARSA(λ) after each step. Traces are reset when an episode begins.
/// * [`Algorithm::QLearning`] updates `Q` with Q-learning after each step and
///   keeps `V[s] = max_a Q[s, a]` for the updated state.
///
/// Actions are chosen by the [`Explorer`] from the row `Q[s, :]`.
pub struct TabularAgent {
    rule: Rule,
    gamma: f64,
    truncation: TruncationPolicy,
    v: ValueTable,
    q: ActionValueTable,
    explorer: Explorer,
    rng: StdRng,
    numerical_warnings: usize,
}

impl TabularAgent {
    /// Constructs the agent.
    pub fn new(
        config: &TabularAgentConfig,
        explorer: Explorer,
        n_states: usize,
        n_actions: usize,
    ) -> Result<Self> {
        if n_actions == 0 {
            return Err(TabularError::config("The action set is empty"));
        }
        if n_states == 0 {
            return Err(TabularError::config("The state set is empty"));
        }
        let (alpha, gamma, lambda) = (config.alpha, config.gamma, config.lambda);
        let rule = match config.algorithm {
            Algorithm::MonteCarlo => Rule::MonteCarlo,
            Algorithm::Td0 => Rule::Td0 {
                v: Td0::new(alpha, gamma),
                q: ExpectedSarsa::new(alpha, gamma),
            },
            Algorithm::TdLambda => Rule::TdLambda {
                v: TdLambda::new(alpha, gamma, lambda, n_states),
                q: ExpectedSarsaLambda::new(alpha, gamma, lambda, n_states, n_actions),
            },
            Algorithm::QLearning => Rule::QLearning(QLearning::new(alpha, gamma)),
            Algorithm::SampleAverage => {
                return Err(TabularError::config(
                    "SampleAverage is estimated by a bandit agent, not a tabular one",
                ))
            }
        };

        Ok(Self {
            rule,
            gamma,
            truncation: config.truncation,
            v: ValueTable::new(n_states, config.init_value),
            q: ActionValueTable::new(n_states, n_actions, config.init_value),
            explorer,
            rng: StdRng::seed_from_u64(config.seed),
            numerical_warnings: 0,
        })
    }

    /// State-value estimates.
    pub fn state_values(&self) -> &ValueTable {
        &self.v
    }

    /// Action-value estimates.
    pub fn action_values(&self) -> &ActionValueTable {
        &self.q
    }

    /// The explorer.
    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// The number of averaging steps skipped because of a zero visit count.
    pub fn numerical_warnings(&self) -> usize {
        self.numerical_warnings
    }

    /// Greedy action at state `s`, ties broken at random.
    pub fn greedy_action(&mut self, s: usize) -> usize {
        crate::util::argmax_random(self.q.row(s), &mut self.rng)
    }

    /// Greedy actions of all states, ties resolved to the lowest action index.
    pub fn greedy_policy(&self) -> Vec<usize> {
        (0..self.q.n_states())
            .map(|s| {
                crate::util::maximizers(self.q.row(s))
                    .first()
                    .copied()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn next_probs(&self, t: &Transition) -> Vec<f64> {
        if t.is_terminated {
            vec![]
        } else {
            self.explorer.probs(t.next_state, self.q.row(t.next_state))
        }
    }
}

impl Policy for TabularAgent {
    fn sample(&mut self, state: usize) -> usize {
        self.explorer.action(state, self.q.row(state), &mut self.rng)
    }
}

impl Agent for TabularAgent {
    fn begin_episode(&mut self) {
        if let Rule::TdLambda { v, q } = &mut self.rule {
            v.reset();
            q.reset();
        }
    }

    fn observe(&mut self, t: &Transition) -> Result<()> {
        let next_probs = match self.rule {
            Rule::Td0 { .. } | Rule::TdLambda { .. } => self.next_probs(t),
            _ => vec![],
        };
        let q_updated = match &mut self.rule {
            Rule::MonteCarlo => false,
            Rule::Td0 { v, q } => {
                v.update(&mut self.v, t);
                q.update(&mut self.q, t, &next_probs);
                true
            }
            Rule::TdLambda { v, q } => {
                v.update(&mut self.v, t);
                q.update(&mut self.q, t, &next_probs);
                true
            }
            Rule::QLearning(q) => {
                q.update(&mut self.q, t);
                self.v.set(t.state, self.q.max(t.state));
                self.v.visit(t.state);
                true
            }
        };

        if q_updated {
            match &self.rule {
                // Only pairs with a nonzero trace were changed
                Rule::TdLambda { q, .. } => {
                    let n_actions = self.q.n_actions();
                    let mut traced: Vec<usize> = q
                        .trace()
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| **e != 0.0)
                        .map(|(ix, _)| ix / n_actions)
                        .collect();
                    traced.dedup();
                    for s in traced {
                        self.explorer.on_update(s, self.q.row(s), &mut self.rng);
                    }
                }
                _ => self
                    .explorer
                    .on_update(t.state, self.q.row(t.state), &mut self.rng),
            }
        }
        self.explorer.tick_step();
        Ok(())
    }

    fn end_episode(&mut self, trace: &EpisodeTrace) -> Result<()> {
        self.explorer.tick_episode();
        if let Rule::MonteCarlo = self.rule {
            if let Some(returns) = compute_returns(trace, self.gamma, self.truncation)? {
                let res_v = first_visit_mc_v(&mut self.v, trace, &returns);
                let res_q = first_visit_mc_q(&mut self.q, trace, &returns);
                self.numerical_warnings += res_v.numerical_warnings + res_q.numerical_warnings;
                for s in res_q.updated {
                    self.explorer.on_update(s, self.q.row(s), &mut self.rng);
                }
            }
        }
        Ok(())
    }
}
