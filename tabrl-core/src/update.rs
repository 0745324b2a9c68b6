//! Update rules of value and action-value tables.
//!
//! The rules are plain values applied to a table and a transition (or a whole
//! trace for Monte Carlo), so they can be replayed on a fixed trajectory
//! independently of any agent.
//!
//! A transition into a terminal state uses `target = r`: the entry of the
//! terminal state is never consulted. A transition cut by truncation
//! bootstraps from the successor as usual.
use crate::{
    util::incremental_mean, ActionValueTable, EligibilityTrace, EpisodeTrace, Transition,
    ValueTable,
};
use log::warn;

/// Outcome of a first-visit Monte Carlo update.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct McUpdate {
    /// Updated keys, states or states of the updated pairs, in first-visit order.
    pub updated: Vec<usize>,

    /// The number of averaging steps skipped because of a zero visit count.
    pub numerical_warnings: usize,
}

/// First-visit Monte Carlo update of `V`.
///
/// `returns[t]` is the return from position `t` of `trace`. For each state,
/// only the return from its first occurrence in the trace is averaged in.
pub fn first_visit_mc_v(v: &mut ValueTable, trace: &EpisodeTrace, returns: &[f64]) -> McUpdate {
    debug_assert_eq!(trace.len(), returns.len());
    let mut seen = vec![false; v.len()];
    let mut res = McUpdate::default();

    for (tr, &g) in trace.transitions().iter().zip(returns) {
        let s = tr.state;
        if seen[s] {
            continue;
        }
        seen[s] = true;
        let n = v.visit(s);
        match incremental_mean(v.get(s), g, n) {
            Some(mean) => {
                v.set(s, mean);
                res.updated.push(s);
            }
            None => {
                warn!("Zero visit count of state {} in Monte Carlo averaging", s);
                res.numerical_warnings += 1;
            }
        }
    }
    res
}

/// First-visit Monte Carlo update of `Q`, keyed on state-action pairs.
///
/// [`McUpdate::updated`] lists the states whose rows changed.
pub fn first_visit_mc_q(
    q: &mut ActionValueTable,
    trace: &EpisodeTrace,
    returns: &[f64],
) -> McUpdate {
    debug_assert_eq!(trace.len(), returns.len());
    let mut seen = vec![false; q.values().len()];
    let mut res = McUpdate::default();

    for (tr, &g) in trace.transitions().iter().zip(returns) {
        let ix = q.index(tr.state, tr.act);
        if seen[ix] {
            continue;
        }
        seen[ix] = true;
        let n = q.visit(tr.state, tr.act);
        match incremental_mean(q.get(tr.state, tr.act), g, n) {
            Some(mean) => {
                q.set(tr.state, tr.act, mean);
                if !res.updated.contains(&tr.state) {
                    res.updated.push(tr.state);
                }
            }
            None => {
                warn!(
                    "Zero visit count of pair ({}, {}) in Monte Carlo averaging",
                    tr.state, tr.act
                );
                res.numerical_warnings += 1;
            }
        }
    }
    res
}

/// TD error `r + gamma * V[s'] - V[s]`.
fn state_td_error(v: &ValueTable, t: &Transition, gamma: f64) -> f64 {
    if t.is_terminated {
        t.reward - v.get(t.state)
    } else {
        t.reward + gamma * v.get(t.next_state) - v.get(t.state)
    }
}

/// One-step TD update `V[s] += alpha * (r + gamma * V[s'] - V[s])`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Td0 {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,
}

impl Td0 {
    /// Constructs the rule.
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Applies the update and returns the TD error.
    pub fn update(&self, v: &mut ValueTable, t: &Transition) -> f64 {
        let delta = state_td_error(v, t, self.gamma);
        v.add(t.state, self.alpha * delta);
        v.visit(t.state);
        delta
    }
}

/// Backward-view TD(λ) with an accumulating eligibility trace over states.
///
/// Per step: `E *= gamma * lambda`, `E[s] += 1`,
/// `delta = r + gamma * V[s'] - V[s]`, `V += alpha * delta * E`.
/// `lambda = 0` reproduces [`Td0`] update for update.
#[derive(Clone, Debug, PartialEq)]
pub struct TdLambda {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Trace decay.
    pub lambda: f64,

    trace: EligibilityTrace,
}

impl TdLambda {
    /// Constructs the rule with an all-zero trace over `n_states` states.
    pub fn new(alpha: f64, gamma: f64, lambda: f64, n_states: usize) -> Self {
        Self {
            alpha,
            gamma,
            lambda,
            trace: EligibilityTrace::new(n_states),
        }
    }

    /// Resets the trace for a new episode.
    pub fn reset(&mut self) {
        self.trace.reset();
    }

    /// The eligibility trace.
    pub fn trace(&self) -> &EligibilityTrace {
        &self.trace
    }

    /// Applies the update and returns the TD error.
    pub fn update(&mut self, v: &mut ValueTable, t: &Transition) -> f64 {
        self.trace.decay(self.gamma * self.lambda);
        self.trace.increment(t.state);
        let delta = state_td_error(v, t, self.gamma);
        self.trace.apply(v.values_mut(), self.alpha * delta);
        v.visit(t.state);
        delta
    }
}

/// Off-policy TD control `Q[s,a] += alpha * (r + gamma * max_a' Q[s',a'] - Q[s,a])`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QLearning {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,
}

impl QLearning {
    /// Constructs the rule.
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Applies the update and returns the TD error.
    pub fn update(&self, q: &mut ActionValueTable, t: &Transition) -> f64 {
        let target = if t.is_terminated {
            t.reward
        } else {
            t.reward + self.gamma * q.max(t.next_state)
        };
        let delta = target - q.get(t.state, t.act);
        q.add(t.state, t.act, self.alpha * delta);
        q.visit(t.state, t.act);
        delta
    }
}

/// Expected value of `Q[s', ·]` under action probabilities `probs`.
fn expected_value(q: &ActionValueTable, s: usize, probs: &[f64]) -> f64 {
    q.row(s).iter().zip(probs).map(|(v, p)| v * p).sum()
}

fn pair_td_error(q: &ActionValueTable, t: &Transition, gamma: f64, next_probs: &[f64]) -> f64 {
    if t.is_terminated {
        t.reward - q.get(t.state, t.act)
    } else {
        t.reward + gamma * expected_value(q, t.next_state, next_probs) - q.get(t.state, t.act)
    }
}

/// On-policy TD control bootstrapping from the expected action value at `s'`.
///
/// `next_probs` are the current action probabilities of the behaviour policy
/// at `s'`; they are ignored for a terminal transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpectedSarsa {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,
}

impl ExpectedSarsa {
    /// Constructs the rule.
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Applies the update and returns the TD error.
    pub fn update(&self, q: &mut ActionValueTable, t: &Transition, next_probs: &[f64]) -> f64 {
        let delta = pair_td_error(q, t, self.gamma, next_probs);
        q.add(t.state, t.act, self.alpha * delta);
        q.visit(t.state, t.act);
        delta
    }
}

/// [`ExpectedSarsa`] with an accumulating eligibility trace over state-action pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpectedSarsaLambda {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Trace decay.
    pub lambda: f64,

    trace: EligibilityTrace,
}

impl ExpectedSarsaLambda {
    /// Constructs the rule with an all-zero trace over `n_states * n_actions` pairs.
    pub fn new(alpha: f64, gamma: f64, lambda: f64, n_states: usize, n_actions: usize) -> Self {
        Self {
            alpha,
            gamma,
            lambda,
            trace: EligibilityTrace::new(n_states * n_actions),
        }
    }

    /// Resets the trace for a new episode.
    pub fn reset(&mut self) {
        self.trace.reset();
    }

    /// The eligibility trace, indexed like [`ActionValueTable::index`].
    pub fn trace(&self) -> &EligibilityTrace {
        &self.trace
    }

    /// Applies the update and returns the TD error.
    pub fn update(&mut self, q: &mut ActionValueTable, t: &Transition, next_probs: &[f64]) -> f64 {
        self.trace.decay(self.gamma * self.lambda);
        self.trace.increment(q.index(t.state, t.act));
        let delta = pair_td_error(q, t, self.gamma, next_probs);
        self.trace.apply(q.values_mut(), self.alpha * delta);
        q.visit(t.state, t.act);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EpisodeEnd;

    fn loop_trace() -> EpisodeTrace {
        // 0 -> 1 -> 0 -> 2 (terminal), rewards 1, 2, 3
        EpisodeTrace::new(
            vec![
                Transition::new(0, 0, 1.0, 1, false),
                Transition::new(1, 1, 2.0, 0, false),
                Transition::new(0, 0, 3.0, 2, true),
            ],
            EpisodeEnd::Terminated,
        )
    }

    #[test]
    fn test_first_visit_mc_uses_first_occurrence() {
        let trace = loop_trace();
        let returns = crate::discounted_returns(&trace.rewards(), 1.0);
        assert_eq!(returns, vec![6.0, 5.0, 3.0]);

        let mut v = ValueTable::new(3, 0.0);
        let res = first_visit_mc_v(&mut v, &trace, &returns);
        assert_eq!(res.updated, vec![0, 1]);
        assert_eq!(v.get(0), 6.0);
        assert_eq!(v.get(1), 5.0);
        assert_eq!(v.visits(0), 1);

        // Running average over episodes
        let res = first_visit_mc_v(&mut v, &trace, &[2.0, 1.0, 0.0]);
        assert_eq!(res.numerical_warnings, 0);
        assert_eq!(v.get(0), 4.0);
        assert_eq!(v.get(1), 3.0);
        assert_eq!(v.get(2), 0.0);
    }

    #[test]
    fn test_first_visit_mc_q() {
        let trace = loop_trace();
        let mut q = ActionValueTable::new(3, 2, 0.0);
        let res = first_visit_mc_q(&mut q, &trace, &[6.0, 5.0, 3.0]);
        assert_eq!(res.updated, vec![0, 1]);
        assert_eq!(q.get(0, 0), 6.0);
        assert_eq!(q.get(1, 1), 5.0);
        assert_eq!(q.visits(0, 0), 1);
    }

    #[test]
    fn test_td0_terminal_ignores_successor_entry() {
        let mut v = ValueTable::new(2, 10.0);
        let delta = Td0::new(0.5, 0.9).update(&mut v, &Transition::new(0, 0, 1.0, 1, true));
        assert_eq!(delta, -9.0);
        assert_eq!(v.get(0), 5.5);
        assert_eq!(v.get(1), 10.0);
    }

    #[test]
    fn test_td_lambda_spreads_error_backward() {
        let mut rule = TdLambda::new(0.5, 1.0, 0.5, 3);
        let mut v = ValueTable::new(3, 0.0);
        rule.update(&mut v, &Transition::new(0, 0, 0.0, 1, false));
        rule.update(&mut v, &Transition::new(1, 0, 1.0, 2, true));
        // Trace after the second step: E[0] = 0.5, E[1] = 1
        assert_eq!(rule.trace().get(0), 0.5);
        assert_eq!(v.get(1), 0.5);
        assert_eq!(v.get(0), 0.25);

        rule.reset();
        assert!(rule.trace().iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_q_learning_bootstraps_from_max() {
        let mut q = ActionValueTable::new(2, 2, 0.0);
        q.set(1, 1, 2.0);
        let rule = QLearning::new(0.5, 0.5);
        rule.update(&mut q, &Transition::new(0, 0, 1.0, 1, false));
        assert_eq!(q.get(0, 0), 1.0);
    }

    #[test]
    fn test_expected_sarsa_uses_probabilities() {
        let mut q = ActionValueTable::new(2, 2, 0.0);
        q.set(1, 0, 4.0);
        let rule = ExpectedSarsa::new(1.0, 1.0);
        rule.update(&mut q, &Transition::new(0, 1, 0.0, 1, false), &[0.25, 0.75]);
        assert_eq!(q.get(0, 1), 1.0);
    }

    #[test]
    fn test_expected_sarsa_lambda_zero_matches_one_step() {
        let transitions = loop_trace();
        let probs = [0.5, 0.5];
        let mut q1 = ActionValueTable::new(3, 2, 0.0);
        let mut q2 = ActionValueTable::new(3, 2, 0.0);
        let one_step = ExpectedSarsa::new(0.3, 0.9);
        let mut lambda = ExpectedSarsaLambda::new(0.3, 0.9, 0.0, 3, 2);
        for t in transitions.transitions() {
            one_step.update(&mut q1, t, &probs);
            lambda.update(&mut q2, t, &probs);
            assert_eq!(q1.values(), q2.values());
        }
    }
}
