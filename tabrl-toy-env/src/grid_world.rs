//! Deterministic grid world.
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tabrl_core::{Env, Step};

/// Moves of [`GridWorldEnv`], in action-index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAction {
    /// `y - 1`.
    Up,

    /// `x + 1`.
    Right,

    /// `y + 1`.
    Down,

    /// `x - 1`.
    Left,
}

impl GridAction {
    /// All moves, indexed by action.
    pub const ALL: [GridAction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// The move of an action index.
    pub fn from_index(act: usize) -> Option<Self> {
        Self::ALL.get(act).copied()
    }
}

/// Configuration of [`GridWorldEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GridWorldConfig {
    /// The number of columns.
    pub width: usize,

    /// The number of rows.
    pub height: usize,

    /// Start cell `(x, y)`.
    pub start: (usize, usize),

    /// Terminal goal cell `(x, y)`.
    pub goal: (usize, usize),

    /// Reward of every step, the one reaching the goal included.
    pub step_reward: f64,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            start: (0, 0),
            goal: (3, 3),
            step_reward: -1.0,
        }
    }
}

impl GridWorldConfig {
    /// Sets the size of the grid.
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the start cell.
    pub fn start(mut self, x: usize, y: usize) -> Self {
        self.start = (x, y);
        self
    }

    /// Sets the goal cell.
    pub fn goal(mut self, x: usize, y: usize) -> Self {
        self.goal = (x, y);
        self
    }
}

/// Grid of `width × height` cells with a goal.
///
/// The state of cell `(x, y)` is `y * width + x`. Actions follow
/// [`GridAction::ALL`]; moves into a wall leave the agent in place.
pub struct GridWorldEnv {
    config: GridWorldConfig,
    pos: (usize, usize),
}

impl GridWorldEnv {
    /// State index of a cell.
    pub fn state_of(&self, x: usize, y: usize) -> usize {
        y * self.config.width + x
    }

    /// Cell of a state index.
    pub fn cell_of(&self, s: usize) -> (usize, usize) {
        (s % self.config.width, s / self.config.width)
    }

    /// Manhattan distance from a state to the goal.
    pub fn distance_to_goal(&self, s: usize) -> usize {
        let (x, y) = self.cell_of(s);
        let (gx, gy) = self.config.goal;
        x.abs_diff(gx) + y.abs_diff(gy)
    }

    /// The state reached from `s` by `act`, without moving the agent.
    pub fn next_state(&self, s: usize, act: GridAction) -> usize {
        let (x, y) = self.cell_of(s);
        let (x, y) = match act {
            GridAction::Up => (x, y.saturating_sub(1)),
            GridAction::Right => ((x + 1).min(self.config.width - 1), y),
            GridAction::Down => (x, (y + 1).min(self.config.height - 1)),
            GridAction::Left => (x.saturating_sub(1), y),
        };
        self.state_of(x, y)
    }

    /// The goal state.
    pub fn goal_state(&self) -> usize {
        self.state_of(self.config.goal.0, self.config.goal.1)
    }
}

impl Env for GridWorldEnv {
    type Config = GridWorldConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        let inside = |(x, y): (usize, usize)| x < config.width && y < config.height;
        if config.width == 0 || config.height == 0 {
            bail!("Empty grid {}x{}", config.width, config.height);
        }
        if !inside(config.start) || !inside(config.goal) {
            bail!(
                "Start {:?} and goal {:?} must be inside the {}x{} grid",
                config.start,
                config.goal,
                config.width,
                config.height
            );
        }
        if config.start == config.goal {
            bail!("Start and goal are the same cell {:?}", config.goal);
        }
        Ok(Self {
            config: config.clone(),
            pos: config.start,
        })
    }

    fn n_states(&self) -> usize {
        self.config.width * self.config.height
    }

    fn n_actions(&self) -> usize {
        GridAction::ALL.len()
    }

    fn reset(&mut self) -> Result<usize> {
        self.pos = self.config.start;
        Ok(self.state_of(self.pos.0, self.pos.1))
    }

    fn step(&mut self, act: usize) -> Result<Step> {
        let s = self.state_of(self.pos.0, self.pos.1);
        if s == self.goal_state() {
            bail!("Stepped the grid world from the goal, reset first");
        }
        let action = match GridAction::from_index(act) {
            Some(action) => action,
            None => bail!("Invalid action {}", act),
        };
        let next = self.next_state(s, action);
        self.pos = self.cell_of(next);
        let is_terminated = next == self.goal_state();
        Ok(Step::new(next, act, self.config.step_reward, is_terminated, false))
    }
}
