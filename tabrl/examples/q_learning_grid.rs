use anyhow::Result;
use clap::Parser;
use tabrl::{
    core::{
        record::LogRecorder, Algorithm, EpsilonGreedy, EpsilonSchedule, ExplorationStrategy,
        Trainer, TrainerConfig, TrainingResult,
    },
    env::{GridAction, GridWorldConfig, GridWorldEnv},
};

const WIDTH: usize = 5;
const HEIGHT: usize = 5;
const ALPHA: f64 = 0.5;
const MAX_STEPS_PER_EPISODE: usize = 200;
const RECORD_INTERVAL: usize = 50;

/// Learn a shortest path to the goal of a grid world with Q-learning
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of episodes
    #[arg(short, long, default_value_t = 1000)]
    n_episodes: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: i64,

    /// Save the learned tables as YAML
    #[arg(long)]
    save: Option<String>,
}

fn env_config() -> GridWorldConfig {
    GridWorldConfig::default()
        .size(WIDTH, HEIGHT)
        .start(0, 0)
        .goal(WIDTH - 1, HEIGHT - 1)
}

fn create_trainer_config(n_episodes: usize, seed: i64) -> TrainerConfig {
    let schedule = EpsilonSchedule::Linear {
        start: 1.0,
        end: 0.05,
        final_step: n_episodes * 4 / 5,
    };
    TrainerConfig::default()
        .algorithm(Algorithm::QLearning)
        .explorer(ExplorationStrategy::EpsilonGreedy(EpsilonGreedy::with_schedule(
            schedule,
        )))
        .alpha(ALPHA)
        .gamma(1.0)
        .n_episodes(n_episodes)
        .max_steps_per_episode(MAX_STEPS_PER_EPISODE)
        .record_interval(RECORD_INTERVAL)
        .seed(seed)
}

fn arrow(act: GridAction) -> char {
    match act {
        GridAction::Up => '^',
        GridAction::Right => '>',
        GridAction::Down => 'v',
        GridAction::Left => '<',
    }
}

fn print_policy(result: &TrainingResult, config: &GridWorldConfig) {
    let policy = result.greedy_policy();
    let goal = config.goal.1 * config.width + config.goal.0;
    for y in 0..config.height {
        let row = (0..config.width)
            .map(|x| {
                let s = y * config.width + x;
                if s == goal {
                    'G'
                } else {
                    GridAction::from_index(policy[s]).map_or('?', arrow)
                }
            })
            .collect::<String>();
        println!("{}", row);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = create_trainer_config(args.n_episodes, args.seed);
    let mut trainer = Trainer::<GridWorldEnv>::build(config, &env_config())?;
    let mut recorder = LogRecorder::new();
    let result = trainer.train(&mut recorder)?;

    print_policy(&result, &env_config());
    println!("V(start) = {:.3}", result.v(0));
    if let Some(path) = args.save.as_ref() {
        result.save(path)?;
    }

    Ok(())
}
