use anyhow::Result;
use clap::Parser;
use log::info;
use tabrl::{
    core::{Algorithm, Env as _, ExplorationStrategy, TrainerConfig, TrainingResult},
    env::{RandomWalkConfig, RandomWalkEnv},
    parallel::{mean_curve, run_many, seed_sweep},
    util::{rms_error, write_curves},
};

const N_INNER: usize = 5;
const ALPHA: f64 = 0.05;

/// Compare TD(λ) value estimates on the random walk for several trace decays
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of episodes per run
    #[arg(short, long, default_value_t = 100)]
    n_episodes: usize,

    /// Number of independent runs per decay
    #[arg(short, long, default_value_t = 50)]
    runs: usize,

    /// Maximum number of runs trained at the same time
    #[arg(short, long, default_value_t = 4)]
    parallelism: usize,

    /// Trace decays to compare, comma separated
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![0.0, 0.4, 0.8, 1.0])]
    lambdas: Vec<f64>,

    /// Write per-episode moving averages of the returns to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

fn run_lambda(lambda: f64, args: &Args) -> Result<Vec<TrainingResult>> {
    let config = TrainerConfig::default()
        .algorithm(Algorithm::TdLambda)
        .explorer(ExplorationStrategy::Greedy)
        .alpha(ALPHA)
        .gamma(1.0)
        .lambda(lambda)
        .init_value(0.5)
        .n_episodes(args.n_episodes);
    let env_config = RandomWalkConfig { n_inner: N_INNER };
    run_many::<RandomWalkEnv>(seed_sweep(&config, args.runs), &env_config, args.parallelism)?
        .into_iter()
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let truth = RandomWalkEnv::build(&RandomWalkConfig { n_inner: N_INNER }, 0)?.true_values();
    let mut names = vec![];
    let mut curves = vec![];
    for &lambda in args.lambdas.iter() {
        let results = run_lambda(lambda, &args)?;
        let rms = results
            .iter()
            .map(|r| rms_error(&r.state_values, &truth, 1..=N_INNER))
            .sum::<f64>()
            / results.len() as f64;
        info!("lambda = {:.2}: mean RMS error {:.4}", lambda, rms);
        names.push(format!("lambda_{}", lambda));
        curves.push(mean_curve(&results));
    }

    if let Some(path) = args.csv.as_ref() {
        let columns = names
            .iter()
            .zip(curves.iter())
            .map(|(n, c)| (n.as_str(), c.as_slice()))
            .collect::<Vec<_>>();
        write_curves(path, &columns)?;
    }

    Ok(())
}
