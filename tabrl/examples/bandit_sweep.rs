use anyhow::Result;
use clap::Parser;
use log::info;
use tabrl::{
    core::{
        Algorithm, EpsilonGreedy, ExplorationStrategy, Thompson, TrainerConfig, TrainingResult,
        Ucb1,
    },
    env::{BernoulliBanditConfig, BernoulliBanditEnv},
    parallel::{mean_curve, run_many, seed_sweep},
    util::write_curves,
};

/// Compare bandit strategies on a Bernoulli bandit averaged over many seeds
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Success probabilities of the arms, comma separated
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![0.5, 0.55])]
    means: Vec<f64>,

    /// Number of pulls per run
    #[arg(short, long, default_value_t = 1000)]
    n_pulls: usize,

    /// Number of runs per strategy
    #[arg(short, long, default_value_t = 200)]
    runs: usize,

    /// Maximum number of runs trained at the same time
    #[arg(short, long, default_value_t = 4)]
    parallelism: usize,

    /// Write mean reward curves to this CSV file
    #[arg(long)]
    csv: Option<String>,
}

fn strategies() -> Vec<(&'static str, ExplorationStrategy)> {
    vec![
        ("thompson", ExplorationStrategy::Thompson(Thompson::default())),
        ("ucb1", ExplorationStrategy::Ucb1(Ucb1::new())),
        (
            "epsilon_greedy",
            ExplorationStrategy::EpsilonGreedy(EpsilonGreedy::new(0.1)),
        ),
    ]
}

fn best_arm_fraction(results: &[TrainingResult], best: usize) -> f64 {
    let fractions = results.iter().filter_map(|r| {
        let arms = r.arms.as_ref()?;
        let total = arms.iter().map(|a| a.pulls).sum::<u64>().max(1);
        Some(arms.get(best)?.pulls as f64 / total as f64)
    });
    let (sum, n) = fractions.fold((0.0, 0), |(s, n), f| (s + f, n + 1));
    sum / n.max(1) as f64
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let env_config = BernoulliBanditConfig::new(args.means.clone());
    let best = args
        .means
        .iter()
        .enumerate()
        .fold(0, |b, (i, &m)| if m > args.means[b] { i } else { b });

    let mut curves = vec![];
    for (name, explorer) in strategies() {
        let config = TrainerConfig::default()
            .algorithm(Algorithm::SampleAverage)
            .explorer(explorer)
            .n_episodes(args.n_pulls)
            .reward_window(args.n_pulls);
        let results = run_many::<BernoulliBanditEnv>(
            seed_sweep(&config, args.runs),
            &env_config,
            args.parallelism,
        )?
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
        info!(
            "{}: best arm pulled in {:.1}% of the pulls",
            name,
            100.0 * best_arm_fraction(&results, best)
        );
        curves.push((name, mean_curve(&results)));
    }

    if let Some(path) = args.csv.as_ref() {
        let columns = curves
            .iter()
            .map(|(n, c)| (*n, c.as_slice()))
            .collect::<Vec<_>>();
        write_curves(path, &columns)?;
    }

    Ok(())
}
