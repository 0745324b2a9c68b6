use anyhow::Result;
use clap::Parser;
use tabrl::{
    core::{
        record::NullRecorder, Algorithm, Env as _, ExplorationStrategy, Trainer, TrainerConfig,
        TrainingResult,
    },
    env::{ChainConfig, ChainEnv},
};

const N_STATES: usize = 6;
const STEP_REWARD: f64 = -1.0;
const TERMINAL_REWARD: f64 = 5.0;
const GAMMA: f64 = 0.9;

/// Estimate state values of a deterministic chain with first-visit Monte Carlo
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of episodes
    #[arg(short, long, default_value_t = 100)]
    n_episodes: usize,

    /// Save the trainer configuration and the result as YAML into this directory
    #[arg(short, long)]
    out_dir: Option<String>,
}

fn env_config() -> ChainConfig {
    ChainConfig::default()
        .n_states(N_STATES)
        .step_reward(STEP_REWARD)
        .terminal_reward(TERMINAL_REWARD)
}

fn train(n_episodes: usize, out_dir: Option<&str>) -> Result<TrainingResult> {
    let config = TrainerConfig::default()
        .algorithm(Algorithm::MonteCarlo)
        .explorer(ExplorationStrategy::Greedy)
        .gamma(GAMMA)
        .n_episodes(n_episodes);
    let mut trainer = Trainer::<ChainEnv>::build(config.clone(), &env_config())?;
    let result = trainer.train(&mut NullRecorder::new())?;

    if let Some(dir) = out_dir {
        config.save(format!("{}/trainer.yaml", dir))?;
        result.save(format!("{}/result.yaml", dir))?;
    }
    Ok(result)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = train(args.n_episodes, args.out_dir.as_deref())?;
    let env = ChainEnv::build(&env_config(), 0)?;
    for s in 0..result.n_states() {
        println!(
            "V(s{}) = {:8.4} (exact {:8.4})",
            s,
            result.v(s),
            env.true_value(s, GAMMA)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_mc_chain() -> Result<()> {
        let tmp_dir = TempDir::new("mc_chain")?;
        let out_dir = match tmp_dir.as_ref().to_str() {
            Some(s) => s,
            None => panic!("Failed to get string of temporary directory"),
        };
        let result = train(10, Some(out_dir))?;
        let env = ChainEnv::build(&env_config(), 0)?;
        for s in 0..N_STATES {
            assert!((result.v(s) - env.true_value(s, GAMMA)).abs() < 1e-9);
        }

        let loaded = TrainingResult::load(format!("{}/result.yaml", out_dir))?;
        assert_eq!(loaded.state_values.len(), N_STATES);
        let config = TrainerConfig::load(format!("{}/trainer.yaml", out_dir))?;
        assert_eq!(config.algorithm, Algorithm::MonteCarlo);
        Ok(())
    }
}
