use anyhow::Result;
use tabrl::{
    core::{
        first_visit_mc_v, record::NullRecorder, Algorithm, Env, ExplorationStrategy, Sampler,
        Trainer, TrainerConfig, TruncationPolicy, UniformPolicy, ValueTable,
    },
    env::{ChainConfig, ChainEnv, GridWorldConfig, GridWorldEnv},
};

fn mc_config() -> TrainerConfig {
    TrainerConfig::default()
        .algorithm(Algorithm::MonteCarlo)
        .explorer(ExplorationStrategy::Greedy)
}

#[test]
fn test_chain_values_are_one() -> Result<()> {
    let config = mc_config().gamma(1.0).n_episodes(20);
    let mut trainer = Trainer::<ChainEnv>::build(config, &ChainConfig::default())?;
    let result = trainer.train(&mut NullRecorder::new())?;

    assert_eq!(result.v(0), 1.0);
    assert_eq!(result.v(1), 1.0);
    assert_eq!(result.v(2), 1.0);
    assert_eq!(result.v(3), 0.0);
    assert_eq!(result.q(0, 0), 1.0);
    assert_eq!(result.numerical_warnings, 0);
    Ok(())
}

#[test]
fn test_discounted_chain_matches_true_values() -> Result<()> {
    let env_config = ChainConfig::default().n_states(6).step_reward(-1.0).terminal_reward(5.0);
    let config = mc_config().gamma(0.9).n_episodes(50);
    let mut trainer = Trainer::<ChainEnv>::build(config, &env_config)?;
    let result = trainer.train(&mut NullRecorder::new())?;

    let env = ChainEnv::build(&env_config, 0)?;
    for s in 0..6 {
        assert!(
            (result.v(s) - env.true_value(s, 0.9)).abs() < 1e-9,
            "V[{}] = {}, expected {}",
            s,
            result.v(s),
            env.true_value(s, 0.9)
        );
    }
    Ok(())
}

#[test]
fn test_fixed_random_policy_on_grid() -> Result<()> {
    // Undiscounted returns count -1 per step until the goal
    let env_config = GridWorldConfig::default().size(2, 2).goal(1, 1);
    let env = GridWorldEnv::build(&env_config, 0)?;
    let mut sampler = Sampler::new(env, 10_000);
    let mut policy = UniformPolicy::new(4, 3);
    let mut v = ValueTable::new(4, 0.0);

    for _ in 0..4000 {
        let trace = sampler.run_episode(&mut policy)?;
        let returns = tabrl::core::compute_returns(&trace, 1.0, TruncationPolicy::Reject)?
            .expect("terminated episodes have returns");
        first_visit_mc_v(&mut v, &trace, &returns);
    }

    // Expected steps to the goal: 8 from the start corner, 6 from its neighbours
    assert!((v.get(0) + 8.0).abs() < 0.5, "V[0] = {}", v.get(0));
    assert!((v.get(1) + 6.0).abs() < 0.5, "V[1] = {}", v.get(1));
    assert!((v.get(2) + 6.0).abs() < 0.5, "V[2] = {}", v.get(2));
    assert_eq!(v.get(3), 0.0);
    Ok(())
}

#[test]
fn test_truncated_episodes_are_discarded() -> Result<()> {
    let config = mc_config()
        .gamma(1.0)
        .n_episodes(5)
        .max_steps_per_episode(2);
    let mut trainer = Trainer::<ChainEnv>::build(config, &ChainConfig::default())?;
    let result = trainer.train(&mut NullRecorder::new())?;

    assert_eq!(result.truncated_episodes, 5);
    assert_eq!(result.state_values, vec![0.0; 4]);
    Ok(())
}

#[test]
fn test_truncated_episodes_accepted() -> Result<()> {
    let env_config = ChainConfig::default().step_reward(1.0);
    let config = mc_config()
        .gamma(1.0)
        .n_episodes(5)
        .max_steps_per_episode(2)
        .truncation(TruncationPolicy::Accept);
    let mut trainer = Trainer::<ChainEnv>::build(config, &env_config)?;
    let result = trainer.train(&mut NullRecorder::new())?;

    // Lower bounds from the two observed rewards
    assert_eq!(result.v(0), 2.0);
    assert_eq!(result.v(1), 1.0);
    assert_eq!(result.v(2), 0.0);
    Ok(())
}
