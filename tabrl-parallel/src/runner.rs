//! Workers running trainers.
use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};
use std::{
    sync::{Arc, Mutex},
    thread::JoinHandle,
};
use tabrl_core::{
    error::TabularError, record::NullRecorder, Env, Trainer, TrainerConfig, TrainingResult,
};

type Job = (usize, TrainerConfig);
type JobResult = (usize, Result<TrainingResult>);

/// Runs a single training run on the current thread.
pub fn run_one<E: Env>(
    config: TrainerConfig,
    env_config: &E::Config,
    stop: Option<Arc<Mutex<bool>>>,
) -> Result<TrainingResult> {
    let mut trainer = Trainer::<E>::build(config, env_config)?;
    if let Some(stop) = stop {
        trainer = trainer.with_stop_flag(stop);
    }
    trainer.train(&mut NullRecorder::new())
}

/// Copies of `config` with the seeds `config.seed`, `config.seed + 1`, ...
pub fn seed_sweep(config: &TrainerConfig, n: usize) -> Vec<TrainerConfig> {
    (0..n)
        .map(|i| config.clone().seed(config.seed.wrapping_add(i as i64)))
        .collect()
}

/// Runs the configurations on `parallelism` worker threads.
///
/// The returned vector is ordered like `configs`; every run succeeds or fails
/// on its own. `parallelism == 0` is a configuration error. The number of
/// workers is capped by the number of runs.
pub fn run_many<E>(
    configs: Vec<TrainerConfig>,
    env_config: &E::Config,
    parallelism: usize,
) -> Result<Vec<Result<TrainingResult>>>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    run_many_inner::<E>(configs, env_config, parallelism, None)
}

/// [`run_many`] with a stop flag shared by every run.
///
/// Setting the flag cancels every run at the top of its next episode.
pub fn run_many_with_stop<E>(
    configs: Vec<TrainerConfig>,
    env_config: &E::Config,
    parallelism: usize,
    stop: Arc<Mutex<bool>>,
) -> Result<Vec<Result<TrainingResult>>>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    run_many_inner::<E>(configs, env_config, parallelism, Some(stop))
}

fn run_many_inner<E>(
    configs: Vec<TrainerConfig>,
    env_config: &E::Config,
    parallelism: usize,
    stop: Option<Arc<Mutex<bool>>>,
) -> Result<Vec<Result<TrainingResult>>>
where
    E: Env + 'static,
    E::Config: Send + 'static,
{
    if parallelism == 0 {
        return Err(TabularError::Config("parallelism must be positive".to_string()).into());
    }
    let n_runs = configs.len();
    let n_workers = parallelism.min(n_runs);
    info!("Running {} trainers on {} workers", n_runs, n_workers);

    let (job_s, job_r) = unbounded::<Job>();
    let (result_s, result_r) = unbounded::<JobResult>();
    for job in configs.into_iter().enumerate() {
        job_s
            .send(job)
            .map_err(|_| anyhow!("The job channel was closed"))?;
    }
    drop(job_s);

    let handles: Vec<JoinHandle<()>> = (0..n_workers)
        .map(|id| {
            let job_r = job_r.clone();
            let result_s = result_s.clone();
            let env_config = env_config.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                work::<E>(id, job_r, result_s, env_config, stop);
            })
        })
        .collect();
    drop(result_s);

    let mut results: Vec<Option<Result<TrainingResult>>> = (0..n_runs).map(|_| None).collect();
    for (ix, res) in result_r.iter() {
        if let Err(e) = &res {
            warn!("Run {} failed: {}", ix, e);
        }
        results[ix] = Some(res);
    }

    for (id, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            warn!("Worker {} panicked", id);
        }
    }

    Ok(results
        .into_iter()
        .enumerate()
        .map(|(ix, res)| res.unwrap_or_else(|| Err(anyhow!("Run {} reported no result", ix))))
        .collect())
}

fn work<E: Env>(
    id: usize,
    jobs: Receiver<Job>,
    results: Sender<JobResult>,
    env_config: E::Config,
    stop: Option<Arc<Mutex<bool>>>,
) {
    for (ix, config) in jobs.iter() {
        info!("Worker {} starts run {} (seed {})", id, ix, config.seed);
        let res = run_one::<E>(config, &env_config, stop.clone());
        if results.send((ix, res)).is_err() {
            break;
        }
    }
}
