//! Aggregation of results across runs.
use tabrl_core::TrainingResult;

/// Mean of the episode returns across runs, episode by episode.
///
/// The curve is as long as the shortest run.
pub fn mean_curve(results: &[TrainingResult]) -> Vec<f64> {
    let len = match results.iter().map(|r| r.episode_returns.len()).min() {
        Some(len) => len,
        None => return vec![],
    };
    let n = results.len() as f64;
    (0..len)
        .map(|t| results.iter().map(|r| r.episode_returns[t]).sum::<f64>() / n)
        .collect()
}

/// Mean across runs of the last moving average of episode returns.
///
/// `None` if no run completed an episode.
pub fn mean_final_average(results: &[TrainingResult]) -> Option<f64> {
    let finals: Vec<f64> = results
        .iter()
        .filter_map(|r| r.final_moving_average())
        .collect();
    if finals.is_empty() {
        None
    } else {
        Some(finals.iter().sum::<f64>() / finals.len() as f64)
    }
}
