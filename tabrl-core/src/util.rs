//! Utilities.
use rand::{seq::SliceRandom, Rng};

/// Indices of the maximal entries of `values`.
pub fn maximizers(values: &[f64]) -> Vec<usize> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect()
}

/// Index of a maximal entry of `values`, ties broken uniformly at random.
///
/// `values` must not be empty. NaN entries never win.
pub fn argmax_random<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> usize {
    let ixs = maximizers(values);
    match ixs.choose(rng) {
        Some(&ix) => ix,
        // Every entry is NaN
        None => rng.gen_range(0..values.len()),
    }
}

/// Trailing moving average over at most `window` entries for every position of `xs`.
pub fn moving_average(xs: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = 0.0;
    xs.iter()
        .enumerate()
        .map(|(i, x)| {
            sum += x;
            if i >= window {
                sum -= xs[i - window];
            }
            sum / (i + 1).min(window) as f64
        })
        .collect()
}

/// Incremental mean `old + (x - old) / n`.
///
/// Returns `None` for `n == 0`, which would mean averaging before the first visit.
pub fn incremental_mean(old: f64, x: f64, n: u64) -> Option<f64> {
    if n == 0 {
        None
    } else {
        Some(old + (x - old) / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_argmax_breaks_ties_at_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let values = [1.0, 3.0, 0.0, 3.0];
        let mut counts = [0usize; 4];
        for _ in 0..1000 {
            counts[argmax_random(&values, &mut rng)] += 1;
        }
        assert_eq!(counts[0] + counts[2], 0);
        assert!(counts[1] > 400 && counts[3] > 400);
    }

    #[test]
    fn test_unpulled_infinite_scores_win() {
        let mut rng = StdRng::seed_from_u64(0);
        let values = [0.9, f64::INFINITY, 0.1];
        assert_eq!(argmax_random(&values, &mut rng), 1);
    }

    #[test]
    fn test_moving_average() {
        let ma = moving_average(&[1.0, 3.0, 5.0, 7.0], 2);
        assert_eq!(ma, vec![1.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_incremental_mean_guards_zero_count() {
        assert_eq!(incremental_mean(0.0, 4.0, 0), None);
        assert_eq!(incremental_mean(2.0, 4.0, 2), Some(3.0));
    }
}
