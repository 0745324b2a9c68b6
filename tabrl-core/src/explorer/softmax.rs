//! Softmax (Boltzmann) action selection.
use crate::util::argmax_random;
use rand::{distributions::WeightedIndex, Rng};
use serde::{Deserialize, Serialize};

/// Softmax explorer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {
    /// Temperature; larger values flatten the distribution.
    pub temperature: f64,
}

impl Softmax {
    /// Constructs softmax explorer.
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    /// Action probabilities `exp(q / T) / sum exp(q / T)`.
    pub fn probs(&self, values: &[f64]) -> Vec<f64> {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = values
            .iter()
            .map(|v| ((v - max) / self.temperature).exp())
            .collect();
        let z: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / z).collect()
    }

    /// Takes an action based on action values.
    pub fn action<R: Rng + ?Sized>(&self, values: &[f64], rng: &mut R) -> usize {
        match WeightedIndex::new(self.probs(values)) {
            Ok(dist) => rng.sample(dist),
            Err(_) => argmax_random(values, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probs() {
        let probs = Softmax::new(1.0).probs(&[0.0, (3.0f64).ln()]);
        assert!((probs[0] - 0.25).abs() < 1e-12);
        assert!((probs[1] - 0.75).abs() < 1e-12);

        let flat = Softmax::new(1e6).probs(&[0.0, 1.0, 2.0]);
        assert!(flat.iter().all(|p| (p - 1.0 / 3.0).abs() < 1e-5));
    }
}
