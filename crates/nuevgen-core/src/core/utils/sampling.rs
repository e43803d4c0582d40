use rand::{distributions::WeightedIndex, prelude::*};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Input weights list is empty, cannot perform sampling")]
    EmptyWeights,
    #[error("All weights are zero, resulting in zero total weight for sampling")]
    ZeroTotalWeight,
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// Picks an index with probability proportional to its weight.
#[instrument(level = "trace", skip_all, fields(n = weights.len()))]
pub fn weighted_choice(weights: &[f64], rng: &mut impl Rng) -> Result<usize, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::EmptyWeights);
    }
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= f64::EPSILON {
        return Err(SamplingError::ZeroTotalWeight);
    }
    let dist = WeightedIndex::new(weights)?;
    Ok(dist.sample(rng))
}

/// Index of the bin of `edges` containing `value`, `None` when outside the edges.
pub fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    if edges.len() < 2 || value < edges[0] || value >= edges[edges.len() - 1] {
        return None;
    }
    Some(edges.partition_point(|e| *e <= value) - 1)
}
