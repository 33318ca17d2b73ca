//! Weight vectors: Xavier-uniform initialization and bounded mutation.

use crate::topology::Topology;
use crate::utils::check_num;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// Flat network parameters of one agent.
///
/// See [`Topology`] for the layout. A vector is never changed in place:
/// initialization and mutation both produce a new one.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for WeightVector {
    fn from(vec: Vec<f64>) -> Self {
        Self(vec)
    }
}

/// Sample a fresh weight vector for `topology`.
///
/// Each matrix is drawn uniformly from `[-limit, limit]` with
/// `limit = sqrt(6 / (fan_in + fan_out))`.
pub fn init_weights<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> WeightVector {
    let mut weights = Vec::with_capacity(topology.n_weights());
    xavier_uniform(
        topology.hidden_size(),
        topology.input_size(),
        rng,
        &mut weights,
    );
    xavier_uniform(
        topology.output_size(),
        topology.hidden_size(),
        rng,
        &mut weights,
    );
    WeightVector(weights)
}

/// Bound of the Xavier-uniform distribution for a `n_rows x n_cols` matrix.
pub fn xavier_limit(n_rows: usize, n_cols: usize) -> f64 {
    (6.0 / (n_cols + n_rows) as f64).sqrt()
}

fn xavier_uniform<R: Rng + ?Sized>(
    n_rows: usize,
    n_cols: usize,
    rng: &mut R,
    out: &mut Vec<f64>,
) {
    let limit = xavier_limit(n_rows, n_cols);
    out.extend((0..n_rows * n_cols).map(|_| rng.random_range(-limit..=limit)));
}

/// Mutation parameters.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MutationConfig {
    /// Width of the uniform perturbation added to each weight.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Mutated weights are clipped to `[-bound, bound]`.
    #[serde(default = "default_bound")]
    pub bound: f64,
}

fn default_step() -> f64 {
    0.1
}

fn default_bound() -> f64 {
    1.0
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            bound: default_bound(),
        }
    }
}

impl MutationConfig {
    pub fn validate(&self) -> Result<()> {
        check_num(self.step, f64::MIN_POSITIVE..=2.0).context("invalid mutation step")?;
        check_num(self.bound, f64::MIN_POSITIVE..=10.0).context("invalid mutation bound")?;
        Ok(())
    }
}

/// Weight mutator.
///
/// Adds `(U(0,1) - 0.5) * step` to every weight independently, then clips
/// the result to `[-bound, bound]`.
#[derive(Debug, Clone)]
pub struct Mutation {
    noise_dist: Uniform<f64>,
    bound: f64,
}

impl Mutation {
    pub fn new(cfg: MutationConfig) -> Result<Self> {
        cfg.validate()?;
        let half_step = 0.5 * cfg.step;
        let noise_dist =
            Uniform::new(-half_step, half_step).context("failed to build mutation distribution")?;
        Ok(Self {
            noise_dist,
            bound: cfg.bound,
        })
    }

    /// Return a mutated copy of `weights`.
    pub fn mutate<R: Rng + ?Sized>(&self, weights: &WeightVector, rng: &mut R) -> WeightVector {
        weights
            .0
            .iter()
            .map(|&w| (w + self.noise_dist.sample(rng)).clamp(-self.bound, self.bound))
            .collect::<Vec<_>>()
            .into()
    }
}
