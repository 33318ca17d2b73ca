//! Two-layer tanh controller turning sensory input into movement decisions.

use crate::config::EnvironmentConfig;
use crate::senses::{Feature, encode};
use crate::topology::Topology;
use crate::types::{AgentSnapshot, MovementDecision};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use thiserror::Error;

/// Reasons a single agent's decision cannot be computed.
#[derive(Debug, PartialEq, Clone, Error)]
pub enum ThinkError {
    /// The agent's weight vector does not fit the configured topology.
    #[error("expected {expected} weights for the configured topology, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    /// The encoded input does not have one value per topology feature.
    #[error("expected {expected} features for the configured topology, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// An encoded feature came out NaN or infinite.
    #[error("feature `{feature}` is not finite ({value})")]
    NonFiniteFeature { feature: Feature, value: f64 },

    /// An environment scale is zero, negative or not finite.
    #[error("{name} must be finite and positive, but is {value}")]
    InvalidScale { name: &'static str, value: f64 },
}

/// Coarse classification of a [`ThinkError`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// The agent's parameters do not match the network it is run on.
    Configuration,
    /// The sensory state cannot be encoded into finite inputs.
    DegenerateInput,
}

impl ThinkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThinkError::WeightCount { .. } | ThinkError::FeatureCount { .. } => {
                ErrorKind::Configuration
            }
            ThinkError::NonFiniteFeature { .. } | ThinkError::InvalidScale { .. } => {
                ErrorKind::DegenerateInput
            }
        }
    }
}

/// Run the network on already encoded `features`.
///
/// `weights` holds the hidden matrix followed by the output matrix, both
/// row-major. Returns the `tanh` activations of the output layer.
///
/// # Errors
/// Returns [`ThinkError::WeightCount`] or [`ThinkError::FeatureCount`] if
/// either slice does not fit `topology`.
pub fn forward(
    topology: &Topology,
    features: &[f64],
    weights: &[f64],
) -> Result<Vec<f64>, ThinkError> {
    let expected = topology.n_weights();
    if weights.len() != expected {
        return Err(ThinkError::WeightCount {
            expected,
            actual: weights.len(),
        });
    }
    if features.len() != topology.input_size() {
        return Err(ThinkError::FeatureCount {
            expected: topology.input_size(),
            actual: features.len(),
        });
    }

    let (hidden_weights, output_weights) = weights.split_at(topology.n_hidden_weights());
    let hidden = layer(hidden_weights, features);
    Ok(layer(output_weights, &hidden))
}

/// `tanh(matrix . input)` for a row-major matrix with `input.len()` columns.
fn layer(matrix: &[f64], input: &[f64]) -> Vec<f64> {
    matrix
        .chunks_exact(input.len())
        .map(|row| {
            row.iter()
                .zip(input)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                .tanh()
        })
        .collect()
}

/// Decision maker for every agent sharing a topology and environment.
#[derive(Debug, Clone)]
pub struct Controller {
    topology: Topology,
    env: EnvironmentConfig,
}

impl Controller {
    pub fn new(topology: Topology, env: EnvironmentConfig) -> Self {
        Self { topology, env }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn env(&self) -> &EnvironmentConfig {
        &self.env
    }

    /// Decide how `agent` moves this tick.
    ///
    /// `rng` is only drawn from when the topology includes
    /// [`Feature::Noise`]; for a given generator state the result is fully
    /// determined by the snapshot.
    pub fn think<R: Rng + ?Sized>(
        &self,
        agent: &AgentSnapshot,
        rng: &mut R,
    ) -> Result<MovementDecision, ThinkError> {
        let features = encode(self.topology.features(), agent, &self.env, rng)?;
        let output = forward(&self.topology, &features, agent.weights.as_slice())?;
        self.decision(agent.id, &output)
    }

    /// Decide for a whole tick, in parallel.
    ///
    /// The result is index-aligned with `agents`. Agent `i` draws its noise
    /// from stream `i` of a generator seeded with `seed`, so the outcome
    /// does not depend on scheduling. A failing agent only fails its own
    /// slot.
    pub fn think_batch(
        &self,
        agents: &[AgentSnapshot],
        seed: u64,
    ) -> Vec<Result<MovementDecision, ThinkError>> {
        agents
            .par_iter()
            .enumerate()
            .map(|(i_agt, agent)| {
                let mut rng = ChaCha12Rng::seed_from_u64(seed);
                rng.set_stream(i_agt as u64);
                let result = self.think(agent, &mut rng);
                if let Err(error) = &result {
                    log::warn!("agent {} (slot {i_agt}) failed: {error}", agent.id);
                }
                result
            })
            .collect()
    }

    fn decision(&self, id: u64, output: &[f64]) -> Result<MovementDecision, ThinkError> {
        let max_turn_angle = output_scale("max_turn_angle", self.env.max_turn_angle)?;
        let max_speed = output_scale("max_speed", self.env.max_speed)?;

        Ok(MovementDecision {
            id,
            angle_delta: output[0] * max_turn_angle,
            speed: (output[1] + 1.0) / 2.0 * max_speed,
            mate_intent: output.get(2).map(|&raw| (raw + 1.0) / 2.0),
        })
    }
}

fn output_scale(name: &'static str, value: f64) -> Result<f64, ThinkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ThinkError::InvalidScale { name, value })
    }
}
