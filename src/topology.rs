//! Network shape: which sensory features feed the network, in what order,
//! and how many hidden and output neurons it has.

use crate::senses::Feature;
use crate::utils::check_num;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Historical network layouts.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 5 grid-normalized inputs, 6 hidden, 2 outputs.
    Forager,
    /// 17 inputs (no sex or mate senses), 9 hidden, 2 outputs.
    Wanderer,
    /// 21 inputs, 9 hidden, 3 outputs.
    Full,
}

/// Validated network topology.
///
/// The weight vector of an agent is laid out as the hidden matrix
/// (`hidden_size x input_size`, row-major) followed by the output matrix
/// (`output_size x hidden_size`, row-major).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(try_from = "TopologyTable", into = "TopologyTable")]
pub struct Topology {
    features: Vec<Feature>,
    hidden_size: usize,
    output_size: usize,
}

impl Topology {
    /// Build a topology from an ordered feature list and layer sizes.
    ///
    /// # Errors
    /// Returns an error if the feature list is empty or has duplicates,
    /// or if the layer sizes are out of range.
    pub fn new(features: Vec<Feature>, hidden_size: usize, output_size: usize) -> Result<Self> {
        if features.is_empty() {
            bail!("feature list must not be empty");
        }
        let mut seen = HashSet::with_capacity(features.len());
        for feature in &features {
            if !seen.insert(feature) {
                bail!("feature {feature} is listed more than once");
            }
        }
        check_num(hidden_size, 1..=256).context("invalid hidden size")?;
        check_num(output_size, 2..=3).context("invalid output size")?;

        Ok(Self {
            features,
            hidden_size,
            output_size,
        })
    }

    pub fn preset(preset: Preset) -> Self {
        use Feature::*;
        let (features, hidden_size, output_size) = match preset {
            Preset::Forager => (
                vec![NearestFoodX, NearestFoodY, EnergyLevel, MoveX, MoveY],
                6,
                2,
            ),
            Preset::Wanderer => {
                let mut features = Feature::FULL[..16].to_vec();
                features.push(Bias);
                (features, 9, 2)
            }
            Preset::Full => (Feature::FULL.to_vec(), 9, 3),
        };
        Self {
            features,
            hidden_size,
            output_size,
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn input_size(&self) -> usize {
        self.features.len()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Number of weights in the hidden matrix.
    pub fn n_hidden_weights(&self) -> usize {
        self.hidden_size * self.input_size()
    }

    /// Number of weights in the output matrix.
    pub fn n_output_weights(&self) -> usize {
        self.output_size * self.hidden_size
    }

    /// Total length of a weight vector for this topology.
    pub fn n_weights(&self) -> usize {
        self.n_hidden_weights() + self.n_output_weights()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::preset(Preset::Full)
    }
}

/// Serialized form of a [`Topology`].
///
/// Either name a `preset`, or list `features` explicitly. Sizes fall back
/// to the preset's sizes (the full preset when nothing is named).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopologyTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preset: Option<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    features: Option<Vec<Feature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hidden_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_size: Option<usize>,
}

impl TryFrom<TopologyTable> for Topology {
    type Error = anyhow::Error;

    fn try_from(table: TopologyTable) -> Result<Self> {
        let base = Topology::preset(table.preset.unwrap_or(Preset::Full));
        Topology::new(
            table.features.unwrap_or(base.features),
            table.hidden_size.unwrap_or(base.hidden_size),
            table.output_size.unwrap_or(base.output_size),
        )
    }
}

impl From<Topology> for TopologyTable {
    fn from(topology: Topology) -> Self {
        Self {
            preset: None,
            features: Some(topology.features),
            hidden_size: Some(topology.hidden_size),
            output_size: Some(topology.output_size),
        }
    }
}
