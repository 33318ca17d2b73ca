//! Decision making for grid-world creatures.
//!
//! Each tick, an [`AgentSnapshot`] is encoded into a fixed-order feature
//! vector ([`senses`]), fed through a two-layer tanh network
//! ([`brain`]) parameterized by the agent's own [`WeightVector`], and mapped
//! to a [`MovementDecision`]. New weight vectors come from
//! [`init_weights`] and [`Mutation`].

pub mod brain;
pub mod config;
pub mod geometry;
pub mod manager;
pub mod senses;
pub mod topology;
pub mod types;
pub mod weights;

mod utils;

pub use brain::{Controller, ErrorKind, ThinkError};
pub use config::{Config, EnvironmentConfig};
pub use geometry::Point;
pub use senses::Feature;
pub use topology::{Preset, Topology};
pub use types::{AgentSnapshot, MovementDecision, Neighbor, Sex};
pub use weights::{Mutation, MutationConfig, WeightVector, init_weights};
