//! Sensory encoding.
//!
//! A network's inputs are an ordered list of named [`Feature`]s. The weight
//! matrices are keyed to that order, so reordering features invalidates
//! every weight vector trained on the old order.

use crate::brain::ThinkError;
use crate::config::EnvironmentConfig;
use crate::geometry::{
    Point, angle_and_magnitude, angle_delta, influence_vector, net_movement_vector, wrap_angle,
};
use crate::types::{AgentSnapshot, Sex};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::{PI, SQRT_2},
    fmt,
};

/// A single named network input.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// `2 * energy / max_energy - 1`.
    EnergyLevel,
    /// Energy change since the previous tick over `max_energy`, in `[-1, 1]`.
    EnergyDelta,
    /// `1` right after reproducing, `-1` otherwise.
    JustReproduced,
    FoodAngle,
    FoodMagnitude,
    ObstacleAngle,
    ObstacleMagnitude,
    CreatureAngle,
    CreatureMagnitude,
    NetMovementAngle,
    NetMovementMagnitude,
    /// Heading change since the previous tick over `pi`.
    AngularVelocity,
    RecentMoveAngle,
    RecentMoveMagnitude,
    WanderAngle,
    WanderMagnitude,
    /// `energy / max_energy` in `[0, 1]`.
    EnergyFraction,
    /// `1` for females, `-1` otherwise.
    SexFlag,
    MateAngle,
    MateDistance,
    /// Constant `1`.
    Bias,
    /// Uniform in `[-1, 1]`, drawn from the agent's generator.
    Noise,
    /// Grid-normalized offset to the nearest food item.
    NearestFoodX,
    NearestFoodY,
    /// Grid-normalized displacement since the previous tick.
    MoveX,
    MoveY,
}

impl Feature {
    /// The 21 inputs of the full network, in order.
    pub const FULL: [Feature; 21] = [
        Feature::EnergyLevel,
        Feature::EnergyDelta,
        Feature::JustReproduced,
        Feature::FoodAngle,
        Feature::FoodMagnitude,
        Feature::ObstacleAngle,
        Feature::ObstacleMagnitude,
        Feature::CreatureAngle,
        Feature::CreatureMagnitude,
        Feature::NetMovementAngle,
        Feature::NetMovementMagnitude,
        Feature::AngularVelocity,
        Feature::RecentMoveAngle,
        Feature::RecentMoveMagnitude,
        Feature::WanderAngle,
        Feature::WanderMagnitude,
        Feature::EnergyFraction,
        Feature::SexFlag,
        Feature::MateAngle,
        Feature::MateDistance,
        Feature::Bias,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::EnergyLevel => "energy_level",
            Feature::EnergyDelta => "energy_delta",
            Feature::JustReproduced => "just_reproduced",
            Feature::FoodAngle => "food_angle",
            Feature::FoodMagnitude => "food_magnitude",
            Feature::ObstacleAngle => "obstacle_angle",
            Feature::ObstacleMagnitude => "obstacle_magnitude",
            Feature::CreatureAngle => "creature_angle",
            Feature::CreatureMagnitude => "creature_magnitude",
            Feature::NetMovementAngle => "net_movement_angle",
            Feature::NetMovementMagnitude => "net_movement_magnitude",
            Feature::AngularVelocity => "angular_velocity",
            Feature::RecentMoveAngle => "recent_move_angle",
            Feature::RecentMoveMagnitude => "recent_move_magnitude",
            Feature::WanderAngle => "wander_angle",
            Feature::WanderMagnitude => "wander_magnitude",
            Feature::EnergyFraction => "energy_fraction",
            Feature::SexFlag => "sex_flag",
            Feature::MateAngle => "mate_angle",
            Feature::MateDistance => "mate_distance",
            Feature::Bias => "bias",
            Feature::Noise => "noise",
            Feature::NearestFoodX => "nearest_food_x",
            Feature::NearestFoodY => "nearest_food_y",
            Feature::MoveX => "move_x",
            Feature::MoveY => "move_y",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode `agent` into one value per entry of `features`.
///
/// Only [`Feature::Noise`] consumes randomness, one draw per occurrence.
///
/// # Errors
/// Returns [`ThinkError::InvalidScale`] if a selected feature divides by an
/// environment scale that is not finite and positive, and
/// [`ThinkError::NonFiniteFeature`] if any encoded value is NaN or infinite.
pub fn encode<R: Rng + ?Sized>(
    features: &[Feature],
    agent: &AgentSnapshot,
    env: &EnvironmentConfig,
    rng: &mut R,
) -> Result<Vec<f64>, ThinkError> {
    let mut senses = Senses::new(agent, env);
    let mut values = Vec::with_capacity(features.len());
    for &feature in features {
        let value = senses.produce(feature, rng)?;
        if !value.is_finite() {
            return Err(ThinkError::NonFiniteFeature { feature, value });
        }
        values.push(value);
    }
    Ok(values)
}

/// Lazily computed intermediate quantities shared between paired features.
struct Senses<'a> {
    agent: &'a AgentSnapshot,
    env: &'a EnvironmentConfig,
    food: Option<(f64, f64)>,
    obstacles: Option<(f64, f64)>,
    creatures: Option<(f64, f64)>,
    net_movement: Option<(f64, f64)>,
    recent_move: Option<(f64, f64)>,
    mate: Option<(f64, f64)>,
}

impl<'a> Senses<'a> {
    fn new(agent: &'a AgentSnapshot, env: &'a EnvironmentConfig) -> Self {
        Self {
            agent,
            env,
            food: None,
            obstacles: None,
            creatures: None,
            net_movement: None,
            recent_move: None,
            mate: None,
        }
    }

    fn produce<R: Rng + ?Sized>(
        &mut self,
        feature: Feature,
        rng: &mut R,
    ) -> Result<f64, ThinkError> {
        let agent = self.agent;
        let value = match feature {
            Feature::EnergyLevel => {
                let max_energy = scale("max_energy", self.env.max_energy)?;
                2.0 * (agent.energy / max_energy) - 1.0
            }
            Feature::EnergyDelta => {
                let max_energy = scale("max_energy", self.env.max_energy)?;
                ((agent.energy - agent.prev_energy) / max_energy).clamp(-1.0, 1.0)
            }
            Feature::JustReproduced => flag(agent.just_reproduced),
            Feature::FoodAngle => self.food().0,
            Feature::FoodMagnitude => self.food().1,
            Feature::ObstacleAngle => self.obstacles().0,
            Feature::ObstacleMagnitude => self.obstacles().1,
            Feature::CreatureAngle => self.creatures().0,
            Feature::CreatureMagnitude => self.creatures().1,
            Feature::NetMovementAngle => self.net_movement()?.0,
            Feature::NetMovementMagnitude => self.net_movement()?.1,
            Feature::AngularVelocity => angle_delta(agent.angle, agent.prev_angle),
            Feature::RecentMoveAngle => self.recent_move().0,
            Feature::RecentMoveMagnitude => self.recent_move().1,
            Feature::WanderAngle => wrap_angle(agent.wander_angle - agent.angle) / PI,
            Feature::WanderMagnitude => (agent.wander_strength / SQRT_2).clamp(0.0, 1.0),
            Feature::EnergyFraction => {
                let max_energy = scale("max_energy", self.env.max_energy)?;
                (agent.energy / max_energy).clamp(0.0, 1.0)
            }
            Feature::SexFlag => flag(agent.sex == Sex::Female),
            Feature::MateAngle => self.mate().0,
            Feature::MateDistance => self.mate().1,
            Feature::Bias => 1.0,
            Feature::Noise => rng.random_range(-1.0..=1.0),
            Feature::NearestFoodX => {
                let grid_size = scale("grid_size", self.env.grid_size)?;
                agent
                    .nearest_food()
                    .map_or(0.0, |food| 2.0 * (food.x - agent.x) / grid_size)
            }
            Feature::NearestFoodY => {
                let grid_size = scale("grid_size", self.env.grid_size)?;
                agent
                    .nearest_food()
                    .map_or(0.0, |food| 2.0 * (food.y - agent.y) / grid_size)
            }
            Feature::MoveX => {
                let grid_size = scale("grid_size", self.env.grid_size)?;
                2.0 * (agent.x - agent.prev_x) / grid_size
            }
            Feature::MoveY => {
                let grid_size = scale("grid_size", self.env.grid_size)?;
                2.0 * (agent.y - agent.prev_y) / grid_size
            }
        };
        Ok(value)
    }

    fn food(&mut self) -> (f64, f64) {
        let agent = self.agent;
        *self.food.get_or_insert_with(|| {
            let (vx, vy) = influence_vector(agent.position(), &agent.food, false);
            angle_and_magnitude(vx, vy, agent.angle)
        })
    }

    fn obstacles(&mut self) -> (f64, f64) {
        let agent = self.agent;
        *self.obstacles.get_or_insert_with(|| {
            let (vx, vy) = influence_vector(agent.position(), &agent.obstacles, true);
            angle_and_magnitude(vx, vy, agent.angle)
        })
    }

    fn creatures(&mut self) -> (f64, f64) {
        let agent = self.agent;
        *self.creatures.get_or_insert_with(|| {
            let positions: Vec<Point> = agent.creatures.iter().map(|c| c.position()).collect();
            let (vx, vy) = influence_vector(agent.position(), &positions, true);
            angle_and_magnitude(vx, vy, agent.angle)
        })
    }

    fn net_movement(&mut self) -> Result<(f64, f64), ThinkError> {
        if let Some(cached) = self.net_movement {
            return Ok(cached);
        }
        let radius = scale("visibility_radius", self.env.visibility_radius)?;
        let (vx, vy) = net_movement_vector(&self.agent.recent_path, radius);
        let encoded = angle_and_magnitude(vx, vy, self.agent.angle);
        self.net_movement = Some(encoded);
        Ok(encoded)
    }

    fn recent_move(&mut self) -> (f64, f64) {
        let agent = self.agent;
        *self.recent_move.get_or_insert_with(|| {
            angle_and_magnitude(agent.x - agent.prev_x, agent.y - agent.prev_y, agent.angle)
        })
    }

    fn mate(&mut self) -> (f64, f64) {
        let agent = self.agent;
        *self.mate.get_or_insert_with(|| match agent.nearest_mate() {
            Some(mate) => angle_and_magnitude(mate.x - agent.x, mate.y - agent.y, agent.angle),
            None => (0.0, 0.0),
        })
    }
}

fn flag(on: bool) -> f64 {
    if on { 1.0 } else { -1.0 }
}

fn scale(name: &'static str, value: f64) -> Result<f64, ThinkError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ThinkError::InvalidScale { name, value })
    }
}
