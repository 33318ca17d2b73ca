//! Per-tick agent snapshots and the decisions returned for them.

use crate::geometry::Point;
use crate::weights::WeightVector;
use serde::{Deserialize, Serialize};

/// Sex of an agent, `Unknown` when the simulation does not track it.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[default]
    Unknown,
}

impl Sex {
    /// Whether an agent of this sex can mate with one of sex `other`.
    pub fn is_opposite(self, other: Sex) -> bool {
        matches!(
            (self, other),
            (Sex::Female, Sex::Male) | (Sex::Male, Sex::Female)
        )
    }
}

/// Another agent within visibility range.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Neighbor {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub sex: Sex,
}

impl Neighbor {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Everything a single agent perceives at one tick.
///
/// Built by the simulation once per tick. Visibility filtering has already
/// been applied to `food`, `obstacles` and `creatures`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub id: u64,

    pub x: f64,
    pub y: f64,
    /// Heading in radians.
    pub angle: f64,
    pub energy: f64,

    pub prev_x: f64,
    pub prev_y: f64,
    pub prev_angle: f64,
    pub prev_energy: f64,

    #[serde(default)]
    pub just_reproduced: bool,
    #[serde(default)]
    pub sex: Sex,

    #[serde(default)]
    pub wander_angle: f64,
    #[serde(default)]
    pub wander_strength: f64,

    /// Recent positions, oldest first.
    #[serde(default)]
    pub recent_path: Vec<Point>,

    #[serde(default)]
    pub food: Vec<Point>,
    #[serde(default)]
    pub obstacles: Vec<Point>,
    #[serde(default)]
    pub creatures: Vec<Neighbor>,

    pub weights: WeightVector,
}

impl AgentSnapshot {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn prev_position(&self) -> Point {
        Point::new(self.prev_x, self.prev_y)
    }

    /// Closest visible agent this one could mate with.
    pub fn nearest_mate(&self) -> Option<&Neighbor> {
        let origin = self.position();
        self.creatures
            .iter()
            .filter(|other| self.sex.is_opposite(other.sex))
            .min_by(|a, b| {
                let dist_a = origin.dist_sq(&a.position());
                let dist_b = origin.dist_sq(&b.position());
                dist_a.total_cmp(&dist_b)
            })
    }

    /// Closest visible food item.
    pub fn nearest_food(&self) -> Option<&Point> {
        let origin = self.position();
        self.food
            .iter()
            .min_by(|a, b| origin.dist_sq(a).total_cmp(&origin.dist_sq(b)))
    }
}

/// Movement and behavior chosen for one agent.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDecision {
    /// Id of the agent this decision belongs to.
    pub id: u64,
    /// Heading change in radians, within `[-max_turn_angle, max_turn_angle]`.
    pub angle_delta: f64,
    /// Within `[0, max_speed]`.
    pub speed: f64,
    /// Within `[0, 1]`, only for networks with three outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate_intent: Option<f64>,
}
