//! Planar vector and angle helpers used by the sensory encoder.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2, TAU};

/// Point (or displacement) on the simulation grid.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Wrap an angle onto the circle, returning a value in `[-pi, pi)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Unit vector pointing toward (or away from, if `repel`) a set of targets.
///
/// Each target contributes its displacement scaled by the inverse square of
/// its distance, so nearer targets dominate. Targets sitting exactly on the
/// origin are skipped. Returns the zero vector if nothing contributes;
/// non-finite coordinates yield NaN components.
pub fn influence_vector(origin: Point, targets: &[Point], repel: bool) -> (f64, f64) {
    let mut vx = 0.0;
    let mut vy = 0.0;
    for target in targets {
        let (dx, dy) = if repel {
            (origin.x - target.x, origin.y - target.y)
        } else {
            (target.x - origin.x, target.y - origin.y)
        };
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > 0.0 {
            vx += dx / dist_sq;
            vy += dy / dist_sq;
        }
    }

    let norm = vx.hypot(vy);
    if norm == 0.0 {
        (0.0, 0.0)
    } else {
        (vx / norm, vy / norm)
    }
}

/// Heading of `(vx, vy)` relative to `orientation`, scaled to `[-1, 1]`,
/// and its length over `sqrt(2)`, clipped to `[0, 1]`.
pub fn angle_and_magnitude(vx: f64, vy: f64, orientation: f64) -> (f64, f64) {
    if vx == 0.0 && vy == 0.0 {
        return (0.0, 0.0);
    }
    let rel_angle = wrap_angle(vy.atan2(vx) - orientation);
    let magnitude = (vx.hypot(vy) / SQRT_2).clamp(0.0, 1.0);
    (rel_angle / PI, magnitude)
}

pub fn angle_delta(current: f64, previous: f64) -> f64 {
    wrap_angle(current - previous) / PI
}

/// Displacement between the oldest and newest point of `path`, squashed
/// per component with `tanh(d / visibility_radius)`.
pub fn net_movement_vector(path: &[Point], visibility_radius: f64) -> (f64, f64) {
    if path.len() < 2 {
        return (0.0, 0.0);
    }
    let first = path[0];
    let last = path[path.len() - 1];
    let dx = last.x - first.x;
    let dy = last.y - first.y;
    (
        (dx / visibility_radius).tanh(),
        (dy / visibility_radius).tanh(),
    )
}
