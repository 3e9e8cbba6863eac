use serde::{Deserialize, Serialize};

use super::types::Vec2;
use crate::config::{DEFAULT_BODY_HEALTH, DEFAULT_BODY_RADIUS};

/// Identifier shared with the presentation layer. Unique across both body sets.
pub type BodyId = i32;

/// Whether a body is an obstacle or takes part in motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Fixed obstacle; velocity is pinned to zero.
    #[default]
    Stationary,
    /// Moves at constant velocity and is collision-checked every frame.
    Moving,
}

/// Per-entity circle state shared between the simulation and the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    id: BodyId,
    pub health: i32,
    kind: BodyKind,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: DEFAULT_BODY_RADIUS,
            id: -1,
            health: DEFAULT_BODY_HEALTH,
            kind: BodyKind::Stationary,
        }
    }
}

impl Body {
    /// Creates an obstacle at `position`.
    pub fn stationary(id: BodyId, position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            id,
            ..Self::default()
        }
    }

    /// Creates a body that travels at `velocity`.
    pub fn moving(id: BodyId, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            id,
            kind: BodyKind::Moving,
            ..Self::default()
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_moving(&self) -> bool {
        self.kind == BodyKind::Moving
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Sum of both radii; two circles overlap when their centres are no farther apart.
    pub fn combined_radius(&self, other: &Body) -> f32 {
        self.radius + other.radius
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.position.distance(other.position) <= self.combined_radius(other)
    }

    /// Turns the body into an obstacle and zeroes its velocity.
    pub fn freeze(&mut self) {
        self.kind = BodyKind::Stationary;
        self.velocity = Vec2::ZERO;
    }
}
