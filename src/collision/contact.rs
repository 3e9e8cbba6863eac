use glam::Vec2;

use crate::core::body::{Body, BodyId};

/// Post-collision state computed for a moving body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Obstacle that was hit.
    pub stationary: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Overlap of the two circles before the push-out.
    pub penetration: f32,
}

impl Resolution {
    /// Writes the new position and velocity into `body`.
    pub fn apply(&self, body: &mut Body) {
        body.position = self.position;
        body.velocity = self.velocity;
    }
}
