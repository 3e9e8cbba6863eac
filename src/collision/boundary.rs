use crate::core::{
    body::Body,
    types::{ArenaBounds, Bounds},
};

/// Which walls a body touched this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    pub horizontal: bool,
    pub vertical: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }

    pub fn count(&self) -> usize {
        usize::from(self.horizontal) + usize::from(self.vertical)
    }
}

/// Clamps a body into the arena, negating the velocity component of every axis
/// whose wall it reached. Both axes are checked independently.
pub fn reflect_at_bounds(body: &mut Body, arena: &ArenaBounds) -> WallHits {
    WallHits {
        horizontal: reflect_axis(&mut body.position.x, &mut body.velocity.x, arena.x),
        vertical: reflect_axis(&mut body.position.y, &mut body.velocity.y, arena.y),
    }
}

fn reflect_axis(position: &mut f32, velocity: &mut f32, bounds: Bounds) -> bool {
    let clamped = if *position >= bounds.max {
        bounds.max
    } else if *position <= bounds.min {
        bounds.min
    } else {
        return false;
    };
    *position = clamped;
    *velocity = -*velocity;
    true
}
