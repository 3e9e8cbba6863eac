use serde::{Deserialize, Serialize};

use crate::error::{Axis, Result, SimError};

/// Common math types re-exported for convenience.
pub use glam::Vec2;

/// Closed interval `[min, max]` along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Symmetric interval `[-extent, extent]`.
    pub fn symmetric(extent: f32) -> Self {
        Self {
            min: -extent,
            max: extent,
        }
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Rejects NaN endpoints and intervals where `min >= max`.
    pub fn validate(&self, axis: Axis) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(SimError::DegenerateBounds {
                axis,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Rectangular region with independent per-axis limits.
///
/// Used both for the arena walls and for the range velocities are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: Bounds,
    pub y: Bounds,
}

impl Rect {
    pub const fn new(x: Bounds, y: Bounds) -> Self {
        Self { x, y }
    }

    /// Square region `[-extent, extent]` on both axes.
    pub fn square(extent: f32) -> Self {
        Self {
            x: Bounds::symmetric(extent),
            y: Bounds::symmetric(extent),
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x.min, self.y.min)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x.max, self.y.max)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }

    pub fn validate(&self) -> Result<()> {
        self.x.validate(Axis::X)?;
        self.y.validate(Axis::Y)
    }
}

/// Walls of the simulation area.
pub type ArenaBounds = Rect;

/// Per-axis range initial velocities are sampled from.
pub type VelocityBounds = Rect;
