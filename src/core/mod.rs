//! Core types describing simulated circles and the regions they live in.

pub mod body;
pub mod types;

pub use body::{Body, BodyId, BodyKind};
pub use types::{ArenaBounds, Bounds, Rect, Vec2, VelocityBounds};
