//! Sphere Sweep – parallel circle collision engine for Rust.
//!
//! Thousands of circles move at constant velocity inside a walled arena and bounce
//! off a frozen set of obstacles. Every frame the moving set is sorted by x, split
//! across a fixed pool of worker threads plus the calling thread, and each body is
//! swept against an x-sorted obstacle index before being reflected off the walls.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    boundary::{reflect_at_bounds, WallHits},
    broadphase::{sweep_and_resolve, StationaryIndex},
    contact::Resolution,
    narrowphase::resolve,
};
pub use config::SimulationConfig;
pub use crate::core::{
    body::{Body, BodyId, BodyKind},
    types::{ArenaBounds, Bounds, Rect, VelocityBounds},
};
pub use dynamics::{integrator::Integrator, parallel::WorkerPool};
pub use error::{Result, SimError};
pub use utils::profiling::FrameStats;
pub use world::SimulationWorld;

/// The state handed to the presentation layer.
pub type SimulationState = SimulationWorld;

/// Scatters `static_count` obstacles and `moving_count` movers uniformly inside
/// `arena`, with velocities drawn from `velocity`, and starts `worker_count`
/// threads per frame (the calling thread included).
pub fn initialize(
    static_count: usize,
    moving_count: usize,
    arena: ArenaBounds,
    velocity: VelocityBounds,
    worker_count: usize,
) -> Result<SimulationState> {
    let config = SimulationConfig::builder()
        .stationary_count(static_count)
        .moving_count(moving_count)
        .arena(arena)
        .velocity(velocity)
        .worker_count(worker_count)
        .build();
    SimulationWorld::new(config)
}
