//! Collision detection and response: sorted obstacle index, sweep, resolver, walls.

pub mod boundary;
pub mod broadphase;
pub mod contact;
pub mod narrowphase;

pub use boundary::{reflect_at_bounds, WallHits};
pub use broadphase::{sweep_and_resolve, StationaryIndex};
pub use contact::Resolution;
pub use narrowphase::resolve;
