//! Simulation dynamics: per-body motion pipeline and the worker pool that runs it.

pub mod integrator;
pub mod parallel;

pub use integrator::{Integrator, PartitionOutcome};
pub use parallel::{Collected, WorkItem, WorkOutput, WorkerPool};
