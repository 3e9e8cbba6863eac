//! Error types for the simulation core.
//!
//! Every fallible operation returns [`SimError`] through the [`Result`] alias.
//! Configuration problems surface from `initialize`, frame-level problems from `step`.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Axis an invalid interval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Main error type for the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Fewer than one thread was requested for the frame.
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    /// An arena or velocity interval is empty, inverted or not finite.
    #[error("degenerate bounds on {axis} axis: min {min} must be below max {max}")]
    DegenerateBounds { axis: Axis, min: f32, max: f32 },

    /// A body radius was zero, negative or not finite.
    #[error("body radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    /// A frame was stepped with a negative or non-finite time step.
    #[error("frame time must be finite and non-negative, got {0}")]
    InvalidFrameTime(f32),

    /// Some workers did not report completion within the frame timeout.
    ///
    /// Recoverable: the next `step` reclaims their partitions before dispatching.
    #[error("frame overrun: {pending} worker(s) still running after {timeout:?}")]
    FrameOverrun { pending: usize, timeout: Duration },

    /// A worker panicked while processing its partition.
    #[error("worker {worker} panicked while processing its partition")]
    WorkerPanicked { worker: usize },

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[source] std::io::Error),

    /// Work was submitted after the pool was shut down.
    #[error("worker pool has been shut down")]
    PoolShutDown,

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenient Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
