//! Global configuration constants and the simulation configuration record.

use std::{num::NonZeroUsize, path::Path, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    core::types::{ArenaBounds, Rect, VelocityBounds},
    error::{Result, SimError},
};

/// Half-width of the default square arena.
pub const DEFAULT_ARENA_EXTENT: f32 = 5000.0;

/// Largest initial speed along either axis.
pub const DEFAULT_VELOCITY_LIMIT: f32 = 50.0;

/// Radius given to every generated body.
pub const DEFAULT_BODY_RADIUS: f32 = 10.0;

/// Starting health tag of a body.
pub const DEFAULT_BODY_HEALTH: i32 = 100;

/// Default total population, split evenly between obstacles and movers.
pub const DEFAULT_BODY_COUNT: usize = 7500;

/// Upper bound on threads taking part in a frame.
pub const MAX_WORKERS: usize = 32;

/// Extra distance added when pushing a body out of an obstacle so it does not
/// re-trigger on the next frame.
pub const SEPARATION_BIAS: f32 = 0.1;

/// How long the frame thread waits for workers before reporting an overrun.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Frame duration above which a warning is logged (60 Hz).
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 1000.0 / 60.0;

/// Everything needed to populate and run a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub stationary_count: usize,
    pub moving_count: usize,
    pub arena: ArenaBounds,
    pub velocity: VelocityBounds,
    pub radius: f32,
    /// Threads taking part in a frame, the calling thread included.
    /// `None` uses the available hardware parallelism.
    pub worker_count: Option<usize>,
    /// Seed for body placement; `None` draws one from the OS.
    pub seed: Option<u64>,
    #[serde(with = "duration_millis")]
    pub frame_timeout: Duration,
    pub frame_budget_ms: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let stationary_count = DEFAULT_BODY_COUNT / 2;
        Self {
            stationary_count,
            moving_count: DEFAULT_BODY_COUNT - stationary_count,
            arena: Rect::square(DEFAULT_ARENA_EXTENT),
            velocity: Rect::square(DEFAULT_VELOCITY_LIMIT),
            radius: DEFAULT_BODY_RADIUS,
            worker_count: None,
            seed: None,
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
        }
    }
}

impl SimulationConfig {
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Parses a JSON document; missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(SimError::ConfigIo)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the configuration without touching any threads.
    pub fn validate(&self) -> Result<()> {
        self.arena.validate()?;
        self.velocity.validate()?;
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SimError::InvalidRadius(self.radius));
        }
        if let Some(0) = self.worker_count {
            return Err(SimError::InvalidWorkerCount(0));
        }
        Ok(())
    }

    /// Resolves the number of threads used per frame, clamped to [`MAX_WORKERS`].
    pub fn effective_worker_count(&self) -> Result<usize> {
        let requested = match self.worker_count {
            Some(0) => return Err(SimError::InvalidWorkerCount(0)),
            Some(count) => count,
            None => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(8),
        };
        if requested > MAX_WORKERS {
            warn!("Requested {requested} workers, clamping to {MAX_WORKERS}");
            return Ok(MAX_WORKERS);
        }
        Ok(requested)
    }
}

/// Fluent construction of a [`SimulationConfig`].
#[derive(Debug, Clone, Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    pub fn stationary_count(mut self, count: usize) -> Self {
        self.config.stationary_count = count;
        self
    }

    pub fn moving_count(mut self, count: usize) -> Self {
        self.config.moving_count = count;
        self
    }

    pub fn arena(mut self, arena: ArenaBounds) -> Self {
        self.config.arena = arena;
        self
    }

    pub fn velocity(mut self, velocity: VelocityBounds) -> Self {
        self.config.velocity = velocity;
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.config.radius = radius;
        self
    }

    pub fn worker_count(mut self, workers: usize) -> Self {
        self.config.worker_count = Some(workers);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn frame_timeout(mut self, timeout: Duration) -> Self {
        self.config.frame_timeout = timeout;
        self
    }

    pub fn frame_budget_ms(mut self, budget: f32) -> Self {
        self.config.frame_budget_ms = budget;
        self
    }

    pub fn build(self) -> SimulationConfig {
        self.config
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
