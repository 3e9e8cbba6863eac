pub mod scheduler;

use std::{
    ops::Range,
    sync::Arc,
    time::{Duration, Instant},
};

use glam::Vec2;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::{
    collision::broadphase::{sort_by_x, StationaryIndex},
    config::SimulationConfig,
    core::{
        body::{Body, BodyId},
        types::{ArenaBounds, Rect},
    },
    dynamics::{
        integrator::{Integrator, PartitionOutcome},
        parallel::{Collected, WorkItem, WorkOutput, WorkerPool},
    },
    error::{Result, SimError},
    utils::{
        logging::{warn_if_frame_budget_exceeded, ScopedTimer},
        profiling::{FrameStats, PhaseTimer},
    },
};

use self::scheduler::PartitionPlan;

/// Simulation state and per-frame driver.
///
/// Owns the frozen obstacle index, the moving-body arena and the worker pool. Each
/// [`step`](Self::step) is a strict fork/join: sort, partition, dispatch, run the
/// inline partition, then wait for every worker before returning.
pub struct SimulationWorld {
    config: SimulationConfig,
    index: Arc<StationaryIndex>,
    moving: Vec<Body>,
    integrator: Integrator,
    pool: WorkerPool,
    spare_buffers: Vec<Vec<Body>>,
    frame: u64,
    last_stats: FrameStats,
}

impl SimulationWorld {
    /// Validates `config`, scatters bodies uniformly at random and starts the pool.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let (stationary, moving) = populate(&config);
        Self::from_bodies(config, stationary, moving)
    }

    /// Builds a world from hand-placed bodies. Population counts in `config` are
    /// ignored; arena, threading and timeout settings apply.
    pub fn from_bodies(
        config: SimulationConfig,
        stationary: Vec<Body>,
        moving: Vec<Body>,
    ) -> Result<Self> {
        config.validate()?;
        if let Some(body) = stationary
            .iter()
            .chain(&moving)
            .find(|b| !b.radius.is_finite() || b.radius <= 0.0)
        {
            return Err(SimError::InvalidRadius(body.radius));
        }

        let threads = config.effective_worker_count()?;
        let pool = WorkerPool::new(threads - 1)?;
        let index = {
            let _timer = ScopedTimer::new("index::build");
            Arc::new(StationaryIndex::build(stationary))
        };

        info!(
            "Simulation ready: {} stationary, {} moving, {} thread(s) per frame",
            index.len(),
            moving.len(),
            threads
        );

        Ok(Self {
            integrator: Integrator::new(config.arena),
            config,
            index,
            moving,
            pool,
            spare_buffers: Vec::new(),
            frame: 0,
            last_stats: FrameStats::default(),
        })
    }

    /// Advances every moving body by one frame and returns once all partitions
    /// are back.
    ///
    /// A [`SimError::FrameOverrun`] leaves late partitions in flight; the next call
    /// waits for them before starting a new frame.
    pub fn step(&mut self, frame_time: f32) -> Result<FrameStats> {
        if self.pool.is_shut_down() {
            return Err(SimError::PoolShutDown);
        }
        if !frame_time.is_finite() || frame_time < 0.0 {
            return Err(SimError::InvalidFrameTime(frame_time));
        }
        let started = Instant::now();
        self.reclaim()?;

        let mut stats = FrameStats {
            frame: self.frame + 1,
            frame_time,
            moving_count: self.moving.len(),
            ..FrameStats::default()
        };

        {
            let _timer = ScopedTimer::new("frame::sort");
            let _phase = PhaseTimer::new(&mut stats.sort_time);
            sort_by_x(&mut self.moving);
        }

        let plan = PartitionPlan::new(self.moving.len(), self.pool.len());
        stats.partitions = plan.active_partitions();
        {
            let _phase = PhaseTimer::new(&mut stats.dispatch_time);
            let items = plan
                .worker_ranges
                .iter()
                .map(|range| self.work_item(range.clone(), frame_time))
                .collect();
            self.pool.dispatch(items)?;
        }
        self.frame += 1;

        let mut totals = {
            let _timer = ScopedTimer::new("frame::inline");
            let _phase = PhaseTimer::new(&mut stats.inline_time);
            self.integrator
                .step_partition(&self.index, &mut self.moving[plan.inline.clone()], frame_time)
        };

        let collected = {
            let _phase = PhaseTimer::new(&mut stats.barrier_time);
            self.pool.collect(self.config.frame_timeout)
        };
        totals += self.absorb(collected)?;

        stats.contacts = totals.contacts;
        stats.wall_hits = totals.wall_hits;
        stats.total_time = started.elapsed();
        stats.report();
        warn_if_frame_budget_exceeded(stats.frame, stats.total_time, self.config.frame_budget_ms);
        self.last_stats = stats;
        Ok(stats)
    }

    /// `(id, position)` of every body, obstacles first. Only meaningful between
    /// steps.
    pub fn positions(&self) -> impl Iterator<Item = (BodyId, Vec2)> + '_ {
        self.bodies().map(|body| (body.id(), body.position))
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.index.as_slice().iter().chain(&self.moving)
    }

    /// Moving bodies, in the x order of the last frame.
    pub fn moving(&self) -> &[Body] {
        &self.moving
    }

    pub fn stationary(&self) -> &StationaryIndex {
        &self.index
    }

    pub fn arena(&self) -> &ArenaBounds {
        &self.integrator.arena
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Threads taking part in a frame, the calling thread included.
    pub fn thread_count(&self) -> usize {
        self.pool.len() + 1
    }

    /// Frames dispatched so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    pub fn frame_timeout(&self) -> Duration {
        self.config.frame_timeout
    }

    pub fn set_frame_timeout(&mut self, timeout: Duration) {
        self.config.frame_timeout = timeout;
    }

    /// Waits for late partitions (bounded by the frame timeout), then stops and
    /// joins every worker. Further steps fail with [`SimError::PoolShutDown`].
    pub fn shutdown(&mut self) {
        if let Err(err) = self.reclaim() {
            warn!("Shutting down with partitions still in flight: {err}");
        }
        self.pool.shutdown();
    }

    fn work_item(&mut self, range: Range<usize>, frame_time: f32) -> WorkItem {
        let mut bodies = self.spare_buffers.pop().unwrap_or_default();
        bodies.clear();
        bodies.extend_from_slice(&self.moving[range.clone()]);
        WorkItem::new(
            range.start,
            frame_time,
            bodies,
            Arc::clone(&self.index),
            self.integrator,
        )
    }

    /// Copies returned partitions back into the arena. Reports the first worker
    /// failure, or an overrun if anything is still in flight.
    fn absorb(&mut self, collected: Collected) -> Result<PartitionOutcome> {
        let mut totals = PartitionOutcome::default();
        let mut failure = None;
        for output in collected.outputs {
            let WorkOutput {
                start,
                bodies,
                outcome,
                ..
            } = output;
            self.moving[start..start + bodies.len()].copy_from_slice(&bodies);
            self.spare_buffers.push(bodies);
            match outcome {
                Ok(partition) => totals += partition,
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        if collected.pending > 0 {
            warn!(
                "Frame {} overran: {} worker(s) still running after {:?}",
                self.frame, collected.pending, self.config.frame_timeout
            );
            return Err(SimError::FrameOverrun {
                pending: collected.pending,
                timeout: self.config.frame_timeout,
            });
        }
        Ok(totals)
    }

    fn reclaim(&mut self) -> Result<()> {
        if !self.pool.is_busy() {
            return Ok(());
        }
        debug!("Reclaiming partitions from frame {}", self.frame);
        let collected = self.pool.collect(self.config.frame_timeout);
        self.absorb(collected).map(|_| ())
    }
}

fn populate(config: &SimulationConfig) -> (Vec<Body>, Vec<Body>) {
    let seed = config.seed.unwrap_or_else(rand::random);
    debug!("Populating arena with seed {seed}");
    let mut rng = Pcg64::seed_from_u64(seed);

    let stationary = (0..config.stationary_count)
        .map(|i| Body::stationary(i as BodyId, sample(&mut rng, &config.arena), config.radius))
        .collect();

    let offset = config.stationary_count;
    let moving = (0..config.moving_count)
        .map(|i| {
            let position = sample(&mut rng, &config.arena);
            let velocity = sample(&mut rng, &config.velocity);
            Body::moving((offset + i) as BodyId, position, velocity, config.radius)
        })
        .collect();

    (stationary, moving)
}

fn sample<R: Rng>(rng: &mut R, rect: &Rect) -> Vec2 {
    Vec2::new(
        rng.random_range(rect.x.min..rect.x.max),
        rng.random_range(rect.y.min..rect.y.max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(workers: usize) -> SimulationConfig {
        SimulationConfig::builder()
            .stationary_count(40)
            .moving_count(60)
            .arena(Rect::square(500.0))
            .worker_count(workers)
            .seed(11)
            .build()
    }

    #[test]
    fn ids_are_unique_across_sets() {
        let world = SimulationWorld::new(small_config(2)).unwrap();
        let mut ids: Vec<BodyId> = world.positions().map(|(id, _)| id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_scene() {
        let a = SimulationWorld::new(small_config(1)).unwrap();
        let b = SimulationWorld::new(small_config(3)).unwrap();
        assert!(a.positions().eq(b.positions()));
    }

    #[test]
    fn bodies_start_inside_the_arena() {
        let world = SimulationWorld::new(small_config(1)).unwrap();
        assert!(world.bodies().all(|b| world.arena().contains(b.position)));
        assert!(world.moving().iter().all(|b| world.config().velocity.contains(b.velocity)));
    }

    #[test]
    fn step_reports_frame_stats() {
        let mut world = SimulationWorld::new(small_config(4)).unwrap();
        let stats = world.step(1.0).unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.moving_count, 60);
        assert_eq!(world.frame(), 1);
        assert_eq!(world.thread_count(), 4);
        assert_eq!(world.last_stats(), &stats);
    }

    #[test]
    fn step_after_shutdown_fails() {
        let mut world = SimulationWorld::new(small_config(2)).unwrap();
        world.shutdown();
        assert!(matches!(world.step(1.0), Err(SimError::PoolShutDown)));
    }

    #[test]
    fn bad_frame_time_is_rejected_without_touching_bodies() {
        let mut world = SimulationWorld::new(small_config(2)).unwrap();
        let before: Vec<Body> = world.moving().to_vec();
        for dt in [f32::NAN, f32::INFINITY, -1.0] {
            assert!(matches!(world.step(dt), Err(SimError::InvalidFrameTime(_))));
        }
        assert_eq!(world.moving(), &before[..]);
        assert_eq!(world.frame(), 0);

        world.step(0.0).unwrap();
        assert!(world.moving().iter().all(|b| b.position.is_finite()));
    }

    #[test]
    fn invalid_body_radius_is_rejected() {
        let bad = Body::stationary(0, Vec2::ZERO, 0.0);
        let result = SimulationWorld::from_bodies(small_config(1), vec![bad], Vec::new());
        assert!(matches!(result, Err(SimError::InvalidRadius(_))));
    }
}
