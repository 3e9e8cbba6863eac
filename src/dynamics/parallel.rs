//! Persistent worker threads for the per-frame fork/join.
//!
//! Each worker owns a condition-guarded slot cycling through
//! `Idle -> Pending -> Running -> Finished -> Idle`. The frame thread publishes a
//! [`WorkItem`] into the slot, and the worker hands the partition back as a
//! [`WorkOutput`]. Completion is tracked by one atomic countdown the frame thread
//! waits on with a timeout, so a stuck worker becomes a reported overrun instead
//! of a hang.

use std::{
    mem,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};

use crate::{
    collision::broadphase::StationaryIndex,
    core::body::Body,
    error::{Result, SimError},
};

use super::integrator::{Integrator, PartitionOutcome};

/// One partition of the moving set, handed to exactly one worker for one frame.
pub struct WorkItem {
    /// Offset of the partition inside the moving-body arena.
    pub start: usize,
    pub frame_time: f32,
    /// Copy of `arena[start..start + bodies.len()]`.
    pub bodies: Vec<Body>,
    pub index: Arc<StationaryIndex>,
    pub integrator: Integrator,
    /// Makes the partition panic instead of stepping.
    #[cfg(test)]
    pub(crate) fault: bool,
}

impl WorkItem {
    pub fn new(
        start: usize,
        frame_time: f32,
        bodies: Vec<Body>,
        index: Arc<StationaryIndex>,
        integrator: Integrator,
    ) -> Self {
        Self {
            start,
            frame_time,
            bodies,
            index,
            integrator,
            #[cfg(test)]
            fault: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Runs the partition on the current thread. A panic is caught and reported;
    /// the bodies are returned either way.
    pub fn run(self, worker: usize) -> WorkOutput {
        #[cfg(test)]
        let fault = self.fault;
        let WorkItem {
            start,
            frame_time,
            mut bodies,
            index,
            integrator,
            ..
        } = self;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            #[cfg(test)]
            if fault {
                panic!("fault injected into partition at {start}");
            }
            integrator.step_partition(&index, &mut bodies, frame_time)
        }));
        let outcome = result.map_err(|_| {
            error!("Worker {worker} panicked on partition starting at {start}");
            SimError::WorkerPanicked { worker }
        });

        WorkOutput {
            worker,
            start,
            bodies,
            outcome,
        }
    }
}

/// A processed partition on its way back to the arena.
pub struct WorkOutput {
    pub worker: usize,
    pub start: usize,
    pub bodies: Vec<Body>,
    pub outcome: Result<PartitionOutcome>,
}

/// Outputs gathered by [`WorkerPool::collect`] and the number still outstanding.
pub struct Collected {
    pub outputs: Vec<WorkOutput>,
    pub pending: usize,
}

impl Collected {
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

enum SlotState {
    Idle,
    Pending(WorkItem),
    Running,
    Finished(WorkOutput),
}

struct WorkerSlot {
    state: Mutex<SlotState>,
    available: Condvar,
}

/// Countdown the frame thread blocks on until every dispatched worker reports.
struct CompletionLatch {
    pending: AtomicUsize,
    lock: Mutex<()>,
    done: Condvar,
}

impl CompletionLatch {
    fn new() -> Self {
        Self {
            pending: AtomicUsize::new(0),
            lock: Mutex::new(()),
            done: Condvar::new(),
        }
    }

    fn arm(&self, count: usize) {
        self.pending.store(count, Ordering::Release);
    }

    fn count_down(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = self.lock.lock();
            self.done.notify_all();
        }
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Waits until the count reaches zero or `timeout` elapses. Returns whether it
    /// reached zero.
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        while self.pending() != 0 {
            if self.done.wait_until(&mut guard, deadline).timed_out() {
                return self.pending() == 0;
            }
        }
        true
    }
}

struct Shared {
    slots: Box<[WorkerSlot]>,
    latch: CompletionLatch,
    shutting_down: AtomicBool,
}

/// Fixed set of persistent worker threads with joinable handles.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    in_flight: usize,
    shut_down: bool,
}

impl WorkerPool {
    /// Spawns `workers` background threads. Zero is allowed: every frame then runs
    /// inline on the calling thread.
    pub fn new(workers: usize) -> Result<Self> {
        let slots = (0..workers)
            .map(|_| WorkerSlot {
                state: Mutex::new(SlotState::Idle),
                available: Condvar::new(),
            })
            .collect();
        let shared = Arc::new(Shared {
            slots,
            latch: CompletionLatch::new(),
            shutting_down: AtomicBool::new(false),
        });

        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(workers),
            in_flight: 0,
            shut_down: false,
        };
        for worker in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("sweep-worker-{worker}"))
                .spawn(move || worker_loop(worker, &shared))
                .map_err(SimError::WorkerSpawn)?;
            pool.handles.push(handle);
        }
        info!("Worker pool started with {workers} background thread(s)");
        Ok(pool)
    }

    /// Number of background threads.
    pub fn len(&self) -> usize {
        self.shared.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether partitions from an earlier dispatch have not been collected yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Publishes `items[i]` to worker `i` and wakes it. Empty items are not sent.
    pub fn dispatch(&mut self, items: Vec<WorkItem>) -> Result<usize> {
        if self.shut_down {
            return Err(SimError::PoolShutDown);
        }
        debug_assert!(!self.is_busy(), "previous frame not collected");
        debug_assert!(items.len() <= self.len());

        let work: Vec<(usize, WorkItem)> = items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_empty())
            .collect();
        self.shared.latch.arm(work.len());
        self.in_flight = work.len();

        for (worker, item) in work {
            let slot = &self.shared.slots[worker];
            *slot.state.lock() = SlotState::Pending(item);
            slot.available.notify_one();
        }
        Ok(self.in_flight)
    }

    /// Waits up to `timeout` for dispatched workers, then takes every finished
    /// partition. Unfinished ones stay in flight for a later call.
    pub fn collect(&mut self, timeout: Duration) -> Collected {
        if self.in_flight == 0 {
            return Collected {
                outputs: Vec::new(),
                pending: 0,
            };
        }

        self.shared.latch.wait(timeout);

        let mut outputs = Vec::with_capacity(self.in_flight);
        for slot in self.shared.slots.iter() {
            let mut state = slot.state.lock();
            match mem::replace(&mut *state, SlotState::Idle) {
                SlotState::Finished(output) => outputs.push(output),
                other => *state = other,
            }
        }
        self.in_flight -= outputs.len();
        Collected {
            outputs,
            pending: self.in_flight,
        }
    }

    /// Stops every worker and joins its thread. Partitions still in flight are
    /// discarded; collect them first to keep their bodies.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.shared.shutting_down.store(true, Ordering::Release);
        for slot in self.shared.slots.iter() {
            let _state = slot.state.lock();
            slot.available.notify_all();
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread terminated abnormally");
            }
        }
        self.in_flight = 0;
        info!("Worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(worker: usize, shared: &Shared) {
    debug!("Worker {worker} idle");
    let slot = &shared.slots[worker];
    loop {
        let item = {
            let mut state = slot.state.lock();
            loop {
                if shared.shutting_down.load(Ordering::Acquire) {
                    debug!("Worker {worker} exiting");
                    return;
                }
                match mem::replace(&mut *state, SlotState::Running) {
                    SlotState::Pending(item) => break item,
                    other => {
                        *state = other;
                        slot.available.wait(&mut state);
                    }
                }
            }
        };

        let output = item.run(worker);

        // Publish and count down under one guard so `collect` never takes an
        // output whose count is still outstanding.
        let mut state = slot.state.lock();
        *state = SlotState::Finished(output);
        shared.latch.count_down();
    }
}
