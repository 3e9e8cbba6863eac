use std::time::{Duration, Instant};

use log::debug;
use serde::Serialize;

/// Timing and counters gathered while stepping a single frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    pub frame_time: f32,

    pub sort_time: Duration,
    pub dispatch_time: Duration,
    pub inline_time: Duration,
    pub barrier_time: Duration,
    pub total_time: Duration,

    pub moving_count: usize,
    pub partitions: usize,
    pub contacts: usize,
    pub wall_hits: usize,
}

impl FrameStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        debug!(
            "Frame {} took {:.2} ms (dt {:.4}): {} movers over {} partitions, {} contacts, {} wall hits",
            self.frame,
            self.total_time.as_secs_f32() * 1000.0,
            self.frame_time,
            self.moving_count,
            self.partitions,
            self.contacts,
            self.wall_hits
        );
        debug!(
            "  sort {:.1}% | dispatch {:.1}% | inline {:.1}% | barrier {:.1}%",
            (self.sort_time.as_micros() as f32 / total_us) * 100.0,
            (self.dispatch_time.as_micros() as f32 / total_us) * 100.0,
            (self.inline_time.as_micros() as f32 / total_us) * 100.0,
            (self.barrier_time.as_micros() as f32 / total_us) * 100.0,
        );
    }
}

/// Adds the time spent in a scope onto a duration slot.
pub struct PhaseTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for PhaseTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
