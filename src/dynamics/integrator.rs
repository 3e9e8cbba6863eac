use std::ops::AddAssign;

use crate::{
    collision::{
        boundary::reflect_at_bounds,
        broadphase::{sweep_and_resolve, StationaryIndex},
    },
    core::{body::Body, types::ArenaBounds},
};

/// Counters produced by advancing a run of moving bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionOutcome {
    pub bodies: usize,
    pub contacts: usize,
    pub wall_hits: usize,
}

impl AddAssign for PartitionOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.bodies += rhs.bodies;
        self.contacts += rhs.contacts;
        self.wall_hits += rhs.wall_hits;
    }
}

/// Steps moving bodies: constant-velocity motion, obstacle sweep, then walls.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub arena: ArenaBounds,
}

impl Integrator {
    pub fn new(arena: ArenaBounds) -> Self {
        Self { arena }
    }

    pub fn integrate_position(&self, body: &mut Body, dt: f32) {
        if !body.is_moving() {
            return;
        }
        body.position += body.velocity * dt;
    }

    /// Full per-body frame update. Only ever touches `body`.
    pub fn advance(&self, index: &StationaryIndex, body: &mut Body, dt: f32) -> PartitionOutcome {
        if !body.is_moving() {
            return PartitionOutcome::default();
        }
        self.integrate_position(body, dt);
        let contacts = sweep_and_resolve(index, body);
        let walls = reflect_at_bounds(body, &self.arena);
        PartitionOutcome {
            bodies: 1,
            contacts,
            wall_hits: walls.count(),
        }
    }

    pub fn step_partition(
        &self,
        index: &StationaryIndex,
        bodies: &mut [Body],
        dt: f32,
    ) -> PartitionOutcome {
        let mut outcome = PartitionOutcome::default();
        for body in bodies.iter_mut() {
            outcome += self.advance(index, body, dt);
        }
        outcome
    }
}
