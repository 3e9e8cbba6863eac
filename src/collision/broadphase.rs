use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::body::Body;

use super::{contact::Resolution, narrowphase};

/// Orders bodies by ascending x, NaN last.
pub fn cmp_by_x(a: &Body, b: &Body) -> Ordering {
    a.position.x.total_cmp(&b.position.x)
}

/// Sorts a body set by x. Stable, so nearly sorted frames stay cheap.
pub fn sort_by_x(bodies: &mut [Body]) {
    #[cfg(feature = "parallel")]
    bodies.par_sort_by(cmp_by_x);
    #[cfg(not(feature = "parallel"))]
    bodies.sort_by(cmp_by_x);
}

/// Obstacles sorted by x, frozen once built.
///
/// Nothing can move or insert an obstacle after construction, so the index is read
/// concurrently by every worker without locking.
#[derive(Debug, Clone, Default)]
pub struct StationaryIndex {
    bodies: Box<[Body]>,
    max_radius: f32,
}

impl StationaryIndex {
    /// Sorts `bodies` by x and pins their velocities to zero.
    pub fn build(mut bodies: Vec<Body>) -> Self {
        for body in &mut bodies {
            body.freeze();
        }
        sort_by_x(&mut bodies);
        let max_radius = bodies.iter().map(|b| b.radius).fold(0.0, f32::max);
        Self {
            bodies: bodies.into_boxed_slice(),
            max_radius,
        }
    }

    /// First position whose x is not less than `x` (lower bound). Equals `len()` when
    /// every obstacle lies left of `x`.
    pub fn find_first_not_less(&self, x: f32) -> usize {
        self.bodies.partition_point(|body| body.position.x < x)
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Largest obstacle radius, used as the sweep's pruning bound.
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Obstacles overlapping a circle, found by sweeping out from the x anchor.
    /// Read-only counterpart of [`sweep_and_resolve`].
    pub fn query(&self, body: &Body) -> Vec<usize> {
        let mut hits = Vec::new();
        let (right, left) = self.sweep_ranges(body.position.x, body.radius);
        for i in right.chain(left) {
            if self.bodies[i].overlaps(body) {
                hits.push(i);
            }
        }
        hits.sort_unstable();
        hits
    }

    /// Indices to visit, rightwards from the anchor then leftwards from just
    /// before it, each stopping once the x gap alone rules out contact.
    fn sweep_ranges(
        &self,
        x: f32,
        radius: f32,
    ) -> (
        impl Iterator<Item = usize> + '_,
        impl Iterator<Item = usize> + '_,
    ) {
        let reach = self.max_radius + radius;
        let anchor = self.find_first_not_less(x);
        let right = (anchor..self.bodies.len())
            .take_while(move |&i| self.bodies[i].position.x - x <= reach);
        let left = (0..anchor)
            .rev()
            .take_while(move |&i| x - self.bodies[i].position.x <= reach);
        (right, left)
    }
}

/// Sweeps `moving` against the index and applies every collision as soon as it is
/// found, so later candidates in the same sweep see the post-collision state. The
/// candidate window is anchored on the position at the start of the sweep.
pub fn sweep_and_resolve(index: &StationaryIndex, moving: &mut Body) -> usize {
    sweep_and_resolve_with(index, moving, |_| {})
}

/// [`sweep_and_resolve`] reporting each applied [`Resolution`] to `on_contact`.
pub fn sweep_and_resolve_with<F>(index: &StationaryIndex, moving: &mut Body, mut on_contact: F) -> usize
where
    F: FnMut(&Resolution),
{
    let mut contacts = 0;
    let (right, left) = index.sweep_ranges(moving.position.x, moving.radius);
    for i in right.chain(left) {
        if let Some(hit) = narrowphase::resolve_in_place(&index.bodies[i], moving) {
            on_contact(&hit);
            contacts += 1;
        }
    }
    contacts
}
