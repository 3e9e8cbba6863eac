use crate::{
    config::SEPARATION_BIAS,
    core::body::Body,
    utils::math::{direction_and_length, reflect},
};

use super::contact::Resolution;

/// Reflection-based response between an obstacle and a moving circle.
///
/// The separation vector is mirrored across the contact normal to get the outgoing
/// direction. The mover is pushed along it until the circles are
/// [`SEPARATION_BIAS`] apart and keeps its speed. Total: returns `None` for
/// non-overlapping pairs and for coincident centres.
pub fn resolve(stationary: &Body, moving: &Body) -> Option<Resolution> {
    let separation = stationary.position - moving.position;
    let combined = stationary.combined_radius(moving);

    let (normal, distance) = direction_and_length(separation)?;
    if distance > combined {
        return None;
    }

    let (outgoing, _) = direction_and_length(reflect(separation, normal))?;
    let penetration = combined - distance;

    Some(Resolution {
        stationary: stationary.id(),
        position: moving.position + outgoing * (penetration + SEPARATION_BIAS),
        velocity: outgoing * moving.speed(),
        penetration,
    })
}

/// Resolves against `stationary` and writes the result into `moving`.
pub fn resolve_in_place(stationary: &Body, moving: &mut Body) -> Option<Resolution> {
    let resolution = resolve(stationary, moving)?;
    resolution.apply(moving);
    Some(resolution)
}
