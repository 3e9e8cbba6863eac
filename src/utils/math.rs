//! Additional math helpers layered on top of `glam`.

use glam::Vec2;

/// Mirrors `v` across the line whose unit normal is `normal`: `v - 2(v·n)n`.
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - 2.0 * v.dot(normal) * normal
}

/// Unit vector and length of `v`, or `None` when `v` has no usable direction.
pub fn direction_and_length(v: Vec2) -> Option<(Vec2, f32)> {
    let length = v.length();
    if length <= 0.0 || !length.is_finite() {
        return None;
    }
    Some((v / length, length))
}
