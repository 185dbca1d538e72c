//! Interpolation helpers for `Simulation::render`.

use crate::types::Alpha;

#[inline]
pub fn lerp(a: f32, b: f32, t: Alpha) -> f32 {
    a + t * (b - a)
}

#[inline]
pub fn lerp_point(a: [f32; 2], b: [f32; 2], t: Alpha) -> [f32; 2] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t)]
}
