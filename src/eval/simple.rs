use crate::eval::frame::{FrameSnapshot, PointOutput};
use crate::eval::sweep;
use crate::foundation::core::Point;
use crate::foundation::math::{clamp01, mix};

const FADE_START_SIZE: f32 = 0.1;
const MIN_FADE_DURATION: f32 = 1e-3;

fn inside_radius(point: &Point, snap: &FrameSnapshot) -> Option<f32> {
    let dist = point.position.distance(snap.params.center);
    (dist <= snap.params.end_radius).then_some(dist)
}

/// Everything inside the end radius, as-is.
pub(crate) fn evaluate_instant(point: &Point, snap: &FrameSnapshot) -> PointOutput {
    let Some(dist) = inside_radius(point, snap) else {
        return PointOutput::HIDDEN;
    };
    let p = &snap.params;
    PointOutput {
        alpha: sweep::mask_visibility(dist, p) * sweep::hide_visibility(point.position, p),
        ..PointOutput::PASSTHROUGH
    }
}

/// Opacity ramps from 0 to 1 over `fade_duration` while points grow from a tenth of their size.
pub(crate) fn evaluate_fade(point: &Point, snap: &FrameSnapshot) -> PointOutput {
    let Some(dist) = inside_radius(point, snap) else {
        return PointOutput::HIDDEN;
    };
    let p = &snap.params;
    let progress = clamp01(snap.time / p.fade_duration.max(MIN_FADE_DURATION));
    let sweeps = sweep::mask_visibility(dist, p) * sweep::hide_visibility(point.position, p);
    PointOutput {
        alpha: progress * sweeps,
        size_scale: mix(FADE_START_SIZE, 1.0, progress),
        ..PointOutput::PASSTHROUGH
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/simple.rs"]
mod tests;
