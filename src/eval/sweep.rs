//! Slow global sweeps layered over every effect: the load-full-scene sweep, the cross-fade mask
//! and the layered hide sweep.

use crate::effects::params::{EffectParams, HideSweepMode};
use crate::foundation::core::Vec3;
use crate::foundation::math::{clamp01, smoothstep};

const MIN_MASK_FEATHER: f32 = 0.01;
const MASK_ENABLE_POS: f32 = 0.001;
const MIN_LAYER_THICKNESS: f32 = 0.01;
const MIN_Y_RANGE: f32 = 0.001;

/// Per-point "global reveal" scalar `localT`: 0 while the point is in the point-cloud phase,
/// 1 once the load sweep has passed it.
///
/// The sweep radius overshoots the end radius by one thickness so that progress 1 leaves every
/// point inside the end radius fully loaded.
pub(crate) fn load_local_t(dist: f32, p: &EffectParams) -> f32 {
    let progress = clamp01(p.load_full_scene_progress);
    let thick = p.load_full_scene_wave_thickness.max(MIN_LAYER_THICKNESS);
    let radius = progress * (p.end_radius + thick);
    // ramps in over the first thickness of travel so progress 0 is exactly the sparse phase
    let engaged = smoothstep(0.0, thick, radius);
    (1.0 - smoothstep(-thick, thick, dist - radius)) * engaged
}

/// Shared fade curve for every reveal-time effect: 1 in the sparse phase, 0 once loaded.
pub(crate) fn effect_fade(local_t: f32, p: &EffectParams) -> f32 {
    let range = p.load_full_scene_motion_fade_range.max(MIN_MASK_FEATHER);
    smoothstep(0.0, range, 1.0 - local_t)
}

/// Cross-fade mask. Points inside the incoming dataset's front are hidden; 1 when disabled.
pub(crate) fn mask_visibility(dist: f32, p: &EffectParams) -> f32 {
    if p.mask_reveal_pos <= MASK_ENABLE_POS {
        return 1.0;
    }
    let outer = (p.mask_reveal_pos - p.mask_reveal_start_radius).max(0.0);
    let inner = outer - p.mask_feather.max(MIN_MASK_FEATHER);
    smoothstep(inner, outer, dist)
}

/// Layer value in `[0, 1]` used by the hide sweep; low values vanish first.
pub(crate) fn hide_layer(position: Vec3, p: &EffectParams) -> f32 {
    match p.hide_scene_mode {
        HideSweepMode::BottomUp | HideSweepMode::TopDown => {
            let range = p.hide_scene_max_y - p.hide_scene_min_y;
            let height = if range > MIN_Y_RANGE {
                clamp01((position.y - p.hide_scene_min_y) / range)
            } else {
                0.0
            };
            if p.hide_scene_mode == HideSweepMode::TopDown {
                1.0 - height
            } else {
                height
            }
        }
        HideSweepMode::CameraDistance => {
            let span = (2.0 * p.end_radius).max(MIN_Y_RANGE);
            clamp01(position.distance(p.camera_position) / span)
        }
    }
}

/// Hide sweep visibility: 1 at progress 0, 0 for every point at progress 1.
///
/// Progress is stretched over `[-thickness, 1 + thickness]` so every layer starts and ends
/// outside the soft band.
pub(crate) fn hide_visibility(position: Vec3, p: &EffectParams) -> f32 {
    let progress = clamp01(p.hide_scene_progress);
    if progress <= 0.0 {
        return 1.0;
    }
    if progress >= 1.0 {
        return 0.0;
    }
    let thick = p.hide_scene_layer_thickness.max(MIN_LAYER_THICKNESS);
    let sweep = progress * (1.0 + 2.0 * thick) - thick;
    let layer = hide_layer(position, p);
    1.0 - smoothstep(layer - thick, layer + thick, sweep)
}

#[cfg(test)]
#[path = "../../tests/unit/eval/sweep.rs"]
mod tests;
