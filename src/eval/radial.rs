//! Radial reveal kernel.
//!
//! A dot wave expands from the center (or retreats toward it in reverse mode). Points behind the
//! front show as small dots, the front itself flashes, and points beyond it stay hidden. Both
//! directions draw the same way, so a hide started on a revealed scene picks up exactly where the
//! reveal left it. The load-full-scene sweep later grows each dot back to its true size and fades
//! every reveal-time effect out through the shared fade curve; a hide still retreats those loaded
//! points behind the raw front. Every gate is a narrow smoothstep so nothing pops between frames.

use glam::Vec2;

use crate::effects::params::EffectParams;
use crate::eval::frame::{FrameSnapshot, PointOutput};
use crate::eval::motion::{self, MotionInput};
use crate::eval::sweep;
use crate::foundation::core::{Point, Rgb, Vec3};
use crate::foundation::math::{clamp01, mix, position_hash, smoothstep};

const EPS: f32 = 1e-3;
/// Half-width of the dot band around the front.
const BAND: f32 = 0.05;
/// Half-width of the flash at the front.
const FLASH: f32 = 0.025;
const DOT_SCALE: f32 = 0.1;
const FLASH_SCALE: f32 = 0.2;
const DOT_SIZE_FACTOR: f32 = 0.08;
const MIN_DOT_SIZE: f32 = 0.001;
const DENSITY_SOFTNESS: f32 = 0.01;
const BORDER_FALLOFF: f32 = 20.0;
const BORDER_TINT: f32 = 0.35;
const WAVE_TINT: f32 = 0.15;

const SALT_FLASH: u64 = 11;
const SALT_DENSITY: u64 = 12;

/// Dot extent for a band scale, bounded by the point's own extent.
fn dot_size(scale: f32, extent: f32, pc_scale: f32) -> f32 {
    let cap = (extent * pc_scale).max(extent * 0.1 * pc_scale);
    (scale * DOT_SIZE_FACTOR * pc_scale).min(cap).max(MIN_DOT_SIZE * pc_scale)
}

/// Band scale profile: dots behind the front, a hash-modulated flash on it, nothing past it.
fn band_scale(dist: f32, front: f32, flash_phase: f32) -> f32 {
    let trailing = DOT_SCALE * (1.0 - smoothstep(front, front + BAND, dist));
    let peak = 1.0 - smoothstep(0.0, FLASH, (dist - front).abs());
    trailing + (FLASH_SCALE - DOT_SCALE) * peak * (0.6 + 0.4 * flash_phase)
}

fn sized(dist: f32, front: f32, extent: f32, local_t: f32, pc_scale: f32, flash_phase: f32) -> f32 {
    let dot = dot_size(band_scale(dist, front, flash_phase), extent, pc_scale);
    mix(dot, extent, local_t)
}

pub(crate) fn evaluate(point: &Point, snap: &FrameSnapshot) -> PointOutput {
    let p = &snap.params;
    let pos = point.position;
    let rel = pos - p.center;
    let dist = rel.length();
    if dist > p.end_radius {
        return PointOutput::HIDDEN;
    }

    let front = snap.front;
    let local_t = sweep::load_local_t(dist, p);
    let fade = sweep::effect_fade(local_t, p);
    let ocean = if fade > 0.0 {
        snap.ocean.intensity(dist, snap.motion_time)
    } else {
        0.0
    };
    let radial_plane = Vec2::new(rel.x, rel.z).length();

    // size
    let extent = point.extent();
    let size_scale = if extent <= f32::EPSILON {
        1.0
    } else {
        let flash_phase = position_hash(pos, SALT_FLASH);
        sized(dist, front, extent, local_t, p.point_cloud_scale, flash_phase) / extent
    };

    // front gate
    let front_on = smoothstep(0.0, BAND, front);
    let gate = (1.0 - smoothstep(front + FLASH, front + BAND, dist)) * front_on;
    // loaded points ignore the dot gate; a hide retreats them with the raw front instead
    let settled = if p.reverse_mode {
        let raw_front = front + p.reveal_start_radius;
        (1.0 - smoothstep(raw_front, raw_front + BAND, dist)) * front_on
    } else {
        1.0
    };
    let mut alpha = mix(settled, gate, fade);

    // density thinning
    let threshold = mix(1.0, clamp01(p.point_cloud_density), fade);
    let keep = 1.0
        - smoothstep(
            threshold - DENSITY_SOFTNESS,
            threshold + DENSITY_SOFTNESS,
            position_hash(pos, SALT_DENSITY),
        );
    alpha *= mix(1.0 - fade, 1.0, keep);
    alpha *= mix(p.point_cloud_opacity, 1.0, local_t);

    // colour
    let span = (2.0 * p.end_radius).max(EPS);
    let darkening =
        (1.0 - clamp01(pos.distance(p.camera_position) / span) * p.distance_darkening).max(0.0);
    let mut scale = mix(1.0, darkening, fade);

    let dot_tint = p.dot_tint.to_vec3();
    let wave_front = front.max(1e-4);
    let border = (wave_front - radial_plane - 0.5).abs();
    let disperse = motion::disperse_factor(radial_plane, front);
    let mut tint = dot_tint * (-BORDER_FALLOFF * border).exp() * disperse * BORDER_TINT * fade;

    let thick = p.dot_wave_thickness.max(0.01);
    let glow = (1.0 - smoothstep(0.0, thick, (dist - front).abs()))
        * (1.0 - smoothstep(front, front + FLASH, dist));
    tint += dot_tint * glow * fade;
    tint += p.wave_tint.to_vec3() * ocean * WAVE_TINT * fade;

    let brightness = mix(1.0, p.base_brightness, fade);
    let restore = mix(
        1.0,
        p.ocean_wave_brightness.max(EPS) / brightness.max(EPS),
        ocean * fade,
    );
    scale *= brightness * restore;
    tint *= brightness * restore;

    alpha *= sweep::mask_visibility(dist, p);
    alpha *= sweep::hide_visibility(pos, p);

    let position_offset = motion::offset(
        &MotionInput {
            position: pos,
            dist,
            radial_plane,
            front,
            ocean,
            fade,
            time: snap.motion_time,
        },
        p,
        &snap.wind,
    );

    PointOutput {
        visible: true,
        alpha,
        size_scale,
        position_offset,
        color_tint: Rgb::from_vec3(tint),
        color_scale: Rgb::from_vec3(Vec3::splat(scale)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/radial.rs"]
mod tests;
