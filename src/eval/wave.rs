//! Wave-driven reveals: spread, unroll, twister and magic.
//!
//! All four share one skeleton. A wave travels away from the center (along the unroll axis for
//! unroll); a point starts appearing once the wave passes it and its `progress` is how far behind
//! the wave it sits relative to the distance the wave has covered. Progress drives a tiny-to-full
//! size ramp, an opacity ramp and a tint that wears off. Each kind then adds its own motion.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec2};

use crate::effects::kind::EffectKind;
use crate::eval::frame::{FrameSnapshot, PointOutput};
use crate::eval::sweep;
use crate::foundation::core::{Point, Rgb, Vec3};
use crate::foundation::math::{centered_noise3, clamp01, mix, position_hash, smoothstep};

/// Distance past the wave at which points still count as reached (fully transparent).
const REACH_MARGIN: f32 = 0.1;
const MIN_WAVE: f32 = 1e-3;
const MIN_SIZE: f32 = 0.05;

const SALT_MAGIC_PHASE: u64 = 21;

/// Per-point progress in `[0, 1]`, or `None` while the wave has not reached the point.
fn progress(reach: f32, wave: f32) -> Option<f32> {
    if reach > wave + REACH_MARGIN {
        return None;
    }
    Some(smoothstep(0.0, 1.0, clamp01((wave - reach) / wave.max(MIN_WAVE))))
}

/// `rgb * scale + tint` form of blending toward `tint` by `amount`.
fn blend(tint: Rgb, amount: f32, brightness: f32) -> (Rgb, Rgb) {
    let amount = clamp01(amount);
    (
        Rgb::from_vec3(tint.to_vec3() * amount),
        Rgb::splat(brightness * (1.0 - amount)),
    )
}

pub(crate) fn evaluate(point: &Point, snap: &FrameSnapshot) -> PointOutput {
    let p = &snap.params;
    let style = &p.wave_style;
    let rel = point.position - p.center;
    let dist = rel.length();
    if dist > p.end_radius {
        return PointOutput::HIDDEN;
    }

    let wave = snap.front;
    let axis = style.unroll_direction.normalize_or(Vec3::X);
    let reach = match snap.kind {
        EffectKind::Unroll => rel.dot(axis),
        _ => dist,
    };
    let Some(progress) = progress(reach, wave) else {
        return PointOutput::HIDDEN;
    };
    // motion only starts once the wave is actually past the point
    let moving = reach <= wave;
    let pending = 1.0 - progress;
    let t = snap.motion_time;

    let mut size_scale = mix(MIN_SIZE, 1.0, progress);
    let mut alpha = progress;
    let mut brightness = 1.0;
    let mut offset = Vec3::ZERO;

    match snap.kind {
        EffectKind::Spread if moving => {
            offset = rel.normalize_or_zero() * progress * style.spread_angle * 0.5;
        }
        EffectKind::Unroll if moving => {
            let up = if axis.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
            let hinge = axis.cross(up).normalize_or(Vec3::Z);
            let rolled = Quat::from_axis_angle(hinge, pending * style.unroll_angle) * rel;
            offset = rolled - rel;
        }
        EffectKind::Twister if moving => {
            let plane = Vec2::new(rel.x, rel.z);
            let angle = rel.z.atan2(rel.x)
                + pending * style.twist_intensity * TAU
                + t * style.rotation_speed;
            let (sin, cos) = angle.sin_cos();
            let spiral = (progress * PI).sin() * pending * style.twist_intensity * 2.0;
            offset = Vec3::new(plane.length() * cos - rel.x, spiral, plane.length() * sin - rel.z);
        }
        EffectKind::Magic => {
            let phase = position_hash(point.position, SALT_MAGIC_PHASE) * TAU;
            let pulse = (t * style.pulse_speed + phase).sin() * 0.5 + 0.5;
            let strength = pending * style.magic_intensity;

            size_scale *= 1.0 + mix(0.8, 1.2, pulse) * strength * 0.2;
            brightness = 1.0 + pulse * strength * 0.5;
            alpha *= (t * style.pulse_speed * 2.0 + phase).sin() * 0.1 + 0.9;

            if moving {
                // the spiral owns the horizontal plane; noise and pulse only lift
                let noise = centered_noise3(point.position * 2.0 + Vec3::splat(t * style.pulse_speed));
                let lift = noise.y * style.distortion_amount * strength
                    + rel.normalize_or_zero().y * pulse * strength * 0.3;
                let spiral_angle = pending * PI + t * style.pulse_speed * 0.5;
                let push = (spiral_angle + phase).sin() * strength * 0.5;
                let heading = rel.z.atan2(rel.x);
                offset = Vec3::new(push * heading.cos(), lift, push * heading.sin());
            }
        }
        _ => {}
    }

    let (color_tint, color_scale) = blend(style.tint, style.tint_intensity * pending, brightness);
    alpha *= sweep::mask_visibility(dist, p) * sweep::hide_visibility(point.position, p);

    PointOutput {
        visible: true,
        alpha,
        size_scale,
        position_offset: offset,
        color_tint,
        color_scale,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/wave.rs"]
mod tests;
