//! Positional overlays applied while a point is still in the sparse phase. Each term is scaled
//! by the shared effect fade and vanishes once the point is fully loaded.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::animation::ease::Ease;
use crate::effects::params::EffectParams;
use crate::foundation::core::Vec3;
use crate::foundation::math::{centered_noise3, position_hash, smoothstep};

const EPS: f32 = 1e-3;
const FLOAT_RATE: f32 = 0.8;
const FLOAT_AMPLITUDE_XZ: f32 = 0.008;
const FLOAT_AMPLITUDE_Y: f32 = 0.01;
const DISPERSE_AMPLITUDE: f32 = 0.04;
const DISPERSE_FLOOR: f32 = 0.8;
const OSCILLATION_AMPLITUDE: f32 = 0.02;
const BAND: f32 = 0.05;

const SALT_PHASE_Y: u64 = 1;
const SALT_PHASE_X: u64 = 2;
const SALT_PHASE_Z: u64 = 3;
const SALT_OSCILLATION: u64 = 4;

/// Fixed wind frame for the flowing distortion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WindFrame {
    pub(crate) dir: Vec3,
    pub(crate) tangent: Vec3,
}

impl WindFrame {
    pub(crate) fn new() -> Self {
        let dir = Vec3::new(0.45, 0.05, 1.0).normalize();
        let tangent = Vec3::Y.cross(dir).normalize();
        Self { dir, tangent }
    }
}

/// How strongly points near the front get scattered. Never below the floor.
pub(crate) fn disperse_factor(radial_plane: f32, front: f32) -> f32 {
    let wf = front.max(1e-4);
    (1.0 - smoothstep(wf - 0.5, wf + 0.5, radial_plane + 0.5)).max(DISPERSE_FLOOR)
}

/// Inputs shared by the motion terms for one point.
pub(crate) struct MotionInput {
    pub(crate) position: Vec3,
    pub(crate) dist: f32,
    pub(crate) radial_plane: f32,
    pub(crate) front: f32,
    pub(crate) ocean: f32,
    pub(crate) fade: f32,
    pub(crate) time: f32,
}

pub(crate) fn offset(m: &MotionInput, p: &EffectParams, wind: &WindFrame) -> Vec3 {
    if m.fade <= 0.0 {
        return Vec3::ZERO;
    }
    let mut out = Vec3::ZERO;
    let t = m.time;
    let front_on = smoothstep(0.0, BAND, m.front);

    if p.float_motion_speed > EPS {
        let fs = p.float_motion_speed * FLOAT_RATE;
        let phase = position_hash(m.position, SALT_PHASE_Y) * TAU;
        let phase_x = position_hash(m.position, SALT_PHASE_X) * TAU;
        let phase_z = position_hash(m.position, SALT_PHASE_Z) * TAU;
        out += Vec3::new(
            (t * fs + phase_x).sin() * FLOAT_AMPLITUDE_XZ,
            (t * fs * 1.1 + phase).sin() * FLOAT_AMPLITUDE_Y,
            (t * fs * 0.9 + phase_z).cos() * FLOAT_AMPLITUDE_XZ,
        ) * m.fade;
    }

    if p.point_motion_speed > EPS && p.oscillation_intensity > EPS {
        let phase = position_hash(m.position, SALT_OSCILLATION) * TAU;
        out.y += (t * p.point_motion_speed + phase).sin()
            * p.oscillation_intensity
            * OSCILLATION_AMPLITUDE
            * m.fade;
    }

    if p.wave_speed > EPS && p.wave_amplitude > EPS {
        let amp = p.wave_amplitude * m.fade * front_on;
        let noise = centered_noise3(m.position * 2.0 + Vec3::splat(t * p.wave_speed * 0.5));
        out += noise * amp;

        let along = m.position.dot(wind.dir);
        let across = m.position.dot(wind.tangent);
        let freq = 1.5 + p.float_motion_speed * 0.2;
        let sync = along * freq + across * freq * 0.7 - t * p.wave_speed;
        let cross = across * freq * 0.65 - t * p.wave_speed * 0.4;
        out += wind.tangent * sync.sin() * amp * 0.3;
        out += wind.dir * (sync * 0.6 + cross).cos() * amp * 0.2;
    }

    if p.dispersive_motion_speed > EPS {
        let disperse = disperse_factor(m.radial_plane, m.front);
        let rel = m.position - p.center;
        let noise =
            centered_noise3(rel * 2.0 + Vec3::splat(t * 0.5 * p.dispersive_motion_speed));
        out += noise * DISPERSE_AMPLITUDE * disperse * m.fade;
    }

    if p.ocean_wave_lift_scale > EPS && m.ocean > 0.0 {
        out.y += (m.ocean * FRAC_PI_2).sin() * p.ocean_wave_lift_scale * m.fade;
    }

    if p.descent_height > EPS {
        // points ahead of the front sit at full height, so nothing jumps as the front passes
        let behind = (m.front - m.dist).max(0.0);
        let progress = (behind / p.descent_duration.max(EPS)).min(1.0);
        let eased = Ease::OutQuad.apply_f32(progress);
        out.y += p.descent_height * (1.0 - eased) * m.fade * front_on;
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/eval/motion.rs"]
mod tests;
