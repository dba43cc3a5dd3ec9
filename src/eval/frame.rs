use crate::effects::kind::EffectKind;
use crate::effects::params::EffectParams;
use crate::eval::motion::WindFrame;
use crate::eval::ocean::OceanSchedule;
use crate::eval::{radial, simple, wave};
use crate::foundation::core::{Point, Rgb, Vec3};

/// Alpha below which a point counts as not visible.
pub const VISIBILITY_EPSILON: f32 = 1e-3;

/// Per-point kernel result consumed by the renderer.
///
/// Final colour is `base * color_scale + color_tint`; final opacity is `base_opacity * alpha`;
/// final extent is `base_extent * size_scale`; final position is `position + position_offset`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PointOutput {
    pub visible: bool,
    pub alpha: f32,
    pub size_scale: f32,
    pub position_offset: Vec3,
    pub color_tint: Rgb,
    pub color_scale: Rgb,
}

impl PointOutput {
    pub const HIDDEN: Self = Self {
        visible: false,
        alpha: 0.0,
        size_scale: 0.0,
        position_offset: Vec3::ZERO,
        color_tint: Rgb::BLACK,
        color_scale: Rgb::WHITE,
    };

    /// Unmodified point.
    pub const PASSTHROUGH: Self = Self {
        visible: true,
        alpha: 1.0,
        size_scale: 1.0,
        position_offset: Vec3::ZERO,
        color_tint: Rgb::BLACK,
        color_scale: Rgb::WHITE,
    };

    /// Clamp alpha and derive `visible`.
    pub(crate) fn finish(mut self) -> Self {
        self.alpha = if self.alpha.is_finite() {
            self.alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !self.size_scale.is_finite() {
            self.size_scale = 0.0;
        }
        self.size_scale = self.size_scale.max(0.0);
        self.visible = self.alpha > VISIBILITY_EPSILON && self.size_scale > 0.0;
        self
    }

    /// The point as the renderer should draw it.
    pub fn apply_to(&self, point: &Point) -> Point {
        let base = point.color.to_vec3();
        let color = base * self.color_scale.to_vec3() + self.color_tint.to_vec3();
        Point {
            position: point.position + self.position_offset,
            color: Rgb::from_vec3(color),
            opacity: point.opacity * self.alpha,
            size: point.size * self.size_scale,
            scale: point.scale.map(|s| s * self.size_scale),
        }
    }
}

/// Everything the kernel needs for one frame of one effect instance.
///
/// Built once per frame on the control thread, then shared read-only by every worker. Anything
/// that depends only on time and parameters is resolved here, not per point.
#[derive(Clone, Copy, Debug)]
pub struct FrameSnapshot {
    pub kind: EffectKind,
    pub params: EffectParams,
    /// Effect-local time in seconds.
    pub time: f32,
    /// Radial: visible dot-wave edge, measured from the reveal start radius in both directions.
    /// Wave-driven kinds: distance the wave has travelled from the center.
    pub front: f32,
    /// Clock of the idle motion terms and ocean pulses. Equal to `time` unless the snapshot
    /// continues another effect's motion.
    pub motion_time: f32,
    pub(crate) ocean: OceanSchedule,
    pub(crate) wind: WindFrame,
}

impl FrameSnapshot {
    pub fn new(kind: EffectKind, params: &EffectParams, time: f32) -> Self {
        let params = params.sanitized();
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let kin = params.kinematics();
        let front = if kind.is_wave() {
            kin.forward_front(time)
        } else if params.reverse_mode {
            kin.reverse_dot_wave_position(time)
        } else {
            kin.dot_wave_position(time)
        };
        Self {
            kind,
            params,
            time,
            front,
            motion_time: time,
            ocean: OceanSchedule::new(&params),
            wind: WindFrame::new(),
        }
    }

    /// Keep the motion clock and ocean pulses of the effect this one took over from, `elapsed`
    /// seconds into it, so a hide started on a moving scene does not jolt it.
    pub fn continuing(mut self, from: &EffectParams, elapsed: f32) -> Self {
        self.motion_time = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            self.time
        };
        self.ocean = OceanSchedule::new(&from.sanitized());
        self
    }

    pub fn evaluate(&self, point: &Point) -> PointOutput {
        let out = match self.kind {
            EffectKind::Radial => radial::evaluate(point, self),
            EffectKind::Instant => simple::evaluate_instant(point, self),
            EffectKind::Fade => simple::evaluate_fade(point, self),
            EffectKind::Spread | EffectKind::Unroll | EffectKind::Twister | EffectKind::Magic => {
                wave::evaluate(point, self)
            }
        };
        out.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/frame.rs"]
mod tests;
