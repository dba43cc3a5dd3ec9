use std::fmt;
use std::str::FromStr;

use crate::effects::params::{EffectParams, ParamKey, WaveStyle};
use crate::foundation::core::{Rgb, Vec3};
use crate::foundation::error::RevealError;

/// Keys a radial reveal takes from the control surface. Transient state (reverse flag, mask,
/// sweep progress) is owned by the director and never copied.
pub const RADIAL_KEYS: &[ParamKey] = &[
    ParamKey::Speed,
    ParamKey::Acceleration,
    ParamKey::Delay,
    ParamKey::Center,
    ParamKey::EndRadius,
    ParamKey::RevealStartRadius,
    ParamKey::FloatMotionSpeed,
    ParamKey::DispersiveMotionSpeed,
    ParamKey::WaveSpeed,
    ParamKey::WaveAmplitude,
    ParamKey::PointMotionSpeed,
    ParamKey::OscillationIntensity,
    ParamKey::PointCloudScale,
    ParamKey::PointCloudDensity,
    ParamKey::PointCloudOpacity,
    ParamKey::BaseBrightness,
    ParamKey::DistanceDarkening,
    ParamKey::CameraPosition,
    ParamKey::DotTint,
    ParamKey::WaveTint,
    ParamKey::MaskFeather,
    ParamKey::DescentHeight,
    ParamKey::DescentDuration,
    ParamKey::OceanWaveThickness,
    ParamKey::OceanWaveInterval,
    ParamKey::OceanWaveSpeedMultiplier,
    ParamKey::OceanWaveLiftScale,
    ParamKey::OceanWaveBrightness,
    ParamKey::DotWaveThickness,
    ParamKey::LoadFullSceneWaveThickness,
    ParamKey::LoadFullSceneMotionFadeRange,
    ParamKey::HideSceneMode,
    ParamKey::HideSceneLayerThickness,
    ParamKey::HideSceneMinY,
    ParamKey::HideSceneMaxY,
];

const INSTANT_KEYS: &[ParamKey] = &[
    ParamKey::Center,
    ParamKey::CameraPosition,
    ParamKey::MaskFeather,
    ParamKey::HideSceneMode,
    ParamKey::HideSceneLayerThickness,
    ParamKey::HideSceneMinY,
    ParamKey::HideSceneMaxY,
];

const FADE_KEYS: &[ParamKey] = &[
    ParamKey::Center,
    ParamKey::CameraPosition,
    ParamKey::MaskFeather,
    ParamKey::HideSceneMode,
    ParamKey::HideSceneLayerThickness,
    ParamKey::HideSceneMinY,
    ParamKey::HideSceneMaxY,
    ParamKey::FadeDuration,
];

/// Wave-driven kinds run with their own speed and style; only placement and the sweeps are shared.
const WAVE_KEYS: &[ParamKey] = INSTANT_KEYS;

/// Radius the simple effects use so that any reasonable dataset fits inside.
const SIMPLE_END_RADIUS: f32 = 5000.0;
const WAVE_SPEED: f32 = 2.0;

/// The family of reveal effects an instance can run.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Wave fronts expanding from the center with dots, ocean pulses and motion.
    #[default]
    Radial,
    /// Everything inside the end radius at once.
    Instant,
    /// Global opacity ramp.
    Fade,
    /// Points are pushed outward as a wave passes them, then settle.
    Spread,
    /// A plane sweeps along one axis and rolls points into place.
    Unroll,
    /// Points spiral in around the vertical axis and keep turning.
    Twister,
    /// Noisy, pulsing, shimmering arrival.
    Magic,
}

impl EffectKind {
    pub const ALL: [EffectKind; 7] = [
        Self::Radial,
        Self::Instant,
        Self::Fade,
        Self::Spread,
        Self::Unroll,
        Self::Twister,
        Self::Magic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Radial => "radial",
            Self::Instant => "instant",
            Self::Fade => "fade",
            Self::Spread => "spread",
            Self::Unroll => "unroll",
            Self::Twister => "twister",
            Self::Magic => "magic",
        }
    }

    /// Kinds whose reveal is a wave travelling away from the center.
    pub fn is_wave(self) -> bool {
        matches!(self, Self::Spread | Self::Unroll | Self::Twister | Self::Magic)
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    /// Following kind in cycle order, wrapping.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Preceding kind in cycle order, wrapping.
    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Keys this kind reads from the control surface.
    pub fn tunable_keys(self) -> &'static [ParamKey] {
        match self {
            Self::Radial => RADIAL_KEYS,
            Self::Instant => INSTANT_KEYS,
            Self::Fade => FADE_KEYS,
            Self::Spread | Self::Unroll | Self::Twister | Self::Magic => WAVE_KEYS,
        }
    }

    /// Overwrite `params` with the defaults this kind starts from.
    pub fn apply_defaults(self, params: &mut EffectParams) {
        *params = EffectParams::default();
        match self {
            Self::Radial => {}
            Self::Instant => params.end_radius = SIMPLE_END_RADIUS,
            Self::Fade => {
                params.end_radius = SIMPLE_END_RADIUS;
                params.fade_duration = 2.0;
            }
            Self::Spread | Self::Unroll | Self::Twister | Self::Magic => {
                params.end_radius = SIMPLE_END_RADIUS;
                params.speed = WAVE_SPEED;
                params.acceleration = 0.0;
                params.wave_style = self.wave_style();
            }
        }
    }

    fn wave_style(self) -> WaveStyle {
        let style = WaveStyle::default();
        match self {
            Self::Unroll => WaveStyle {
                unroll_direction: Vec3::X,
                tint: Rgb::new(0.5, 0.8, 1.0),
                tint_intensity: 0.2,
                ..style
            },
            Self::Twister => WaveStyle {
                tint: Rgb::new(1.0, 0.0, 1.0),
                tint_intensity: 0.3,
                ..style
            },
            Self::Magic => WaveStyle {
                tint: Rgb::new(0.5, 0.3, 1.0),
                tint_intensity: 0.4,
                ..style
            },
            _ => style,
        }
    }

    /// Copy the keys this kind cares about from `source` into `target`.
    pub fn apply_params(self, source: &EffectParams, target: &mut EffectParams) {
        target.copy_keys(source, self.tunable_keys());
    }

    /// Fresh parameter set for a new instance of this kind: defaults, then `base`.
    pub fn build(self, base: &EffectParams) -> EffectParams {
        let mut params = EffectParams::default();
        self.apply_defaults(&mut params);
        self.apply_params(base, &mut params);
        params
    }

    /// Effect-local time at which the reveal is fully shown, if it ever is.
    pub fn completion_time(self, params: &EffectParams) -> Option<f32> {
        match self {
            Self::Radial if params.reverse_mode => Some(params.kinematics().reverse_completion_time()),
            Self::Radial => params.kinematics().completion_time(),
            Self::Instant => Some(0.0),
            Self::Fade => Some(params.fade_duration.max(0.0)),
            Self::Spread | Self::Unroll | Self::Twister | Self::Magic => {
                params.kinematics().completion_time()
            }
        }
    }

    pub fn is_complete(self, params: &EffectParams, time: f32) -> bool {
        self.completion_time(params).is_some_and(|t| time >= t)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| RevealError::validation(format!("unknown effect '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kind.rs"]
mod tests;
