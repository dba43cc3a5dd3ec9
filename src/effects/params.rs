use std::fmt;
use std::str::FromStr;

use crate::animation::kinematics::WaveKinematics;
use crate::foundation::core::{Rgb, Vec3};
use crate::foundation::error::{RevealError, RevealResult};

/// How the hide sweep assigns each point its layer value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideSweepMode {
    /// Lowest points vanish first.
    #[default]
    BottomUp,
    /// Highest points vanish first.
    TopDown,
    /// Points nearest the camera vanish first.
    CameraDistance,
}

impl HideSweepMode {
    /// Map a numeric control value (`0`, `1`, `2`) to a mode, rounding and clamping.
    pub fn from_index(v: f32) -> Self {
        match v.round().clamp(0.0, 2.0) as u8 {
            0 => Self::BottomUp,
            1 => Self::TopDown,
            _ => Self::CameraDistance,
        }
    }

    pub fn index(self) -> f32 {
        match self {
            Self::BottomUp => 0.0,
            Self::TopDown => 1.0,
            Self::CameraDistance => 2.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom_up" | "bottom-up" | "0" => Some(Self::BottomUp),
            "top_down" | "top-down" | "1" => Some(Self::TopDown),
            "camera_distance" | "camera-distance" | "2" => Some(Self::CameraDistance),
            _ => None,
        }
    }
}

/// Shape of the wave-driven reveals (spread, unroll, twister, magic). Each kind reads only its own
/// fields plus the shared tint.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaveStyle {
    /// How far spread points are pushed outward while they appear.
    pub spread_angle: f32,
    /// Axis the unroll travels along; normalized at the point of use.
    pub unroll_direction: Vec3,
    /// Radians a point is rolled back by before it lands.
    pub unroll_angle: f32,
    /// Turns a twister point makes on its way in.
    pub twist_intensity: f32,
    /// Radians per second the twister keeps spinning at.
    pub rotation_speed: f32,
    pub distortion_amount: f32,
    pub pulse_speed: f32,
    pub magic_intensity: f32,
    /// Colour blended in while a point appears.
    pub tint: Rgb,
    pub tint_intensity: f32,
}

impl Default for WaveStyle {
    fn default() -> Self {
        Self {
            spread_angle: 1.0,
            unroll_direction: Vec3::X,
            unroll_angle: 1.57,
            twist_intensity: 1.0,
            rotation_speed: 0.5,
            distortion_amount: 0.5,
            pulse_speed: 2.0,
            magic_intensity: 1.0,
            tint: Rgb::new(1.0, 0.5, 0.0),
            tint_intensity: 0.3,
        }
    }
}

impl WaveStyle {
    fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let pick = |v: f32, min: f32, max: f32, fallback: f32| {
            if v.is_finite() { v.clamp(min, max) } else { fallback }
        };
        Self {
            spread_angle: pick(self.spread_angle, 0.0, 5.0, defaults.spread_angle),
            unroll_direction: if self.unroll_direction.is_finite() {
                self.unroll_direction
            } else {
                defaults.unroll_direction
            },
            unroll_angle: pick(self.unroll_angle, 0.0, std::f32::consts::PI, defaults.unroll_angle),
            twist_intensity: pick(self.twist_intensity, 0.0, 2.0, defaults.twist_intensity),
            rotation_speed: pick(self.rotation_speed, 0.0, 5.0, defaults.rotation_speed),
            distortion_amount: pick(self.distortion_amount, 0.0, 2.0, defaults.distortion_amount),
            pulse_speed: pick(self.pulse_speed, 0.0, 10.0, defaults.pulse_speed),
            magic_intensity: pick(self.magic_intensity, 0.0, 2.0, defaults.magic_intensity),
            tint: if self.tint.to_vec3().is_finite() {
                self.tint
            } else {
                Rgb::BLACK
            },
            tint_intensity: pick(self.tint_intensity, 0.0, 1.0, 0.0),
        }
    }
}

/// Complete input of one kernel invocation.
///
/// The struct is `Copy` so a frame snapshot can be handed to worker threads by value. Setters on
/// [`EffectParams::set`] clamp to each key's declared range; the kernel clamps again at the point
/// of use, so hand-built values outside the ranges are safe too.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EffectParams {
    // kinematics
    pub speed: f32,
    pub acceleration: f32,
    pub delay: f32,
    pub reverse_mode: bool,
    pub reverse_speed: f32,

    // geometry
    pub center: Vec3,
    pub end_radius: f32,
    pub reveal_start_radius: f32,

    // motion
    pub float_motion_speed: f32,
    pub dispersive_motion_speed: f32,
    pub wave_speed: f32,
    pub wave_amplitude: f32,
    pub point_motion_speed: f32,
    pub oscillation_intensity: f32,

    // density and appearance
    pub point_cloud_scale: f32,
    pub point_cloud_density: f32,
    pub point_cloud_opacity: f32,
    pub base_brightness: f32,
    pub distance_darkening: f32,
    pub camera_position: Vec3,

    pub dot_tint: Rgb,
    pub wave_tint: Rgb,

    // cross-fade mask
    pub mask_reveal_pos: f32,
    pub mask_reveal_start_radius: f32,
    pub mask_feather: f32,

    // descent
    pub descent_height: f32,
    /// Distance behind the front over which points settle.
    pub descent_duration: f32,

    // ocean wave
    pub ocean_wave_thickness: f32,
    pub ocean_wave_interval: f32,
    pub ocean_wave_speed_multiplier: f32,
    pub ocean_wave_lift_scale: f32,
    pub ocean_wave_brightness: f32,

    pub dot_wave_thickness: f32,

    // load-full-scene sweep
    pub load_full_scene_progress: f32,
    pub load_full_scene_wave_thickness: f32,
    pub load_full_scene_motion_fade_range: f32,

    // hide sweep
    pub hide_scene_progress: f32,
    pub hide_scene_mode: HideSweepMode,
    pub hide_scene_layer_thickness: f32,
    pub hide_scene_min_y: f32,
    pub hide_scene_max_y: f32,

    /// Ramp length of the fade effect.
    pub fade_duration: f32,

    pub wave_style: WaveStyle,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            speed: 1.65,
            acceleration: 0.0,
            delay: 0.0,
            reverse_mode: false,
            reverse_speed: 5.0,
            center: Vec3::ZERO,
            end_radius: 25.0,
            reveal_start_radius: 0.4,
            float_motion_speed: 1.5,
            dispersive_motion_speed: 0.0,
            wave_speed: 1.0,
            wave_amplitude: 0.02,
            point_motion_speed: 1.5,
            oscillation_intensity: 0.2,
            point_cloud_scale: 0.5,
            point_cloud_density: 0.65,
            point_cloud_opacity: 0.7,
            base_brightness: 0.7,
            distance_darkening: 0.0,
            camera_position: Vec3::ZERO,
            dot_tint: Rgb::new(0.0, 1.0, 1.0),
            wave_tint: Rgb::new(1.0, 0.5, 0.0),
            mask_reveal_pos: 0.0,
            mask_reveal_start_radius: 0.0,
            mask_feather: 0.4,
            descent_height: 0.5,
            descent_duration: 2.5,
            ocean_wave_thickness: 0.33,
            ocean_wave_interval: 10.0,
            ocean_wave_speed_multiplier: 4.0,
            ocean_wave_lift_scale: 0.6,
            ocean_wave_brightness: 1.0,
            dot_wave_thickness: 1.0,
            load_full_scene_progress: 0.0,
            load_full_scene_wave_thickness: 0.8,
            load_full_scene_motion_fade_range: 0.15,
            hide_scene_progress: 0.0,
            hide_scene_mode: HideSweepMode::BottomUp,
            hide_scene_layer_thickness: 0.1,
            hide_scene_min_y: -10.0,
            hide_scene_max_y: 10.0,
            fade_duration: 2.0,
            wave_style: WaveStyle::default(),
        }
    }
}

/// Named entry of [`EffectParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    Speed,
    Acceleration,
    Delay,
    ReverseMode,
    ReverseSpeed,
    Center,
    EndRadius,
    RevealStartRadius,
    FloatMotionSpeed,
    DispersiveMotionSpeed,
    WaveSpeed,
    WaveAmplitude,
    PointMotionSpeed,
    OscillationIntensity,
    PointCloudScale,
    PointCloudDensity,
    PointCloudOpacity,
    BaseBrightness,
    DistanceDarkening,
    CameraPosition,
    DotTint,
    WaveTint,
    MaskRevealPos,
    MaskRevealStartRadius,
    MaskFeather,
    DescentHeight,
    DescentDuration,
    OceanWaveThickness,
    OceanWaveInterval,
    OceanWaveSpeedMultiplier,
    OceanWaveLiftScale,
    OceanWaveBrightness,
    DotWaveThickness,
    LoadFullSceneProgress,
    LoadFullSceneWaveThickness,
    LoadFullSceneMotionFadeRange,
    HideSceneProgress,
    HideSceneMode,
    HideSceneLayerThickness,
    HideSceneMinY,
    HideSceneMaxY,
    FadeDuration,
}

/// Value shape accepted and produced by a [`ParamKey`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamKind {
    Scalar { min: f32, max: f32 },
    Flag,
    Vector,
    Color,
    Mode,
}

impl ParamKey {
    pub const ALL: [ParamKey; 42] = [
        Self::Speed,
        Self::Acceleration,
        Self::Delay,
        Self::ReverseMode,
        Self::ReverseSpeed,
        Self::Center,
        Self::EndRadius,
        Self::RevealStartRadius,
        Self::FloatMotionSpeed,
        Self::DispersiveMotionSpeed,
        Self::WaveSpeed,
        Self::WaveAmplitude,
        Self::PointMotionSpeed,
        Self::OscillationIntensity,
        Self::PointCloudScale,
        Self::PointCloudDensity,
        Self::PointCloudOpacity,
        Self::BaseBrightness,
        Self::DistanceDarkening,
        Self::CameraPosition,
        Self::DotTint,
        Self::WaveTint,
        Self::MaskRevealPos,
        Self::MaskRevealStartRadius,
        Self::MaskFeather,
        Self::DescentHeight,
        Self::DescentDuration,
        Self::OceanWaveThickness,
        Self::OceanWaveInterval,
        Self::OceanWaveSpeedMultiplier,
        Self::OceanWaveLiftScale,
        Self::OceanWaveBrightness,
        Self::DotWaveThickness,
        Self::LoadFullSceneProgress,
        Self::LoadFullSceneWaveThickness,
        Self::LoadFullSceneMotionFadeRange,
        Self::HideSceneProgress,
        Self::HideSceneMode,
        Self::HideSceneLayerThickness,
        Self::HideSceneMinY,
        Self::HideSceneMaxY,
        Self::FadeDuration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Acceleration => "acceleration",
            Self::Delay => "delay",
            Self::ReverseMode => "reverse_mode",
            Self::ReverseSpeed => "reverse_speed",
            Self::Center => "center",
            Self::EndRadius => "end_radius",
            Self::RevealStartRadius => "reveal_start_radius",
            Self::FloatMotionSpeed => "float_motion_speed",
            Self::DispersiveMotionSpeed => "dispersive_motion_speed",
            Self::WaveSpeed => "wave_speed",
            Self::WaveAmplitude => "wave_amplitude",
            Self::PointMotionSpeed => "point_motion_speed",
            Self::OscillationIntensity => "oscillation_intensity",
            Self::PointCloudScale => "point_cloud_scale",
            Self::PointCloudDensity => "point_cloud_density",
            Self::PointCloudOpacity => "point_cloud_opacity",
            Self::BaseBrightness => "base_brightness",
            Self::DistanceDarkening => "distance_darkening",
            Self::CameraPosition => "camera_position",
            Self::DotTint => "dot_tint",
            Self::WaveTint => "wave_tint",
            Self::MaskRevealPos => "mask_reveal_pos",
            Self::MaskRevealStartRadius => "mask_reveal_start_radius",
            Self::MaskFeather => "mask_feather",
            Self::DescentHeight => "descent_height",
            Self::DescentDuration => "descent_duration",
            Self::OceanWaveThickness => "ocean_wave_thickness",
            Self::OceanWaveInterval => "ocean_wave_interval",
            Self::OceanWaveSpeedMultiplier => "ocean_wave_speed_multiplier",
            Self::OceanWaveLiftScale => "ocean_wave_lift_scale",
            Self::OceanWaveBrightness => "ocean_wave_brightness",
            Self::DotWaveThickness => "dot_wave_thickness",
            Self::LoadFullSceneProgress => "load_full_scene_progress",
            Self::LoadFullSceneWaveThickness => "load_full_scene_wave_thickness",
            Self::LoadFullSceneMotionFadeRange => "load_full_scene_motion_fade_range",
            Self::HideSceneProgress => "hide_scene_progress",
            Self::HideSceneMode => "hide_scene_mode",
            Self::HideSceneLayerThickness => "hide_scene_layer_thickness",
            Self::HideSceneMinY => "hide_scene_min_y",
            Self::HideSceneMaxY => "hide_scene_max_y",
            Self::FadeDuration => "fade_duration",
        }
    }

    pub fn kind(self) -> ParamKind {
        let scalar = |min, max| ParamKind::Scalar { min, max };
        match self {
            Self::Speed => scalar(0.0, 10.0),
            Self::Acceleration => scalar(0.0, 5.0),
            Self::Delay => scalar(0.0, 60.0),
            Self::ReverseMode => ParamKind::Flag,
            Self::ReverseSpeed => scalar(0.1, 10.0),
            Self::Center | Self::CameraPosition => ParamKind::Vector,
            Self::EndRadius => scalar(0.0, 10_000.0),
            Self::RevealStartRadius => scalar(0.0, 10.0),
            Self::FloatMotionSpeed
            | Self::DispersiveMotionSpeed
            | Self::PointMotionSpeed => scalar(0.0, 3.0),
            Self::WaveSpeed => scalar(0.0, 5.0),
            Self::WaveAmplitude => scalar(0.0, 0.1),
            Self::OscillationIntensity => scalar(0.0, 1.0),
            Self::PointCloudScale => scalar(0.0, 2.0),
            Self::PointCloudDensity | Self::PointCloudOpacity => scalar(0.0, 1.0),
            Self::BaseBrightness => scalar(0.0, 2.0),
            Self::DistanceDarkening => scalar(0.0, 5.0),
            Self::DotTint | Self::WaveTint => ParamKind::Color,
            Self::MaskRevealPos => scalar(0.0, 10_000.0),
            Self::MaskRevealStartRadius => scalar(0.0, 10.0),
            Self::MaskFeather => scalar(0.0, 5.0),
            Self::DescentHeight => scalar(0.0, 5.0),
            Self::DescentDuration => scalar(0.0, 10.0),
            Self::OceanWaveThickness => scalar(0.01, 5.0),
            Self::OceanWaveInterval => scalar(0.0, 60.0),
            Self::OceanWaveSpeedMultiplier => scalar(0.1, 10.0),
            Self::OceanWaveLiftScale => scalar(0.0, 1.0),
            Self::OceanWaveBrightness => scalar(0.5, 2.0),
            Self::DotWaveThickness => scalar(0.01, 5.0),
            Self::LoadFullSceneProgress | Self::HideSceneProgress => scalar(0.0, 1.0),
            Self::LoadFullSceneWaveThickness => scalar(0.1, 3.0),
            Self::LoadFullSceneMotionFadeRange => scalar(0.01, 0.5),
            Self::HideSceneMode => ParamKind::Mode,
            Self::HideSceneLayerThickness => scalar(0.01, 1.0),
            Self::HideSceneMinY | Self::HideSceneMaxY => scalar(-10_000.0, 10_000.0),
            Self::FadeDuration => scalar(0.0, 60.0),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKey {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| RevealError::parameter(format!("unknown parameter '{wanted}'")))
    }
}

impl serde::Serialize for ParamKey {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for ParamKey {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Loosely typed parameter value as it crosses the control surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Scalar(f32),
    Triple([f32; 3]),
    Text(String),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Triple([a, b, c]) => write!(f, "[{a}, {b}, {c}]"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn finite(key: ParamKey, v: f32) -> RevealResult<f32> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RevealError::parameter(format!("{key} must be finite, got {v}")))
    }
}

fn wrong_type(key: ParamKey, value: &ParamValue) -> RevealError {
    RevealError::parameter(format!(
        "{key} expects a {:?} value, got '{value}'",
        key.kind()
    ))
}

impl EffectParams {
    pub fn kinematics(&self) -> WaveKinematics {
        WaveKinematics {
            speed: self.speed,
            acceleration: self.acceleration,
            delay: self.delay,
            reveal_start_radius: self.reveal_start_radius,
            end_radius: self.end_radius,
            reverse_speed: self.reverse_speed,
        }
    }

    fn scalar_slot(&mut self, key: ParamKey) -> Option<&mut f32> {
        Some(match key {
            ParamKey::Speed => &mut self.speed,
            ParamKey::Acceleration => &mut self.acceleration,
            ParamKey::Delay => &mut self.delay,
            ParamKey::ReverseSpeed => &mut self.reverse_speed,
            ParamKey::EndRadius => &mut self.end_radius,
            ParamKey::RevealStartRadius => &mut self.reveal_start_radius,
            ParamKey::FloatMotionSpeed => &mut self.float_motion_speed,
            ParamKey::DispersiveMotionSpeed => &mut self.dispersive_motion_speed,
            ParamKey::WaveSpeed => &mut self.wave_speed,
            ParamKey::WaveAmplitude => &mut self.wave_amplitude,
            ParamKey::PointMotionSpeed => &mut self.point_motion_speed,
            ParamKey::OscillationIntensity => &mut self.oscillation_intensity,
            ParamKey::PointCloudScale => &mut self.point_cloud_scale,
            ParamKey::PointCloudDensity => &mut self.point_cloud_density,
            ParamKey::PointCloudOpacity => &mut self.point_cloud_opacity,
            ParamKey::BaseBrightness => &mut self.base_brightness,
            ParamKey::DistanceDarkening => &mut self.distance_darkening,
            ParamKey::MaskRevealPos => &mut self.mask_reveal_pos,
            ParamKey::MaskRevealStartRadius => &mut self.mask_reveal_start_radius,
            ParamKey::MaskFeather => &mut self.mask_feather,
            ParamKey::DescentHeight => &mut self.descent_height,
            ParamKey::DescentDuration => &mut self.descent_duration,
            ParamKey::OceanWaveThickness => &mut self.ocean_wave_thickness,
            ParamKey::OceanWaveInterval => &mut self.ocean_wave_interval,
            ParamKey::OceanWaveSpeedMultiplier => &mut self.ocean_wave_speed_multiplier,
            ParamKey::OceanWaveLiftScale => &mut self.ocean_wave_lift_scale,
            ParamKey::OceanWaveBrightness => &mut self.ocean_wave_brightness,
            ParamKey::DotWaveThickness => &mut self.dot_wave_thickness,
            ParamKey::LoadFullSceneProgress => &mut self.load_full_scene_progress,
            ParamKey::LoadFullSceneWaveThickness => &mut self.load_full_scene_wave_thickness,
            ParamKey::LoadFullSceneMotionFadeRange => {
                &mut self.load_full_scene_motion_fade_range
            }
            ParamKey::HideSceneProgress => &mut self.hide_scene_progress,
            ParamKey::HideSceneLayerThickness => &mut self.hide_scene_layer_thickness,
            ParamKey::HideSceneMinY => &mut self.hide_scene_min_y,
            ParamKey::HideSceneMaxY => &mut self.hide_scene_max_y,
            ParamKey::FadeDuration => &mut self.fade_duration,
            ParamKey::ReverseMode
            | ParamKey::Center
            | ParamKey::CameraPosition
            | ParamKey::DotTint
            | ParamKey::WaveTint
            | ParamKey::HideSceneMode => return None,
        })
    }

    /// Current value of `key` in its canonical shape.
    pub fn get(&self, key: ParamKey) -> ParamValue {
        let mut copy = *self;
        if let Some(v) = copy.scalar_slot(key) {
            return ParamValue::Scalar(*v);
        }
        match key {
            ParamKey::ReverseMode => ParamValue::Flag(self.reverse_mode),
            ParamKey::Center => ParamValue::Triple(self.center.to_array()),
            ParamKey::CameraPosition => ParamValue::Triple(self.camera_position.to_array()),
            ParamKey::DotTint => ParamValue::Triple(self.dot_tint.to_vec3().to_array()),
            ParamKey::WaveTint => ParamValue::Triple(self.wave_tint.to_vec3().to_array()),
            _ => ParamValue::Scalar(self.hide_scene_mode.index()),
        }
    }

    /// Scalar value of `key`, or `None` for non-scalar keys.
    pub fn scalar(&self, key: ParamKey) -> Option<f32> {
        let mut copy = *self;
        copy.scalar_slot(key).map(|v| *v)
    }

    /// Write `value` into `key`, clamping scalars to the key's range.
    ///
    /// Returns the value actually stored. Wrong shapes and non-finite numbers are rejected with
    /// [`RevealError::InvalidParameter`] and leave the set untouched.
    pub fn set(&mut self, key: ParamKey, value: &ParamValue) -> RevealResult<ParamValue> {
        match (key.kind(), value) {
            (ParamKind::Scalar { min, max }, ParamValue::Scalar(v)) => {
                let v = finite(key, *v)?.clamp(min, max);
                if let Some(slot) = self.scalar_slot(key) {
                    *slot = v;
                }
            }
            (ParamKind::Flag, ParamValue::Flag(b)) => self.reverse_mode = *b,
            (ParamKind::Flag, ParamValue::Scalar(v)) => {
                self.reverse_mode = finite(key, *v)? != 0.0;
            }
            (ParamKind::Vector, ParamValue::Triple(arr)) => {
                for c in arr {
                    finite(key, *c)?;
                }
                let v = Vec3::from_array(*arr);
                if key == ParamKey::Center {
                    self.center = v;
                } else {
                    self.camera_position = v;
                }
            }
            (ParamKind::Color, ParamValue::Triple([r, g, b])) => {
                let c = Rgb::new(finite(key, *r)?, finite(key, *g)?, finite(key, *b)?);
                self.set_color(key, c);
            }
            (ParamKind::Color, ParamValue::Text(hex)) => {
                let c = Rgb::from_hex(hex).map_err(|e| RevealError::parameter(e.to_string()))?;
                self.set_color(key, c);
            }
            (ParamKind::Mode, ParamValue::Scalar(v)) => {
                self.hide_scene_mode = HideSweepMode::from_index(finite(key, *v)?);
            }
            (ParamKind::Mode, ParamValue::Text(s)) => {
                self.hide_scene_mode =
                    HideSweepMode::parse(s).ok_or_else(|| wrong_type(key, value))?;
            }
            _ => return Err(wrong_type(key, value)),
        }
        Ok(self.get(key))
    }

    /// Convenience for numeric keys.
    pub fn set_scalar(&mut self, key: ParamKey, v: f32) -> RevealResult<f32> {
        let stored = self.set(key, &ParamValue::Scalar(v))?;
        stored
            .as_scalar()
            .ok_or_else(|| RevealError::parameter(format!("{key} is not numeric")))
    }

    fn set_color(&mut self, key: ParamKey, c: Rgb) {
        if key == ParamKey::DotTint {
            self.dot_tint = c;
        } else {
            self.wave_tint = c;
        }
    }

    /// Copy with every scalar clamped to its range and non-finite values replaced.
    ///
    /// The kernel only ever reads sanitized parameters.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for key in ParamKey::ALL {
            if let ParamKind::Scalar { min, max } = key.kind()
                && let Some(slot) = out.scalar_slot(key)
            {
                *slot = if slot.is_finite() {
                    slot.clamp(min, max)
                } else {
                    min.max(0.0).min(max)
                };
            }
        }
        if !out.center.is_finite() {
            out.center = Vec3::ZERO;
        }
        if !out.camera_position.is_finite() {
            out.camera_position = Vec3::ZERO;
        }
        for c in [&mut out.dot_tint, &mut out.wave_tint] {
            if !c.to_vec3().is_finite() {
                *c = Rgb::BLACK;
            }
        }
        out.wave_style = out.wave_style.sanitized();
        out
    }

    /// Copy the listed keys from `source` verbatim.
    pub fn copy_keys(&mut self, source: &EffectParams, keys: &[ParamKey]) {
        for &key in keys {
            match key {
                ParamKey::ReverseMode => self.reverse_mode = source.reverse_mode,
                ParamKey::Center => self.center = source.center,
                ParamKey::CameraPosition => self.camera_position = source.camera_position,
                ParamKey::DotTint => self.dot_tint = source.dot_tint,
                ParamKey::WaveTint => self.wave_tint = source.wave_tint,
                ParamKey::HideSceneMode => self.hide_scene_mode = source.hide_scene_mode,
                _ => {
                    if let (Some(v), Some(slot)) = (source.scalar(key), self.scalar_slot(key)) {
                        *slot = v;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
