use crate::foundation::error::{RevealError, RevealResult};

pub use glam::Vec3;

/// Linear RGB triple. Components are not clamped; tints above 1 are legal.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> RevealResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(RevealError::validation(format!(
                "colour '{s}' must be #rrggbb"
            )));
        }
        let channel = |i: usize| -> RevealResult<f32> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| f32::from(v) / 255.0)
                .map_err(|_| RevealError::validation(format!("colour '{s}' is not hexadecimal")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#rrggbb`, clamping each channel to `[0, 1]`.
    pub fn to_hex(self) -> String {
        fn byte(c: f32) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// One element of a point cloud. Never mutated by evaluation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub position: Vec3,
    pub color: Rgb,
    pub opacity: f32,
    /// Isotropic extent used for size blending.
    pub size: f32,
    /// Optional per-axis extent; renderers scale it by the same factor as `size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
}

impl Point {
    pub fn new(position: Vec3, color: Rgb, opacity: f32, size: f32) -> Self {
        Self {
            position,
            color,
            opacity,
            size,
            scale: None,
        }
    }

    /// Size used by the kernel: the largest axis of `scale` when present, else `size`.
    pub fn extent(&self) -> f32 {
        match self.scale {
            Some(s) => s.max_element().max(0.0),
            None => self.size.max(0.0),
        }
    }
}
