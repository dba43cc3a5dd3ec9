/// Easing curves used by parameter tweens and settle ramps. Input is clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Hide-scene sweep.
    #[default]
    Linear,
    /// Dispersion settle in the kernel.
    OutQuad,
    /// Load-full-scene tween.
    OutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// Single-precision variant for the per-point kernel.
    pub fn apply_f32(self, t: f32) -> f32 {
        self.apply(f64::from(t)) as f32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
