use crate::animation::ease::Ease;
use crate::effects::params::ParamKey;

/// Time-driven animation of one scalar parameter on an active effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamTween {
    pub key: ParamKey,
    pub from: f32,
    pub to: f32,
    /// Director clock seconds.
    pub start: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl ParamTween {
    pub fn new(key: ParamKey, from: f32, to: f32, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            key,
            from,
            to,
            start,
            duration,
            ease,
        }
    }

    /// Normalised progress in `[0, 1]`. A zero duration jumps straight to the end.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: f64) -> f32 {
        let k = self.ease.apply(self.progress(now)) as f32;
        self.from + (self.to - self.from) * k
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
