use crate::effects::kind::EffectKind;
use crate::effects::params::HideSweepMode;
use crate::foundation::error::{RevealError, RevealResult};
use crate::orchestrator::plan::TransitionTiming;

/// Director-level tuning. Loaded from JSON; every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorConfig {
    /// Speed of the hide (reverse) animation on the outgoing dataset.
    pub reverse_speed: f32,
    /// Fraction of the hide animation after which the incoming reveal starts.
    pub overlap: f32,
    pub min_reverse_duration: f32,
    pub max_reverse_duration: f32,
    pub load_full_scene_duration: f32,
    pub hide_scene_duration: f32,
    pub hide_scene_mode: HideSweepMode,
    pub hide_scene_layer_thickness: f32,
    pub initial_effect: EffectKind,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            reverse_speed: 5.0,
            overlap: 0.5,
            min_reverse_duration: 0.1,
            max_reverse_duration: 10.0,
            load_full_scene_duration: 1.5,
            hide_scene_duration: 2.0,
            hide_scene_mode: HideSweepMode::BottomUp,
            hide_scene_layer_thickness: 0.1,
            initial_effect: EffectKind::Radial,
        }
    }
}

fn positive(name: &str, v: f32) -> RevealResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(RevealError::validation(format!(
            "director config '{name}' must be finite and > 0, got {v}"
        )))
    }
}

impl DirectorConfig {
    pub fn from_json(json: &str) -> RevealResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| RevealError::serde(format!("invalid director config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> RevealResult<()> {
        positive("reverse_speed", self.reverse_speed)?;
        positive("min_reverse_duration", self.min_reverse_duration)?;
        positive("max_reverse_duration", self.max_reverse_duration)?;
        positive("load_full_scene_duration", self.load_full_scene_duration)?;
        positive("hide_scene_duration", self.hide_scene_duration)?;
        positive("hide_scene_layer_thickness", self.hide_scene_layer_thickness)?;
        if !(self.overlap.is_finite() && (0.0..=1.0).contains(&self.overlap)) {
            return Err(RevealError::validation(format!(
                "director config 'overlap' must be in [0, 1], got {}",
                self.overlap
            )));
        }
        if self.min_reverse_duration > self.max_reverse_duration {
            return Err(RevealError::validation(
                "director config 'min_reverse_duration' must not exceed 'max_reverse_duration'",
            ));
        }
        Ok(())
    }

    pub fn timing(&self) -> TransitionTiming {
        TransitionTiming {
            reverse_speed: self.reverse_speed,
            overlap: self.overlap,
            min_duration: self.min_reverse_duration,
            max_duration: self.max_reverse_duration,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/config.rs"]
mod tests;
