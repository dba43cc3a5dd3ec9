use crate::effects::kind::EffectKind;
use crate::effects::params::{ParamKey, ParamValue};
use crate::foundation::error::{RevealError, RevealResult};
use crate::scene::dataset::DatasetId;

/// Headless control-surface commands understood by the scene director.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartReveal,
    Restart,
    NextEffect,
    PrevEffect,
    SetEffect { effect: EffectKind },
    ChangeScene { id: DatasetId },
    NextScene,
    LoadFullScene,
    HideScene,
    SetParam { key: ParamKey, value: ParamValue },
}

/// Command scheduled at a director clock time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptStep {
    pub at: f64,
    #[serde(flatten)]
    pub command: Command,
}

/// Ordered list of timed commands, as read from a JSON array.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CommandScript {
    pub steps: Vec<ScriptStep>,
}

impl CommandScript {
    pub fn from_json(json: &str) -> RevealResult<Self> {
        let mut script: Self = serde_json::from_str(json)
            .map_err(|e| RevealError::serde(format!("invalid command script: {e}")))?;
        if let Some(bad) = script.steps.iter().find(|s| !s.at.is_finite() || s.at < 0.0) {
            return Err(RevealError::validation(format!(
                "command time must be finite and >= 0, got {}",
                bad.at
            )));
        }
        script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }

    /// Time of the last step, or 0 for an empty script.
    pub fn end_time(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.at)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/commands.rs"]
mod tests;
