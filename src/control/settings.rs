//! Persistence of user-tunable parameters.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::control::store::{ParamChange, ParamStore};
use crate::effects::kind::EffectKind;
use crate::effects::params::{EffectParams, ParamKey, ParamValue};
use crate::foundation::error::{RevealError, RevealResult};

/// Store key under which [`Settings`] are saved.
pub const SETTINGS_KEY: &str = "reveal-settings";

/// Scalar keys that survive a restart.
pub const USER_TUNABLE_KEYS: &[ParamKey] = &[
    ParamKey::Speed,
    ParamKey::Acceleration,
    ParamKey::Delay,
    ParamKey::EndRadius,
    ParamKey::RevealStartRadius,
    ParamKey::FloatMotionSpeed,
    ParamKey::WaveSpeed,
    ParamKey::WaveAmplitude,
    ParamKey::PointMotionSpeed,
    ParamKey::OscillationIntensity,
    ParamKey::PointCloudScale,
    ParamKey::PointCloudDensity,
    ParamKey::PointCloudOpacity,
    ParamKey::BaseBrightness,
    ParamKey::DistanceDarkening,
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
    ParamKey::HideSceneLayerThickness,
    ParamKey::FadeDuration,
];

/// Motion parameters the panel does not expose. Always restored to these values.
const HIDDEN_MOTION: &[(ParamKey, f32)] = &[(ParamKey::DispersiveMotionSpeed, 0.0)];

/// Key-value persistence backend. Values are JSON documents.
pub trait SettingsStore {
    fn load(&self, key: &str) -> RevealResult<Option<String>>;
    fn save(&mut self, key: &str, json: &str) -> RevealResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> RevealResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, json: &str) -> RevealResult<()> {
        self.entries.insert(key.to_owned(), json.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> RevealResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RevealError::validation(format!(
                "settings key '{key}' must be non-empty ascii alphanumerics, '-' or '_'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> RevealResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read settings file '{}'", path.display()))
                .into()),
        }
    }

    fn save(&mut self, key: &str, json: &str) -> RevealResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create settings dir '{}'", self.dir.display()))?;
        std::fs::write(&path, json)
            .with_context(|| format!("write settings file '{}'", path.display()))?;
        Ok(())
    }
}

/// Persisted subset of the control surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Values of [`USER_TUNABLE_KEYS`] by key name.
    pub values: BTreeMap<String, f32>,
    pub dot_tint: String,
    pub effect: EffectKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self::capture(&EffectParams::default(), EffectKind::default())
    }
}

impl Settings {
    pub fn capture(params: &EffectParams, effect: EffectKind) -> Self {
        let values = USER_TUNABLE_KEYS
            .iter()
            .filter_map(|&k| params.scalar(k).map(|v| (k.name().to_owned(), v)))
            .collect();
        Self {
            values,
            dot_tint: params.dot_tint.to_hex(),
            effect,
        }
    }

    /// Write these settings into `store`. Unknown or invalid entries are skipped with a warning;
    /// hidden motion parameters are reset.
    pub fn apply(&self, store: &mut ParamStore) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        let mut push = |store: &mut ParamStore, key: ParamKey, value: ParamValue| {
            match store.set(key, &value) {
                Ok(Some(c)) => changes.push(c),
                Ok(None) => {}
                Err(err) => tracing::warn!(key = %key, %err, "ignoring saved setting"),
            }
        };

        for (name, &v) in &self.values {
            match name.parse::<ParamKey>() {
                Ok(key) if USER_TUNABLE_KEYS.contains(&key) => {
                    push(store, key, ParamValue::Scalar(v));
                }
                _ => tracing::warn!(key = %name, "ignoring unknown saved setting"),
            }
        }
        if !self.dot_tint.is_empty() {
            push(store, ParamKey::DotTint, ParamValue::Text(self.dot_tint.clone()));
        }
        for &(key, v) in HIDDEN_MOTION {
            push(store, key, ParamValue::Scalar(v));
        }
        changes
    }

    pub fn to_json(&self) -> RevealResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RevealError::serde(e.to_string()))
    }

    pub fn from_json(json: &str) -> RevealResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RevealError::serde(format!("invalid settings document: {e}")))
    }

    pub fn save_to(&self, backend: &mut dyn SettingsStore) -> RevealResult<()> {
        backend.save(SETTINGS_KEY, &self.to_json()?)
    }

    /// `None` when nothing was saved yet.
    pub fn load_from(backend: &dyn SettingsStore) -> RevealResult<Option<Self>> {
        backend
            .load(SETTINGS_KEY)?
            .map(|json| Self::from_json(&json))
            .transpose()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/settings.rs"]
mod tests;
