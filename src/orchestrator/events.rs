use crate::effects::kind::EffectKind;
use crate::foundation::error::RevealError;
use crate::scene::dataset::DatasetId;

/// Notifications emitted by the scene director, in the order they happen.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// A transition finished; `current` is now `dataset_id`.
    SceneChanged { dataset_id: DatasetId },
    TransitionStarted {
        generation: u64,
        from: Option<DatasetId>,
        to: DatasetId,
        reverse_duration: f32,
        reveal_delay: f32,
    },
    TransitionCancelled { generation: u64, target: DatasetId },
    DatasetLoading { dataset_id: DatasetId },
    DatasetReady { dataset_id: DatasetId },
    /// Dataset or instance failure. Aborts only the transition that needed it.
    LoadError {
        dataset_id: DatasetId,
        uri: String,
        cause: String,
    },
    RevealStarted {
        dataset_id: DatasetId,
        effect: EffectKind,
    },
    EffectChanged { effect: EffectKind },
}

impl SceneEvent {
    /// [`SceneEvent::LoadError`] describing `err`.
    pub fn load_error(err: &RevealError, uri: impl Into<String>) -> Self {
        Self::LoadError {
            dataset_id: DatasetId::from(err.dataset_id().unwrap_or_default()),
            uri: uri.into(),
            cause: err.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SceneChanged { .. } => "scene_changed",
            Self::TransitionStarted { .. } => "transition_started",
            Self::TransitionCancelled { .. } => "transition_cancelled",
            Self::DatasetLoading { .. } => "dataset_loading",
            Self::DatasetReady { .. } => "dataset_ready",
            Self::LoadError { .. } => "load_error",
            Self::RevealStarted { .. } => "reveal_started",
            Self::EffectChanged { .. } => "effect_changed",
        }
    }
}

/// Event stamped with the director clock.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimedEvent {
    pub time: f64,
    #[serde(flatten)]
    pub event: SceneEvent,
}
