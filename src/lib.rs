//! Reveal and hide animations for point-cloud datasets.
//!
//! The crate has two halves:
//!
//! - A per-point kernel ([`FrameSnapshot::evaluate`], [`evaluate_frame`]) that turns an effect's
//!   parameters and local time into a position offset, size, colour and alpha for every point.
//! - A [`SceneDirector`] that owns the visible dataset and the incoming one, and runs the
//!   hide-then-reveal handoff between them on an explicit clock.
//!
//! Both halves are headless. Rendering is left to a [`RenderHost`] implementation.
#![forbid(unsafe_code)]

pub mod animation;
pub mod control;
pub mod effects;
pub mod eval;
pub mod foundation;
pub mod orchestrator;
pub mod scene;

pub use crate::foundation::core::{Point, Rgb, Vec3};
pub use crate::foundation::error::{RevealError, RevealResult};

pub use crate::animation::ease::Ease;
pub use crate::control::commands::{Command, CommandScript, ScriptStep};
pub use crate::control::config::DirectorConfig;
pub use crate::control::settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
pub use crate::control::store::{ParamChange, ParamStore};
pub use crate::effects::kind::EffectKind;
pub use crate::effects::params::{EffectParams, HideSweepMode, ParamKey, ParamValue, WaveStyle};
pub use crate::eval::batch::{EvalThreading, FrameStats, evaluate_frame, evaluate_frame_with_stats};
pub use crate::eval::frame::{FrameSnapshot, PointOutput};
pub use crate::orchestrator::director::{DirectorStatus, SceneDirector, TransitionState};
pub use crate::orchestrator::events::{SceneEvent, TimedEvent};
pub use crate::orchestrator::plan::{TransitionPlan, TransitionTiming, plan_transition};
pub use crate::scene::catalog::{Catalog, CatalogSource};
pub use crate::scene::dataset::{DatasetId, DatasetInfo, DatasetState, PointCloud};
pub use crate::scene::host::{HeadlessHost, InstanceHandle, RenderHost};
pub use crate::scene::lifecycle::DatasetRegistry;
pub use crate::scene::loader::{DatasetLoader, MemoryLoader, SyntheticLoader, ThreadedLoader};
