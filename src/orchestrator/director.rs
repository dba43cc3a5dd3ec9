//! Scene director: owns the `current` and `next` dataset instances and runs the hide/reveal
//! handoff between them.
//!
//! The director is driven by an explicit clock. Callers pass `now` (seconds) into every command
//! and into [`SceneDirector::tick`]; deferred work lives in a [`Scheduler`] and is tagged with the
//! transition generation it belongs to, so anything left over from a cancelled transition is
//! dropped instead of firing.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::ease::Ease;
use crate::animation::kinematics::time_to_reach;
use crate::animation::tween::ParamTween;
use crate::control::commands::Command;
use crate::control::config::DirectorConfig;
use crate::control::store::{ParamChange, ParamStore};
use crate::effects::kind::EffectKind;
use crate::effects::params::{EffectParams, ParamKey, ParamValue};
use crate::eval::batch::{EvalThreading, FrameStats, evaluate_frame_with_stats};
use crate::eval::frame::{FrameSnapshot, PointOutput};
use crate::foundation::error::{RevealError, RevealResult};
use crate::foundation::observe::{Observer, Subscribers, SubscriptionId};
use crate::orchestrator::events::{SceneEvent, TimedEvent};
use crate::orchestrator::plan::{TransitionPlan, plan_transition};
use crate::orchestrator::scheduler::{Continuation, Scheduled, Scheduler};
use crate::scene::dataset::{DatasetId, DatasetState, PointCloud};
use crate::scene::host::{HeadlessHost, InstanceHandle, RenderHost};
use crate::scene::lifecycle::{DatasetRegistry, LoadOutcome};

const ORDER_BACK: i32 = 0;
const ORDER_FRONT: i32 = 1;

/// Motion clock a hide inherits from the reveal it replaced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarriedMotion {
    pub params: EffectParams,
    pub started_at: f64,
}

/// An effect running on one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub params: EffectParams,
    /// Director clock time at which effect-local time is zero.
    pub started_at: f64,
    pub carried: Option<CarriedMotion>,
}

impl ActiveEffect {
    pub fn new(kind: EffectKind, params: EffectParams, started_at: f64) -> Self {
        Self {
            kind,
            params,
            started_at,
            carried: None,
        }
    }

    pub fn local_time(&self, now: f64) -> f32 {
        (now - self.started_at).max(0.0) as f32
    }

    pub fn snapshot(&self, now: f64) -> FrameSnapshot {
        let snap = FrameSnapshot::new(self.kind, &self.params, self.local_time(now));
        match &self.carried {
            Some(c) => snap.continuing(&c.params, (now - c.started_at).max(0.0) as f32),
            None => snap,
        }
    }

    /// Distance of the front from the center, capped at the end radius. `None` for effects
    /// without a front.
    pub fn front_radius(&self, now: f64) -> Option<f32> {
        let t = self.local_time(now);
        let kin = self.params.kinematics();
        match self.kind {
            EffectKind::Radial if self.params.reverse_mode => Some(kin.reverse_front(t)),
            EffectKind::Instant | EffectKind::Fade => None,
            _ => Some(kin.forward_front(t).min(self.params.end_radius)),
        }
    }

    pub fn is_complete(&self, now: f64) -> bool {
        self.kind.is_complete(&self.params, self.local_time(now))
    }

    /// Radial hide that starts exactly where this effect stands at `now`.
    ///
    /// A radial effect keeps every parameter it has, sweep progress included; only the direction,
    /// speed, end radius and delay change. Other kinds show their points whole, so they are hidden
    /// as a fully loaded radial scene built from `base`.
    pub fn hide_from(&self, base: &EffectParams, reverse_speed: f32, now: f64) -> Self {
        let (mut params, carried) = match self.kind {
            EffectKind::Radial => (
                self.params,
                self.carried.or(Some(CarriedMotion {
                    params: self.params,
                    started_at: self.started_at,
                })),
            ),
            _ => {
                let mut p = EffectKind::Radial.build(base);
                p.center = self.params.center;
                p.load_full_scene_progress = 1.0;
                p.hide_scene_progress = self.params.hide_scene_progress;
                p.hide_scene_mode = self.params.hide_scene_mode;
                p.hide_scene_layer_thickness = self.params.hide_scene_layer_thickness;
                p.hide_scene_min_y = self.params.hide_scene_min_y;
                p.hide_scene_max_y = self.params.hide_scene_max_y;
                (p, None)
            }
        };
        let front = self
            .front_radius(now)
            .unwrap_or(params.end_radius)
            .min(params.end_radius);
        params.reverse_mode = true;
        params.reverse_speed = reverse_speed;
        params.end_radius = front.max(params.reveal_start_radius);
        params.delay = 0.0;
        Self {
            kind: EffectKind::Radial,
            params,
            started_at: now,
            carried,
        }
    }

    /// Forward reveal that picks a hide back up from its current front, or `None` when there is
    /// no reveal to return to.
    fn resume_from(&self, now: f64) -> Option<Self> {
        let carried = self.carried?;
        let forward = carried.params;
        let front = self.front_radius(now)?;
        let to_front = time_to_reach(front, forward.speed, forward.acceleration)?;
        Some(Self {
            kind: EffectKind::Radial,
            params: forward,
            started_at: now - f64::from(forward.delay.max(0.0) + to_front),
            carried: Some(carried),
        })
    }
}

/// A placed occurrence of a ready dataset.
#[derive(Clone, Debug)]
pub struct DatasetInstance {
    pub dataset: DatasetId,
    pub handle: InstanceHandle,
    pub cloud: Arc<PointCloud>,
    pub enabled: bool,
    pub render_order: i32,
    /// `None` until a reveal has been started on this instance.
    pub effect: Option<ActiveEffect>,
    tweens: SmallVec<[ParamTween; 2]>,
}

impl DatasetInstance {
    fn new(dataset: DatasetId, handle: InstanceHandle, cloud: Arc<PointCloud>) -> Self {
        Self {
            dataset,
            handle,
            cloud,
            enabled: false,
            render_order: ORDER_FRONT,
            effect: None,
            tweens: SmallVec::new(),
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.effect.is_some()
    }

    fn start_tween(&mut self, tween: ParamTween) {
        self.tweens.retain(|t| t.key != tween.key);
        self.tweens.push(tween);
    }

    fn cancel_tween(&mut self, key: ParamKey) {
        self.tweens.retain(|t| t.key != key);
    }

    fn advance_tweens(&mut self, now: f64) {
        let Some(effect) = self.effect.as_mut() else {
            self.tweens.clear();
            return;
        };
        for tw in &self.tweens {
            if let Err(err) = effect.params.set_scalar(tw.key, tw.value_at(now)) {
                tracing::warn!(key = %tw.key, %err, "tween value rejected");
            }
        }
        self.tweens.retain(|t| !t.is_finished(now));
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    AwaitingDataset {
        generation: u64,
        target: DatasetId,
    },
    InProgress {
        generation: u64,
        target: DatasetId,
        plan: TransitionPlan,
    },
}

/// Public view of the transition state machine.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransitionState {
    Idle,
    AwaitingDataset { target: DatasetId },
    InProgress { target: DatasetId, plan: TransitionPlan },
}

/// Serializable summary of the director at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DirectorStatus {
    pub time: f64,
    pub transition: TransitionState,
    pub generation: u64,
    pub effect: EffectKind,
    pub current: Option<DatasetId>,
    pub next: Option<DatasetId>,
    pub pending_timers: usize,
    /// Director clock time of the earliest pending continuation.
    pub next_timer_due: Option<f64>,
}

/// Evaluated output of one enabled instance.
#[derive(Clone, Debug)]
pub struct RenderedInstance {
    pub dataset: DatasetId,
    pub render_order: i32,
    pub outputs: Vec<PointOutput>,
    pub stats: FrameStats,
}

/// Single-threaded scene transition state machine.
pub struct SceneDirector<H: RenderHost = HeadlessHost> {
    config: DirectorConfig,
    registry: DatasetRegistry,
    host: H,
    params: ParamStore,
    effect_kind: EffectKind,
    current: Option<DatasetInstance>,
    next: Option<DatasetInstance>,
    phase: Phase,
    generation: u64,
    scheduler: Scheduler,
    clock: f64,
    log: Vec<TimedEvent>,
    subscribers: Subscribers<SceneEvent>,
}

impl<H: RenderHost> std::fmt::Debug for SceneDirector<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDirector")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("effect_kind", &self.effect_kind)
            .field("current", &self.current.as_ref().map(|i| &i.dataset))
            .field("next", &self.next.as_ref().map(|i| &i.dataset))
            .finish()
    }
}

impl<H: RenderHost> SceneDirector<H> {
    pub fn new(config: DirectorConfig, registry: DatasetRegistry, host: H) -> RevealResult<Self> {
        config.validate()?;
        Ok(Self {
            effect_kind: config.initial_effect,
            config,
            registry,
            host,
            params: ParamStore::default(),
            current: None,
            next: None,
            phase: Phase::Idle,
            generation: 0,
            scheduler: Scheduler::default(),
            clock: 0.0,
            log: Vec::new(),
            subscribers: Subscribers::default(),
        })
    }

    /// Replace the base parameter store, e.g. after restoring saved settings.
    pub fn with_params(mut self, params: ParamStore) -> Self {
        self.params = params;
        self
    }

    // ---- accessors -------------------------------------------------------------------------

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamStore {
        &mut self.params
    }

    pub fn effect_kind(&self) -> EffectKind {
        self.effect_kind
    }

    pub fn current(&self) -> Option<&DatasetInstance> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&DatasetInstance> {
        self.next.as_ref()
    }

    pub fn current_dataset(&self) -> Option<&DatasetId> {
        self.current.as_ref().map(|i| &i.dataset)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn transition_state(&self) -> TransitionState {
        match &self.phase {
            Phase::Idle => TransitionState::Idle,
            Phase::AwaitingDataset { target, .. } => TransitionState::AwaitingDataset {
                target: target.clone(),
            },
            Phase::InProgress { target, plan, .. } => TransitionState::InProgress {
                target: target.clone(),
                plan: *plan,
            },
        }
    }

    pub fn status(&self) -> DirectorStatus {
        DirectorStatus {
            time: self.clock,
            transition: self.transition_state(),
            generation: self.generation,
            effect: self.effect_kind,
            current: self.current_dataset().cloned(),
            next: self.next.as_ref().map(|i| i.dataset.clone()),
            pending_timers: self.scheduler.len(),
            next_timer_due: self.scheduler.next_due(),
        }
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[TimedEvent] {
        &self.log
    }

    pub fn take_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.log)
    }

    pub fn subscribe(&mut self, observer: impl Observer<SceneEvent> + 'static) -> SubscriptionId {
        self.subscribers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn emit(&mut self, event: SceneEvent) {
        tracing::info!(event = event.name(), time = self.clock, "scene event");
        self.subscribers.emit(&event);
        self.log.push(TimedEvent {
            time: self.clock,
            event,
        });
    }

    fn advance_clock(&mut self, now: f64) {
        if now.is_finite() && now > self.clock {
            self.clock = now;
        }
    }

    // ---- transitions -----------------------------------------------------------------------

    /// Transition to dataset `id`.
    ///
    /// Any transition in progress is cancelled first. Asking for the dataset already shown is a
    /// no-op; asking for it mid-transition cancels and re-reveals it. Unknown ids fail with
    /// [`RevealError::DatasetNotFound`]; load and instance failures are reported as
    /// [`SceneEvent::LoadError`] and leave the director idle with `current` shown. A `current`
    /// already hiding for a cancelled transition resumes its reveal from where the hide stood.
    #[tracing::instrument(skip(self))]
    pub fn change_to(&mut self, id: &str, now: f64) -> RevealResult<()> {
        self.advance_clock(now);
        let now = self.clock;
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|c| c.dataset.as_str() == id);
        let (heading_there, hiding) = match &self.phase {
            Phase::Idle => (false, false),
            Phase::AwaitingDataset { target, .. } => (target.as_str() == id, false),
            Phase::InProgress { target, .. } => (target.as_str() == id, true),
        };

        if self.is_idle() {
            if is_current {
                return Ok(());
            }
        } else {
            if heading_there {
                return Ok(());
            }
            self.cancel_transition();
            if is_current {
                if hiding {
                    self.restart_current(now);
                }
                return Ok(());
            }
        }

        let info = match self.registry.info(id) {
            Ok(info) => info.clone(),
            Err(err) => {
                self.emit(SceneEvent::load_error(&err, ""));
                self.recover_current(now);
                return Err(err);
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let state = self.registry.request_load(info.id.as_str())?;
        self.phase = Phase::AwaitingDataset {
            generation,
            target: info.id.clone(),
        };
        if state == DatasetState::Ready {
            self.begin(generation, now);
        } else {
            self.emit(SceneEvent::DatasetLoading {
                dataset_id: info.id,
            });
            self.process_loads(now);
        }
        Ok(())
    }

    /// Advance to the following dataset in catalog order. Ignored while a transition runs.
    pub fn next_scene(&mut self, now: f64) -> RevealResult<()> {
        if !self.is_idle() {
            tracing::debug!("next scene ignored, transition in progress");
            return Ok(());
        }
        let target = match self.current_dataset() {
            Some(id) => self.registry.catalog().next_after(id.as_str()),
            None => self.registry.catalog().first(),
        }
        .map(|info| info.id.clone())
        .ok_or_else(|| RevealError::validation("catalog is empty"))?;
        self.change_to(target.as_str(), now)
    }

    /// Drop the transition in progress: pending timers, the incoming instance and the mask.
    fn cancel_transition(&mut self) {
        let (generation, target) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => return,
            Phase::AwaitingDataset { generation, target }
            | Phase::InProgress {
                generation, target, ..
            } => (generation, target),
        };
        let dropped = self.scheduler.cancel_generation(generation);
        tracing::debug!(generation, dropped, "transition cancelled");
        if let Some(next) = self.next.take() {
            self.host.release_instance(next.handle);
        }
        if let Some(cur) = self.current.as_mut() {
            if let Some(effect) = cur.effect.as_mut() {
                effect.params.mask_reveal_pos = 0.0;
                effect.params.mask_reveal_start_radius = 0.0;
            }
            cur.render_order = ORDER_FRONT;
            self.host.set_render_order(cur.handle, ORDER_FRONT);
        }
        self.emit(SceneEvent::TransitionCancelled { generation, target });
    }

    /// Bring back a current dataset left hiding by a cancelled transition whose replacement then
    /// failed. The reveal resumes from wherever the hide had got to.
    fn recover_current(&mut self, now: f64) {
        let Some(hiding) = self
            .current
            .as_ref()
            .and_then(|c| c.effect)
            .filter(|e| e.params.reverse_mode)
        else {
            return;
        };
        let Some(resumed) = hiding.resume_from(now) else {
            self.restart_current(now);
            return;
        };
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        tracing::info!(dataset = %cur.dataset, "reveal resumed after failed transition");
        cur.effect = Some(resumed);
        cur.tweens.clear();
        cur.enabled = true;
        self.host.set_enabled(cur.handle, true);
        let dataset_id = cur.dataset.clone();
        self.emit(SceneEvent::RevealStarted {
            dataset_id,
            effect: resumed.kind,
        });
    }

    /// Create the incoming instance and start the handoff. Failures are reported and end the
    /// transition.
    fn begin(&mut self, generation: u64, now: f64) {
        let Phase::AwaitingDataset { target, .. } = &self.phase else {
            return;
        };
        let target = target.clone();
        match self.create_instance(&target) {
            Ok(next) => self.start_handoff(generation, next, now),
            Err(err) => {
                let uri = self
                    .registry
                    .info(target.as_str())
                    .map(|i| i.uri.clone())
                    .unwrap_or_default();
                tracing::warn!(dataset = %target, %err, "transition aborted");
                self.phase = Phase::Idle;
                self.emit(SceneEvent::load_error(&err, uri));
                self.recover_current(now);
            }
        }
    }

    fn create_instance(&mut self, id: &DatasetId) -> RevealResult<DatasetInstance> {
        let cloud = self.registry.cloud(id.as_str())?;
        let handle = self
            .host
            .create_instance(id, &cloud)
            .map_err(|cause| RevealError::entity(id.as_str(), cause))?;
        self.host.set_enabled(handle, false);
        self.host.set_render_order(handle, ORDER_FRONT);
        Ok(DatasetInstance::new(id.clone(), handle, cloud))
    }

    fn start_handoff(&mut self, generation: u64, next: DatasetInstance, now: f64) {
        let target = next.dataset.clone();
        let base = *self.params.params();

        let revealed = self.current.as_ref().is_some_and(DatasetInstance::is_revealed);
        if !revealed {
            // nothing on screen to hide
            if let Some(old) = self.current.take() {
                self.host.release_instance(old.handle);
            }
            self.current = Some(next);
            self.phase = Phase::Idle;
            self.emit(SceneEvent::SceneChanged { dataset_id: target });
            return;
        }
        let Some(outgoing) = self.current.as_mut() else {
            return;
        };
        outgoing.advance_tweens(now);
        let Some(shown) = outgoing.effect else {
            return;
        };
        let hide = shown.hide_from(&base, self.config.reverse_speed, now);
        let plan = plan_transition(
            hide.params.end_radius,
            hide.params.reveal_start_radius,
            &self.config.timing(),
        );
        outgoing.effect = Some(hide);
        outgoing.tweens.clear();
        outgoing.render_order = ORDER_BACK;
        self.host.set_render_order(outgoing.handle, ORDER_BACK);
        let from = Some(outgoing.dataset.clone());

        self.next = Some(next);
        self.scheduler
            .schedule(now + f64::from(plan.reveal_delay), generation, Continuation::StartReveal);
        self.scheduler
            .schedule(now + f64::from(plan.reverse_duration), generation, Continuation::Promote);
        self.phase = Phase::InProgress {
            generation,
            target: target.clone(),
            plan,
        };
        tracing::info!(
            generation,
            reverse_duration = plan.reverse_duration,
            reveal_delay = plan.reveal_delay,
            "transition started"
        );
        self.emit(SceneEvent::TransitionStarted {
            generation,
            from,
            to: target,
            reverse_duration: plan.reverse_duration,
            reveal_delay: plan.reveal_delay,
        });
        // an overlap of 0 starts the reveal right away
        self.run_due(now);
    }

    fn start_next_reveal(&mut self, at: f64) {
        let base = *self.params.params();
        let kind = self.effect_kind;
        let Some(next) = self.next.as_mut() else {
            return;
        };
        let mut params = kind.build(&base);
        params.delay = 0.0;
        next.effect = Some(ActiveEffect::new(kind, params, at));
        next.enabled = true;
        self.host.set_enabled(next.handle, true);
        let dataset_id = next.dataset.clone();
        self.emit(SceneEvent::RevealStarted {
            dataset_id,
            effect: kind,
        });
    }

    fn promote(&mut self) {
        let Some(next) = self.next.take() else {
            self.phase = Phase::Idle;
            return;
        };
        if let Some(old) = self.current.take() {
            self.host.release_instance(old.handle);
        }
        self.host.set_render_order(next.handle, ORDER_FRONT);
        let dataset_id = next.dataset.clone();
        self.current = Some(DatasetInstance {
            render_order: ORDER_FRONT,
            ..next
        });
        self.phase = Phase::Idle;
        self.emit(SceneEvent::SceneChanged { dataset_id });
    }

    fn phase_generation(&self) -> Option<u64> {
        match self.phase {
            Phase::Idle => None,
            Phase::AwaitingDataset { generation, .. } | Phase::InProgress { generation, .. } => {
                Some(generation)
            }
        }
    }

    fn run_due(&mut self, now: f64) {
        for Scheduled {
            generation, task, due, ..
        } in self.scheduler.take_due(now)
        {
            if self.phase_generation() != Some(generation) {
                tracing::debug!(generation, ?task, "stale continuation dropped");
                continue;
            }
            match task {
                Continuation::StartReveal => self.start_next_reveal(due),
                Continuation::Promote => self.promote(),
            }
        }
    }

    fn process_loads(&mut self, now: f64) {
        for outcome in self.registry.poll() {
            let awaited = match &self.phase {
                Phase::AwaitingDataset { generation, target } if target == outcome.id() => {
                    Some(*generation)
                }
                _ => None,
            };
            match outcome {
                LoadOutcome::Ready { id } => {
                    self.emit(SceneEvent::DatasetReady { dataset_id: id });
                    if let Some(generation) = awaited {
                        self.begin(generation, now);
                    }
                }
                LoadOutcome::Failed { id, uri, cause } => {
                    if awaited.is_some() {
                        let err = RevealError::load_failed(id.as_str(), uri.as_str(), cause);
                        tracing::warn!(%err, "transition aborted");
                        self.phase = Phase::Idle;
                        self.emit(SceneEvent::load_error(&err, uri));
                        self.recover_current(now);
                    } else {
                        tracing::debug!(dataset = %id, %cause, "load failure for dataset no longer wanted");
                    }
                }
            }
        }
    }

    /// Keep the outgoing instance's mask on the incoming reveal front.
    fn sync_mask(&mut self, now: f64) {
        let mask = self
            .next
            .as_ref()
            .and_then(|n| n.effect.as_ref())
            .filter(|e| e.kind == EffectKind::Radial && !e.params.reverse_mode)
            .map(|e| {
                let kin = e.params.kinematics();
                (kin.forward_front(e.local_time(now)), e.params.reveal_start_radius)
            });
        if let Some(effect) = self.current.as_mut().and_then(|c| c.effect.as_mut()) {
            let (pos, start) = mask.unwrap_or((0.0, 0.0));
            effect.params.mask_reveal_pos = pos;
            effect.params.mask_reveal_start_radius = start;
        }
    }

    /// Advance the director to `now`: apply finished loads, fire due continuations, step
    /// parameter tweens and the cross-fade mask.
    pub fn tick(&mut self, now: f64) {
        self.advance_clock(now);
        let now = self.clock;
        self.process_loads(now);
        self.run_due(now);
        for inst in [self.current.as_mut(), self.next.as_mut()].into_iter().flatten() {
            inst.advance_tweens(now);
        }
        self.sync_mask(now);
    }

    // ---- effect control --------------------------------------------------------------------

    /// Show the current dataset with the selected effect, from the beginning.
    pub fn start_reveal(&mut self, now: f64) -> RevealResult<()> {
        self.advance_clock(now);
        if matches!(self.phase, Phase::InProgress { .. }) {
            tracing::debug!("start reveal ignored, transition in progress");
            return Ok(());
        }
        if self.current.is_none() {
            return Err(RevealError::validation("no dataset to reveal"));
        }
        self.restart_current(self.clock);
        Ok(())
    }

    /// Restart the reveal on the current dataset. Same as [`SceneDirector::start_reveal`].
    pub fn restart(&mut self, now: f64) -> RevealResult<()> {
        self.start_reveal(now)
    }

    fn restart_current(&mut self, now: f64) {
        let base = *self.params.params();
        let kind = self.effect_kind;
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        cur.effect = Some(ActiveEffect::new(kind, kind.build(&base), now));
        cur.tweens.clear();
        cur.enabled = true;
        cur.render_order = ORDER_FRONT;
        self.host.set_enabled(cur.handle, true);
        self.host.set_render_order(cur.handle, ORDER_FRONT);
        let dataset_id = cur.dataset.clone();
        self.emit(SceneEvent::RevealStarted {
            dataset_id,
            effect: kind,
        });
    }

    /// Select an effect kind. A revealed, idle current dataset restarts with it.
    pub fn set_effect(&mut self, kind: EffectKind, now: f64) {
        self.advance_clock(now);
        if kind == self.effect_kind {
            return;
        }
        self.effect_kind = kind;
        self.emit(SceneEvent::EffectChanged { effect: kind });
        let revealed = self.current.as_ref().is_some_and(DatasetInstance::is_revealed);
        if revealed && self.is_idle() {
            self.restart_current(self.clock);
        }
    }

    pub fn next_effect(&mut self, now: f64) {
        self.set_effect(self.effect_kind.next(), now);
    }

    pub fn prev_effect(&mut self, now: f64) {
        self.set_effect(self.effect_kind.prev(), now);
    }

    /// Sweep the current dataset to full size and brightness. Cancels any hide sweep.
    pub fn load_full_scene(&mut self, now: f64) -> RevealResult<()> {
        self.advance_clock(now);
        let now = self.clock;
        let duration = f64::from(self.config.load_full_scene_duration);
        let Some(cur) = self.current.as_mut() else {
            return Err(RevealError::validation("no dataset to load"));
        };
        let Some(effect) = cur.effect.as_mut() else {
            tracing::warn!(dataset = %cur.dataset, "load full scene ignored, nothing revealed");
            return Ok(());
        };
        effect.params.hide_scene_progress = 0.0;
        let from = effect.params.load_full_scene_progress;
        cur.cancel_tween(ParamKey::HideSceneProgress);
        cur.start_tween(ParamTween::new(
            ParamKey::LoadFullSceneProgress,
            from,
            1.0,
            now,
            duration,
            Ease::OutCubic,
        ));
        Ok(())
    }

    /// Sweep the current dataset out layer by layer.
    pub fn hide_scene(&mut self, now: f64) -> RevealResult<()> {
        self.advance_clock(now);
        let now = self.clock;
        let duration = f64::from(self.config.hide_scene_duration);
        let mode = self.config.hide_scene_mode;
        let thickness = self.config.hide_scene_layer_thickness;
        let extent = self.params.params().end_radius;
        let Some(cur) = self.current.as_mut() else {
            return Err(RevealError::validation("no dataset to hide"));
        };
        let Some(effect) = cur.effect.as_mut() else {
            tracing::warn!(dataset = %cur.dataset, "hide scene ignored, nothing revealed");
            return Ok(());
        };
        let p = &mut effect.params;
        p.hide_scene_mode = mode;
        p.hide_scene_layer_thickness = thickness;
        p.hide_scene_min_y = p.center.y - extent;
        p.hide_scene_max_y = p.center.y + extent;
        p.hide_scene_progress = 0.0;
        cur.start_tween(ParamTween::new(
            ParamKey::HideSceneProgress,
            0.0,
            1.0,
            now,
            duration,
            Ease::Linear,
        ));
        Ok(())
    }

    /// Write a base parameter and live-sync it into the current forward effect.
    pub fn set_param(
        &mut self,
        key: ParamKey,
        value: &ParamValue,
        now: f64,
    ) -> RevealResult<Option<ParamChange>> {
        self.advance_clock(now);
        let change = self.params.set(key, value)?;
        if change.is_some() && self.is_idle() {
            let base = *self.params.params();
            if let Some(effect) = self.current.as_mut().and_then(|c| c.effect.as_mut())
                && !effect.params.reverse_mode
            {
                let delay = effect.params.delay;
                effect.kind.apply_params(&base, &mut effect.params);
                effect.params.delay = delay;
                if let Some(carried) = effect.carried.as_mut() {
                    effect.kind.apply_params(&base, &mut carried.params);
                    carried.params.delay = delay;
                }
            }
        }
        Ok(change)
    }

    pub fn dispatch(&mut self, command: &Command, now: f64) -> RevealResult<()> {
        tracing::debug!(?command, now, "dispatch");
        match command {
            Command::StartReveal => self.start_reveal(now),
            Command::Restart => self.restart(now),
            Command::NextEffect => {
                self.next_effect(now);
                Ok(())
            }
            Command::PrevEffect => {
                self.prev_effect(now);
                Ok(())
            }
            Command::SetEffect { effect } => {
                self.set_effect(*effect, now);
                Ok(())
            }
            Command::ChangeScene { id } => self.change_to(id.as_str(), now),
            Command::NextScene => self.next_scene(now),
            Command::LoadFullScene => self.load_full_scene(now),
            Command::HideScene => self.hide_scene(now),
            Command::SetParam { key, value } => self.set_param(*key, value, now).map(|_| ()),
        }
    }

    // ---- frames ----------------------------------------------------------------------------

    /// Snapshots of every enabled instance with a running effect, back to front.
    pub fn frame(&self, now: f64) -> Vec<(DatasetId, i32, FrameSnapshot)> {
        let mut out: Vec<_> = [self.current.as_ref(), self.next.as_ref()]
            .into_iter()
            .flatten()
            .filter(|i| i.enabled)
            .filter_map(|i| {
                i.effect
                    .as_ref()
                    .map(|e| (i.dataset.clone(), i.render_order, e.snapshot(now)))
            })
            .collect();
        out.sort_by_key(|(_, order, _)| *order);
        out
    }

    /// Evaluate every enabled instance at `now`.
    pub fn render_frame(
        &self,
        now: f64,
        threading: &EvalThreading,
    ) -> RevealResult<Vec<RenderedInstance>> {
        let mut out = Vec::new();
        for (dataset, render_order, snapshot) in self.frame(now) {
            let cloud = [self.current.as_ref(), self.next.as_ref()]
                .into_iter()
                .flatten()
                .find(|i| i.dataset == dataset)
                .map(|i| Arc::clone(&i.cloud))
                .ok_or_else(|| RevealError::not_found(dataset.as_str()))?;
            let (outputs, stats) = evaluate_frame_with_stats(&cloud.points, &snapshot, threading)?;
            out.push(RenderedInstance {
                dataset,
                render_order,
                outputs,
                stats,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orchestrator/director.rs"]
mod tests;
