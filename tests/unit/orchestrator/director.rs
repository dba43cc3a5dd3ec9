use std::sync::Mutex;

use super::*;
use crate::scene::catalog::Catalog;
use crate::scene::loader::SyntheticLoader;

fn director_with(loader: SyntheticLoader, host: HeadlessHost) -> SceneDirector {
    let registry = DatasetRegistry::new(Catalog::builtin(), loader);
    let mut d = SceneDirector::new(DirectorConfig::default(), registry, host).unwrap();
    d.set_param(ParamKey::Speed, &ParamValue::Scalar(5.0), 0.0)
        .unwrap();
    d.set_param(ParamKey::RevealStartRadius, &ParamValue::Scalar(0.3), 0.0)
        .unwrap();
    d
}

fn director() -> SceneDirector {
    director_with(SyntheticLoader::with_points(64), HeadlessHost::default())
}

/// Director showing `room`, revealed at t=0 and ticked to t=10 so the front sits at the end
/// radius.
fn revealed_room() -> SceneDirector {
    let mut d = director();
    d.change_to("room", 0.0).unwrap();
    d.start_reveal(0.0).unwrap();
    d.tick(10.0);
    d
}

fn names(d: &SceneDirector) -> Vec<&'static str> {
    d.events().iter().map(|e| e.event.name()).collect()
}

fn count(d: &SceneDirector, name: &str) -> usize {
    d.events().iter().filter(|e| e.event.name() == name).count()
}

fn room_outputs(d: &SceneDirector, now: f64) -> Vec<PointOutput> {
    d.render_frame(now, &EvalThreading::sequential())
        .unwrap()
        .into_iter()
        .find(|f| f.dataset.as_str() == "room")
        .map(|f| f.outputs)
        .unwrap_or_default()
}

fn assert_no_jump(before: &[PointOutput], after: &[PointOutput]) {
    assert_eq!(before.len(), after.len());
    for (i, (a, b)) in before.iter().zip(after).enumerate() {
        assert_eq!(a.visible, b.visible, "visibility of point {i}");
        assert!((a.alpha - b.alpha).abs() < 1e-4, "alpha of point {i}");
        if a.visible {
            assert!((a.size_scale - b.size_scale).abs() < 1e-4, "size of point {i}");
            assert!(
                a.position_offset.abs_diff_eq(b.position_offset, 1e-4),
                "offset of point {i}"
            );
        }
    }
}

/// Switch `room` to `canyon` at `now` and check the room looks the same either side of it.
fn hand_off_without_a_jump(d: &mut SceneDirector, now: f64) {
    d.tick(now);
    let before = room_outputs(d, now);
    d.change_to("canyon", now).unwrap();
    assert!(d.current().unwrap().effect.unwrap().params.reverse_mode);
    assert_no_jump(&before, &room_outputs(d, now));
}

fn shown(outputs: &[PointOutput]) -> usize {
    outputs.iter().filter(|o| o.visible && o.alpha > 1e-3).count()
}

fn enabled(d: &SceneDirector) -> Vec<String> {
    d.host()
        .enabled_datasets()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn first_dataset_switches_in_without_animation() {
    let mut d = director();
    d.change_to("room", 0.0).unwrap();
    assert_eq!(
        names(&d),
        vec!["dataset_loading", "dataset_ready", "scene_changed"]
    );
    assert!(d.is_idle());
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
    assert!(!d.current().unwrap().is_revealed());
    assert_eq!(d.host().live_count(), 1);
    assert!(enabled(&d).is_empty());
}

#[test]
fn change_to_current_is_a_no_op() {
    let mut d = revealed_room();
    let events = d.events().len();
    let generation = d.generation();
    let effect = *d.current().unwrap().effect.as_ref().unwrap();
    d.change_to("room", 11.0).unwrap();
    assert_eq!(d.events().len(), events);
    assert_eq!(d.generation(), generation);
    assert_eq!(d.pending_timers(), 0);
    assert_eq!(*d.current().unwrap().effect.as_ref().unwrap(), effect);
}

#[test]
fn handoff_follows_the_plan() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();

    let started = d
        .events()
        .iter()
        .find_map(|e| match &e.event {
            SceneEvent::TransitionStarted {
                reverse_duration,
                reveal_delay,
                ..
            } => Some((*reverse_duration, *reveal_delay)),
            _ => None,
        })
        .unwrap();
    assert!((started.0 - 4.94).abs() < 1e-3);
    assert!((started.1 - 2.47).abs() < 1e-3);

    let hide = d.current().unwrap().effect.unwrap();
    assert!(hide.params.reverse_mode);
    assert_eq!(hide.params.delay, 0.0);
    assert_eq!(hide.params.end_radius, 25.0);
    assert_eq!(hide.carried.unwrap().started_at, 0.0);
    assert_eq!(d.current().unwrap().render_order, 0);
    assert_eq!(d.next().unwrap().render_order, 1);
    assert_eq!(d.pending_timers(), 2);

    d.tick(12.0);
    assert_eq!(enabled(&d), vec!["room"]);
    d.tick(12.48);
    assert_eq!(enabled(&d).len(), 2);
    assert_eq!(count(&d, "reveal_started"), 2);

    d.tick(14.0);
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
    d.tick(14.95);
    assert!(d.is_idle());
    assert_eq!(d.current_dataset().unwrap().as_str(), "canyon");
    assert!(d.next().is_none());
    assert_eq!(enabled(&d), vec!["canyon"]);
    assert_eq!(d.host().live_count(), 1);
    assert_eq!(count(&d, "scene_changed"), 2);
    assert_eq!(d.pending_timers(), 0);
}

#[test]
fn mask_tracks_incoming_front() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    d.tick(11.0);
    assert_eq!(d.current().unwrap().effect.unwrap().params.mask_reveal_pos, 0.0);

    d.tick(13.0);
    let incoming = d.next().unwrap().effect.unwrap();
    let t = incoming.local_time(13.0);
    assert!((t - 0.53).abs() < 1e-3);
    let mask = d.current().unwrap().effect.unwrap().params;
    assert!((mask.mask_reveal_pos - 5.0 * t).abs() < 1e-3);
    assert_eq!(mask.mask_reveal_start_radius, 0.3);
}

#[test]
fn second_request_cancels_the_first() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    d.tick(13.0);
    assert!(enabled(&d).contains(&"canyon".to_owned()));

    d.change_to("skull", 13.0).unwrap();
    assert_eq!(count(&d, "transition_cancelled"), 1);
    assert_eq!(d.pending_timers(), 2);

    let mut t = 13.0;
    while t < 25.0 {
        t += 0.05;
        d.tick(t);
        let on = enabled(&d);
        assert!(
            !(on.contains(&"canyon".to_owned()) && on.contains(&"skull".to_owned())),
            "both enabled at {t}"
        );
    }
    assert!(d.is_idle());
    assert_eq!(enabled(&d), vec!["skull"]);
    assert_eq!(d.host().live_count(), 1);
}

#[test]
fn load_failure_reports_once_and_keeps_current() {
    let mut d = director_with(
        SyntheticLoader::with_points(16).failing("canyon"),
        HeadlessHost::default(),
    );
    d.change_to("room", 0.0).unwrap();
    d.start_reveal(0.0).unwrap();
    d.change_to("canyon", 1.0).unwrap();
    d.tick(2.0);
    d.tick(20.0);

    assert!(d.is_idle());
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
    assert!(!d.current().unwrap().effect.unwrap().params.reverse_mode);
    assert_eq!(enabled(&d), vec!["room"]);
    assert_eq!(count(&d, "load_error"), 1);
    match &d.events().last().unwrap().event {
        SceneEvent::LoadError {
            dataset_id,
            uri,
            cause,
        } => {
            assert_eq!(dataset_id.as_str(), "canyon");
            assert_eq!(uri, "assets/splats/Canyon.ply");
            assert!(cause.starts_with("dataset error: failed to load 'canyon'"));
            assert!(cause.ends_with("synthetic failure for 'canyon'"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn instance_failure_is_reported_as_load_error() {
    let mut host = HeadlessHost::default();
    host.reject("canyon");
    let mut d = director_with(SyntheticLoader::with_points(16), host);
    d.change_to("room", 0.0).unwrap();
    d.start_reveal(0.0).unwrap();
    d.change_to("canyon", 1.0).unwrap();

    assert!(d.is_idle());
    assert_eq!(count(&d, "load_error"), 1);
    let SceneEvent::LoadError { cause, .. } = &d.events().last().unwrap().event else {
        panic!("expected load error");
    };
    assert!(cause.starts_with("entity error:"));
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
}

#[test]
fn unknown_dataset_fails_and_reports() {
    let mut d = revealed_room();
    let err = d.change_to("atlantis", 11.0).unwrap_err();
    assert!(matches!(err, RevealError::DatasetNotFound { .. }));
    assert_eq!(count(&d, "load_error"), 1);
    assert!(d.is_idle());
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
}

#[test]
fn returning_to_current_mid_transition_re_reveals_it() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    d.change_to("room", 11.0).unwrap();

    assert!(d.is_idle());
    assert!(d.next().is_none());
    assert_eq!(d.pending_timers(), 0);
    let effect = d.current().unwrap().effect.unwrap();
    assert!(!effect.params.reverse_mode);
    assert_eq!(effect.started_at, 11.0);
    assert_eq!(effect.params.mask_reveal_pos, 0.0);
    assert_eq!(d.current().unwrap().render_order, 1);
    assert_eq!(enabled(&d), vec!["room"]);

    // promotion timer of the cancelled transition must not fire
    d.tick(20.0);
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
}

#[test]
fn unrevealed_current_switches_instantly() {
    let mut d = director();
    d.change_to("room", 0.0).unwrap();
    d.change_to("canyon", 1.0).unwrap();
    assert!(d.is_idle());
    assert_eq!(d.current_dataset().unwrap().as_str(), "canyon");
    assert_eq!(count(&d, "transition_started"), 0);
    assert_eq!(d.host().live_count(), 1);
}

#[test]
fn load_full_scene_tweens_progress() {
    let mut d = revealed_room();
    d.current
        .as_mut()
        .unwrap()
        .effect
        .as_mut()
        .unwrap()
        .params
        .hide_scene_progress = 0.4;
    d.load_full_scene(10.0).unwrap();
    d.tick(10.75);
    let mid = d.current().unwrap().effect.unwrap().params;
    assert!(mid.load_full_scene_progress > 0.5 && mid.load_full_scene_progress < 1.0);
    assert_eq!(mid.hide_scene_progress, 0.0);
    d.tick(11.6);
    let done = d.current().unwrap().effect.unwrap().params;
    assert_eq!(done.load_full_scene_progress, 1.0);
    assert!(d.current().unwrap().tweens.is_empty());
}

#[test]
fn hide_scene_sweeps_linearly() {
    let mut d = revealed_room();
    d.hide_scene(10.0).unwrap();
    d.tick(11.0);
    let p = d.current().unwrap().effect.unwrap().params;
    assert!((p.hide_scene_progress - 0.5).abs() < 1e-5);
    assert_eq!(p.hide_scene_min_y, -25.0);
    assert_eq!(p.hide_scene_max_y, 25.0);
    d.tick(13.0);
    assert_eq!(
        d.current().unwrap().effect.unwrap().params.hide_scene_progress,
        1.0
    );
}

#[test]
fn load_and_hide_need_a_dataset() {
    let mut d = director();
    assert!(d.load_full_scene(0.0).is_err());
    assert!(d.hide_scene(0.0).is_err());
    assert!(d.start_reveal(0.0).is_err());
}

#[test]
fn set_param_live_syncs_but_keeps_delay() {
    let mut d = revealed_room();
    d.set_param(ParamKey::PointCloudDensity, &ParamValue::Scalar(0.3), 10.0)
        .unwrap();
    d.set_param(ParamKey::Delay, &ParamValue::Scalar(2.0), 10.0)
        .unwrap();
    let p = d.current().unwrap().effect.unwrap().params;
    assert_eq!(p.point_cloud_density, 0.3);
    assert_eq!(p.delay, 0.0);
    assert_eq!(d.params().params().delay, 2.0);
}

#[test]
fn effect_cycle_restarts_revealed_current() {
    let mut d = revealed_room();
    d.next_effect(10.0);
    assert_eq!(d.effect_kind(), EffectKind::Instant);
    let effect = d.current().unwrap().effect.unwrap();
    assert_eq!(effect.kind, EffectKind::Instant);
    assert_eq!(effect.started_at, 10.0);
    d.prev_effect(10.0);
    d.prev_effect(10.0);
    assert_eq!(d.effect_kind(), EffectKind::Magic);
    assert_eq!(count(&d, "effect_changed"), 3);
}

#[test]
fn next_scene_walks_the_catalog() {
    let mut d = director();
    d.next_scene(0.0).unwrap();
    assert_eq!(d.current_dataset().unwrap().as_str(), "bull_06_771ks_sel");
    d.change_to("stonehenge", 0.0).unwrap();
    d.next_scene(0.0).unwrap();
    assert_eq!(d.current_dataset().unwrap().as_str(), "bull_06_771ks_sel");
}

#[test]
fn next_scene_is_ignored_mid_transition() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    let generation = d.generation();
    d.next_scene(10.5).unwrap();
    assert_eq!(d.generation(), generation);
}

#[test]
fn observers_see_every_event() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut d = director();
    let sink = Arc::clone(&seen);
    d.subscribe(move |e: &SceneEvent| sink.lock().unwrap().push(e.name()));
    d.change_to("room", 0.0).unwrap();
    assert_eq!(*seen.lock().unwrap(), names(&d));
}

#[test]
fn dispatch_routes_commands() {
    let mut d = director();
    d.dispatch(
        &Command::ChangeScene {
            id: DatasetId::from("room"),
        },
        0.0,
    )
    .unwrap();
    d.dispatch(&Command::StartReveal, 0.0).unwrap();
    d.dispatch(
        &Command::SetParam {
            key: ParamKey::PointCloudOpacity,
            value: ParamValue::Scalar(0.25),
        },
        0.5,
    )
    .unwrap();
    d.dispatch(&Command::SetEffect {
        effect: EffectKind::Fade,
    }, 1.0)
    .unwrap();
    assert_eq!(d.effect_kind(), EffectKind::Fade);
    assert_eq!(d.params().params().point_cloud_opacity, 0.25);
    assert!(d.dispatch(&Command::LoadFullScene, 1.0).is_ok());
}

#[test]
fn render_frame_evaluates_enabled_instances() {
    let mut d = revealed_room();
    let frames = d.render_frame(10.0, &EvalThreading::sequential()).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].outputs.len(), 64);
    assert!(frames[0].stats.points_visible > 0);

    d.change_to("canyon", 10.0).unwrap();
    d.tick(13.0);
    let frames = d.render_frame(13.0, &EvalThreading::sequential()).unwrap();
    let order: Vec<i32> = frames.iter().map(|f| f.render_order).collect();
    assert_eq!(order, vec![0, 1]);
}

#[test]
fn status_reflects_transition() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    let status = d.status();
    assert!(matches!(status.transition, TransitionState::InProgress { .. }));
    assert_eq!(status.next.as_ref().unwrap().as_str(), "canyon");
    assert!((status.next_timer_due.unwrap() - 12.47).abs() < 1e-3);
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["transition"]["state"], "in_progress");
}

#[test]
fn handoff_keeps_a_sparse_reveal_in_place() {
    let mut d = director();
    d.change_to("room", 0.0).unwrap();
    d.start_reveal(0.0).unwrap();
    hand_off_without_a_jump(&mut d, 2.0);
    // the hide then eats into what was shown
    let at_start = shown(&room_outputs(&d, 2.0));
    assert!(at_start > 0);
    d.tick(3.5);
    assert!(shown(&room_outputs(&d, 3.5)) < at_start);
}

#[test]
fn handoff_keeps_a_loaded_scene_in_place() {
    let mut d = revealed_room();
    d.load_full_scene(10.0).unwrap();
    hand_off_without_a_jump(&mut d, 12.0);
    let hide = d.current().unwrap().effect.unwrap().params;
    assert_eq!(hide.load_full_scene_progress, 1.0);

    let at_start = shown(&room_outputs(&d, 12.0));
    d.tick(16.5);
    assert!(shown(&room_outputs(&d, 16.5)) * 4 < at_start);
}

#[test]
fn handoff_keeps_a_hidden_scene_hidden() {
    let mut d = revealed_room();
    d.hide_scene(10.0).unwrap();
    hand_off_without_a_jump(&mut d, 13.0);
    assert_eq!(
        d.current().unwrap().effect.unwrap().params.hide_scene_progress,
        1.0
    );
    d.tick(14.0);
    assert_eq!(shown(&room_outputs(&d, 14.0)), 0);
}

#[test]
fn failed_retarget_brings_the_hiding_scene_back() {
    let mut d = director_with(
        SyntheticLoader::with_points(64).failing("canyon"),
        HeadlessHost::default(),
    );
    d.change_to("room", 0.0).unwrap();
    d.start_reveal(0.0).unwrap();
    d.tick(10.0);
    d.change_to("skull", 10.0).unwrap();
    d.tick(11.0);
    let before = room_outputs(&d, 11.0);

    d.change_to("canyon", 11.0).unwrap();
    assert!(d.is_idle());
    assert_eq!(count(&d, "transition_cancelled"), 1);
    assert_eq!(count(&d, "load_error"), 1);
    assert_eq!(d.pending_timers(), 0);
    assert_eq!(d.current_dataset().unwrap().as_str(), "room");
    let effect = d.current().unwrap().effect.unwrap();
    assert!(!effect.params.reverse_mode);
    assert_eq!(effect.params.end_radius, 25.0);
    assert!((effect.front_radius(11.0).unwrap() - 20.0).abs() < 1e-3);
    assert_no_jump(&before, &room_outputs(&d, 11.0));

    d.tick(30.0);
    assert_eq!(enabled(&d), vec!["room"]);
    let mut fresh = revealed_room();
    fresh.tick(30.0);
    assert_no_jump(&room_outputs(&fresh, 30.0), &room_outputs(&d, 30.0));
}

#[test]
fn failed_load_of_an_unknown_retarget_brings_the_scene_back() {
    let mut d = revealed_room();
    d.change_to("canyon", 10.0).unwrap();
    d.tick(11.0);
    assert!(d.change_to("atlantis", 11.0).is_err());
    assert!(d.is_idle());
    let effect = d.current().unwrap().effect.unwrap();
    assert!(!effect.params.reverse_mode);
    assert!((effect.front_radius(11.0).unwrap() - 20.0).abs() < 1e-3);
    assert_eq!(count(&d, "reveal_started"), 2);
}
