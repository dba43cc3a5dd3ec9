use super::*;

fn params() -> EffectParams {
    EffectParams::default()
}

#[test]
fn load_sweep_is_zero_before_and_one_after() {
    let mut p = params();
    for d in [0.0, 1.0, 12.0, 25.0] {
        assert_eq!(load_local_t(d, &p), 0.0);
    }
    p.load_full_scene_progress = 1.0;
    for d in [0.0, 1.0, 12.0, 25.0] {
        assert!((load_local_t(d, &p) - 1.0).abs() < 1e-6, "dist {d}");
    }
}

#[test]
fn load_sweep_travels_outward() {
    let mut p = params();
    p.load_full_scene_progress = 0.4;
    assert!(load_local_t(1.0, &p) > 0.99);
    assert!(load_local_t(24.0, &p) < 0.01);
}

#[test]
fn effect_fade_ends_at_full_load() {
    let p = params();
    assert_eq!(effect_fade(0.0, &p), 1.0);
    assert_eq!(effect_fade(1.0, &p), 0.0);
    assert!(effect_fade(0.95, &p) > 0.0);
}

#[test]
fn mask_is_off_until_enabled() {
    let p = params();
    assert_eq!(mask_visibility(0.0, &p), 1.0);
}

#[test]
fn mask_hides_inside_and_keeps_outside() {
    let mut p = params();
    p.mask_reveal_pos = 5.3;
    p.mask_reveal_start_radius = 0.3;
    p.mask_feather = 0.4;
    assert_eq!(mask_visibility(4.0, &p), 0.0);
    assert_eq!(mask_visibility(6.0, &p), 1.0);
    let mid = mask_visibility(4.8, &p);
    assert!(mid > 0.0 && mid < 1.0);
}

#[test]
fn hide_sweep_endpoints_are_exact() {
    let mut p = params();
    let pts = [
        Vec3::new(0.0, -10.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 10.0, 0.0),
        Vec3::new(0.0, 50.0, 3.0),
    ];
    for q in pts {
        assert_eq!(hide_visibility(q, &p), 1.0);
    }
    p.hide_scene_progress = 1.0;
    for q in pts {
        assert_eq!(hide_visibility(q, &p), 0.0);
    }
}

#[test]
fn bottom_up_hides_low_points_first() {
    let mut p = params();
    p.hide_scene_progress = 0.5;
    let low = hide_visibility(Vec3::new(0.0, -8.0, 0.0), &p);
    let high = hide_visibility(Vec3::new(0.0, 8.0, 0.0), &p);
    assert_eq!(low, 0.0);
    assert_eq!(high, 1.0);

    p.hide_scene_mode = HideSweepMode::TopDown;
    let low = hide_visibility(Vec3::new(0.0, -8.0, 0.0), &p);
    let high = hide_visibility(Vec3::new(0.0, 8.0, 0.0), &p);
    assert_eq!(low, 1.0);
    assert_eq!(high, 0.0);
}

#[test]
fn camera_mode_hides_near_points_first() {
    let mut p = params();
    p.hide_scene_mode = HideSweepMode::CameraDistance;
    p.camera_position = Vec3::new(0.0, 0.0, 20.0);
    p.hide_scene_progress = 0.5;
    assert_eq!(hide_visibility(Vec3::new(0.0, 0.0, 19.0), &p), 0.0);
    assert_eq!(hide_visibility(Vec3::new(0.0, 0.0, -20.0), &p), 1.0);
}

#[test]
fn degenerate_height_range_is_safe() {
    let mut p = params();
    p.hide_scene_min_y = 2.0;
    p.hide_scene_max_y = 2.0;
    p.hide_scene_progress = 0.3;
    let v = hide_visibility(Vec3::new(0.0, 5.0, 0.0), &p);
    assert!(v.is_finite());
}
