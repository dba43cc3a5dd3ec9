use super::*;
use crate::effects::kind::EffectKind;
use crate::foundation::math::mix64;

fn params() -> EffectParams {
    EffectParams {
        speed: 5.0,
        acceleration: 0.0,
        delay: 3.0,
        reveal_start_radius: 0.3,
        end_radius: 25.0,
        point_cloud_density: 1.0,
        ..EffectParams::default()
    }
}

fn point(x: f32, y: f32, z: f32) -> Point {
    Point::new(Vec3::new(x, y, z), Rgb::new(0.5, 0.5, 0.5), 1.0, 0.05)
}

fn cloud(n: usize, radius: f32, seed: u64) -> Vec<Point> {
    (0..n as u64)
        .map(|i| {
            let h = |salt: u64| (mix64(seed ^ (i * 4 + salt)) >> 40) as f32 / (1u64 << 24) as f32;
            let v = Vec3::new(h(0) - 0.5, h(1) - 0.5, h(2) - 0.5) * 2.0;
            let v = if v.length() > 1.0 { v.normalize() * h(3) } else { v };
            point(v.x * radius, v.y * radius, v.z * radius)
        })
        .collect()
}

fn eval(p: &EffectParams, t: f32, pt: &Point) -> PointOutput {
    FrameSnapshot::new(EffectKind::Radial, p, t).evaluate(pt)
}

#[test]
fn beyond_end_radius_is_never_visible() {
    let mut p = params();
    let outside = [point(25.5, 0.0, 0.0), point(0.0, 30.0, 0.0), point(-20.0, 0.0, 20.0)];
    for progress in [0.0, 0.5, 1.0] {
        p.load_full_scene_progress = progress;
        for reverse in [false, true] {
            p.reverse_mode = reverse;
            for t in [0.0, 4.0, 8.0, 50.0, 500.0] {
                for pt in &outside {
                    assert!(!eval(&p, t, pt).visible);
                }
            }
        }
    }
}

#[test]
fn nothing_shows_before_the_delay_elapses() {
    let p = params();
    for pt in cloud(500, 10.0, 1) {
        assert!(!eval(&p, 2.5, &pt).visible);
    }
}

#[test]
fn front_separates_shown_from_hidden() {
    let p = params();
    // t = 5 -> dot wave at 5 * 2 - 0.3
    let t = 5.0;
    assert!(eval(&p, t, &point(3.0, 0.0, 0.0)).visible);
    assert!(eval(&p, t, &point(0.0, 0.0, 9.0)).visible);
    assert!(!eval(&p, t, &point(10.0, 0.0, 0.0)).visible);
    assert!(!eval(&p, t, &point(0.0, 15.0, 0.0)).visible);
}

#[test]
fn sparse_phase_draws_small_dots() {
    let p = params();
    let out = eval(&p, 20.0, &point(2.0, 1.0, 0.0));
    assert!(out.visible);
    assert!(out.size_scale < 0.5, "size {}", out.size_scale);
    assert!(out.alpha <= p.point_cloud_opacity + 1e-6);
}

#[test]
fn density_thinning_keeps_about_the_requested_fraction() {
    let p = EffectParams {
        point_cloud_density: 0.25,
        ..params()
    };
    let pts = cloud(20_000, 20.0, 7);
    let visible = pts.iter().filter(|pt| eval(&p, 20.0, pt).visible).count();
    let frac = visible as f32 / pts.len() as f32;
    assert!((frac - 0.25).abs() < 0.03, "fraction {frac}");
}

#[test]
fn full_load_shows_every_point_without_motion_or_tint() {
    let p = EffectParams {
        point_cloud_density: 0.25,
        load_full_scene_progress: 1.0,
        ..params()
    };
    for pt in cloud(2000, 24.0, 3) {
        let out = eval(&p, 37.0, &pt);
        assert!(out.visible);
        assert!((out.alpha - 1.0).abs() < 1e-6);
        assert!((out.size_scale - 1.0).abs() < 1e-5);
        assert_eq!(out.position_offset, Vec3::ZERO);
        assert_eq!(out.color_tint, Rgb::BLACK);
        assert_eq!(out.color_scale, Rgb::WHITE);
    }
}

#[test]
fn reverse_front_hides_from_the_outside_in() {
    let p = EffectParams {
        reverse_mode: true,
        reverse_speed: 5.0,
        delay: 0.0,
        ..params()
    };
    // edge at 25 - 5 * 2 - 0.3
    let t = 2.0;
    assert!(eval(&p, t, &point(10.0, 0.0, 0.0)).visible);
    assert!(!eval(&p, t, &point(20.0, 0.0, 0.0)).visible);
    // once the front settles on the reveal start radius nothing is left
    for pt in cloud(500, 24.0, 4) {
        assert!(!eval(&p, 30.0, &pt).visible);
    }
}

/// Hide that takes over from `forward` at effect time `at`.
fn hide_from(forward: &EffectParams, at: f32) -> EffectParams {
    let kin = forward.kinematics();
    EffectParams {
        reverse_mode: true,
        reverse_speed: 5.0,
        end_radius: kin.forward_front(at).min(forward.end_radius),
        delay: 0.0,
        ..*forward
    }
}

fn eval_hide(forward: &EffectParams, at: f32, t: f32, pt: &Point) -> PointOutput {
    FrameSnapshot::new(EffectKind::Radial, &hide_from(forward, at), t)
        .continuing(forward, at + t)
        .evaluate(pt)
}

fn assert_same_look(forward: &EffectParams, at: f32, pts: &[Point]) {
    for pt in pts {
        let before = eval(forward, at, pt);
        let after = eval_hide(forward, at, 0.0, pt);
        assert_eq!(before.visible, after.visible, "visibility of {pt:?}");
        assert!((before.alpha - after.alpha).abs() < 1e-5, "alpha of {pt:?}");
        if before.visible {
            assert!((before.size_scale - after.size_scale).abs() < 1e-5, "size of {pt:?}");
            assert!(before.position_offset.abs_diff_eq(after.position_offset, 1e-5));
            assert!(before.color_tint.to_vec3().abs_diff_eq(after.color_tint.to_vec3(), 1e-5));
            assert!(before.color_scale.to_vec3().abs_diff_eq(after.color_scale.to_vec3(), 1e-5));
        }
    }
}

#[test]
fn hide_picks_up_a_sparse_reveal_where_it_left_off() {
    // front at 12, halfway out
    assert_same_look(&params(), 5.4, &cloud(2000, 24.0, 21));
}

#[test]
fn hide_picks_up_a_loaded_scene_where_it_left_off() {
    let p = EffectParams {
        load_full_scene_progress: 1.0,
        ..params()
    };
    assert_same_look(&p, 12.0, &cloud(2000, 24.0, 22));

    // and then takes loaded points away from the outside in
    assert!(!eval_hide(&p, 12.0, 2.0, &point(20.0, 0.0, 0.0)).visible);
    assert!(eval_hide(&p, 12.0, 2.0, &point(5.0, 0.0, 0.0)).visible);
    assert!(!eval_hide(&p, 12.0, 8.0, &point(1.0, 0.0, 0.0)).visible);
}

#[test]
fn hide_keeps_a_hidden_scene_hidden() {
    let p = EffectParams {
        hide_scene_progress: 1.0,
        load_full_scene_progress: 1.0,
        ..params()
    };
    let pts = cloud(500, 24.0, 23);
    assert_same_look(&p, 12.0, &pts);
    assert!(pts.iter().all(|pt| !eval_hide(&p, 12.0, 0.5, pt).visible));
}

#[test]
fn alpha_and_size_are_continuous_in_time() {
    let p = params();
    for pt in [point(4.0, 0.0, 0.0), point(0.0, 7.3, 1.0), point(-2.0, -2.0, 12.0)] {
        let mut prev = eval(&p, 3.0, &pt);
        for i in 1..16_000 {
            let t = 3.0 + i as f32 * 0.0002;
            let cur = eval(&p, t, &pt);
            assert!((cur.alpha - prev.alpha).abs() < 0.15, "alpha jump at t {t}");
            assert!((cur.size_scale - prev.size_scale).abs() < 0.15, "size jump at t {t}");
            prev = cur;
        }
    }
}

#[test]
fn hide_sweep_completion_hides_everything() {
    let p = EffectParams {
        hide_scene_progress: 1.0,
        load_full_scene_progress: 1.0,
        ..params()
    };
    for pt in cloud(500, 20.0, 5) {
        assert!(!eval(&p, 40.0, &pt).visible);
    }
}

#[test]
fn evaluation_is_deterministic() {
    let p = params();
    let pts = cloud(200, 20.0, 9);
    for pt in &pts {
        assert_eq!(eval(&p, 6.25, pt), eval(&p, 6.25, pt));
    }
}

#[test]
fn degenerate_parameters_stay_finite() {
    let p = EffectParams {
        speed: 0.0,
        acceleration: 0.0,
        end_radius: 0.0,
        reveal_start_radius: 0.0,
        point_cloud_scale: 0.0,
        load_full_scene_wave_thickness: 0.0,
        hide_scene_min_y: 1.0,
        hide_scene_max_y: 1.0,
        hide_scene_progress: 0.5,
        ..params()
    };
    for pt in [point(0.0, 0.0, 0.0), point(1.0, 1.0, 1.0)] {
        let out = eval(&p, 10.0, &pt);
        assert!(out.alpha.is_finite());
        assert!(out.size_scale.is_finite());
        assert!(out.position_offset.is_finite());
    }
}
