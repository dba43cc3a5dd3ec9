use super::*;

#[test]
fn snapshot_resolves_the_front_once() {
    let params = EffectParams {
        speed: 5.0,
        acceleration: 0.0,
        delay: 3.0,
        reveal_start_radius: 0.3,
        ..EffectParams::default()
    };
    let snap = FrameSnapshot::new(EffectKind::Radial, &params, 4.0);
    assert!((snap.front - 4.7).abs() < 1e-5);

    let reverse = EffectParams {
        reverse_mode: true,
        reverse_speed: 5.0,
        delay: 0.0,
        ..params
    };
    let snap = FrameSnapshot::new(EffectKind::Radial, &reverse, 1.0);
    // 25 - 5, measured from the reveal start radius
    assert!((snap.front - 19.7).abs() < 1e-5);
}

#[test]
fn snapshot_sanitizes_time_and_params() {
    let params = EffectParams {
        point_cloud_density: 9.0,
        ..EffectParams::default()
    };
    let snap = FrameSnapshot::new(EffectKind::Radial, &params, f32::NAN);
    assert_eq!(snap.time, 0.0);
    assert_eq!(snap.params.point_cloud_density, 1.0);
}

#[test]
fn finish_clamps_and_derives_visibility() {
    let out = PointOutput {
        alpha: 1.7,
        ..PointOutput::PASSTHROUGH
    }
    .finish();
    assert_eq!(out.alpha, 1.0);
    assert!(out.visible);

    let out = PointOutput {
        alpha: f32::NAN,
        ..PointOutput::PASSTHROUGH
    }
    .finish();
    assert!(!out.visible);

    let out = PointOutput {
        size_scale: 0.0,
        ..PointOutput::PASSTHROUGH
    }
    .finish();
    assert!(!out.visible);
}

#[test]
fn apply_to_composes_all_channels() {
    let point = Point::new(Vec3::new(1.0, 2.0, 3.0), Rgb::new(0.5, 0.5, 0.5), 0.8, 0.1);
    let out = PointOutput {
        visible: true,
        alpha: 0.5,
        size_scale: 2.0,
        position_offset: Vec3::new(0.0, 1.0, 0.0),
        color_tint: Rgb::new(0.0, 0.25, 0.0),
        color_scale: Rgb::splat(0.5),
    };
    let drawn = out.apply_to(&point);
    assert_eq!(drawn.position, Vec3::new(1.0, 3.0, 3.0));
    assert_eq!(drawn.color, Rgb::new(0.25, 0.5, 0.25));
    assert!((drawn.opacity - 0.4).abs() < 1e-6);
    assert!((drawn.size - 0.2).abs() < 1e-6);
}

#[test]
fn continuing_keeps_the_motion_clock_of_the_previous_effect() {
    let forward = EffectParams::default();
    let hide = EffectParams {
        reverse_mode: true,
        ..forward
    };
    let snap = FrameSnapshot::new(EffectKind::Radial, &hide, 0.5).continuing(&forward, 40.5);
    assert_eq!(snap.time, 0.5);
    assert_eq!(snap.motion_time, 40.5);
    assert_eq!(snap.ocean, OceanSchedule::new(&forward));
    assert_eq!(FrameSnapshot::new(EffectKind::Radial, &hide, 0.5).motion_time, 0.5);
}

#[test]
fn wave_kinds_report_the_raw_wave_distance() {
    let params = EffectKind::Spread.build(&EffectParams::default());
    let snap = FrameSnapshot::new(EffectKind::Spread, &params, 3.0);
    assert!((snap.front - 6.0).abs() < 1e-5);
}
