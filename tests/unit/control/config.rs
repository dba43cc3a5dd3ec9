use super::*;

#[test]
fn defaults_validate() {
    let cfg = DirectorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.timing().reverse_speed, 5.0);
    assert_eq!(cfg.timing().overlap, 0.5);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = DirectorConfig::from_json(r#"{"overlap":0.25,"initial_effect":"fade"}"#).unwrap();
    assert_eq!(cfg.overlap, 0.25);
    assert_eq!(cfg.initial_effect, EffectKind::Fade);
    assert_eq!(cfg.hide_scene_duration, 2.0);
}

#[test]
fn bad_values_are_rejected() {
    let err = DirectorConfig::from_json(r#"{"reverse_speed":0}"#).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
    assert!(DirectorConfig::from_json(r#"{"overlap":1.5}"#).is_err());
    assert!(
        DirectorConfig::from_json(r#"{"min_reverse_duration":5,"max_reverse_duration":1}"#)
            .is_err()
    );
    let err = DirectorConfig::from_json(r#"{"unknown":1}"#).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}
